//! Usage: Application layer (shared state, notices, logging setup).

pub mod app_state;
pub mod logging;
pub mod notice;
