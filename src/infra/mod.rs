//! Usage: Infrastructure adapters (filesystem paths, persistence, remote HTTP APIs).

pub mod api_client;
pub mod app_paths;
pub mod credential_store;
pub mod settings;
pub mod weather;
