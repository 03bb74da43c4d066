//! Usage: Screen-level business logic (session, tasks, emergency contact, shortcuts, check-in).

pub mod auth;
pub mod checkin;
pub mod emergency;
pub mod session;
pub mod shortcuts;
pub mod tasks;
