//! Usage: Cross-cutting utilities shared across domains (low-level helpers, pure logic).

pub mod error;
pub(crate) mod fs;
pub(crate) mod keyed_lock;
pub(crate) mod mutex_ext;
pub(crate) mod serde_ext;
