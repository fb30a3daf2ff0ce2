//! Domain types and service seams for Parley.
//!
//! Nothing in this crate performs I/O. Storage lives in
//! `parley-infrastructure`, service adapters in `parley-interaction`.

pub mod chat;
pub mod conversation;
pub mod error;
pub mod files;
pub mod locale;
pub mod speech;

// Re-export common error type
pub use error::ParleyError;
