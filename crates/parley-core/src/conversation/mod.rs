//! Conversation domain module.
//!
//! # Module Structure
//!
//! - `message`: Turn types (`Role`, `RoleTag`, `Turn`)
//! - `repository`: Repository trait for conversation log persistence

mod message;
mod repository;

pub use message::{Role, RoleTag, Turn};
pub use repository::ConversationRepository;
