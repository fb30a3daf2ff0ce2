//! Conversation repository trait.
//!
//! Defines the interface for conversation log persistence.

use super::message::Turn;
use crate::error::Result;

/// An abstract repository for one named conversation log.
///
/// A repository is bound to a single log (for the file implementation, a
/// single path). Reads are forgiving and writes are full rewrites: the
/// source of truth at save time is the chat session's complete transcript.
pub trait ConversationRepository: Send + Sync {
    /// Loads the stored turns in append order.
    ///
    /// Never fails: a missing or unreadable log yields an empty vector.
    fn load(&self) -> Vec<Turn>;

    /// Replaces the stored log with `turns`.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Log rewritten
    /// - `Err(_)`: The log could not be written; callers report it and go on
    fn save(&self, turns: &[Turn]) -> Result<()>;

    /// Human-readable name of the log, used in status lines.
    fn display_name(&self) -> String;
}
