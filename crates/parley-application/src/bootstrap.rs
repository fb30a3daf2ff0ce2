//! Session Bootstrap: replays a stored conversation into a new chat session.

use parley_core::chat::{ChatClient, ChatError, SessionRequest};
use parley_core::conversation::ConversationRepository;

/// Loads the full stored log and opens a session seeded with it.
///
/// Turns are handed over unchanged and in file order; an empty log opens
/// a fresh conversation.
pub async fn open_session<C>(
    client: &C,
    repository: &dyn ConversationRepository,
    model: &str,
    system_instruction: Option<&str>,
) -> Result<C::Session, ChatError>
where
    C: ChatClient,
{
    let initial_turns = repository.load();
    tracing::info!(
        "[Bootstrap] Replaying {} turns from {}",
        initial_turns.len(),
        repository.display_name()
    );

    client
        .create_session(SessionRequest {
            model: model.to_string(),
            initial_turns,
            system_instruction: system_instruction.map(str::to_string),
        })
        .await
}
