use std::path::Path;
use std::sync::Arc;

use parley_application::ChatService;
use parley_application::bootstrap::open_session;
use parley_core::locale::EN;
use parley_infrastructure::FileConversationRepository;
use parley_interaction::mock::{MockChatClient, MockChatSession, MockFileStore};

pub(crate) async fn chat_service(
    client: &MockChatClient,
    store: Arc<MockFileStore>,
    dir: &Path,
) -> ChatService<MockChatSession> {
    let repository = Arc::new(FileConversationRepository::new(
        dir.join("loop.chat_history.txt"),
    ));
    let session = open_session(client, repository.as_ref(), "mock-model", None)
        .await
        .unwrap();
    ChatService::new(session, store, repository, &EN)
}
