use std::fs;
use std::sync::Arc;

use parley_application::bootstrap::open_session;
use parley_application::{AnalyzeCommand, ChatService, ContextPolicy, UploadEvent};
use parley_core::chat::{ChatSession, ContentPart};
use parley_core::conversation::{ConversationRepository, Turn};
use parley_core::locale::EN;
use parley_infrastructure::FileConversationRepository;
use parley_interaction::mock::{MockChatClient, MockChatSession, MockFileStore};
use tempfile::TempDir;

const CONTEXT: &str = "[CONTEXT: SYSTEM]: Linux\n[CONTEXT: HISTORY (last 10 commands)]: ls";

struct Fixture {
    _dir: TempDir,
    dir_path: std::path::PathBuf,
    repository: Arc<FileConversationRepository>,
    store: Arc<MockFileStore>,
    client: MockChatClient,
}

impl Fixture {
    fn new(store: MockFileStore, client: MockChatClient) -> Self {
        let dir = TempDir::new().unwrap();
        let dir_path = dir.path().to_path_buf();
        let repository = Arc::new(FileConversationRepository::new(
            dir_path.join("test.chat_history.txt"),
        ));
        Self {
            _dir: dir,
            dir_path,
            repository,
            store: Arc::new(store),
            client,
        }
    }

    async fn service(&self, policy: ContextPolicy) -> ChatService<MockChatSession> {
        let session = open_session(
            &self.client,
            self.repository.as_ref(),
            "mock-model",
            Some(EN.system_instruction),
        )
        .await
        .expect("Should open session");
        ChatService::new(
            session,
            self.store.clone(),
            self.repository.clone(),
            &EN,
        )
        .with_context(CONTEXT, policy)
    }
}

fn texts(parts: &[ContentPart]) -> Vec<String> {
    parts
        .iter()
        .filter_map(|part| part.as_text().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn test_bootstrap_replays_stored_turns_in_order() {
    let fixture = Fixture::new(MockFileStore::new(), MockChatClient::new());
    let stored = vec![Turn::user("one"), Turn::model("two"), Turn::user("three")];
    fixture.repository.save(&stored).unwrap();

    let service = fixture.service(ContextPolicy::WhileFresh).await;

    let requests = fixture.client.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].initial_turns, stored);
    assert_eq!(requests[0].model, "mock-model");
    assert_eq!(
        requests[0].system_instruction.as_deref(),
        Some(EN.system_instruction)
    );
    assert_eq!(service.session().transcript(), stored);
}

#[tokio::test]
async fn test_bootstrap_failure_is_reported() {
    let fixture = Fixture::new(MockFileStore::new(), MockChatClient::new().failing_create());
    let result = open_session(&fixture.client, fixture.repository.as_ref(), "m", None).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_context_prepended_only_while_fresh() {
    let fixture = Fixture::new(MockFileStore::new(), MockChatClient::new());
    let mut service = fixture.service(ContextPolicy::WhileFresh).await;

    service.send_message("first").await.unwrap();
    service.send_message("second").await.unwrap();

    let sent = fixture.client.sent();
    assert_eq!(texts(&sent[0]), vec![format!("{CONTEXT}\n\n[USER QUESTION]: first")]);
    assert_eq!(texts(&sent[1]), vec!["second".to_string()]);
}

#[tokio::test]
async fn test_no_context_when_history_was_loaded() {
    let fixture = Fixture::new(MockFileStore::new(), MockChatClient::new());
    fixture.repository.save(&[Turn::user("hi"), Turn::model("hello")]).unwrap();
    let mut service = fixture.service(ContextPolicy::WhileFresh).await;

    service.send_message("again").await.unwrap();
    assert_eq!(texts(&fixture.client.sent()[0]), vec!["again".to_string()]);
}

#[tokio::test]
async fn test_first_turn_of_run_policy_ignores_loaded_history() {
    let fixture = Fixture::new(MockFileStore::new(), MockChatClient::new());
    fixture.repository.save(&[Turn::user("hi"), Turn::model("hello")]).unwrap();
    let mut service = fixture.service(ContextPolicy::FirstTurnOfRun).await;

    service.send_message("spoken").await.unwrap();
    service.send_message("spoken again").await.unwrap();

    let sent = fixture.client.sent();
    assert!(texts(&sent[0])[0].starts_with(CONTEXT));
    assert_eq!(texts(&sent[1]), vec!["spoken again".to_string()]);
}

#[tokio::test]
async fn test_analyze_sends_context_files_then_prompt() {
    let fixture = Fixture::new(MockFileStore::new(), MockChatClient::new());
    let project = fixture.dir_path.join("project");
    fs::create_dir(&project).unwrap();
    fs::write(project.join("main.py"), "print(1)").unwrap();
    fs::write(project.join("logo.png"), [0x89, b'P', b'N', b'G']).unwrap();

    let mut service = fixture.service(ContextPolicy::WhileFresh).await;
    let command = AnalyzeCommand {
        path: project.display().to_string(),
        prompt: "explain this".to_string(),
    };
    let reply = service.analyze(&command, |_| {}).await.unwrap();

    assert_eq!(reply.uploaded, 2);
    let all_sent = fixture.client.sent();
    let sent = &all_sent[0];
    assert_eq!(sent.len(), 4);
    assert_eq!(sent[0].as_text(), Some(CONTEXT));
    assert!(matches!(sent[1], ContentPart::File(_)));
    assert!(matches!(sent[2], ContentPart::File(_)));
    assert_eq!(sent[3].as_text(), Some("explain this"));
    assert_eq!(service.pending_uploads().len(), 2);
}

#[tokio::test]
async fn test_analyze_without_files_tells_the_model() {
    let fixture = Fixture::new(MockFileStore::new(), MockChatClient::new());
    let empty = fixture.dir_path.join("empty");
    fs::create_dir(&empty).unwrap();
    let mut service = fixture.service(ContextPolicy::WhileFresh).await;
    service.send_message("warm up").await.unwrap();

    let mut notices = Vec::new();
    let exists_cmd = AnalyzeCommand {
        path: empty.display().to_string(),
        prompt: "anything".to_string(),
    };
    service
        .analyze(&exists_cmd, |e| {
            if let UploadEvent::NothingUploaded { notice } = e {
                notices.push(notice);
            }
        })
        .await
        .unwrap();

    let missing_cmd = AnalyzeCommand {
        path: fixture.dir_path.join("missing").display().to_string(),
        prompt: "anything".to_string(),
    };
    service
        .analyze(&missing_cmd, |e| {
            if let UploadEvent::NothingUploaded { notice } = e {
                notices.push(notice);
            }
        })
        .await
        .unwrap();

    assert_eq!(notices.len(), 2);
    assert!(notices[0].contains(EN.analyze_check_exists));
    assert!(notices[1].contains(EN.analyze_check_not_found));
    assert_ne!(notices[0], notices[1]);

    let sent = fixture.client.sent();
    let analyze_parts = &sent[1];
    assert_eq!(analyze_parts.len(), 1);
    let text = analyze_parts[0].as_text().unwrap();
    assert!(text.starts_with("[INTERNAL_ERROR_FILE_UPLOAD]: "));
    assert!(!text.contains("anything"));
}

#[tokio::test]
async fn test_failed_turn_is_not_recorded() {
    let fixture = Fixture::new(MockFileStore::new(), MockChatClient::new().failing_send(2));
    let mut service = fixture.service(ContextPolicy::WhileFresh).await;

    service.send_message("ok").await.unwrap();
    assert!(service.send_message("boom").await.is_err());

    let report = service.shutdown().await;
    assert_eq!(report.saved.unwrap(), 2);
    let stored = fixture.repository.load();
    assert_eq!(stored.len(), 2);
    assert!(stored[0].text.ends_with("[USER QUESTION]: ok"));
    assert_eq!(stored[1], Turn::model(format!("echo: {}", stored[0].text)));
}

#[tokio::test]
async fn test_shutdown_saves_and_cleans_up() {
    let fixture = Fixture::new(
        MockFileStore::new().failing_delete("files/1"),
        MockChatClient::new(),
    );
    let project = fixture.dir_path.join("project");
    fs::create_dir(&project).unwrap();
    fs::write(project.join("a.txt"), "a").unwrap();
    fs::write(project.join("b.txt"), "b").unwrap();

    let mut service = fixture.service(ContextPolicy::WhileFresh).await;
    let command = AnalyzeCommand {
        path: project.display().to_string(),
        prompt: "compare".to_string(),
    };
    service.analyze(&command, |_| {}).await.unwrap();

    let report = service.shutdown().await;
    assert_eq!(report.saved.unwrap(), 2);
    assert_eq!(report.cleanup.deleted, 1);
    assert_eq!(report.cleanup.failures.len(), 1);
    assert_eq!(fixture.store.deletes().len(), 2);

    // multi-line user text survives the round trip through the log
    let stored = fixture.repository.load();
    assert_eq!(stored[0].text, format!("{CONTEXT}\ncompare"));
}

#[tokio::test]
async fn test_save_failure_does_not_skip_cleanup() {
    let dir = TempDir::new().unwrap();
    let repository = Arc::new(FileConversationRepository::new(
        dir.path().join("missing").join("x.chat_history.txt"),
    ));
    let store = Arc::new(MockFileStore::new());
    let client = MockChatClient::new();
    let project = dir.path().join("project");
    fs::create_dir(&project).unwrap();
    fs::write(project.join("a.txt"), "a").unwrap();

    let session = open_session(&client, repository.as_ref(), "m", None)
        .await
        .unwrap();
    let mut service = ChatService::new(session, store.clone(), repository, &EN);
    let command = AnalyzeCommand {
        path: project.display().to_string(),
        prompt: "p".to_string(),
    };
    service.analyze(&command, |_| {}).await.unwrap();

    let report = service.shutdown().await;
    assert!(report.saved.unwrap_err().is_io());
    assert_eq!(report.cleanup.deleted, 1);
    assert_eq!(store.deletes(), vec!["files/1".to_string()]);
}
