//! In-memory stand-ins for the Gemini API, used by tests.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use parley_core::chat::{ChatClient, ChatError, ChatSession, ContentPart, SessionRequest};
use parley_core::conversation::Turn;
use parley_core::files::{FileStore, FileStoreError, RemoteFile};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn joined_text(parts: &[ContentPart]) -> String {
    parts
        .iter()
        .filter_map(ContentPart::as_text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Chat client whose sessions echo the text of every turn.
#[derive(Clone, Default)]
pub struct MockChatClient {
    fail_create: bool,
    fail_on_send: Option<usize>,
    requests: Arc<Mutex<Vec<SessionRequest>>>,
    sent: Arc<Mutex<Vec<Vec<ContentPart>>>>,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `create_session` fail.
    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// Makes the `n`-th send (1-based) of each session fail with an API error.
    pub fn failing_send(mut self, n: usize) -> Self {
        self.fail_on_send = Some(n);
        self
    }

    /// Every session request received so far.
    pub fn requests(&self) -> Vec<SessionRequest> {
        lock(&self.requests).clone()
    }

    /// Parts of every turn sent through any session, in order.
    pub fn sent(&self) -> Vec<Vec<ContentPart>> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    type Session = MockChatSession;

    async fn create_session(&self, request: SessionRequest) -> Result<Self::Session, ChatError> {
        lock(&self.requests).push(request.clone());
        if self.fail_create {
            return Err(ChatError::Api {
                code: 403,
                status: Some("PERMISSION_DENIED".to_string()),
                message: "API key not valid".to_string(),
            });
        }

        Ok(MockChatSession {
            transcript: request.initial_turns,
            sends: 0,
            fail_on_send: self.fail_on_send,
            sent: Arc::clone(&self.sent),
        })
    }
}

pub struct MockChatSession {
    transcript: Vec<Turn>,
    sends: usize,
    fail_on_send: Option<usize>,
    sent: Arc<Mutex<Vec<Vec<ContentPart>>>>,
}

#[async_trait]
impl ChatSession for MockChatSession {
    async fn send(&mut self, parts: Vec<ContentPart>) -> Result<String, ChatError> {
        self.sends += 1;
        lock(&self.sent).push(parts.clone());

        if self.fail_on_send == Some(self.sends) {
            return Err(ChatError::Api {
                code: 500,
                status: Some("INTERNAL".to_string()),
                message: "mock failure".to_string(),
            });
        }

        let text = joined_text(&parts);
        let reply = format!("echo: {text}");
        self.transcript.push(Turn::user(text));
        self.transcript.push(Turn::model(reply.clone()));
        Ok(reply)
    }

    fn transcript(&self) -> Vec<Turn> {
        self.transcript.clone()
    }
}

/// One recorded upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCall {
    pub path: PathBuf,
    pub content_type: Option<String>,
}

/// File store that hands out `files/<n>` handles.
#[derive(Default)]
pub struct MockFileStore {
    failing_files: HashSet<String>,
    failing_deletes: HashSet<String>,
    rejects_content_type: bool,
    no_content_type_support: bool,
    uploads: Mutex<Vec<UploadCall>>,
    deletes: Mutex<Vec<String>>,
}

impl MockFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads of this file name fail with an API error.
    pub fn failing_file(mut self, file_name: impl Into<String>) -> Self {
        self.failing_files.insert(file_name.into());
        self
    }

    /// Deleting this remote name fails.
    pub fn failing_delete(mut self, remote_name: impl Into<String>) -> Self {
        self.failing_deletes.insert(remote_name.into());
        self
    }

    /// Behaves like a client that rejects the content type parameter at call time.
    pub fn rejecting_content_type(mut self) -> Self {
        self.rejects_content_type = true;
        self
    }

    /// Advertises up front that content types cannot be declared.
    pub fn without_content_type_support(mut self) -> Self {
        self.no_content_type_support = true;
        self
    }

    pub fn uploads(&self) -> Vec<UploadCall> {
        lock(&self.uploads).clone()
    }

    /// Remote names passed to `delete`, failures included.
    pub fn deletes(&self) -> Vec<String> {
        lock(&self.deletes).clone()
    }
}

#[async_trait]
impl FileStore for MockFileStore {
    fn supports_declared_content_type(&self) -> bool {
        !self.no_content_type_support
    }

    async fn upload(
        &self,
        path: &Path,
        content_type: Option<&str>,
    ) -> Result<RemoteFile, FileStoreError> {
        let mut uploads = lock(&self.uploads);
        uploads.push(UploadCall {
            path: path.to_path_buf(),
            content_type: content_type.map(str::to_string),
        });

        if self.rejects_content_type && content_type.is_some() {
            return Err(FileStoreError::UnsupportedParameter {
                parameter: "mime_type",
            });
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.failing_files.contains(&file_name) {
            return Err(FileStoreError::Api {
                code: 400,
                message: format!("cannot process {file_name}"),
            });
        }

        let id = uploads.len();
        let file = RemoteFile::new(
            format!("files/{id}"),
            format!("https://example.invalid/files/{id}"),
            file_name,
        );
        Ok(match content_type {
            Some(content_type) => file.with_mime_type(content_type),
            None => file,
        })
    }

    async fn delete(&self, file: &RemoteFile) -> Result<(), FileStoreError> {
        lock(&self.deletes).push(file.name.clone());
        if self.failing_deletes.contains(&file.name) {
            return Err(FileStoreError::Api {
                code: 404,
                message: format!("{} not found", file.name),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_session_records_turns_and_fails_on_demand() {
        let client = MockChatClient::new().failing_send(2);
        let mut session = client
            .create_session(SessionRequest {
                model: "mock".to_string(),
                initial_turns: vec![Turn::user("old"), Turn::model("reply")],
                system_instruction: None,
            })
            .await
            .unwrap();

        let reply = session.send(vec![ContentPart::text("hi")]).await.unwrap();
        assert_eq!(reply, "echo: hi");
        assert!(session.send(vec![ContentPart::text("boom")]).await.is_err());

        assert_eq!(session.transcript().len(), 4);
        assert_eq!(client.sent().len(), 2);
        assert_eq!(client.requests()[0].initial_turns.len(), 2);
    }

    #[tokio::test]
    async fn test_mock_store_rejects_content_type_when_asked() {
        let store = MockFileStore::new().rejecting_content_type();
        let err = store
            .upload(Path::new("/tmp/a.txt"), Some("text/plain"))
            .await
            .unwrap_err();
        assert!(err.is_unsupported_parameter());

        let file = store.upload(Path::new("/tmp/a.txt"), None).await.unwrap();
        assert_eq!(file.name, "files/2");
        assert_eq!(store.uploads().len(), 2);
    }
}
