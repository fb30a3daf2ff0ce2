//! Gemini REST adapter.
//!
//! [`GeminiApiClient`] opens chat sessions over `generateContent` and manages
//! uploads through the Files API. Session state lives on the client side:
//! every request replays the accumulated contents, and a turn is appended
//! only after the service answered it.

use std::path::Path;

use async_trait::async_trait;
use parley_core::chat::{ChatClient, ChatError, ChatSession, ContentPart, SessionRequest};
use parley_core::conversation::{Role, Turn};
use parley_core::files::{FileStore, FileStoreError, RemoteFile};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

const BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_VERSION: &str = "v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// Client for the Gemini generative language API.
#[derive(Clone)]
pub struct GeminiApiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiApiClient {
    /// Creates a new client with the provided API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Points the client at another host (e.g. a regional endpoint or proxy).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn generate(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<String, ChatError> {
        let url = format!(
            "{}/{API_VERSION}/models/{model}:generateContent",
            self.base_url
        );

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| ChatError::Transport(format!("Gemini API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, &body_text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| ChatError::Transport(format!("Failed to parse Gemini response: {err}")))?;

        extract_text_response(parsed)
    }

    async fn start_upload(
        &self,
        display_name: &str,
        size: usize,
        content_type: Option<&str>,
    ) -> Result<String, FileStoreError> {
        let url = format!("{}/upload/{API_VERSION}/files", self.base_url);
        let mut request = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", size.to_string());
        if let Some(content_type) = content_type {
            request = request.header("X-Goog-Upload-Header-Content-Type", content_type);
        }

        let response = request
            .json(&UploadMetadata {
                file: UploadFileMetadata {
                    display_name: display_name.to_string(),
                },
            })
            .send()
            .await
            .map_err(|err| FileStoreError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(file_store_error(response).await);
        }

        response
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| FileStoreError::Malformed("missing upload URL".to_string()))
    }
}

#[async_trait]
impl ChatClient for GeminiApiClient {
    type Session = GeminiChatSession;

    async fn create_session(&self, request: SessionRequest) -> Result<Self::Session, ChatError> {
        let contents: Vec<Content> = request.initial_turns.iter().map(Content::from_turn).collect();
        tracing::info!(
            "[GeminiApi] Opening session on {} with {} prior turns",
            request.model,
            contents.len()
        );

        Ok(GeminiChatSession {
            client: self.clone(),
            model: request.model,
            system_instruction: request.system_instruction.map(Content::instruction),
            contents,
        })
    }
}

#[async_trait]
impl FileStore for GeminiApiClient {
    async fn upload(
        &self,
        path: &Path,
        content_type: Option<&str>,
    ) -> Result<RemoteFile, FileStoreError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| FileStoreError::io(path, &e))?;
        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let upload_url = self
            .start_upload(&display_name, bytes.len(), content_type)
            .await?;

        let response = self
            .client
            .post(upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await
            .map_err(|err| FileStoreError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(file_store_error(response).await);
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|err| FileStoreError::Malformed(err.to_string()))?;
        let file = uploaded.file.into_remote(&display_name);
        tracing::debug!("[GeminiApi] Uploaded {} as {}", display_name, file.name);
        Ok(file)
    }

    async fn delete(&self, file: &RemoteFile) -> Result<(), FileStoreError> {
        let url = format!("{}/{API_VERSION}/{}", self.base_url, file.name);
        let response = self
            .client
            .delete(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|err| FileStoreError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(file_store_error(response).await);
        }
        tracing::debug!("[GeminiApi] Deleted {}", file.name);
        Ok(())
    }
}

/// A conversation held as the contents replayed on every request.
pub struct GeminiChatSession {
    client: GeminiApiClient,
    model: String,
    system_instruction: Option<Content>,
    contents: Vec<Content>,
}

#[async_trait]
impl ChatSession for GeminiChatSession {
    async fn send(&mut self, parts: Vec<ContentPart>) -> Result<String, ChatError> {
        let user = Content::from_parts(Role::User, parts);

        let mut contents = self.contents.clone();
        contents.push(user.clone());
        let request = GenerateContentRequest {
            contents,
            system_instruction: self.system_instruction.clone(),
        };

        let reply = self.client.generate(&self.model, &request).await?;

        self.contents.push(user);
        self.contents
            .push(Content::from_turn(&Turn::model(reply.clone())));
        Ok(reply)
    }

    fn transcript(&self) -> Vec<Turn> {
        self.contents.iter().filter_map(Content::to_turn).collect()
    }

    fn is_fresh(&self) -> bool {
        self.contents.is_empty()
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Debug, Clone, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

impl Content {
    /// One stored turn becomes one content with a single text part.
    fn from_turn(turn: &Turn) -> Self {
        Self {
            role: Some(turn.role.to_string()),
            parts: vec![Part::Text {
                text: turn.text.clone(),
            }],
        }
    }

    fn from_parts(role: Role, parts: Vec<ContentPart>) -> Self {
        Self {
            role: Some(role.to_string()),
            parts: parts.into_iter().map(Part::from).collect(),
        }
    }

    fn instruction(text: String) -> Self {
        Self {
            role: None,
            parts: vec![Part::Text { text }],
        }
    }

    /// Text parts joined by newlines; file parts are not part of the record.
    fn to_turn(&self) -> Option<Turn> {
        let role: Role = self.role.as_deref()?.parse().ok()?;
        let text = self
            .parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                Part::FileData { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n");
        Some(Turn::new(role, text))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    FileData {
        #[serde(rename = "fileData")]
        file_data: FileDataPayload,
    },
}

impl From<ContentPart> for Part {
    fn from(part: ContentPart) -> Self {
        match part {
            ContentPart::Text(text) => Part::Text { text },
            ContentPart::File(file) => Part::FileData {
                file_data: FileDataPayload {
                    mime_type: file.mime_type,
                    file_uri: file.uri,
                },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileDataPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    file_uri: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Serialize)]
struct UploadMetadata {
    file: UploadFileMetadata,
}

#[derive(Serialize)]
struct UploadFileMetadata {
    display_name: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    file: FileResource,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileResource {
    name: String,
    uri: String,
    mime_type: Option<String>,
    display_name: Option<String>,
}

impl FileResource {
    fn into_remote(self, fallback_name: &str) -> RemoteFile {
        let display_name = self
            .display_name
            .unwrap_or_else(|| fallback_name.to_string());
        let file = RemoteFile::new(self.name, self.uri, display_name);
        match self.mime_type {
            Some(mime) => file.with_mime_type(mime),
            None => file,
        }
    }
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: Option<u16>,
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String, ChatError> {
    let text = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .filter(|text| !text.is_empty());

    text.ok_or(ChatError::EmptyResponse)
}

fn map_http_error(status: StatusCode, body: &str) -> ChatError {
    match serde_json::from_str::<ErrorWrapper>(body) {
        Ok(wrapper) => ChatError::Api {
            code: wrapper.error.code.unwrap_or(status.as_u16()),
            status: wrapper.error.status,
            message: wrapper.error.message.unwrap_or_else(|| body.to_string()),
        },
        Err(_) => ChatError::Api {
            code: status.as_u16(),
            status: status.canonical_reason().map(str::to_string),
            message: body.to_string(),
        },
    }
}

async fn file_store_error(response: reqwest::Response) -> FileStoreError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match map_http_error(status, &body) {
        ChatError::Api { code, message, .. } => FileStoreError::Api { code, message },
        other => FileStoreError::Transport(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_turns_map_one_to_one_into_contents() {
        let turns = vec![Turn::user("Hello"), Turn::model("Hi"), Turn::user("Again")];
        let contents: Vec<Content> = turns.iter().map(Content::from_turn).collect();

        let value = serde_json::to_value(&contents).unwrap();
        assert_eq!(
            value,
            json!([
                {"role": "user", "parts": [{"text": "Hello"}]},
                {"role": "model", "parts": [{"text": "Hi"}]},
                {"role": "user", "parts": [{"text": "Again"}]},
            ])
        );
        let back: Vec<Turn> = contents.iter().filter_map(Content::to_turn).collect();
        assert_eq!(back, turns);
    }

    #[test]
    fn test_request_serializes_file_parts_and_instruction() {
        let file = RemoteFile::new("files/abc", "https://files/abc", "main.py")
            .with_mime_type("text/plain");
        let request = GenerateContentRequest {
            contents: vec![Content::from_parts(
                Role::User,
                vec![ContentPart::File(file), ContentPart::text("explain")],
            )],
            system_instruction: Some(Content::instruction("be brief".to_string())),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"fileData": {"mimeType": "text/plain", "fileUri": "https://files/abc"}},
                        {"text": "explain"}
                    ]
                }],
                "system_instruction": {"parts": [{"text": "be brief"}]}
            })
        );
    }

    #[test]
    fn test_transcript_text_skips_file_parts() {
        let content = Content::from_parts(
            Role::User,
            vec![
                ContentPart::text("[CONTEXT: SYSTEM]: Linux"),
                ContentPart::File(RemoteFile::new("files/1", "uri", "a.txt")),
                ContentPart::text("explain this"),
            ],
        );

        let turn = content.to_turn().unwrap();
        assert_eq!(turn, Turn::user("[CONTEXT: SYSTEM]: Linux\nexplain this"));
        assert!(Content::instruction("sys".to_string()).to_turn().is_none());
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "Hello, "}, {"text": "world"}]}}]
        }))
        .unwrap();
        assert_eq!(extract_text_response(response).unwrap(), "Hello, world");
    }

    #[test]
    fn test_extract_text_without_candidates_is_empty_response() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap();
        assert_eq!(extract_text_response(response), Err(ChatError::EmptyResponse));
    }

    #[test]
    fn test_map_http_error_reads_error_payload() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        let err = map_http_error(StatusCode::TOO_MANY_REQUESTS, body);

        assert_eq!(
            err,
            ChatError::Api {
                code: 429,
                status: Some("RESOURCE_EXHAUSTED".to_string()),
                message: "Quota exceeded".to_string(),
            }
        );
    }

    #[test]
    fn test_map_http_error_falls_back_to_raw_body() {
        let err = map_http_error(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        match err {
            ChatError::Api { code, message, .. } => {
                assert_eq!(code, 502);
                assert_eq!(message, "<html>bad gateway</html>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_upload_response_into_remote_file() {
        let uploaded: UploadResponse = serde_json::from_value(json!({
            "file": {
                "name": "files/xyz",
                "uri": "https://generativelanguage.googleapis.com/v1beta/files/xyz",
                "mimeType": "image/png",
                "sizeBytes": "42"
            }
        }))
        .unwrap();

        let file = uploaded.file.into_remote("shot.png");
        assert_eq!(file.name, "files/xyz");
        assert_eq!(file.display_name, "shot.png");
        assert_eq!(file.mime_type.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn test_new_session_is_fresh_only_without_turns() {
        let client = GeminiApiClient::new("test-key");
        let fresh = client
            .create_session(SessionRequest {
                model: "gemini-2.5-flash-lite".to_string(),
                initial_turns: Vec::new(),
                system_instruction: None,
            })
            .await
            .unwrap();
        assert!(fresh.is_fresh());

        let resumed = client
            .create_session(SessionRequest {
                model: "gemini-2.5-flash-lite".to_string(),
                initial_turns: vec![Turn::user("Hello"), Turn::model("Hi")],
                system_instruction: Some("sys".to_string()),
            })
            .await
            .unwrap();
        assert!(!resumed.is_fresh());
        assert_eq!(resumed.transcript(), vec![Turn::user("Hello"), Turn::model("Hi")]);
    }
}
