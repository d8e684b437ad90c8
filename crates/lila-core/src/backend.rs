//! Backend capability used by the dispatcher
//!
//! The dispatcher never talks HTTP itself; it drives a [`ChatBackend`].
//! `lila-client` provides the reqwest implementation and tests provide mocks.

use crate::attachment::Attachment;
use crate::conversation::ConversationContext;
use crate::error::{TransportError, TurnResult};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// Raw response body of a streaming chat request
///
/// Dropping the stream releases the underlying connection.
pub type ByteStream = BoxStream<'static, Result<Bytes, TransportError>>;

/// Opaque backend identifier for an uploaded file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileReference(pub String);

impl FileReference {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Document attachment descriptor carried by chat requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub transfer_method: String,
    pub upload_file_id: String,
}

impl FileDescriptor {
    pub fn document(reference: &FileReference) -> Self {
        Self {
            kind: "document".to_string(),
            transfer_method: "local_file".to_string(),
            upload_file_id: reference.0.clone(),
        }
    }
}

/// Structured inputs echoed to the chat workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatInputs {
    pub query: String,
    #[serde(rename = "Options")]
    pub options: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileDescriptor>,
}

/// Body of a streaming chat request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub inputs: ChatInputs,
    pub query: String,
    pub response_mode: String,
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub files: Vec<FileDescriptor>,
}

impl ChatRequest {
    pub fn new(
        query: impl Into<String>,
        mode_label: impl Into<String>,
        context: &ConversationContext,
        file: Option<&FileReference>,
    ) -> Self {
        let query = query.into();
        let descriptor = file.map(FileDescriptor::document);

        Self {
            inputs: ChatInputs {
                query: query.clone(),
                options: mode_label.into(),
                file: descriptor.clone(),
            },
            query,
            response_mode: "streaming".to_string(),
            user: context.user_id().to_string(),
            conversation_id: context.conversation_id().map(str::to_string),
            files: descriptor.into_iter().collect(),
        }
    }
}

/// The three backend workflows plus a liveness probe
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Exchange raw file bytes for a file reference
    async fn upload(&self, attachment: &Attachment, user: &str) -> TurnResult<FileReference>;

    /// Run the document analysis and return the plain-text report
    async fn analyze(&self, attachment: &Attachment) -> TurnResult<String>;

    /// Issue a chat request and hand back the response body as it arrives
    async fn open_chat(&self, request: &ChatRequest) -> TurnResult<ByteStream>;

    /// Whether the backend answers at all
    async fn health_check(&self) -> TurnResult<bool>;
}
