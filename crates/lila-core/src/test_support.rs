//! Test doubles for the dispatcher
//!
//! [`MockBackend`] records every call and replays scripted responses;
//! [`RecordingRenderer`] records everything the dispatcher shows.

use crate::attachment::Attachment;
use crate::backend::{ByteStream, ChatBackend, ChatRequest, FileReference};
use crate::error::{TransportError, TurnError, TurnResult};
use crate::mode::Mode;
use crate::render::Renderer;
use crate::reply::ReplyView;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A call received by [`MockBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Upload { name: String, user: String },
    Analyze { name: String },
    Chat(ChatRequest),
    Health,
}

/// Scripted body of one chat response
pub type ChatScript = TurnResult<Vec<Result<Bytes, TransportError>>>;

struct MockState {
    calls: Vec<BackendCall>,
    upload: TurnResult<FileReference>,
    analyze: TurnResult<String>,
    chats: VecDeque<ChatScript>,
    healthy: bool,
}

/// In-memory [`ChatBackend`]
#[derive(Clone)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
    chunks_read: Arc<AtomicUsize>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                calls: Vec::new(),
                upload: Ok(FileReference("file-1".to_string())),
                analyze: Ok(String::new()),
                chats: VecDeque::new(),
                healthy: true,
            })),
            chunks_read: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MockState) -> T) -> T {
        let mut state = self.state.lock().expect("mock backend state poisoned");
        f(&mut state)
    }

    pub fn set_upload(&self, result: TurnResult<FileReference>) {
        self.with_state(|s| s.upload = result);
    }

    pub fn set_analyze(&self, result: TurnResult<String>) {
        self.with_state(|s| s.analyze = result);
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.with_state(|s| s.healthy = healthy);
    }

    /// Queue a chat response made of the given raw chunks
    pub fn push_chat_chunks<I, C>(&self, chunks: I)
    where
        I: IntoIterator<Item = C>,
        C: Into<Bytes>,
    {
        let body = chunks.into_iter().map(|c| Ok(c.into())).collect();
        self.with_state(|s| s.chats.push_back(Ok(body)));
    }

    /// Queue a fully scripted chat response
    pub fn push_chat(&self, script: ChatScript) {
        self.with_state(|s| s.chats.push_back(script));
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.with_state(|s| s.calls.clone())
    }

    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::Chat(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    /// Body chunks pulled from chat streams so far
    pub fn chunks_read(&self) -> usize {
        self.chunks_read.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn upload(&self, attachment: &Attachment, user: &str) -> TurnResult<FileReference> {
        self.with_state(|s| {
            s.calls.push(BackendCall::Upload {
                name: attachment.name().to_string(),
                user: user.to_string(),
            });
            s.upload.clone()
        })
    }

    async fn analyze(&self, attachment: &Attachment) -> TurnResult<String> {
        self.with_state(|s| {
            s.calls.push(BackendCall::Analyze {
                name: attachment.name().to_string(),
            });
            s.analyze.clone()
        })
    }

    async fn open_chat(&self, request: &ChatRequest) -> TurnResult<ByteStream> {
        let script = self.with_state(|s| {
            s.calls.push(BackendCall::Chat(request.clone()));
            s.chats.pop_front().unwrap_or_else(|| Ok(Vec::new()))
        })?;

        let counter = self.chunks_read.clone();
        Ok(futures::stream::iter(script)
            .inspect(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .boxed())
    }

    async fn health_check(&self) -> TurnResult<bool> {
        self.with_state(|s| {
            s.calls.push(BackendCall::Health);
            Ok(s.healthy)
        })
    }
}

/// Something the dispatcher asked the renderer to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCall {
    UserTurn(String),
    BeginAssistant,
    AssistantDelta(ReplyView),
    Report(String),
    Status(String),
    Error(String),
    EndAssistant,
    Notice(String),
    AttachmentStaged(String),
    AttachmentCleared,
    Loading(bool),
    ModeChanged(Mode),
}

/// [`Renderer`] that keeps every call in order
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub calls: Vec<RenderCall>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent full reply handed to the renderer
    pub fn last_reply(&self) -> Option<&ReplyView> {
        self.calls.iter().rev().find_map(|call| match call {
            RenderCall::AssistantDelta(view) => Some(view),
            _ => None,
        })
    }

    pub fn errors(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RenderCall::Error(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn notices(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RenderCall::Notice(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn delta_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, RenderCall::AssistantDelta(_)))
            .count()
    }
}

impl Renderer for RecordingRenderer {
    fn render_user_turn(&mut self, text: &str) {
        self.calls.push(RenderCall::UserTurn(text.to_string()));
    }

    fn begin_assistant_turn(&mut self) {
        self.calls.push(RenderCall::BeginAssistant);
    }

    fn render_assistant_delta(&mut self, reply: &ReplyView) {
        self.calls.push(RenderCall::AssistantDelta(reply.clone()));
    }

    fn render_report(&mut self, report: &str) {
        self.calls.push(RenderCall::Report(report.to_string()));
    }

    fn render_status(&mut self, status: &str) {
        self.calls.push(RenderCall::Status(status.to_string()));
    }

    fn render_error(&mut self, message: &str) {
        self.calls.push(RenderCall::Error(message.to_string()));
    }

    fn end_assistant_turn(&mut self) {
        self.calls.push(RenderCall::EndAssistant);
    }

    fn render_notice(&mut self, message: &str) {
        self.calls.push(RenderCall::Notice(message.to_string()));
    }

    fn attachment_staged(&mut self, attachment: &Attachment) {
        self.calls
            .push(RenderCall::AttachmentStaged(attachment.name().to_string()));
    }

    fn attachment_cleared(&mut self) {
        self.calls.push(RenderCall::AttachmentCleared);
    }

    fn set_loading(&mut self, loading: bool) {
        self.calls.push(RenderCall::Loading(loading));
    }

    fn mode_changed(&mut self, mode: Mode) {
        self.calls.push(RenderCall::ModeChanged(mode));
    }
}

/// Convenience for tests that only need a generic transport failure
pub fn network_error(message: &str) -> TurnError {
    TurnError::Transport(TransportError::Network(message.to_string()))
}
