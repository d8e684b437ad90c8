//! Mode Dispatcher
//!
//! [`ChatSession`] owns the attachment slot, the conversation context and the
//! transcript, and drives one turn at a time through either the analysis
//! workflow or the streaming chat workflow.
//!
//! ```text
//!            submit
//!   Idle ──────────────┬──────────────────────────────┐
//!    ▲                 │ retail + attachment          │ otherwise
//!    │                 ▼                              ▼
//!    │          AwaitingUpload ──────────────▶ AwaitingResponse
//!    │                                                │
//!    │                                                ▼
//!    └──────────────── success or error ◀──────── Rendering
//! ```
//!
//! Every workflow step returns a [`TurnResult`]; the turn boundary in
//! [`ChatSession::submit`] renders a failure once and always releases the
//! loading state.

use crate::attachment::{Attachment, AttachmentManager, AttachmentStatus};
use crate::backend::{ChatBackend, ChatRequest, FileReference};
use crate::conversation::{ConversationContext, RenderedForm, Turn};
use crate::error::{TurnError, TurnResult, ValidationError};
use crate::frame::{FrameDecoder, StreamEvent};
use crate::mode::Mode;
use crate::render::Renderer;
use crate::reply::ReplyView;
use bytes::Bytes;
use futures::StreamExt;
use lila_config::ChatConfig;
use tracing::{debug, info, warn};

const ANALYZING_STATUS: &str = "Analyzing Excel file via HomePort Engine...";
const UPLOADING_STATUS: &str = "Uploading Excel file...";

/// Where the dispatcher is within a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    AwaitingUpload,
    AwaitingResponse,
    Rendering,
}

/// How a submission ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Nothing to send; no turn was started
    Ignored,
    /// A precondition failed; no turn was started and no request was made
    Rejected(ValidationError),
    /// The assistant turn as recorded in the transcript
    Completed(Turn),
    /// The turn ended with an error line
    Failed(TurnError),
}

/// Per-session settings taken from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Fixed label sent in `inputs.Options`
    pub mode_label: String,
    /// Rendered once by [`ChatSession::open`]
    pub greeting: String,
    pub initial_mode: Mode,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from_config(&ChatConfig::default())
    }
}

impl SessionOptions {
    pub fn from_config(config: &ChatConfig) -> Self {
        Self {
            mode_label: config.mode_label.clone(),
            greeting: config.greeting.clone(),
            initial_mode: config.default_mode.into(),
        }
    }
}

/// Top-level session controller
pub struct ChatSession<B, R> {
    backend: B,
    renderer: R,
    context: ConversationContext,
    attachments: AttachmentManager,
    mode: Mode,
    state: DispatchState,
    transcript: Vec<Turn>,
    options: SessionOptions,
    greeted: bool,
}

impl<B, R> ChatSession<B, R>
where
    B: ChatBackend,
    R: Renderer,
{
    pub fn new(
        backend: B,
        renderer: R,
        context: ConversationContext,
        attachments: AttachmentManager,
        options: SessionOptions,
    ) -> Self {
        Self {
            backend,
            renderer,
            context,
            attachments,
            mode: options.initial_mode,
            state: DispatchState::Idle,
            transcript: Vec::new(),
            options,
            greeted: false,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Whether input should be disabled
    pub fn is_busy(&self) -> bool {
        self.state != DispatchState::Idle
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachments.current()
    }

    pub fn attachment_status(&self) -> AttachmentStatus {
        self.attachments.status()
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Show the greeting the first time the session is opened
    pub fn open(&mut self) {
        if self.greeted {
            return;
        }
        self.greeted = true;

        let greeting = self.options.greeting.clone();
        self.renderer.begin_assistant_turn();
        self.renderer
            .render_assistant_delta(&ReplyView::parse(&greeting));
        self.renderer.end_assistant_turn();
        self.transcript
            .push(Turn::assistant(greeting, RenderedForm::Markdown));
    }

    /// Validate and stage a file for the next turn
    ///
    /// A rejected file is reported as a notice and leaves any current
    /// attachment untouched.
    pub fn select_attachment(
        &mut self,
        name: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Result<(), ValidationError> {
        match self.attachments.select(name, bytes) {
            Ok(attachment) => {
                self.renderer.attachment_staged(attachment);
                Ok(())
            }
            Err(err) => {
                self.renderer.render_notice(&err.to_string());
                Err(err)
            }
        }
    }

    /// Check a file's name and size against the attachment policy
    ///
    /// Lets callers reject a file before reading it. A rejection is reported
    /// as a notice and the current attachment is left untouched.
    pub fn check_attachment(&mut self, name: &str, size: u64) -> Result<(), ValidationError> {
        match self.attachments.policy().validate(name, size) {
            Ok(_) => Ok(()),
            Err(err) => {
                self.renderer.render_notice(&err.to_string());
                Err(err)
            }
        }
    }

    /// Drop the staged file and its UI representation
    pub fn remove_attachment(&mut self) {
        self.attachments.clear();
        self.renderer.attachment_cleared();
    }

    /// Switch workflow; switching to retail discards the staged file
    pub fn set_mode(&mut self, mode: Mode) -> TurnResult<()> {
        if self.is_busy() {
            return Err(TurnError::Busy);
        }

        info!(from = %self.mode, to = %mode, "mode changed");
        self.mode = mode;
        if mode == Mode::Retail {
            self.remove_attachment();
        }
        self.renderer.mode_changed(mode);
        Ok(())
    }

    /// Forget the backend conversation; the session id is kept
    pub fn new_conversation(&mut self) {
        self.context.reset();
    }

    /// Run one user turn to completion
    pub async fn submit(&mut self, text: &str) -> TurnOutcome {
        if self.is_busy() {
            return TurnOutcome::Failed(TurnError::Busy);
        }

        if self.mode.requires_attachment() && !self.attachments.is_present() {
            let err = ValidationError::MissingAttachment;
            self.renderer.render_notice(&err.to_string());
            return TurnOutcome::Rejected(err);
        }

        let text = text.trim();
        if text.is_empty() && !self.attachments.is_present() {
            return TurnOutcome::Ignored;
        }

        let display = match self.attachments.current() {
            Some(attachment) => format!("[Attached: {}] {}", attachment.name(), text)
                .trim_end()
                .to_string(),
            None => text.to_string(),
        };
        self.renderer.render_user_turn(&display);
        self.transcript.push(Turn::user(display));

        self.renderer.set_loading(true);
        self.renderer.begin_assistant_turn();
        self.context.begin_turn();

        let result = match self.mode {
            Mode::Homeport => self.run_analysis().await,
            Mode::Retail => self.run_streaming(text).await,
        };

        self.state = DispatchState::Idle;
        let outcome = match result {
            Ok(turn) => {
                self.transcript.push(turn.clone());
                TurnOutcome::Completed(turn)
            }
            Err(err) => {
                warn!(error = %err, mode = %self.mode, "turn failed");
                let message = err.user_message();
                self.renderer.render_error(&message);
                self.transcript
                    .push(Turn::assistant(message, RenderedForm::Error));
                TurnOutcome::Failed(err)
            }
        };
        self.renderer.end_assistant_turn();
        self.renderer.set_loading(false);
        outcome
    }

    async fn run_analysis(&mut self) -> TurnResult<Turn> {
        let attachment = self
            .attachments
            .current()
            .cloned()
            .ok_or_else(|| TurnError::Backend(ValidationError::MissingAttachment.to_string()))?;

        self.renderer.render_status(ANALYZING_STATUS);
        self.state = DispatchState::AwaitingResponse;
        info!(name = attachment.name(), bytes = attachment.size(), "requesting analysis");

        let report = self.backend.analyze(&attachment).await?;

        self.state = DispatchState::Rendering;
        self.renderer.render_report(&report);
        self.remove_attachment();
        Ok(Turn::assistant(report, RenderedForm::Report))
    }

    async fn run_streaming(&mut self, text: &str) -> TurnResult<Turn> {
        let reference = match self.attachments.current().cloned() {
            Some(attachment) => Some(self.upload(&attachment).await?),
            None => None,
        };

        let request = ChatRequest::new(
            text,
            self.options.mode_label.as_str(),
            &self.context,
            reference.as_ref(),
        );

        self.state = DispatchState::AwaitingResponse;
        debug!(conversation_id = ?request.conversation_id, "opening chat stream");
        let mut body = self.backend.open_chat(&request).await?;

        self.state = DispatchState::Rendering;
        let mut decoder = FrameDecoder::new();
        let mut answer = String::new();

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            let events = decoder.feed(&chunk);
            self.apply_events(events, &mut answer)?;
            if decoder.is_complete() {
                break;
            }
        }

        if decoder.is_complete() {
            drop(body);
            debug!("turn complete, response stream released");
        } else {
            let events = decoder.finish();
            self.apply_events(events, &mut answer)?;
        }

        if answer.is_empty() {
            // Clear any upload placeholder
            self.renderer.render_assistant_delta(&ReplyView::default());
        }
        Ok(Turn::assistant(answer, RenderedForm::Markdown))
    }

    async fn upload(&mut self, attachment: &Attachment) -> TurnResult<FileReference> {
        self.state = DispatchState::AwaitingUpload;
        self.attachments.set_status(AttachmentStatus::Uploading);
        self.renderer.render_status(UPLOADING_STATUS);
        info!(name = attachment.name(), bytes = attachment.size(), "uploading attachment");

        match self.backend.upload(attachment, self.context.user_id()).await {
            Ok(reference) => {
                debug!(file_id = reference.as_str(), "upload accepted");
                self.attachments.set_status(AttachmentStatus::Uploaded);
                self.remove_attachment();
                Ok(reference)
            }
            Err(err) => {
                // The file stays staged so the user can resubmit
                self.attachments.set_status(AttachmentStatus::Failed);
                Err(TurnError::Upload(Box::new(err)))
            }
        }
    }

    fn apply_events(&mut self, events: Vec<StreamEvent>, answer: &mut String) -> TurnResult<()> {
        for event in events {
            match event {
                StreamEvent::ContentDelta(delta) => {
                    answer.push_str(&delta);
                    self.renderer
                        .render_assistant_delta(&ReplyView::parse(answer));
                }
                StreamEvent::ConversationAssigned(id) => {
                    self.context.assign(&id);
                }
                StreamEvent::TurnComplete => {}
                StreamEvent::Failed(message) => return Err(TurnError::Backend(message)),
            }
        }
        Ok(())
    }
}
