//! Conversation State
//!
//! Identity of the user and of the backend conversation, plus the rendered
//! turn history.

use tracing::{debug, warn};

/// Identity threaded into every streaming request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationContext {
    user_id: String,
    conversation_id: Option<String>,
    assigned_this_turn: bool,
}

impl ConversationContext {
    /// Start with no conversation; the first backend response supplies one
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            conversation_id: None,
            assigned_this_turn: false,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub(crate) fn begin_turn(&mut self) {
        self.assigned_this_turn = false;
    }

    /// Record an id from a successfully decoded frame
    ///
    /// The first id seen in a turn wins; a different id later in the same
    /// turn is ignored. Returns whether the stored id changed.
    pub fn assign(&mut self, id: &str) -> bool {
        if self.conversation_id.as_deref() == Some(id) {
            self.assigned_this_turn = true;
            return false;
        }
        if self.assigned_this_turn {
            warn!(
                current = ?self.conversation_id,
                ignored = id,
                "backend sent a second conversation id within one turn"
            );
            return false;
        }

        debug!(conversation_id = id, "conversation assigned");
        self.conversation_id = Some(id.to_string());
        self.assigned_this_turn = true;
        true
    }

    /// Forget the conversation so the next turn starts a new one
    pub fn reset(&mut self) {
        self.conversation_id = None;
        self.assigned_this_turn = false;
    }
}

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// How a turn's text is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderedForm {
    /// Shown exactly as typed
    Plain,
    /// Markdown with an optional reasoning trace
    Markdown,
    /// Monospace report, never markdown-parsed
    Report,
    /// Single error line
    Error,
}

/// One rendered entry of the transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub form: RenderedForm,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            form: RenderedForm::Plain,
        }
    }

    pub fn assistant(text: impl Into<String>, form: RenderedForm) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            form,
        }
    }
}
