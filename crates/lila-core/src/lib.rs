//! # Lila Core
//!
//! Turn dispatch for the Lil A chat client.
//!
//! ## Modules
//!
//! - [`attachment`]: the single pending-file slot and its validation policy
//! - [`frame`]: incremental decoder for the streamed reply protocol
//! - [`conversation`]: conversation identity and transcript entries
//! - [`session`]: the mode dispatcher driving analysis and streaming turns
//! - [`reply`]: reasoning-trace post-processing ahead of markdown rendering
//! - [`backend`] / [`render`]: the capabilities the dispatcher depends on
//!
//! The crate contains no network or terminal code; `lila-client` implements
//! [`ChatBackend`] over HTTP and `lila-cli` implements [`Renderer`].

#![warn(clippy::all)]

pub mod attachment;
pub mod backend;
pub mod conversation;
pub mod error;
pub mod frame;
pub mod mode;
pub mod render;
pub mod reply;
pub mod session;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use attachment::{Attachment, AttachmentManager, AttachmentPolicy, AttachmentStatus};
pub use backend::{ByteStream, ChatBackend, ChatInputs, ChatRequest, FileDescriptor, FileReference};
pub use conversation::{ConversationContext, RenderedForm, Role, Turn};
pub use error::{ProtocolError, TransportError, TurnError, TurnResult, ValidationError};
pub use frame::{FrameDecoder, StreamEvent, EVENT_MARKER};
pub use mode::Mode;
pub use render::Renderer;
pub use reply::{ReasoningTrace, ReplyView};
pub use session::{ChatSession, DispatchState, SessionOptions, TurnOutcome};
