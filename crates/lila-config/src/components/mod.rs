//! Configuration components for the chat client
//!
//! One section per concern, each with its own defaults.

pub mod attachments;
pub mod backend;
pub mod chat;
pub mod session;

// Re-export component types
pub use attachments::*;
pub use backend::*;
pub use chat::*;
pub use session::*;

/// Default values shared by the components
pub mod defaults {
    /// Local development backend
    pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5001";
    /// Streaming chat relay
    pub const DEFAULT_CHAT_PATH: &str = "/api/chat-stream";
    /// Upload handshake endpoint
    pub const DEFAULT_UPLOAD_PATH: &str = "/api/files/upload";
    /// HomePort document analysis endpoint
    pub const DEFAULT_ANALYZE_PATH: &str = "/api/homeport/analyze";
    /// Liveness probe
    pub const DEFAULT_HEALTH_PATH: &str = "/";
    /// Attachment ceiling in megabytes
    pub const DEFAULT_MAX_ATTACHMENT_MB: u64 = 5;
    /// Spreadsheet formats accepted for upload
    pub const DEFAULT_ACCEPTED_EXTENSIONS: &[&str] = &["xlsx", "xls"];
    /// Display name of the assistant
    pub const DEFAULT_ASSISTANT_NAME: &str = "Lil A";
    /// Mode label sent with every streaming request
    pub const DEFAULT_MODE_LABEL: &str = "Retail Channel";
    /// Greeting shown when a session is first opened
    pub const DEFAULT_GREETING: &str =
        "Hi, I'm Lil A. Ask me anything about Retail Ratesheet and Matrix!";
    /// Log level when nothing else is configured
    pub const DEFAULT_LOG_LEVEL: &str = "off";
}
