//! Error taxonomy for the turn pipeline
//!
//! Validation problems are reported where a file is selected or a turn is
//! submitted and never reach the network. Protocol problems are recovered
//! per line inside the frame decoder. Transport and backend failures abort the
//! current turn and surface as a single error line.

/// An attachment or submission failed a local precondition
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid file \"{name}\". Please upload an Excel file ({accepted}).")]
    UnsupportedExtension { name: String, accepted: String },

    #[error("File \"{name}\" is {size} bytes, which exceeds the limit of {limit_mb}MB.")]
    TooLarge { name: String, size: u64, limit_mb: u64 },

    #[error("Please attach an Excel file for HomePort Qualification.")]
    MissingAttachment,
}

/// A request could not be completed at the HTTP level
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("{0}")]
    Network(String),

    #[error("{status} {reason}")]
    Status { status: u16, reason: String },

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// A single stream frame could not be interpreted
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed frame payload: {0}")]
    MalformedPayload(String),
}

/// Why a turn ended without a complete reply
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Structured error reported by the backend, used verbatim
    #[error("{0}")]
    Backend(String),

    /// The upload handshake failed; no chat request was made
    #[error("File upload failed: {0}")]
    Upload(#[source] Box<TurnError>),

    #[error("A turn is already in progress")]
    Busy,
}

impl TurnError {
    /// The single line shown to the user for this failure
    pub fn user_message(&self) -> String {
        format!("Error: {}", self)
    }

    /// Whether the failure happened before any chat request was issued
    pub fn is_upload_failure(&self) -> bool {
        matches!(self, TurnError::Upload(_))
    }
}

/// Result type for turn pipeline operations
pub type TurnResult<T> = Result<T, TurnError>;
