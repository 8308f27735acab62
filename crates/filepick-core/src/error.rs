//! Error types for the file picker bridge.
//!
//! Decoding failures, transport failures and caller cancellation each get their
//! own variant so callers can tell a broken host apart from a user who simply
//! closed the dialog (which is not an error at all: it yields an empty selection).

use thiserror::Error;

/// Main error type for picker and registry operations.
#[derive(Debug, Error)]
pub enum PickerError {
    // Decoding errors
    #[error("Selected file ID is not valid: {value:?}")]
    InvalidIdentity { value: String },

    #[error("Malformed file record {record:?}: expected 3 fields, got {fields}")]
    MalformedRecord { record: String, fields: usize },

    #[error("Invalid file type map: {message}")]
    InvalidFileTypeMap { message: String },

    #[error("Invalid file type filter: {pattern:?}")]
    InvalidFilter { pattern: String },

    // Host / transport errors
    #[error("Picker host unavailable: {message}")]
    HostUnavailable { message: String },

    #[error("Host returned error {code}: {message}")]
    Remote { code: i32, message: String },

    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("Invalid params: {message}")]
    InvalidParams { message: String },

    #[error("Method not found: {method}")]
    MethodNotFound { method: String },

    // Registry errors
    #[error("No native handle registered for file {id}")]
    HandleNotFound { id: String },

    #[error("File picking cancelled")]
    Cancelled,
}

/// Result type alias for picker operations.
pub type Result<T> = std::result::Result<T, PickerError>;

impl From<std::io::Error> for PickerError {
    fn from(err: std::io::Error) -> Self {
        PickerError::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for PickerError {
    fn from(err: serde_json::Error) -> Self {
        PickerError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl PickerError {
    /// Convert to a JSON-RPC error code.
    ///
    /// Standard JSON-RPC error codes:
    /// - -32700: Parse error
    /// - -32601: Method not found
    /// - -32602: Invalid params
    /// - -32603: Internal error
    ///
    /// Custom error codes (application-defined, -32000 to -32099):
    /// - -32000: Host unavailable / transport error
    /// - -32002: Handle not found
    /// - -32004: Cancelled by caller
    /// - -32005: Validation error
    pub fn to_rpc_error_code(&self) -> i32 {
        match self {
            PickerError::HostUnavailable { .. } | PickerError::Io { .. } => -32000,

            PickerError::HandleNotFound { .. } => -32002,

            PickerError::Cancelled => -32004,

            PickerError::InvalidIdentity { .. }
            | PickerError::MalformedRecord { .. }
            | PickerError::InvalidFileTypeMap { .. }
            | PickerError::InvalidFilter { .. } => -32005,

            PickerError::Json { .. } => -32700,
            PickerError::MethodNotFound { .. } => -32601,
            PickerError::InvalidParams { .. } => -32602,

            PickerError::Remote { code, .. } => *code,
        }
    }

    /// Rebuild an error from a JSON-RPC error object received over IPC.
    pub fn from_rpc_error(code: i32, message: String) -> Self {
        match code {
            -32004 => PickerError::Cancelled,
            -32000 => PickerError::HostUnavailable { message },
            _ => PickerError::Remote { code, message },
        }
    }

    /// True when the caller asked for the operation to stop.
    ///
    /// Cancellation is an outcome, not a failure; UI code usually treats it
    /// like an empty selection.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, PickerError::Cancelled)
    }
}
