//! Centralized configuration for the picker bridge.
//!
//! Wire-format tokens, MIME defaults and IPC limits live here so the codec,
//! the orchestrator and the transport agree on them.

use std::time::Duration;

/// Tokens of the host call contract.
pub struct WireConfig;

impl WireConfig {
    /// Script-side type that owns `pickFilesAsync`.
    pub const HOST_TYPE: &'static str = "filepick.FileOpenPicker";
    pub const PICK_METHOD: &'static str = "pickFilesAsync";

    /// Separates file records in a delimited response.
    pub const RECORD_SEPARATOR: &'static str = "\\\\";
    /// Separates the fields of one file record.
    pub const FIELD_SEPARATOR: char = '\\';
    pub const FIELDS_PER_RECORD: usize = 3;

    /// Filter pattern that allows every entry type.
    pub const WILDCARD: &'static str = "*";
    pub const EMPTY_FILE_TYPE_MAP: &'static str = "{}";
    pub const QUOTE: char = '\'';
    pub const ESCAPE: char = '\\';
}

/// MIME lookup defaults.
pub struct MimeConfig;

impl MimeConfig {
    pub const FALLBACK_MIME: &'static str = "application/octet-stream";
}

/// Local IPC transport limits.
pub struct IpcConfig;

impl IpcConfig {
    pub const BIND_ADDR: &'static str = "127.0.0.1:0";
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
    pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024; // 16MB
    pub const MAX_CONNECTIONS: usize = 32;

    // Registry contract method names
    pub const ADD_HANDLE_METHOD: &'static str = "addHandle";
    pub const REMOVE_HANDLE_METHOD: &'static str = "removeHandle";
    pub const GET_HANDLE_METHOD: &'static str = "getHandle";
}
