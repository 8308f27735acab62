//! The host call: the one place the picker suspends.
//!
//! A [`PickerHost`] shows the native dialog on the far side of the boundary and
//! answers with an encoded string (see [`crate::picker::response`]). The host
//! also receives the native handles and registers them under the ids it
//! returns; this crate never sees the dialog or the raw handles.

use crate::config::WireConfig;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Parameters of one `pickFilesAsync` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickRequest {
    pub multiple: bool,
    pub allow_all_types: bool,
    /// Encoded [`FileTypeMap`](crate::picker::FileTypeMap).
    pub file_type_map: String,
}

impl PickRequest {
    /// Render the call as a script expression, for hosts that evaluate script.
    ///
    /// The map encoding is already a valid object literal.
    pub fn to_script(&self) -> String {
        format!(
            "{}.{}({},{},{})",
            WireConfig::HOST_TYPE,
            WireConfig::PICK_METHOD,
            self.multiple,
            self.allow_all_types,
            self.file_type_map
        )
    }
}

/// Native side of the picker.
#[async_trait]
pub trait PickerHost: Send + Sync {
    /// Show the picker and return the encoded selection.
    ///
    /// An empty string means the user dismissed the dialog. Transport failures
    /// are returned as errors and are not retried by the caller.
    async fn pick_files(&self, request: &PickRequest) -> Result<String>;
}
