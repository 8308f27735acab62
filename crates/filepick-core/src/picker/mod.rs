//! Open-file picker orchestration.
//!
//! One pick is a round trip through the host:
//!
//! ```text
//! Idle -> AwaitingHostResponse -> Decoding -> Completed
//!                 |
//!                 +-> Cancelled (caller token fired)
//! ```
//!
//! - **filter**: extension patterns to [`FilterSpec`] and its wire encoding
//! - **response**: decoding the host's answer into [`PickedEntry`](crate::PickedEntry)s
//! - **file_open_picker**: the picker object applications hold

pub mod builder;
pub mod file_open_picker;
pub mod filter;
pub mod response;

pub use builder::FilePickerBuilder;
pub use file_open_picker::{FileOpenPicker, PickState};
pub use filter::{validate_pattern, FileTypeMap, FilterSpec};
pub use response::{decode_delimited, decode_json, encode_delimited, ResponseFormat};
