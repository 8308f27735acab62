//! Filepick Core - open-file picker bridge for sandboxed hosts.
//!
//! Native file handles granted by a browser-style picker are opaque
//! capabilities that cannot cross the host/guest boundary. This crate gives
//! each picked file a stable [`FileId`], keeps a [`HandleRegistry`] from ids to
//! live handles, and drives the pick round trip through a [`PickerHost`].
//!
//! # Example
//!
//! ```rust,ignore
//! use filepick_core::{CancellationToken, FileOpenPicker, IpcPickerHost};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> filepick_core::Result<()> {
//!     let host = IpcPickerHost::connect("127.0.0.1:40123".parse().unwrap()).await?;
//!     let mut picker = FileOpenPicker::new(Arc::new(host));
//!     picker.set_file_type_filter([".png", ".jpg"])?;
//!
//!     let files = picker.pick_multiple_files(&CancellationToken::new()).await?;
//!     for file in &files {
//!         println!("{} {} ({})", file.id(), file.name(), file.content_type());
//!     }
//!     Ok(())
//! }
//! ```

pub mod cancel;
pub mod config;
pub mod error;
pub mod host;
pub mod identity;
pub mod ipc;
pub mod mime;
pub mod picker;
pub mod registry;
pub mod storage_file;

// Re-export commonly used types
pub use cancel::{CancellationToken, CancelledError};
pub use error::{PickerError, Result};
pub use host::{PickRequest, PickerHost};
pub use identity::FileId;
pub use ipc::{BridgeDispatch, IpcPickerHost, IpcServer, IpcServerHandle};
pub use mime::{GuessMimeResolver, MimeResolver};
pub use picker::{FileOpenPicker, FilePickerBuilder, FileTypeMap, FilterSpec, ResponseFormat};
pub use registry::HandleRegistry;
pub use storage_file::{FileFactory, NativeFileFactory, PickedEntry, StorageFile};
