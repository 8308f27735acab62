//! Local IPC between the picker and the process that owns the native dialog.
//!
//! Typed calls and sequence-numbered replies travel as length-prefixed JSON
//! over `127.0.0.1` TCP connections.
//!
//! # Architecture
//!
//! - **Server**: runs in the host, dispatches `pickFilesAsync` and the
//!   registry contract through [`BridgeDispatch`]
//! - **Client**: [`IpcPickerHost`] forwards pick requests to the server
//! - **Protocol**: [`BridgeCall`], [`BridgeReply`] and the framing shared by both

pub mod client;
pub mod dispatch;
pub mod picker_host;
pub mod protocol;
pub mod server;

pub use client::IpcClient;
pub use dispatch::BridgeDispatch;
pub use picker_host::IpcPickerHost;
pub use protocol::{BridgeCall, BridgeReply};
pub use server::{IpcDispatch, IpcServer, IpcServerHandle};
