//! Process-wide registry of native file handles.
//!
//! Native handles are capability objects owned by the host page; they cannot be
//! serialized, so the picker hands out [`FileId`](crate::FileId)s instead and
//! the registry maps them back to live handles for later content I/O.
//!
//! # Lifecycle
//!
//! - **Insert**: the host callback that receives a handle calls `add_handle`,
//!   or `register` mints a fresh id for a synthesized handle.
//! - **Lookup**: I/O code calls `get_handle` (or `require_handle`) by id every
//!   time; handles are never cached across an await point.
//! - **Remove**: the file-lifecycle owner calls `remove_handle` when the file
//!   object is disposed. There is no bulk clear.

pub mod handle_registry;

pub use handle_registry::HandleRegistry;
