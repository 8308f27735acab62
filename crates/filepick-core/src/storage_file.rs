//! Framework-side file objects built from picked entries.

use crate::identity::FileId;
use serde::{Deserialize, Serialize};

/// One file chosen in the native picker, as decoded from the host response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickedEntry {
    pub id: FileId,
    pub name: String,
    pub content_type: String,
}

impl PickedEntry {
    pub fn new(id: FileId, name: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            content_type: content_type.into(),
        }
    }
}

/// A file backed by a native handle that lives in the
/// [`HandleRegistry`](crate::registry::HandleRegistry) under `id`.
///
/// The object carries only the identity; content I/O re-fetches the handle by
/// id every time instead of caching it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageFile {
    id: FileId,
    name: String,
    content_type: String,
}

impl StorageFile {
    /// Build a file object for a handle registered by the host.
    pub fn from_native_handle(
        id: FileId,
        name: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            content_type: content_type.into(),
        }
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Extension including the leading dot, or an empty string.
    pub fn file_type(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) if idx > 0 => &self.name[idx..],
            _ => "",
        }
    }

    /// Name without its extension.
    pub fn display_name(&self) -> &str {
        let ext = self.file_type();
        &self.name[..self.name.len() - ext.len()]
    }
}

/// Turns decoded entries into the framework's file objects.
pub trait FileFactory: Send + Sync {
    type File: Send;

    fn create(&self, entry: PickedEntry) -> Self::File;
}

/// Factory producing [`StorageFile`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFileFactory;

impl FileFactory for NativeFileFactory {
    type File = StorageFile;

    fn create(&self, entry: PickedEntry) -> StorageFile {
        StorageFile::from_native_handle(entry.id, entry.name, entry.content_type)
    }
}
