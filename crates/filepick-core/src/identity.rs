//! Stable identities for native file handles.
//!
//! A `FileId` stands in for a capability object that cannot cross the
//! host/guest boundary. Ids are random v4 UUIDs and are never reused.

use crate::error::PickerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identity of one picked file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(Uuid);

impl FileId {
    /// Mint a fresh identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse any textual GUID form (hyphenated, simple, braced or URN).
    pub fn parse(value: &str) -> Result<Self, PickerError> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| PickerError::InvalidIdentity {
                value: value.to_string(),
            })
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for FileId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for FileId {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}
