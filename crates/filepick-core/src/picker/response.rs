//! Decoding of the host's pick response.
//!
//! The compatibility encoding is a flat string:
//!
//! ```text
//! <id>\<name>\<contentType>\\<id>\<name>\<contentType>
//! ```
//!
//! Records are separated by two backslashes, fields by one. An empty string
//! means the user dismissed the dialog. Names are sent unescaped, so a record
//! with more than three fields is read as a name containing backslashes.

use crate::config::WireConfig;
use crate::identity::FileId;
use crate::storage_file::PickedEntry;
use crate::{PickerError, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Encoding of the string returned by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Backslash-delimited records.
    #[default]
    Delimited,
    /// JSON array of `{"id","name","contentType"}` objects.
    Json,
}

impl ResponseFormat {
    pub fn decode(self, response: &str) -> Result<Vec<PickedEntry>> {
        match self {
            ResponseFormat::Delimited => decode_delimited(response),
            ResponseFormat::Json => decode_json(response),
        }
    }

    pub fn encode(self, entries: &[PickedEntry]) -> Result<String> {
        match self {
            ResponseFormat::Delimited => Ok(encode_delimited(entries)),
            ResponseFormat::Json => Ok(serde_json::to_string(entries)?),
        }
    }
}

/// Decode a delimited response.
///
/// Fails on the first record whose id is not a valid identity or that has fewer
/// than three fields; nothing decoded before the failure is returned.
pub fn decode_delimited(response: &str) -> Result<Vec<PickedEntry>> {
    response
        .split(WireConfig::RECORD_SEPARATOR)
        .filter(|record| !record.is_empty())
        .map(decode_record)
        .collect()
}

fn decode_record(record: &str) -> Result<PickedEntry> {
    let fields: Vec<&str> = record.split(WireConfig::FIELD_SEPARATOR).collect();

    // The id is checked first so a garbled record reports the bad identity.
    let id = FileId::parse(fields[0])?;

    if fields.len() < WireConfig::FIELDS_PER_RECORD {
        return Err(PickerError::MalformedRecord {
            record: record.to_string(),
            fields: fields.len(),
        });
    }

    // Names are not escaped by the host. Content types never contain the
    // separator, so extra fields belong to the name.
    let last = fields.len() - 1;
    if fields.len() > WireConfig::FIELDS_PER_RECORD {
        warn!(
            "File record for {} has {} fields; treating the separators as part of the name",
            id,
            fields.len()
        );
    }
    let name = fields[1..last].join(&WireConfig::FIELD_SEPARATOR.to_string());

    Ok(PickedEntry::new(id, name, fields[last]))
}

/// Encode entries the way a host sends them. Used by host implementations.
pub fn encode_delimited(entries: &[PickedEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            format!(
                "{id}{sep}{name}{sep}{content_type}",
                id = entry.id,
                sep = WireConfig::FIELD_SEPARATOR,
                name = entry.name,
                content_type = entry.content_type,
            )
        })
        .collect::<Vec<_>>()
        .join(WireConfig::RECORD_SEPARATOR)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonRecord {
    id: String,
    name: String,
    content_type: String,
}

/// Decode a JSON response. An empty string or empty array means dismissal.
pub fn decode_json(response: &str) -> Result<Vec<PickedEntry>> {
    if response.trim().is_empty() {
        return Ok(Vec::new());
    }
    let records: Vec<JsonRecord> = serde_json::from_str(response)?;
    records
        .into_iter()
        .map(|record| {
            let id = FileId::parse(&record.id)?;
            Ok(PickedEntry::new(id, record.name, record.content_type))
        })
        .collect()
}
