//! The picker object applications hold.

use super::builder::FilePickerBuilder;
use super::filter::{validate_pattern, FilterSpec};
use super::response::ResponseFormat;
use crate::cancel::CancellationToken;
use crate::host::{PickRequest, PickerHost};
use crate::mime::MimeResolver;
use crate::storage_file::{FileFactory, NativeFileFactory};
use crate::{PickerError, Result};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Progress of a single pick invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickState {
    Idle,
    AwaitingHostResponse,
    Decoding,
    Completed,
    Cancelled,
}

impl fmt::Display for PickState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PickState::Idle => "idle",
            PickState::AwaitingHostResponse => "awaiting_host_response",
            PickState::Decoding => "decoding",
            PickState::Completed => "completed",
            PickState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Lets the user choose files through the host's native dialog.
///
/// Each call to [`pick_single_file`](Self::pick_single_file) or
/// [`pick_multiple_files`](Self::pick_multiple_files) owns its own filter and
/// decode state, so one picker can serve overlapping requests.
///
/// # Example
///
/// ```rust,ignore
/// let mut picker = FileOpenPicker::new(host);
/// picker.add_file_type(".png")?;
/// picker.add_file_type(".jpg")?;
///
/// let token = CancellationToken::new();
/// if let Some(file) = picker.pick_single_file(&token).await? {
///     println!("picked {} ({})", file.name(), file.content_type());
/// }
/// ```
pub struct FileOpenPicker<F: FileFactory = NativeFileFactory> {
    pub(super) host: Arc<dyn PickerHost>,
    pub(super) resolver: Arc<dyn MimeResolver>,
    pub(super) factory: F,
    pub(super) response_format: ResponseFormat,
    pub(super) file_type_filter: Vec<String>,
}

impl FileOpenPicker<NativeFileFactory> {
    /// Create a picker with the default MIME resolver and file factory.
    pub fn new(host: Arc<dyn PickerHost>) -> Self {
        Self::builder(host).build_unfiltered()
    }

    /// Create a builder for more control over the picker's collaborators.
    pub fn builder(host: Arc<dyn PickerHost>) -> FilePickerBuilder {
        FilePickerBuilder::new(host)
    }
}

impl<F: FileFactory> FileOpenPicker<F> {
    /// Extension patterns shown in the dialog, in the order they were added.
    pub fn file_type_filter(&self) -> &[String] {
        &self.file_type_filter
    }

    /// Add one pattern: `*` or an extension such as `.png`.
    pub fn add_file_type(&mut self, pattern: impl Into<String>) -> Result<()> {
        let pattern = pattern.into();
        validate_pattern(&pattern)?;
        self.file_type_filter.push(pattern);
        Ok(())
    }

    /// Replace the whole filter. Nothing changes if any pattern is invalid.
    pub fn set_file_type_filter<I, S>(&mut self, patterns: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        for pattern in &patterns {
            validate_pattern(pattern)?;
        }
        self.file_type_filter = patterns;
        Ok(())
    }

    pub fn response_format(&self) -> ResponseFormat {
        self.response_format
    }

    /// Resolve the current filter into what the host call carries.
    pub fn filter_spec(&self) -> FilterSpec {
        FilterSpec::from_patterns(&self.file_type_filter, self.resolver.as_ref())
    }

    /// Let the user choose one file.
    ///
    /// Returns `Ok(None)` when the dialog is dismissed and
    /// `Err(PickerError::Cancelled)` when `token` fires first.
    pub async fn pick_single_file(&self, token: &CancellationToken) -> Result<Option<F::File>> {
        let files = self.pick_files(false, token).await?;
        Ok(files.into_iter().next())
    }

    /// Let the user choose any number of files, in the order the host reports them.
    pub async fn pick_multiple_files(&self, token: &CancellationToken) -> Result<Vec<F::File>> {
        self.pick_files(true, token).await
    }

    async fn pick_files(&self, multiple: bool, token: &CancellationToken) -> Result<Vec<F::File>> {
        let spec = self.filter_spec();
        let request = PickRequest {
            multiple,
            allow_all_types: spec.allow_all,
            file_type_map: spec.encoded_file_types(),
        };
        debug!(
            "Pick state {} -> {}: {}",
            PickState::Idle,
            PickState::AwaitingHostResponse,
            request.to_script()
        );

        token.check()?;
        let response = tokio::select! {
            biased;
            _ = token.cancelled() => {
                info!("Pick state {}: caller cancelled while awaiting host", PickState::Cancelled);
                return Err(PickerError::Cancelled);
            }
            result = self.host.pick_files(&request) => result?,
        };

        debug!("Pick state {}: {} bytes from host", PickState::Decoding, response.len());
        let entries = match self.response_format.decode(&response) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Discarding pick response: {}", e);
                return Err(e);
            }
        };

        if entries.is_empty() {
            debug!("Pick state {}: dialog dismissed", PickState::Completed);
            return Ok(Vec::new());
        }

        let files: Vec<F::File> = entries
            .into_iter()
            .map(|entry| self.factory.create(entry))
            .collect();
        debug!("Pick state {}: {} file(s)", PickState::Completed, files.len());
        Ok(files)
    }
}

impl<F: FileFactory> fmt::Debug for FileOpenPicker<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileOpenPicker")
            .field("file_type_filter", &self.file_type_filter)
            .field("response_format", &self.response_format)
            .finish_non_exhaustive()
    }
}
