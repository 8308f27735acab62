//! Builder for configuring a FileOpenPicker.

use super::file_open_picker::FileOpenPicker;
use super::filter::validate_pattern;
use super::response::ResponseFormat;
use crate::host::PickerHost;
use crate::mime::{GuessMimeResolver, MimeResolver};
use crate::storage_file::{FileFactory, NativeFileFactory};
use crate::Result;
use std::sync::Arc;

/// Builder for configuring a [`FileOpenPicker`].
///
/// # Example
///
/// ```rust,ignore
/// let picker = FileOpenPicker::builder(host)
///     .file_type_filter([".png", ".jpg"])
///     .response_format(ResponseFormat::Json)
///     .build()?;
/// ```
pub struct FilePickerBuilder<F: FileFactory = NativeFileFactory> {
    host: Arc<dyn PickerHost>,
    resolver: Arc<dyn MimeResolver>,
    factory: F,
    response_format: ResponseFormat,
    file_type_filter: Vec<String>,
}

impl FilePickerBuilder<NativeFileFactory> {
    /// Create a new builder for the given host.
    pub fn new(host: Arc<dyn PickerHost>) -> Self {
        Self {
            host,
            resolver: Arc::new(GuessMimeResolver),
            factory: NativeFileFactory,
            response_format: ResponseFormat::default(),
            file_type_filter: Vec::new(),
        }
    }
}

impl<F: FileFactory> FilePickerBuilder<F> {
    /// Replace the extension to MIME lookup.
    ///
    /// Default: [`GuessMimeResolver`]
    pub fn with_mime_resolver(mut self, resolver: Arc<dyn MimeResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replace the factory that turns picked entries into file objects.
    ///
    /// Default: [`NativeFileFactory`]
    pub fn with_factory<G: FileFactory>(self, factory: G) -> FilePickerBuilder<G> {
        FilePickerBuilder {
            host: self.host,
            resolver: self.resolver,
            factory,
            response_format: self.response_format,
            file_type_filter: self.file_type_filter,
        }
    }

    /// Encoding the host uses for its answer.
    ///
    /// Default: [`ResponseFormat::Delimited`]
    pub fn response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }

    /// Initial filter patterns; validated by [`build`](Self::build).
    pub fn file_type_filter<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file_type_filter = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Build the picker, validating the filter patterns.
    pub fn build(self) -> Result<FileOpenPicker<F>> {
        for pattern in &self.file_type_filter {
            validate_pattern(pattern)?;
        }
        Ok(self.build_unfiltered())
    }

    pub(super) fn build_unfiltered(self) -> FileOpenPicker<F> {
        FileOpenPicker {
            host: self.host,
            resolver: self.resolver,
            factory: self.factory,
            response_format: self.response_format,
            file_type_filter: self.file_type_filter,
        }
    }
}
