//! Extension to MIME type resolution.

use crate::config::MimeConfig;

/// Resolves a file extension to a MIME type string.
///
/// Implementations must be pure: the same extension always yields the same MIME.
pub trait MimeResolver: Send + Sync {
    fn mime_for_extension(&self, extension: &str) -> String;
}

/// Default resolver backed by `mime_guess`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuessMimeResolver;

impl MimeResolver for GuessMimeResolver {
    fn mime_for_extension(&self, extension: &str) -> String {
        let ext = extension.trim_start_matches('.');
        mime_guess::from_ext(ext)
            .first_raw()
            .unwrap_or(MimeConfig::FALLBACK_MIME)
            .to_string()
    }
}

impl<F> MimeResolver for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn mime_for_extension(&self, extension: &str) -> String {
        self(extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        let resolver = GuessMimeResolver;
        assert_eq!(resolver.mime_for_extension("png"), "image/png");
        assert_eq!(resolver.mime_for_extension(".jpg"), "image/jpeg");
        assert_eq!(resolver.mime_for_extension(".jpeg"), "image/jpeg");
        assert_eq!(resolver.mime_for_extension("pdf"), "application/pdf");
    }

    #[test]
    fn test_unknown_extension_falls_back() {
        assert_eq!(
            GuessMimeResolver.mime_for_extension(".definitely-not-a-type"),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |ext: &str| format!("test/{}", ext);
        assert_eq!(resolver.mime_for_extension("abc"), "test/abc");
    }
}
