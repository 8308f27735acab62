//! File type filters and their wire encoding.
//!
//! A caller's extension patterns become a [`FilterSpec`]: an allow-all flag
//! (set by the `*` pattern) plus a [`FileTypeMap`] grouping extensions under
//! their MIME type. The map is sent to the host as
//!
//! ```text
//! {'image/png':['.png'],'image/jpeg':['.jpg','.jpeg']}
//! ```
//!
//! with single-quoted strings and `'` written as `\'`.

use crate::config::WireConfig;
use crate::mime::MimeResolver;
use crate::{PickerError, Result};
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// MIME type to extensions mapping that keeps insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTypeMap {
    groups: Vec<(String, Vec<String>)>,
}

impl FileTypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `extension` to the group for `mime`, creating the group on first use.
    pub fn insert(&mut self, mime: impl Into<String>, extension: impl Into<String>) {
        let mime = mime.into();
        let extension = extension.into();
        match self.groups.iter_mut().find(|(m, _)| *m == mime) {
            Some((_, extensions)) => extensions.push(extension),
            None => self.groups.push((mime, vec![extension])),
        }
    }

    pub fn get(&self, mime: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|(m, _)| m == mime)
            .map(|(_, exts)| exts.as_slice())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// MIME groups in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups
            .iter()
            .map(|(mime, exts)| (mime.as_str(), exts.as_slice()))
    }

    /// Encode for the `fileTypeMap` parameter of the host call.
    pub fn encode(&self) -> String {
        if self.groups.is_empty() {
            return WireConfig::EMPTY_FILE_TYPE_MAP.to_string();
        }

        let mut out = String::from("{");
        for (i, (mime, extensions)) in self.groups.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            push_quoted(&mut out, mime);
            out.push_str(":[");
            for (j, ext) in extensions.iter().enumerate() {
                if j > 0 {
                    out.push(',');
                }
                push_quoted(&mut out, ext);
            }
            out.push(']');
        }
        out.push('}');
        out
    }

    /// Parse the encoding produced by [`encode`](Self::encode).
    ///
    /// Host-side implementations use this to read the filter back.
    pub fn parse(input: &str) -> Result<Self> {
        let mut parser = MapParser {
            chars: input.trim().chars().peekable(),
        };
        let map = parser.parse_map()?;
        parser.skip_whitespace();
        if let Some(c) = parser.chars.next() {
            return Err(parse_error(format!("unexpected trailing character {:?}", c)));
        }
        Ok(map)
    }
}

impl fmt::Display for FileTypeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

fn push_quoted(out: &mut String, value: &str) {
    out.push(WireConfig::QUOTE);
    for c in value.chars() {
        if c == WireConfig::QUOTE {
            out.push(WireConfig::ESCAPE);
        }
        out.push(c);
    }
    out.push(WireConfig::QUOTE);
}

fn parse_error(message: impl Into<String>) -> PickerError {
    PickerError::InvalidFileTypeMap {
        message: message.into(),
    }
}

struct MapParser<'a> {
    chars: Peekable<Chars<'a>>,
}

impl MapParser<'_> {
    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        self.skip_whitespace();
        match self.chars.next() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(parse_error(format!("expected {:?}, found {:?}", expected, c))),
            None => Err(parse_error(format!("expected {:?}, found end of input", expected))),
        }
    }

    /// Consume `c` if it is the next non-whitespace character.
    fn eat(&mut self, c: char) -> bool {
        self.skip_whitespace();
        self.chars.next_if_eq(&c).is_some()
    }

    fn parse_map(&mut self) -> Result<FileTypeMap> {
        self.expect('{')?;
        let mut map = FileTypeMap::new();
        if self.eat('}') {
            return Ok(map);
        }
        loop {
            let mime = self.parse_string()?;
            self.expect(':')?;
            self.expect('[')?;
            let mut extensions = Vec::new();
            if !self.eat(']') {
                loop {
                    extensions.push(self.parse_string()?);
                    if self.eat(']') {
                        break;
                    }
                    self.expect(',')?;
                }
            }
            for ext in extensions {
                map.insert(mime.clone(), ext);
            }
            if self.eat('}') {
                return Ok(map);
            }
            self.expect(',')?;
        }
    }

    fn parse_string(&mut self) -> Result<String> {
        self.expect(WireConfig::QUOTE)?;
        let mut value = String::new();
        loop {
            match self.chars.next() {
                Some(WireConfig::ESCAPE) if self.chars.peek() == Some(&WireConfig::QUOTE) => {
                    value.push(WireConfig::QUOTE);
                    self.chars.next();
                }
                Some(WireConfig::QUOTE) => return Ok(value),
                Some(c) => value.push(c),
                None => return Err(parse_error("unterminated string")),
            }
        }
    }
}

/// A caller's filter list resolved into what the host call needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    /// Whether the picker shows every entry type, set by the `*` pattern.
    pub allow_all: bool,
    pub file_types: FileTypeMap,
}

impl FilterSpec {
    /// Build from ordered extension patterns.
    ///
    /// The wildcard never enters the map; every other pattern is grouped under
    /// the MIME type `resolver` returns for it, in first-seen order.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S], resolver: &dyn MimeResolver) -> Self {
        let mut spec = FilterSpec::default();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            if pattern == WireConfig::WILDCARD {
                spec.allow_all = true;
                continue;
            }
            let mime = resolver.mime_for_extension(pattern);
            spec.file_types.insert(mime, pattern);
        }
        spec
    }

    /// The `fileTypeMap` argument of the host call.
    pub fn encoded_file_types(&self) -> String {
        self.file_types.encode()
    }
}

/// Check a user-supplied filter entry before it is accepted.
///
/// Accepts the wildcard or a non-empty extension with an optional leading dot.
/// Path separators are rejected since they would corrupt the delimited wire
/// format.
pub fn validate_pattern(pattern: &str) -> Result<()> {
    let invalid = || PickerError::InvalidFilter {
        pattern: pattern.to_string(),
    };
    if pattern == WireConfig::WILDCARD {
        return Ok(());
    }
    let ext = pattern.strip_prefix('.').unwrap_or(pattern);
    if ext.trim().is_empty() || ext.contains(['/', '\\', '*']) {
        return Err(invalid());
    }
    Ok(())
}
