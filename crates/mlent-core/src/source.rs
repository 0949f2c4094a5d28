//! # YAML Sources and Relative Origins
//!
//! A [`Source`] is where a document is read from: a file path, a borrowed
//! readable stream, or in-memory text. The loader borrows the source for the
//! duration of a single call; streams stay owned (and open) by the caller.
//!
//! An [`Origin`] is the string used to resolve relative file references
//! found inside a parsed document. It is derived once per call by
//! [`derive_origin`].

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Origin used when nothing better can be derived from the source.
pub const DEFAULT_RELATIVE_ORIGIN: &str = "./";

/// A caller-owned readable stream, optionally carrying a name (typically
/// the path the stream was opened from).
pub struct NamedStream<'a> {
    reader: &'a mut dyn Read,
    name: Option<String>,
}

impl<'a> NamedStream<'a> {
    /// Wrap a nameless stream.
    pub fn new(reader: &'a mut dyn Read) -> Self {
        Self { reader, name: None }
    }

    /// Wrap a stream that exposes a name.
    pub fn named(reader: &'a mut dyn Read, name: impl Into<String>) -> Self {
        Self {
            reader,
            name: Some(name.into()),
        }
    }

    /// The stream's name, if it has one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn read_to_string(&mut self) -> std::io::Result<String> {
        let mut buf = String::new();
        self.reader.read_to_string(&mut buf)?;
        Ok(buf)
    }
}

impl fmt::Debug for NamedStream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedStream")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Input for a load call.
#[derive(Debug)]
pub enum Source<'a> {
    /// A filesystem path, opened and read by the loader.
    Path(PathBuf),
    /// An already-open stream, read to the end but never closed.
    Stream(NamedStream<'a>),
    /// YAML text held in memory.
    Text(String),
}

impl<'a> Source<'a> {
    /// A filesystem path source.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// A nameless stream source.
    pub fn stream(reader: &'a mut dyn Read) -> Self {
        Self::Stream(NamedStream::new(reader))
    }

    /// A stream source that exposes `name`.
    pub fn named_stream(reader: &'a mut dyn Read, name: impl Into<String>) -> Self {
        Self::Stream(NamedStream::named(reader, name))
    }

    /// An in-memory YAML source.
    pub fn text(yaml: impl Into<String>) -> Self {
        Self::Text(yaml.into())
    }

    /// Short description used in log events.
    pub fn describe(&self) -> String {
        match self {
            Self::Path(p) => p.display().to_string(),
            Self::Stream(s) => s.name().unwrap_or("<stream>").to_string(),
            Self::Text(_) => "<text>".to_string(),
        }
    }

    /// Consume the source and return its full contents.
    ///
    /// # Errors
    ///
    /// Propagates the underlying I/O error untranslated (missing file,
    /// permission denied, unreadable stream, invalid UTF-8).
    pub fn read_to_string(self) -> std::io::Result<String> {
        match self {
            Self::Path(p) => std::fs::read_to_string(p),
            Self::Stream(mut s) => s.read_to_string(),
            Self::Text(t) => Ok(t),
        }
    }
}

impl From<PathBuf> for Source<'_> {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for Source<'_> {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

/// Plain strings are paths; use [`Source::text`] for inline YAML.
impl From<&str> for Source<'_> {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<String> for Source<'_> {
    fn from(path: String) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

/// Base identifier for resolving file references inside a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Origin(String);

impl Origin {
    /// Wrap an origin string.
    pub fn new(origin: impl Into<String>) -> Self {
        Self(origin.into())
    }

    /// The default marker `./`.
    pub fn default_marker() -> Self {
        Self(DEFAULT_RELATIVE_ORIGIN.to_string())
    }

    /// Access the origin string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when this is the default marker.
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_RELATIVE_ORIGIN
    }

    /// Directory that relative references resolve against: the parent of
    /// the origin path, or `.` when there is none.
    pub fn base_dir(&self) -> PathBuf {
        if self.is_default() {
            return PathBuf::from(".");
        }
        match Path::new(&self.0).parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl Default for Origin {
    fn default() -> Self {
        Self::default_marker()
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the origin for `source`.
///
/// An explicit `relative_origin` always wins. Otherwise paths use the path
/// itself, named streams use their name, and everything else falls back to
/// [`DEFAULT_RELATIVE_ORIGIN`].
pub fn derive_origin(source: Option<&Source<'_>>, relative_origin: Option<&str>) -> Origin {
    if let Some(explicit) = relative_origin {
        return Origin::new(explicit);
    }
    match source {
        Some(Source::Path(p)) => Origin::new(p.to_string_lossy()),
        Some(Source::Stream(s)) => s
            .name()
            .map(Origin::new)
            .unwrap_or_else(Origin::default_marker),
        Some(Source::Text(_)) | None => Origin::default_marker(),
    }
}
