//! # Load Arguments and Source Resolution
//!
//! Every load function accepts the same inputs: a `source`, an optional
//! `relative_origin`, the deprecated `path`, positional `args`, and a
//! `params_override` list. [`resolve_source`] collapses the three source
//! inputs into one value, once, before the pipeline runs:
//!
//! 1. `source`, when given.
//! 2. Otherwise the first positional arg.
//! 3. Otherwise `path`, with a deprecation warning.
//!
//! Supplying nothing is not an error here. The pipeline reports it when it
//! tries to read the document.

use std::path::PathBuf;

use mlent_core::{derive_origin, Origin, Override, Source};

/// Inputs shared by every `load_*` function.
#[derive(Debug, Default)]
pub struct LoadArgs<'a> {
    source: Option<Source<'a>>,
    relative_origin: Option<String>,
    path: Option<PathBuf>,
    args: Vec<Source<'a>>,
    params_override: Vec<Override>,
}

impl<'a> LoadArgs<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arguments that load from `source`.
    pub fn from_source(source: impl Into<Source<'a>>) -> Self {
        Self::new().source(source)
    }

    /// The YAML to load: a path, an open stream, or in-memory text.
    pub fn source(mut self, source: impl Into<Source<'a>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Base used to resolve relative file references inside the document.
    /// Defaults to the source path, or the stream name.
    pub fn relative_origin(mut self, origin: impl Into<String>) -> Self {
        self.relative_origin = Some(origin.into());
        self
    }

    /// Append a positional argument. The first one stands in for `source`.
    pub fn arg(mut self, source: impl Into<Source<'a>>) -> Self {
        self.args.push(source.into());
        self
    }

    /// Legacy way to name a file source.
    #[deprecated(note = "the `path` input for load functions is deprecated, use `source` instead")]
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Replace the override list.
    pub fn params_override(mut self, overrides: Vec<Override>) -> Self {
        self.params_override = overrides;
        self
    }

    /// Append one override entry.
    pub fn with_override(mut self, entry: Override) -> Self {
        self.params_override.push(entry);
        self
    }

    /// Resolve the source and split off the overrides.
    pub fn into_parts(self) -> (ResolvedSource<'a>, Vec<Override>) {
        let resolved = resolve_source(
            self.source,
            self.path,
            self.args,
            self.relative_origin.as_deref(),
        );
        (resolved, self.params_override)
    }
}

/// The effective source and origin of one load call.
#[derive(Debug)]
pub struct ResolvedSource<'a> {
    /// `None` when no source input was supplied.
    pub source: Option<Source<'a>>,
    pub origin: Origin,
    /// True when the source came from the deprecated `path` input.
    pub deprecated_path: bool,
}

impl ResolvedSource<'_> {
    /// A source that can actually be read. An empty path does not count.
    pub fn has_usable_source(&self) -> bool {
        match &self.source {
            Some(Source::Path(p)) => !p.as_os_str().is_empty(),
            Some(_) => true,
            None => false,
        }
    }
}

/// Pick the effective source from `source`, `args` and the deprecated
/// `path`, then derive its origin.
pub fn resolve_source<'a>(
    source: Option<Source<'a>>,
    path: Option<PathBuf>,
    args: Vec<Source<'a>>,
    relative_origin: Option<&str>,
) -> ResolvedSource<'a> {
    let mut deprecated_path = false;
    let source = source
        .or_else(|| args.into_iter().next())
        .or_else(|| {
            path.map(|p| {
                tracing::warn!(
                    path = %p.display(),
                    "the 'path' input for load functions is deprecated. Please use 'source' instead."
                );
                deprecated_path = true;
                Source::Path(p)
            })
        });
    let origin = derive_origin(source.as_ref(), relative_origin);
    ResolvedSource {
        source,
        origin,
        deprecated_path,
    }
}

#[cfg(test)]
#[allow(deprecated)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_source_wins_over_args_and_path() {
        let (resolved, _) = LoadArgs::from_source("a.yml")
            .arg("b.yml")
            .path("c.yml")
            .into_parts();
        assert!(matches!(resolved.source, Some(Source::Path(ref p)) if p == &PathBuf::from("a.yml")));
        assert!(!resolved.deprecated_path);
        assert_eq!(resolved.origin.as_str(), "a.yml");
    }

    #[test]
    fn test_first_arg_beats_path() {
        let (resolved, _) = LoadArgs::new()
            .arg("first.yml")
            .arg("second.yml")
            .path("legacy.yml")
            .into_parts();
        assert_eq!(resolved.origin.as_str(), "first.yml");
        assert!(!resolved.deprecated_path);
    }

    #[test]
    fn test_path_fallback_is_flagged() {
        let (resolved, _) = LoadArgs::new().path("legacy.yml").into_parts();
        assert!(resolved.deprecated_path);
        assert_eq!(resolved.origin.as_str(), "legacy.yml");
    }

    #[test]
    fn test_nothing_supplied() {
        let (resolved, overrides) = LoadArgs::new().into_parts();
        assert!(resolved.source.is_none());
        assert!(!resolved.has_usable_source());
        assert!(resolved.origin.is_default());
        assert!(overrides.is_empty());
    }

    #[test]
    fn test_explicit_origin_wins() {
        let mut cursor = Cursor::new(b"name: x".to_vec());
        let (resolved, _) = LoadArgs::new()
            .source(Source::named_stream(&mut cursor, "/tmp/foo.yaml"))
            .relative_origin("/srv/project/")
            .into_parts();
        assert_eq!(resolved.origin.as_str(), "/srv/project/");
    }

    #[test]
    fn test_empty_path_is_not_usable() {
        let (resolved, _) = LoadArgs::from_source("").into_parts();
        assert!(resolved.source.is_some());
        assert!(!resolved.has_usable_source());
    }

    #[test]
    fn test_overrides_kept_in_order() {
        let (_, overrides) = LoadArgs::new()
            .with_override(Override::new("name", "a"))
            .with_override(Override::new("name", "b"))
            .into_parts();
        assert_eq!(overrides.len(), 2);
        assert_eq!(overrides[1].get("name"), Some(&serde_json::json!("b")));
    }
}
