//! Relative file reference resolution.

use std::path::Path;

/// Prefixes of references that never point at the local filesystem.
const REMOTE_PREFIXES: &[&str] = &[
    "azureml:",
    "http://",
    "https://",
    "wasb://",
    "wasbs://",
    "abfs://",
    "abfss://",
    "adl://",
    "git+",
];

/// True for references resolved by the service rather than on disk.
pub fn is_remote_reference(reference: &str) -> bool {
    REMOTE_PREFIXES.iter().any(|p| reference.starts_with(p))
}

/// Resolve `reference` against `base_dir`.
///
/// Remote references and absolute paths come back unchanged. A leading
/// `file:` is dropped. Relative paths are joined onto `base_dir` unless it
/// is the current directory.
pub fn resolve_reference(base_dir: &Path, reference: &str) -> String {
    if is_remote_reference(reference) {
        return reference.to_string();
    }
    let local = reference.strip_prefix("file:").unwrap_or(reference);
    let path = Path::new(local);
    if path.is_absolute() || base_dir.as_os_str().is_empty() || base_dir == Path::new(".") {
        return local.to_string();
    }
    base_dir.join(path).to_string_lossy().into_owned()
}

/// Rewrites the local file references held by an entity.
pub(crate) trait ResolvePaths {
    fn resolve_paths(&mut self, base_dir: &Path);
}

impl<T: ResolvePaths> ResolvePaths for Option<T> {
    fn resolve_paths(&mut self, base_dir: &Path) {
        if let Some(inner) = self {
            inner.resolve_paths(base_dir);
        }
    }
}

impl<T: ResolvePaths> ResolvePaths for Box<T> {
    fn resolve_paths(&mut self, base_dir: &Path) {
        self.as_mut().resolve_paths(base_dir);
    }
}

impl<K, T: ResolvePaths> ResolvePaths for std::collections::BTreeMap<K, T> {
    fn resolve_paths(&mut self, base_dir: &Path) {
        for value in self.values_mut() {
            value.resolve_paths(base_dir);
        }
    }
}

impl ResolvePaths for String {
    fn resolve_paths(&mut self, base_dir: &Path) {
        *self = resolve_reference(base_dir, self);
    }
}

impl<T: ResolvePaths> ResolvePaths for Vec<T> {
    fn resolve_paths(&mut self, base_dir: &Path) {
        for value in self {
            value.resolve_paths(base_dir);
        }
    }
}
