//! Source provider abstraction for filesystem-independent processing.
//!
//! Both passes read their input through [`SourceProvider`], so the pipeline
//! can run against the real filesystem ([`FileSystemProvider`]) or a map of
//! in-memory files ([`InMemoryProvider`]) in tests.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

pub trait SourceProvider {
    /// Read the full text of `path`.
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error>;

    /// Resolve the `FILE=` value of an `&INCL` record against the directory
    /// of the including file.
    fn resolve_include(&self, base: &Path, include: &str) -> PathBuf;
}

/// Default provider backed by `std::fs`.
pub struct FileSystemProvider;

impl SourceProvider for FileSystemProvider {
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error> {
        std::fs::read_to_string(path)
    }

    fn resolve_include(&self, base: &Path, include: &str) -> PathBuf {
        base.join(include)
    }
}

/// In-memory provider mapping normalized paths to file contents.
pub struct InMemoryProvider {
    files: HashMap<PathBuf, String>,
}

impl InMemoryProvider {
    pub fn new(files: HashMap<PathBuf, String>) -> Self {
        Self { files }
    }

    /// Convenience constructor from `(path, text)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(p, s)| (Self::normalize_path(Path::new(p)), s.to_string()))
                .collect(),
        )
    }

    /// Resolve `.` and `..` without touching the filesystem.
    fn normalize_path(path: &Path) -> PathBuf {
        let mut components = Vec::new();
        for component in path.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    components.pop();
                }
                other => components.push(other),
            }
        }
        components.iter().collect()
    }
}

impl SourceProvider for InMemoryProvider {
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error> {
        let normalized = Self::normalize_path(path);
        self.files.get(&normalized).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found in memory: {}", normalized.display()),
            )
        })
    }

    fn resolve_include(&self, base: &Path, include: &str) -> PathBuf {
        Self::normalize_path(&base.join(include))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_path_resolves_dot_and_dotdot() {
        let normalized = InMemoryProvider::normalize_path(Path::new("/a/b/../c/./d"));
        assert_eq!(normalized, PathBuf::from("/a/c/d"));
    }

    #[test]
    fn in_memory_read_source_found() {
        let provider = InMemoryProvider::from_pairs([("/case/room.fds", "&HEAD CHID='room' /")]);
        let content = provider.read_source(Path::new("/case/./room.fds")).unwrap();
        assert_eq!(content, "&HEAD CHID='room' /");
    }

    #[test]
    fn in_memory_read_source_not_found() {
        let provider = InMemoryProvider::new(HashMap::new());
        let err = provider.read_source(Path::new("/missing.fds")).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn include_resolves_against_including_directory() {
        let provider = InMemoryProvider::new(HashMap::new());
        let resolved = provider.resolve_include(Path::new("/case/parts"), "../lib/desk.fds");
        assert_eq!(resolved, PathBuf::from("/case/lib/desk.fds"));
    }
}
