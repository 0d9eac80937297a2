//! Scenario source readers
//!
//! The manifest stores a location string per entry; a [`ScenarioSource`]
//! turns that string into document text.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Reader for scenario documents
pub trait ScenarioSource: Send + Sync {
    /// Read the document at a manifest location
    ///
    /// # Errors
    /// Returns the underlying IO error if the location cannot be read.
    fn read(&self, location: &str) -> io::Result<String>;
}

/// Reads scenario files relative to a scenarios directory
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    /// Create source rooted at `root`
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Scenarios directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ScenarioSource for FsSource {
    fn read(&self, location: &str) -> io::Result<String> {
        std::fs::read_to_string(self.root.join(location))
    }
}

/// In-memory documents keyed by location
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: HashMap<String, String>,
}

impl MemorySource {
    /// Create empty source
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a document
    pub fn insert(&mut self, location: impl Into<String>, content: impl Into<String>) {
        self.documents.insert(location.into(), content.into());
    }

    /// Builder form of [`MemorySource::insert`]
    #[must_use]
    pub fn with(mut self, location: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(location, content);
        self
    }
}

impl ScenarioSource for MemorySource {
    fn read(&self, location: &str) -> io::Result<String> {
        self.documents.get(location).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no document at '{location}'"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_source_reads_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("runs")).unwrap();
        std::fs::write(dir.path().join("runs/a.json"), "{}").unwrap();

        let source = FsSource::new(dir.path());
        assert_eq!(source.read("runs/a.json").unwrap(), "{}");
        assert_eq!(
            source.read("runs/b.json").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn memory_source_lookup() {
        let source = MemorySource::new().with("a.json", "{}");
        assert_eq!(source.read("a.json").unwrap(), "{}");
        assert!(source.read("b.json").is_err());
    }
}
