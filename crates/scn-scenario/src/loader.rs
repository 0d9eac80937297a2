//! Scenario definition loader
//!
//! Identifier → manifest location → source text → [`ScenarioDefinition`].
//!
//! By default every call re-reads and re-parses the source, so edits to a
//! scenario file are picked up on the next enqueue. With a cache capacity the
//! loader memoizes parsed definitions per identifier in a bounded `moka` cache.

use crate::definition::{parse_definition, ScenarioDefinition};
use crate::error::{FormatError, LoadError};
use crate::manifest::{Manifest, ScenarioId};
use crate::source::ScenarioSource;
use moka::sync::Cache;
use std::fmt;
use std::sync::Arc;

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached definitions
    pub entry_count: u64,
}

/// Resolves identifiers into parsed definitions
#[derive(Clone)]
pub struct ScenarioLoader {
    manifest: Arc<Manifest>,
    source: Arc<dyn ScenarioSource>,
    cache: Option<Cache<ScenarioId, Arc<ScenarioDefinition>>>,
}

impl fmt::Debug for ScenarioLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioLoader")
            .field("manifest_entries", &self.manifest.len())
            .field("cached", &self.cache.is_some())
            .finish()
    }
}

impl ScenarioLoader {
    /// Create uncached loader
    #[must_use]
    pub fn new(manifest: Arc<Manifest>, source: Arc<dyn ScenarioSource>) -> Self {
        Self {
            manifest,
            source,
            cache: None,
        }
    }

    /// Enable definition caching with a maximum entry count
    ///
    /// A capacity of zero keeps the loader uncached.
    #[must_use]
    pub fn with_cache(mut self, max_capacity: u64) -> Self {
        self.cache = (max_capacity > 0).then(|| Cache::new(max_capacity));
        self
    }

    /// Manifest backing this loader
    #[inline]
    #[must_use]
    pub fn manifest(&self) -> &Arc<Manifest> {
        &self.manifest
    }

    /// Load and parse the definition for an identifier
    ///
    /// # Errors
    /// - [`LoadError::NotRegistered`] if the manifest has no such entry
    /// - [`LoadError::SourceUnavailable`] if the source cannot be read
    /// - [`LoadError::Format`] if the document is malformed or its kind differs
    ///   from the identifier's category
    pub fn load(&self, id: &ScenarioId) -> Result<Arc<ScenarioDefinition>, LoadError> {
        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get(id)) {
            tracing::trace!(scenario = %id, "Definition cache hit");
            return Ok(cached);
        }

        let definition = Arc::new(self.load_uncached(id)?);
        if let Some(cache) = &self.cache {
            cache.insert(id.clone(), Arc::clone(&definition));
        }
        Ok(definition)
    }

    fn load_uncached(&self, id: &ScenarioId) -> Result<ScenarioDefinition, LoadError> {
        let location = self
            .manifest
            .location(id)
            .ok_or_else(|| LoadError::NotRegistered { id: id.clone() })?;

        let content = self
            .source
            .read(location)
            .map_err(|source| LoadError::SourceUnavailable {
                id: id.clone(),
                location: location.to_string(),
                source,
            })?;

        let format_error = |source| LoadError::Format {
            id: id.clone(),
            location: location.to_string(),
            source,
        };

        let definition = parse_definition(&content).map_err(format_error)?;
        if definition.kind != id.kind() {
            return Err(format_error(FormatError::KindMismatch {
                expected: id.kind(),
                found: definition.kind,
            }));
        }

        tracing::debug!(
            scenario = %id,
            location,
            steps = definition.len(),
            "Loaded scenario definition"
        );
        Ok(definition)
    }

    /// Drop one cached definition
    pub fn invalidate(&self, id: &ScenarioId) {
        if let Some(cache) = &self.cache {
            cache.invalidate(id);
        }
    }

    /// Drop every cached definition
    pub fn invalidate_all(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
        }
    }

    /// Get cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.cache.as_ref().map_or(0, |c| {
                c.run_pending_tasks();
                c.entry_count()
            }),
        }
    }
}
