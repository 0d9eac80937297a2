//! Scenario model, manifest registry and definition loader
//!
//! The read side of the scenario core: everything that happens before a
//! scenario is handed to the execution engine.
//!
//! # Core Concepts
//!
//! - [`Manifest`]: category → key → source location, loaded once at startup
//! - [`Identifiers`]: frozen per-category [`ScenarioId`] sets generated from the manifest
//! - [`ScenarioDefinition`]: parsed scenario with its ordered [`ActionStep`]s
//! - [`ScenarioLoader`]: identifier → definition, with optional bounded caching
//!
//! # Example
//!
//! ```rust,ignore
//! use scn_scenario::{FsSource, Manifest, ScenarioLoader};
//! use std::sync::Arc;
//!
//! let manifest = Arc::new(Manifest::load("scenarios/manifest.json")?);
//! let ids = manifest.generate_identifiers();
//!
//! let loader = ScenarioLoader::new(manifest, Arc::new(FsSource::new("scenarios")));
//! let wall = ids.missions.lookup("great northern wall").unwrap();
//! let definition = loader.load(wall)?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod definition;
pub mod error;
pub mod kind;
pub mod loader;
pub mod manifest;
pub mod names;
pub mod source;

pub use definition::{parse_definition, ActionStep, ScenarioDefinition};
pub use error::{FormatError, LoadError, ManifestError};
pub use kind::ScenarioKind;
pub use loader::{CacheStats, ScenarioLoader};
pub use manifest::{IdentifierSet, Identifiers, Manifest, ScenarioId};
pub use source::{FsSource, MemorySource, ScenarioSource};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
