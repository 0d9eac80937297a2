//! Manifest registry and stable scenario identifiers
//!
//! The manifest maps each category to `key → source location`. It is read once
//! at startup; [`Manifest::generate_identifiers`] then freezes the keys into
//! [`Identifiers`] that calling code holds instead of raw strings.
//!
//! Referenced scenario files are not opened here. A broken scenario surfaces
//! only when it is loaded.

use crate::error::ManifestError;
use crate::kind::ScenarioKind;
use crate::names::normalize_token;
use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

/// Stable identifier of a manifest entry
///
/// Cheap to clone and usable as a map or set key. Identifiers are normally
/// obtained from [`Identifiers`]; one built by hand with [`ScenarioId::new`]
/// only resolves if some manifest registers the same kind and key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ScenarioId {
    kind: ScenarioKind,
    key: Arc<str>,
}

impl ScenarioId {
    /// Create identifier from kind and case-preserved key
    #[inline]
    #[must_use]
    pub fn new(kind: ScenarioKind, key: impl Into<Arc<str>>) -> Self {
        Self {
            kind,
            key: key.into(),
        }
    }

    /// Category the entry is registered under
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ScenarioKind {
        self.kind
    }

    /// Manifest key as written
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.key)
    }
}

/// Parsed manifest
///
/// Immutable after construction. Keys keep their declaration order.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    sections: BTreeMap<ScenarioKind, IndexMap<String, String>>,
}

impl Manifest {
    /// Parse manifest JSON
    ///
    /// # Errors
    /// Returns [`ManifestError`] if the document is not an object of known
    /// categories, a section is not an object of path strings, or a key is
    /// blank, repeated, or normalizes onto another key of its section.
    pub fn from_json_str(content: &str) -> Result<Self, ManifestError> {
        let root: RawNode<RawNode<serde_json::Value>> =
            serde_json::from_str(content).map_err(|e| ManifestError::Syntax(e.to_string()))?;

        let categories = match root {
            RawNode::Object(categories) => categories,
            other => return Err(ManifestError::NotAnObject(other.type_name())),
        };

        let mut sections = BTreeMap::new();
        for (category, section) in categories {
            let kind = ScenarioKind::from_section(&category)
                .ok_or_else(|| ManifestError::UnknownCategory(category.clone()))?;
            if sections.contains_key(&kind) {
                return Err(ManifestError::DuplicateCategory(category));
            }

            let entries = match section {
                RawNode::Object(entries) => entries,
                other => {
                    return Err(ManifestError::MalformedSection {
                        category,
                        found: other.type_name(),
                    })
                }
            };

            sections.insert(kind, parse_section(&category, entries)?);
        }

        Ok(Self { sections })
    }

    /// Read and parse a manifest file
    ///
    /// # Errors
    /// Returns [`ManifestError::Io`] if the file cannot be read, otherwise as
    /// [`Manifest::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ManifestError::io_error(path, e))?;
        let manifest = Self::from_json_str(&content)?;
        tracing::info!(
            path = %path.display(),
            entries = manifest.len(),
            "Loaded scenario manifest"
        );
        Ok(manifest)
    }

    /// Entries of one category in declaration order
    pub fn section(&self, kind: ScenarioKind) -> impl Iterator<Item = (&str, &str)> {
        self.sections
            .get(&kind)
            .into_iter()
            .flat_map(|s| s.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Source location registered for an identifier
    #[must_use]
    pub fn location(&self, id: &ScenarioId) -> Option<&str> {
        self.sections
            .get(&id.kind)
            .and_then(|s| s.get(id.key()))
            .map(String::as_str)
    }

    /// Check whether an identifier is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &ScenarioId) -> bool {
        self.location(id).is_some()
    }

    /// Total number of entries across categories
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.values().map(IndexMap::len).sum()
    }

    /// Check if manifest has no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Freeze manifest keys into per-category identifier sets
    ///
    /// Intended to run once at startup. Identifiers produced from the same
    /// manifest compare equal across calls.
    #[must_use]
    pub fn generate_identifiers(&self) -> Identifiers {
        let build = |kind: ScenarioKind| IdentifierSet::from_keys(kind, self.section(kind).map(|(k, _)| k));
        Identifiers {
            missions: build(ScenarioKind::Mission),
            quests: build(ScenarioKind::Quest),
            runs: build(ScenarioKind::Run),
            vanquishes: build(ScenarioKind::Vanquish),
        }
    }
}

fn parse_section(
    category: &str,
    entries: Vec<(String, serde_json::Value)>,
) -> Result<IndexMap<String, String>, ManifestError> {
    let mut section = IndexMap::with_capacity(entries.len());
    let mut normalized: HashMap<String, String> = HashMap::with_capacity(entries.len());

    for (raw_key, value) in entries {
        let key = raw_key.trim().to_string();
        if key.is_empty() {
            return Err(ManifestError::EmptyKey {
                category: category.to_string(),
            });
        }
        if section.contains_key(&key) {
            return Err(ManifestError::DuplicateKey {
                category: category.to_string(),
                key,
            });
        }

        let serde_json::Value::String(location) = value else {
            return Err(ManifestError::InvalidEntry {
                category: category.to_string(),
                key,
            });
        };

        let norm = normalize_token(&key);
        if let Some(first) = normalized.get(&norm) {
            return Err(ManifestError::NormalizedCollision {
                category: category.to_string(),
                first: first.clone(),
                second: key,
                normalized: norm,
            });
        }
        normalized.insert(norm, key.clone());
        section.insert(key, location);
    }

    Ok(section)
}

/// Frozen identifiers of one category
///
/// Two lookup surfaces resolve to the same [`ScenarioId`]: the key as written
/// ([`IdentifierSet::get`]) and its normalized form ([`IdentifierSet::lookup`]).
#[derive(Debug, Clone)]
pub struct IdentifierSet {
    kind: ScenarioKind,
    by_key: IndexMap<Arc<str>, ScenarioId>,
    by_normalized: HashMap<String, ScenarioId>,
}

impl IdentifierSet {
    fn from_keys<'a>(kind: ScenarioKind, keys: impl Iterator<Item = &'a str>) -> Self {
        let mut by_key = IndexMap::new();
        let mut by_normalized = HashMap::new();
        for key in keys {
            let id = ScenarioId::new(kind, key);
            by_normalized.insert(normalize_token(key), id.clone());
            by_key.insert(Arc::clone(&id.key), id);
        }
        Self {
            kind,
            by_key,
            by_normalized,
        }
    }

    /// Category of every identifier in the set
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ScenarioKind {
        self.kind
    }

    /// Case-preserving lookup
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ScenarioId> {
        self.by_key.get(key)
    }

    /// Exact key first, then case/separator-insensitive match
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&ScenarioId> {
        self.get(name)
            .or_else(|| self.by_normalized.get(&normalize_token(name)))
    }

    /// Check membership
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &ScenarioId) -> bool {
        id.kind == self.kind && self.by_key.contains_key(id.key())
    }

    /// Identifiers in manifest order
    pub fn iter(&self) -> impl Iterator<Item = &ScenarioId> {
        self.by_key.values()
    }

    /// Number of identifiers
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Check if set is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// Identifier sets for all four categories
#[derive(Debug, Clone)]
pub struct Identifiers {
    /// `missions` section
    pub missions: IdentifierSet,
    /// `quests` section
    pub quests: IdentifierSet,
    /// `runs` section
    pub runs: IdentifierSet,
    /// `vanquishes` section
    pub vanquishes: IdentifierSet,
}

impl Identifiers {
    /// Set for one category
    #[must_use]
    pub fn of(&self, kind: ScenarioKind) -> &IdentifierSet {
        match kind {
            ScenarioKind::Mission => &self.missions,
            ScenarioKind::Quest => &self.quests,
            ScenarioKind::Run => &self.runs,
            ScenarioKind::Vanquish => &self.vanquishes,
        }
    }

    /// Every identifier, category by category
    pub fn iter(&self) -> impl Iterator<Item = &ScenarioId> {
        ScenarioKind::ALL.into_iter().flat_map(|k| self.of(k).iter())
    }
}

/// JSON node that keeps repeated object keys instead of collapsing them
enum RawNode<V> {
    Object(Vec<(String, V)>),
    Other(&'static str),
}

impl<V> RawNode<V> {
    fn type_name(&self) -> &'static str {
        match self {
            RawNode::Object(_) => "object",
            RawNode::Other(name) => name,
        }
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for RawNode<V> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(RawNodeVisitor(PhantomData))
    }
}

struct RawNodeVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for RawNodeVisitor<V> {
    type Value = RawNode<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, V>()? {
            entries.push((key, value));
        }
        Ok(RawNode::Object(entries))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(RawNode::Other("array"))
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<Self::Value, E> {
        Ok(RawNode::Other("string"))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(RawNode::Other("boolean"))
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<Self::Value, E> {
        Ok(RawNode::Other("number"))
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<Self::Value, E> {
        Ok(RawNode::Other("number"))
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
        Ok(RawNode::Other("number"))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(RawNode::Other("null"))
    }
}
