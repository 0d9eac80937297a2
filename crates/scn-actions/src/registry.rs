//! Handler registry and alias table
//!
//! Canonical names are `Component.Method`. Registering one also registers a
//! family of normalized aliases so scenario authors can write `move.xy`,
//! `Move_XY`, `follow_auto_path` or just `XY`.
//!
//! Lookup order in [`HandlerRegistry::resolve`]:
//! 1. exact canonical name
//! 2. component-qualified and explicit aliases
//! 3. bare method aliases
//!
//! Bare method aliases rank last: the `for_time` generated by `Wait.ForTime`
//! never shadows the qualified aliases of a later `For.Time`.

use crate::error::{RegistryError, ResolveError};
use crate::handler::ActionHandler;
use scn_scenario::names::{camel_to_snake, normalize_token};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Handler together with the canonical name it was registered under
#[derive(Clone)]
pub struct ResolvedAction {
    /// Canonical `Component.Method`
    pub canonical: Arc<str>,
    /// Registered handler
    pub handler: Arc<dyn ActionHandler>,
}

impl fmt::Debug for ResolvedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedAction")
            .field("canonical", &self.canonical)
            .finish_non_exhaustive()
    }
}

/// Table of action handlers keyed by canonical name
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<Arc<str>, Arc<dyn ActionHandler>>,
    aliases: HashMap<String, Arc<str>>,
    method_aliases: HashMap<String, Arc<str>>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("actions", &self.handlers.keys().collect::<Vec<_>>())
            .field("aliases", &(self.aliases.len() + self.method_aliases.len()))
            .finish()
    }
}

impl HandlerRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `Component.Method` and its generated aliases
    ///
    /// # Errors
    /// - [`RegistryError::InvalidName`] if either part is empty or contains a `.`
    /// - [`RegistryError::DuplicateAction`] if the canonical name exists
    pub fn register<H>(&mut self, component: &str, method: &str, handler: H) -> Result<(), RegistryError>
    where
        H: ActionHandler + 'static,
    {
        let (component, method) = (component.trim(), method.trim());
        let canonical = format!("{component}.{method}");
        if !is_name_part(component) || !is_name_part(method) {
            return Err(RegistryError::InvalidName(canonical));
        }

        let canonical = self.insert_handler(&canonical, Arc::new(handler))?;
        let (qualified, bare) = generated_aliases(component, method);
        // Earlier registrations keep contested aliases within each table
        for alias in qualified {
            self.aliases.entry(alias).or_insert_with(|| Arc::clone(&canonical));
        }
        for alias in bare {
            self.method_aliases
                .entry(alias)
                .or_insert_with(|| Arc::clone(&canonical));
        }
        Ok(())
    }

    /// Register a handler under a full `Component.Method` name
    ///
    /// # Errors
    /// Same as [`HandlerRegistry::register`].
    pub fn register_canonical<H>(&mut self, canonical: &str, handler: H) -> Result<(), RegistryError>
    where
        H: ActionHandler + 'static,
    {
        match canonical.trim().split_once('.') {
            Some((component, method)) => self.register(component, method, handler),
            None => Err(RegistryError::InvalidName(canonical.to_string())),
        }
    }

    /// Add an explicit alias for a registered canonical name
    ///
    /// Re-adding an alias that already points at the same action is a no-op.
    ///
    /// # Errors
    /// - [`RegistryError::UnknownTarget`] if `canonical` is not registered
    /// - [`RegistryError::AliasConflict`] if the alias resolves elsewhere
    pub fn alias(&mut self, name: &str, canonical: &str) -> Result<(), RegistryError> {
        let Some((target, _)) = self.handlers.get_key_value(canonical) else {
            return Err(RegistryError::UnknownTarget {
                alias: name.to_string(),
                canonical: canonical.to_string(),
            });
        };
        let target = Arc::clone(target);

        let alias = normalize_token(name);
        match self.aliases.get(&alias) {
            Some(existing) if *existing != target => Err(RegistryError::AliasConflict {
                alias,
                existing: existing.to_string(),
                requested: target.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                tracing::debug!(alias = %alias, canonical = %target, "Registered action alias");
                self.aliases.insert(alias, target);
                Ok(())
            }
        }
    }

    /// Resolve an action name to its handler
    ///
    /// # Errors
    /// Returns [`ResolveError::UnknownAction`] if nothing matches.
    pub fn resolve(&self, name: &str) -> Result<ResolvedAction, ResolveError> {
        if let Some((canonical, handler)) = self.handlers.get_key_value(name) {
            return Ok(ResolvedAction {
                canonical: Arc::clone(canonical),
                handler: Arc::clone(handler),
            });
        }

        let alias = normalize_token(name);
        self.aliases
            .get(&alias)
            .or_else(|| self.method_aliases.get(&alias))
            .and_then(|canonical| self.handlers.get_key_value(canonical))
            .map(|(canonical, handler)| ResolvedAction {
                canonical: Arc::clone(canonical),
                handler: Arc::clone(handler),
            })
            .ok_or_else(|| ResolveError::unknown_action(name))
    }

    /// Check if a name resolves
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_ok()
    }

    /// Canonical names in sorted order
    pub fn canonical_names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(AsRef::as_ref)
    }

    /// Get number of registered actions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    fn insert_handler(
        &mut self,
        canonical: &str,
        handler: Arc<dyn ActionHandler>,
    ) -> Result<Arc<str>, RegistryError> {
        if self.handlers.contains_key(canonical) {
            return Err(RegistryError::DuplicateAction(canonical.to_string()));
        }
        let key: Arc<str> = Arc::from(canonical);
        self.handlers.insert(Arc::clone(&key), handler);
        tracing::trace!(canonical, "Registered action handler");
        Ok(key)
    }
}

fn is_name_part(part: &str) -> bool {
    !part.is_empty() && !part.contains('.')
}

/// Component-qualified and bare method aliases, normalized
fn generated_aliases(component: &str, method: &str) -> ([String; 4], [String; 2]) {
    let method_snake = camel_to_snake(method);
    let qualified = [
        format!("{component}.{method}"),
        format!("{component}.{method_snake}"),
        format!("{component}_{method}"),
        format!("{component}_{method_snake}"),
    ]
    .map(|alias| normalize_token(&alias));
    let bare = [method.to_string(), method_snake].map(|alias| normalize_token(&alias));
    (qualified, bare)
}
