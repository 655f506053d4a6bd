// SPDX-License-Identifier: AGPL-3.0-or-later
//! Type-name keyed handler registry
//!
//! Both conversion directions look handlers up by the type name of the node
//! or mark being converted. The registry is read-only while a conversion runs.

use std::collections::HashMap;
use std::fmt;

/// Registry of handlers keyed by node or mark type name
#[derive(Clone)]
pub struct HandlerRegistry<H> {
    handlers: HashMap<String, H>,
}

impl<H> HandlerRegistry<H> {
    pub fn new() -> Self {
        HandlerRegistry {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler
    ///
    /// If a handler with the same type name already exists, it will be replaced.
    pub fn register(&mut self, name: impl Into<String>, handler: H) -> &mut Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    pub fn get(&self, name: &str) -> Option<&H> {
        self.handlers.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<H> {
        self.handlers.remove(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered type names (sorted)
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<H> Default for HandlerRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for HandlerRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl<H, S: Into<String>> FromIterator<(S, H)> for HandlerRegistry<H> {
    fn from_iter<I: IntoIterator<Item = (S, H)>>(iter: I) -> Self {
        HandlerRegistry {
            handlers: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
