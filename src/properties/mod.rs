//! Hierarchical named-property store
//!
//! Each store holds its own string key/value entries and optionally links to
//! a parent store for lookup fallback. Local entries always shadow the
//! parent; writes never propagate upward. The parent link is weak, so a
//! child never keeps an enclosing scope alive.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, Weak};

use tracing::debug;

/// Well-known property keys shared across the recognizer stack.
pub mod keys {
    /// BCP-47 recognition language tag, e.g. "en-US"
    pub const RECOGNITION_LANGUAGE: &str = "speech.recognition.language";
    /// Milliseconds of leading silence before a recognition times out
    pub const INITIAL_SILENCE_TIMEOUT_MS: &str = "speech.recognition.initial-silence-timeout-ms";
    /// Milliseconds of trailing silence that ends an utterance
    pub const END_SILENCE_TIMEOUT_MS: &str = "speech.recognition.end-silence-timeout-ms";
}

/// String key/value store with child-overrides-parent lookup semantics
pub struct PropertyStore {
    /// Local overrides; shadow the parent for the same key
    entries: RwLock<HashMap<String, String>>,

    /// Enclosing store, lookup-only; wired by the owner at init time
    parent: RwLock<Weak<PropertyStore>>,
}

impl PropertyStore {
    /// Create an unlinked (root) store
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entries: RwLock::new(HashMap::new()),
            parent: RwLock::new(Weak::new()),
        })
    }

    /// Create a store that falls back to `parent` on lookup misses
    pub fn with_parent(parent: &Arc<PropertyStore>) -> Arc<Self> {
        let store = Self::new();
        store.link_parent(parent);
        store
    }

    /// Link (or replace) the parent store used for lookup fallback
    pub fn link_parent(&self, parent: &Arc<PropertyStore>) {
        *self.parent.write().unwrap() = Arc::downgrade(parent);
    }

    /// Drop the parent link; subsequent misses return `None`
    pub fn unlink_parent(&self) {
        *self.parent.write().unwrap() = Weak::new();
    }

    /// Look up a value: local entries first, then the parent chain
    pub fn get_string_value(&self, name: &str) -> Option<String> {
        if let Some(value) = self.entries.read().unwrap().get(name) {
            return Some(value.clone());
        }

        let parent = self.parent.read().unwrap().upgrade();
        parent.and_then(|p| p.get_string_value(name))
    }

    /// Whether `name` resolves anywhere in the chain
    pub fn has_string_value(&self, name: &str) -> bool {
        self.get_string_value(name).is_some()
    }

    /// Write a value into the local layer, never the parent.
    /// Keys are overwrite-only; there is no removal.
    pub fn set_string_value(&self, name: &str, value: &str) {
        debug!("Setting property {}={}", name, value);
        self.entries
            .write()
            .unwrap()
            .insert(name.to_string(), value.to_string());
    }
}
