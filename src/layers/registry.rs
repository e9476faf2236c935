use crate::{
    layers::key::RegistryKey, prelude::HashMap, rendering::engine::RenderEngine,
    traits::EngineResource,
};

/// Two-level store of overlay entities: namespace, then key.
///
/// An entity is only reachable through the namespace its key derives. A namespace
/// that is unknown (`None`) is distinct from one that exists but holds nothing
/// (`Some` of an empty map).
#[derive(Debug)]
pub struct Registry<K, T> {
    buckets: HashMap<String, HashMap<K, T>>,
}

impl<K: RegistryKey, T> Registry<K, T> {
    pub fn new() -> Self {
        Self {
            buckets: HashMap::default(),
        }
    }

    /// Inserts a value, creating its namespace on first use.
    ///
    /// Returns the value previously stored under the same key. The registry does
    /// not detach it; the caller decides what happens to the replaced object.
    pub fn insert(&mut self, key: K, value: T) -> Option<T> {
        self.buckets
            .entry(key.namespace().to_string())
            .or_default()
            .insert(key, value)
    }

    /// Creates an empty namespace if it does not exist yet
    pub fn ensure_namespace(&mut self, namespace: &str) {
        self.buckets.entry(namespace.to_string()).or_default();
    }

    pub fn get(&self, key: &K) -> Option<&T> {
        self.buckets.get(key.namespace())?.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut T> {
        self.buckets.get_mut(key.namespace())?.get_mut(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Every entity of one namespace, `None` if the namespace is unknown
    pub fn namespace(&self, namespace: &str) -> Option<&HashMap<K, T>> {
        self.buckets.get(namespace)
    }

    /// Lists all namespace names
    pub fn namespaces(&self) -> Vec<String> {
        self.buckets.keys().cloned().collect()
    }

    /// Removes one entity without touching the engine. The namespace stays.
    pub fn remove(&mut self, key: &K) -> Option<T> {
        self.buckets.get_mut(key.namespace())?.remove(key)
    }

    /// Iterates over every entity of every namespace
    pub fn iter(&self) -> impl Iterator<Item = (&K, &T)> {
        self.buckets.values().flat_map(|bucket| bucket.iter())
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.buckets.values_mut().flat_map(|bucket| bucket.values_mut())
    }

    /// Number of entities across all namespaces
    pub fn len(&self) -> usize {
        self.buckets.values().map(|bucket| bucket.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: RegistryKey, T: EngineResource> Registry<K, T> {
    /// Inserts a value that is already attached, detaching the one it replaces.
    ///
    /// Returns whether something was replaced.
    pub fn replace(&mut self, key: K, value: T, engine: &mut dyn RenderEngine) -> bool {
        let label = key.to_string();
        match self.insert(key, value) {
            Some(previous) => {
                log::debug!("replacing {}", label);
                detach_logged(&label, &previous, engine);
                true
            }
            None => false,
        }
    }

    /// Detaches and deletes one entity. Returns whether it existed.
    pub fn detach_one(&mut self, key: &K, engine: &mut dyn RenderEngine) -> bool {
        match self.remove(key) {
            Some(value) => {
                detach_logged(key, &value, engine);
                true
            }
            None => false,
        }
    }

    /// Detaches every entity of a namespace and deletes the namespace itself.
    ///
    /// Returns how many entities were removed, `None` if the namespace is unknown.
    pub fn remove_namespace(&mut self, namespace: &str, engine: &mut dyn RenderEngine) -> Option<usize> {
        let bucket = self.buckets.remove(namespace)?;
        let removed = bucket.len();

        for (key, value) in &bucket {
            detach_logged(key, value, engine);
        }

        log::debug!("removed namespace {} ({} entities)", namespace, removed);
        Some(removed)
    }

    /// Removes every namespace as [`Registry::remove_namespace`] does
    pub fn remove_all(&mut self, engine: &mut dyn RenderEngine) -> usize {
        let mut removed = 0;
        for namespace in self.namespaces() {
            removed += self.remove_namespace(&namespace, engine).unwrap_or(0);
        }
        removed
    }
}

impl<K: RegistryKey, T> Default for Registry<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A failed detach never keeps the registry entry alive
fn detach_logged<K: std::fmt::Display, T: EngineResource>(key: &K, value: &T, engine: &mut dyn RenderEngine) {
    if let Err(e) = value.detach(engine) {
        log::warn!("Failed to detach {} from the engine: {}", key, e);
    }
}
