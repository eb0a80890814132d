/// Single-entry memoization keyed by an explicit composite key.
///
/// The stored value is reused while the key compares equal to the last one and
/// recomputed as soon as any component of the key changes.
#[derive(Debug, Clone)]
pub struct Memo<K, V> {
    entry: Option<(K, V)>,
}

impl<K: PartialEq, V: Clone> Memo<K, V> {
    pub fn new() -> Self {
        Self { entry: None }
    }

    /// Returns the cached value for `key`, computing and storing it on a miss
    pub fn get_or_insert_with<F>(&mut self, key: K, compute: F) -> V
    where
        F: FnOnce(&K) -> V,
    {
        match &self.entry {
            Some((cached_key, value)) if *cached_key == key => value.clone(),
            _ => {
                let value = compute(&key);
                self.entry = Some((key, value.clone()));
                value
            }
        }
    }

    pub fn is_cached(&self, key: &K) -> bool {
        matches!(&self.entry, Some((cached_key, _)) if cached_key == key)
    }
}

impl<K: PartialEq, V: Clone> Default for Memo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
