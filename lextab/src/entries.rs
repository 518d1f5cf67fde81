use super::Error;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

/// A key and the value it should resolve to.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry<V> {
    key: String,
    value: V,
}

impl<V> Entry<V> {
    /// The key.
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The value.
    #[inline]
    #[must_use]
    pub const fn value(&self) -> &V {
        &self.value
    }
}

/// An ordered collection of entries with unique keys.
///
/// This is the input of the compilers. Insertion order is preserved and matters: among colliding
/// keys of equal length, the one inserted first gets the earlier cell.
///
/// Values are opaque to this crate. They are usually indices or tokens of the consumer, cloned into
/// the compiled structures.
#[derive(Clone, Debug)]
pub struct KeyValueSet<V> {
    entries: Vec<Entry<V>>,
    index: BTreeMap<String, usize>,
}

impl<V> KeyValueSet<V> {
    /// Create an empty set.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    /// Build a set from pairs, failing on the first duplicate key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] if a key occurs twice.
    #[inline]
    pub fn from_entries<K: Into<String>>(
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, Error> {
        let mut set = Self::new();
        for (key, value) in entries {
            set.insert(key, value)?;
        }
        Ok(set)
    }

    /// Append an entry.
    ///
    /// Keys are compared exactly here; the hash compiler additionally rejects keys that are equal
    /// up to ASCII case when case folding is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] if the key is already present. The set is left unchanged.
    #[inline]
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Result<(), Error> {
        let key = key.into();
        if self.index.contains_key(&key) {
            return Err(Error::DuplicateKey { key });
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push(Entry { key, value });
        Ok(())
    }

    /// Look a value up by its exact key.
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&i| &self.entries[i].value)
    }

    /// Get number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the set is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate through entries in insertion order.
    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, Entry<V>> {
        self.entries.iter()
    }

    /// Iterate through keys in insertion order.
    #[inline]
    pub fn keys(&self) -> impl Iterator<Item = &str> + Clone {
        self.entries.iter().map(Entry::key)
    }
}

impl<V> Default for KeyValueSet<V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, V> IntoIterator for &'a KeyValueSet<V> {
    type Item = &'a Entry<V>;
    type IntoIter = core::slice::Iter<'a, Entry<V>>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
