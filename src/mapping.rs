//! A YAML mapping and its formatting-aware iteration and query APIs.

use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

use indexmap::IndexMap;

use crate::format::FormattingMetadata;
use crate::value::Value;

/// A YAML mapping in which the keys and values are both `Value`.
///
/// Entries iterate in insertion order, which for loaded documents is source
/// order. Alongside the ordinary content the mapping carries a sparse side
/// table of [`FormattingMetadata`] keyed by key value, plus any comments that
/// trailed the mapping's final entry in the source. Both are empty unless the
/// document was loaded with formatting capture.
#[derive(Clone, Debug, Default)]
pub struct Mapping {
    map: IndexMap<Value, Value>,
    formatting: IndexMap<Value, FormattingMetadata>,
    trailing_comments: Vec<String>,
}

impl Mapping {
    /// Creates an empty YAML mapping.
    pub fn new() -> Self {
        Mapping::default()
    }

    /// Creates an empty YAML mapping with the given initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Mapping {
            map: IndexMap::with_capacity(capacity),
            formatting: IndexMap::new(),
            trailing_comments: Vec::new(),
        }
    }

    /// Inserts a key-value pair into the mapping. If the mapping did have
    /// this key present, the value is updated and the old value is returned.
    pub fn insert(&mut self, k: Value, v: Value) -> Option<Value> {
        self.map.insert(k, v)
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get(&self, k: &Value) -> Option<&Value> {
        self.map.get(k)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, k: &Value) -> Option<&mut Value> {
        self.map.get_mut(k)
    }

    /// Returns true if the mapping contains the given key.
    pub fn contains_key(&self, k: &Value) -> bool {
        self.map.contains_key(k)
    }

    /// Removes and returns the value corresponding to the key, preserving the
    /// order of the remaining entries. Any formatting recorded for the key is
    /// removed with it.
    pub fn remove(&mut self, k: &Value) -> Option<Value> {
        self.formatting.shift_remove(k);
        self.map.shift_remove(k)
    }

    /// Returns the number of entries in the mapping.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the mapping contains no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Clears the mapping of all content and formatting.
    pub fn clear(&mut self) {
        self.map.clear();
        self.formatting.clear();
        self.trailing_comments.clear();
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.map.iter()
    }

    /// Iterates over the entries with mutable values, in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Value, &mut Value)> {
        self.map.iter_mut()
    }

    /// Iterates over the keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.map.keys()
    }

    /// Iterates over the values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.map.values()
    }

    /// Returns the formatting recorded for a key, or `None` when the key has
    /// no preceding blanks or comments. Absence is the common case.
    pub fn formatting(&self, k: &Value) -> Option<&FormattingMetadata> {
        self.formatting.get(k)
    }

    /// Returns mutable formatting for a key, creating an empty record if the
    /// key had none.
    pub fn formatting_mut(&mut self, k: Value) -> &mut FormattingMetadata {
        self.formatting.entry(k).or_default()
    }

    /// Records formatting for a key. The key does not have to be present in
    /// the content yet; the loader reconciles the two before dumping.
    pub fn set_formatting(&mut self, k: Value, meta: FormattingMetadata) {
        self.formatting.insert(k, meta);
    }

    /// Comments that trailed the mapping's last entry in the source, with no
    /// following element to bind to.
    pub fn trailing_comments(&self) -> &[String] {
        &self.trailing_comments
    }

    /// Appends a trailing comment.
    pub fn push_trailing_comment(&mut self, comment: impl Into<String>) {
        let comment = comment.into();
        if comment.starts_with('#') {
            self.trailing_comments.push(comment);
        } else {
            self.trailing_comments.push(format!("# {}", comment));
        }
    }
}

// Equality and hashing consider content only: two mappings that differ just
// in recorded formatting compare equal.
impl PartialEq for Mapping {
    fn eq(&self, other: &Mapping) -> bool {
        self.map == other.map
    }
}

impl Eq for Mapping {}

impl Hash for Mapping {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.map.len().hash(state);
        for (k, v) in &self.map {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl FromIterator<(Value, Value)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        Mapping {
            map: IndexMap::from_iter(iter),
            formatting: IndexMap::new(),
            trailing_comments: Vec::new(),
        }
    }
}

impl Extend<(Value, Value)> for Mapping {
    fn extend<I: IntoIterator<Item = (Value, Value)>>(&mut self, iter: I) {
        self.map.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Mapping {
    type Item = (&'a Value, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, Value, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.iter()
    }
}

impl IntoIterator for Mapping {
    type Item = (Value, Value);
    type IntoIter = indexmap::map::IntoIter<Value, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.into_iter()
    }
}
