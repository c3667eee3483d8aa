// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Identifier → name registry built while scanning one log stream.

use std::collections::HashMap;

/// Names learned from `AT` records, keyed by raw identifier.
///
/// # Invariants
///
/// - Keys are unique; a later definition replaces the earlier one wholesale.
/// - No eviction. The registry lives exactly as long as its owner.
/// - [`lookup`](TagRegistry::lookup) returning `None` is the normal
///   "not yet defined" answer, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRegistry {
    names: HashMap<Vec<u8>, Vec<u8>>,
}

impl TagRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolved name for `key`, if one has been defined.
    pub fn lookup(&self, key: impl AsRef<[u8]>) -> Option<&[u8]> {
        self.names.get(key.as_ref()).map(Vec::as_slice)
    }

    /// Bind `key` to `name`, returning the name it replaced.
    pub fn define(&mut self, key: &[u8], name: &[u8]) -> Option<Vec<u8>> {
        self.names.insert(key.to_vec(), name.to_vec())
    }

    /// Number of defined identifiers.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if nothing has been defined.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for TagRegistry
where
    K: Into<Vec<u8>>,
    V: Into<Vec<u8>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            names: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
