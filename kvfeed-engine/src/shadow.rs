//! Snapshot reconciliation for a watch session.

use kvfeed_store::KeyValuePair;
use std::collections::BTreeMap;

/// Changes between the retained shadow and a fresh remote snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// New or byte-changed pairs, carrying the remote value.
    pub upserts: Vec<KeyValuePair>,
    /// Pairs gone from the remote snapshot, carrying the last value seen.
    pub deletes: Vec<KeyValuePair>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.deletes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.upserts.len() + self.deletes.len()
    }
}

/// Last-observed `key -> value` snapshot of one watch session.
///
/// Values are compared byte for byte. Two encodings of the same entity that
/// differ in layout are reported as a change. Versions are carried along but
/// never compared.
#[derive(Debug, Clone, Default)]
pub struct ShadowDiffEngine {
    shadow: BTreeMap<String, KeyValuePair>,
}

impl ShadowDiffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diffs `remote` against the shadow, then replaces the shadow with it.
    ///
    /// If `remote` lists a key twice the later pair wins.
    pub fn reconcile(&mut self, remote: Vec<KeyValuePair>) -> Reconciliation {
        let mut next = BTreeMap::new();
        for pair in remote {
            next.insert(pair.key.clone(), pair);
        }

        let upserts = next
            .values()
            .filter(|pair| {
                self.shadow
                    .get(&pair.key)
                    .is_none_or(|seen| seen.value != pair.value)
            })
            .cloned()
            .collect();

        let previous = std::mem::replace(&mut self.shadow, next);
        let deletes = previous
            .into_values()
            .filter(|pair| !self.shadow.contains_key(&pair.key))
            .collect();

        Reconciliation { upserts, deletes }
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.shadow.get(key).map(|pair| pair.value.as_slice())
    }

    pub fn len(&self) -> usize {
        self.shadow.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shadow.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.shadow.keys().map(String::as_str)
    }
}
