use crate::Error;
use crate::query::{Criteria, Entity};

use std::sync::Arc;

use std::borrow::Borrow;
use std::collections::BTreeMap;

/// An immutable, cheaply cloneable list of entities indexed by key.
///
/// Values keep their insertion order. When two values share a key, the index
/// points to the last one, but both remain in [`Map::values`].
#[derive(Debug)]
pub struct Map<K, V>(Arc<Inner<K, V>>);

#[derive(Debug)]
struct Inner<K, V> {
    entries: BTreeMap<K, usize>,
    values: Arc<[V]>,
}

impl<K, V> Map<K, V> {
    pub fn new(values: impl Into<Arc<[V]>>, to_key: impl Fn(&V) -> K) -> Self
    where
        K: Ord,
    {
        let values = values.into();

        Self(Arc::new(Inner {
            entries: BTreeMap::from_iter(
                values
                    .iter()
                    .enumerate()
                    .map(|(i, value)| (to_key(value), i)),
            ),
            values,
        }))
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        Some(&self.0.values[*self.0.entries.get(key)?])
    }

    pub fn len(&self) -> usize {
        self.0.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values.is_empty()
    }

    pub fn values(&self) -> &[V] {
        &self.0.values
    }

    /// Scans every value and keeps the ones matching all the criteria.
    pub fn filter(&self, criteria: &Criteria) -> Result<Vec<&V>, Error>
    where
        V: Entity,
    {
        let mut matches = Vec::new();

        for value in self.values() {
            if value.compare(criteria)? {
                matches.push(value);
            }
        }

        Ok(matches)
    }
}

impl<K, V> Clone for Map<K, V> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
