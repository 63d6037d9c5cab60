//! AssociativeMap: chained hash table that doubles its bucket array when the
//! load factor reaches 0.8.

use crate::error::{MapError, MapResult};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

/// Bucket count used by [`AssociativeMap::new`].
pub const DEFAULT_CAPACITY: usize = 64;

// Grow once len / capacity >= 4 / 5.
const LOAD_FACTOR_NUM: usize = 4;
const LOAD_FACTOR_DEN: usize = 5;
const GROWTH_FACTOR: usize = 2;

#[derive(Debug, Clone)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
}

/// Hash map with one `Vec` chain per bucket.
///
/// Keys are unique: [`put`](Self::put) rejects a key that is already present
/// instead of overwriting it. Each entry keeps the hash computed at insertion,
/// so a rehash relocates entries without calling `K: Hash` again and cannot
/// fail part way through.
#[derive(Clone)]
pub struct AssociativeMap<K, V, S = RandomState> {
    hasher: S,
    buckets: Vec<Vec<Entry<K, V>>>,
    len: usize,
}

impl<K, V> AssociativeMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// A `capacity` of zero is raised to one bucket.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, Default::default())
    }
}

impl<K, V> Default for AssociativeMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

fn empty_buckets<K, V>(capacity: usize) -> Vec<Vec<Entry<K, V>>> {
    let mut buckets = Vec::with_capacity(capacity);
    buckets.resize_with(capacity, Vec::new);
    buckets
}

impl<K, V, S> AssociativeMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hasher)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            hasher,
            buckets: empty_buckets(capacity.max(1)),
            len: 0,
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    fn bucket_index(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }

    /// Bucket and chain position of the entry equal to `q`.
    fn locate<Q>(&self, q: &Q) -> Option<(usize, usize)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        let bucket = self.bucket_index(hash);
        self.buckets[bucket]
            .iter()
            .position(|e| e.hash == hash && e.key.borrow() == q)
            .map(|pos| (bucket, pos))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Insert a new mapping. Fails with [`MapError::DuplicateKey`] and leaves
    /// the map untouched if `key` is already present.
    pub fn put(&mut self, key: K, value: V) -> MapResult<()> {
        let hash = self.make_hash(&key);
        let bucket = self.bucket_index(hash);
        let chain = &mut self.buckets[bucket];
        if chain.iter().any(|e| e.hash == hash && e.key == key) {
            return Err(MapError::DuplicateKey);
        }
        chain.push(Entry { key, value, hash });
        self.len += 1;

        if self.len * LOAD_FACTOR_DEN >= self.buckets.len() * LOAD_FACTOR_NUM {
            self.rehash();
        }
        Ok(())
    }

    // One doubling per threshold crossing. Entries move by their stored hash,
    // so this never goes back through `put`.
    fn rehash(&mut self) {
        let old_capacity = self.buckets.len();
        let new_capacity = old_capacity * GROWTH_FACTOR;
        let mut buckets = empty_buckets(new_capacity);
        for entry in self.buckets.drain(..).flatten() {
            let bucket = (entry.hash % new_capacity as u64) as usize;
            buckets[bucket].push(entry);
        }
        self.buckets = buckets;
        tracing::debug!(
            old_capacity,
            new_capacity,
            len = self.len,
            "associative map rehashed"
        );
    }

    pub fn get<Q>(&self, q: &Q) -> MapResult<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (bucket, pos) = self.locate(q).ok_or(MapError::KeyNotFound)?;
        Ok(&self.buckets[bucket][pos].value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> MapResult<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (bucket, pos) = self.locate(q).ok_or(MapError::KeyNotFound)?;
        Ok(&mut self.buckets[bucket][pos].value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.locate(q).is_some()
    }

    /// Remove a mapping and return its value. The remaining chain keeps its
    /// order.
    pub fn remove<Q>(&mut self, q: &Q) -> MapResult<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (bucket, pos) = self.locate(q).ok_or(MapError::KeyNotFound)?;
        let entry = self.buckets[bucket].remove(pos);
        self.len -= 1;
        Ok(entry.value)
    }

    /// Drop every entry. Capacity is unchanged.
    pub fn clear(&mut self) {
        for chain in &mut self.buckets {
            chain.clear();
        }
        self.len = 0;
    }
}

impl<K, V, S> AssociativeMap<K, V, S> {
    /// Entries bucket by bucket, chain order within a bucket.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            chain: <&[Entry<K, V>]>::default().iter(),
            remaining: self.len,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }
}

impl<K, V, S> fmt::Debug for AssociativeMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over the entries of an [`AssociativeMap`].
pub struct Iter<'a, K, V> {
    buckets: core::slice::Iter<'a, Vec<Entry<K, V>>>,
    chain: core::slice::Iter<'a, Entry<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.chain.next() {
                self.remaining -= 1;
                return Some((&e.key, &e.value));
            }
            self.chain = self.buckets.next()?.iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V, S> IntoIterator for &'a AssociativeMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
