//! Module implementing a thread-safe resource cache.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use antidote::Mutex;


/// A thread-safe cache of keys & cached values.
/// Actual values stored in the cache are `Arc<V>`s.
///
/// Nothing is ever evicted, so this is only suitable for small, fixed sets
/// of keys (like font families). The cache counts hits and misses.
pub struct ThreadSafeCache<K, V>
    where K: Eq + Hash
{
    inner: Mutex<HashMap<K, Arc<V>>>,
    // Cache statistics.
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<K: Eq + Hash, V> ThreadSafeCache<K, V> {
    #[inline]
    pub fn new() -> Self {
        ThreadSafeCache{
            inner: Mutex::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }
}

impl<K: Eq + Hash, V> Default for ThreadSafeCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V> ThreadSafeCache<K, V> {
    /// Get the element corresponding to given key if it's present in the cache.
    pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
        where K: Borrow<Q>, Q: ?Sized + Eq + Hash
    {
        match self.inner.lock().get(key) {
            Some(v) => { self.hit(); Some(v.clone()) }
            None => { self.miss(); None }
        }
    }

    /// Put an item into cache under given key.
    ///
    /// Returns the (`Arc`'d) value that's now cached under the key.
    pub fn put(&self, k: K, v: V) -> Arc<V> {
        let value = Arc::new(v);
        self.inner.lock().insert(k, value.clone());
        value
    }

    /// Check if the cache contains given key.
    /// This doesn't count as either hit or miss.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
        where K: Borrow<Q>, Q: ?Sized + Eq + Hash
    {
        self.inner.lock().contains_key(key)
    }

    /// Current size of the cache.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Remove all elements from the cache.
    pub fn clear(&self) {
        self.inner.lock().clear()
    }
}

// Statistics.
impl<K: Eq + Hash, V> ThreadSafeCache<K, V> {
    /// Returns the number of cache hits.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    /// Returns the number of cache misses.
    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }
}

impl<K: Eq + Hash, V> fmt::Debug for ThreadSafeCache<K, V> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("ThreadSafeCache")
            .field("len", &self.len())
            .field("hits", &self.hits())
            .field("misses", &self.misses())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use spectral::prelude::*;
    use super::ThreadSafeCache;

    #[test]
    fn counts_hits_and_misses() {
        let cache = ThreadSafeCache::<String, u32>::new();
        assert_that!(cache.get("foo")).is_none();
        cache.put("foo".into(), 42);
        assert_that!(cache.get("foo").map(|v| *v)).is_equal_to(Some(42));
        assert_that!(cache.get("foo").map(|v| *v)).is_equal_to(Some(42));
        assert_that!(cache.get("bar")).is_none();

        assert_that!(cache.hits()).is_equal_to(2);
        assert_that!(cache.misses()).is_equal_to(2);
        assert_that!(cache.len()).is_equal_to(1);
    }

    #[test]
    fn contains_key_is_not_counted() {
        let cache = ThreadSafeCache::<u8, ()>::new();
        assert!(!cache.contains_key(&1));
        cache.put(1, ());
        assert!(cache.contains_key(&1));
        assert_that!(cache.hits() + cache.misses()).is_equal_to(0);
    }
}
