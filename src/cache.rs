use std::cell::Cell;

use crate::utils::MyHash;

struct Entry<K, V> {
    key: K,
    value: V,
}

/// Direct-mapped computed table.
///
/// Each key maps to exactly one slot; a colliding insert simply overwrites
/// the previous entry. Full keys are stored, so a lookup never returns a
/// result computed for a different key.
pub struct Cache<K, V> {
    data: Vec<Option<Entry<K, V>>>,
    bitmask: u64,
    hits: Cell<usize>,
    misses: Cell<usize>,
}

impl<K, V> Cache<K, V> {
    /// Create a new cache of size `2^bits`.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Bits should be in the range 0..=31");

        let size = 1 << bits;
        let bitmask = (size - 1) as u64;

        Self {
            data: std::iter::repeat_with(|| None).take(size).collect(),
            bitmask,
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    /// Get the number of cache hits.
    pub fn hits(&self) -> usize {
        self.hits.get()
    }
    /// Get the number of cache misses.
    pub fn misses(&self) -> usize {
        self.misses.get()
    }

    /// Reset the cache.
    pub fn clear(&mut self) {
        self.data.fill_with(|| None);
    }

    fn index(&self, key: &K) -> usize
    where
        K: MyHash,
    {
        (key.hash() & self.bitmask) as usize
    }

    /// Get the cached result.
    pub fn get(&self, key: &K) -> Option<&V>
    where
        K: MyHash + Eq,
    {
        match &self.data[self.index(key)] {
            Some(entry) if &entry.key == key => {
                self.hits.set(self.hits.get() + 1);
                Some(&entry.value)
            }
            _ => {
                self.misses.set(self.misses.get() + 1);
                None
            }
        }
    }

    /// Insert a result into the cache.
    pub fn insert(&mut self, key: K, value: V)
    where
        K: MyHash,
    {
        let index = self.index(&key);
        self.data[index] = Some(Entry { key, value });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bdd::OpKey;
    use crate::reference::Ref;

    fn ite(f: u32, g: u32, h: u32) -> OpKey {
        OpKey::Ite(Ref::positive(f), Ref::positive(g), Ref::positive(h))
    }

    #[test]
    fn test_cache() {
        let mut cache = Cache::<OpKey, i32>::new(3);

        cache.insert(ite(1, 2, 3), 3);
        cache.insert(ite(2, 3, 1), 1);
        cache.insert(OpKey::Exists(Ref::positive(2), Ref::positive(3)), 2);

        assert_eq!(cache.get(&ite(1, 2, 3)), Some(&3));
        assert_eq!(cache.get(&ite(2, 3, 1)), Some(&1));
        assert_eq!(cache.get(&OpKey::Exists(Ref::positive(2), Ref::positive(3))), Some(&2));
        assert_eq!(cache.get(&ite(3, 2, 1)), None);
        assert_eq!(cache.get(&OpKey::Exists(Ref::positive(3), Ref::positive(2))), None);
        assert_eq!(cache.hits(), 3);
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn test_collision_overwrites() {
        // A single slot: every key collides.
        let mut cache = Cache::<OpKey, i32>::new(0);
        cache.insert(ite(1, 2, 3), 3);
        cache.insert(ite(5, 7, 9), 4);
        assert_eq!(cache.get(&ite(1, 2, 3)), None);
        assert_eq!(cache.get(&ite(5, 7, 9)), Some(&4));

        cache.clear();
        assert_eq!(cache.get(&ite(5, 7, 9)), None);
    }
}
