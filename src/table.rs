use std::cmp::min;
use std::ops::Index;

use log::debug;

use crate::utils::MyHash;

#[derive(Clone)]
struct Entry<T> {
    value: T,
    next: usize,
    occupied: bool,
}

impl<T> Entry<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            next: 0,
            occupied: false,
        }
    }
}

/// Hash-consing table with chained buckets.
///
/// Index `0` is a sentinel and never holds a value, so `0` doubles as the
/// "end of chain" marker. The table grows on demand: cells are appended when
/// no freed cell is available, and the bucket array doubles once the load
/// factor exceeds two.
pub struct Table<T> {
    data: Vec<Entry<T>>,

    buckets: Vec<usize>,
    bitmask: u64,

    /// Index of the first *possibly* free (non-occupied) cell.
    min_free: usize,
    /// Number of occupied cells.
    real_size: usize,
}

impl<T> Table<T>
where
    T: Default,
{
    /// Create a new table with initial capacity of `2^bits` cells.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Storage bits should be in the range 0..=31");

        let mut data = Vec::with_capacity(1 << bits);
        let mut sentinel = Entry::new(T::default());
        sentinel.occupied = true;
        data.push(sentinel);

        let buckets_size = 1 << min(bits, 16);

        Self {
            data,
            buckets: vec![0; buckets_size],
            bitmask: (buckets_size - 1) as u64,
            min_free: 1,
            real_size: 0,
        }
    }
}

impl<T> Table<T> {
    /// Get the number of allocated cells (including freed ones).
    pub fn size(&self) -> usize {
        self.data.len() - 1
    }
    /// Get the number of occupied cells.
    pub fn real_size(&self) -> usize {
        self.real_size
    }
    /// Get the number of buckets.
    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Get the reference to the value at the given index.
    pub fn value(&self, index: usize) -> &T {
        assert_ne!(index, 0, "Index is 0");
        &self.data[index].value
    }

    /// Check if the cell at the given index is occupied.
    pub fn is_occupied(&self, index: usize) -> bool {
        assert_ne!(index, 0, "Index is 0");
        self.data[index].occupied
    }
    /// Get the index of the next cell in the chain.
    pub fn next(&self, index: usize) -> usize {
        assert_ne!(index, 0, "Index is 0");
        self.data[index].next
    }
    fn set_next(&mut self, index: usize, next: usize) {
        assert_ne!(index, 0, "Index is 0");
        self.data[index].next = next;
    }

    /// Drop the value at the given index.
    fn drop(&mut self, index: usize) {
        assert_ne!(index, 0, "Index is 0");
        assert!(self.data[index].occupied, "Cell {} is not occupied", index);

        self.data[index].occupied = false;
        self.data[index].next = 0;
        self.min_free = min(self.min_free, index);
        self.real_size -= 1;
    }

    /// Add a new value outside of any bucket and return its index.
    pub fn add(&mut self, value: T) -> usize {
        let free = (self.min_free..self.data.len()).find(|&i| !self.data[i].occupied);
        let index = match free {
            Some(i) => {
                self.data[i] = Entry::new(value);
                i
            }
            None => {
                self.data.push(Entry::new(value));
                self.data.len() - 1
            }
        };

        self.data[index].occupied = true;
        self.min_free = index + 1;
        self.real_size += 1;

        index
    }

    /// Keep only the hashed cells for which `keep` returns `true`.
    ///
    /// Cells added with [`Table::add`] are not chained and are never dropped.
    /// Returns the number of dropped cells.
    pub fn retain(&mut self, mut keep: impl FnMut(usize) -> bool) -> usize {
        let mut dropped = 0;
        for b in 0..self.buckets.len() {
            let mut index = self.buckets[b];
            let mut prev = 0;
            while index != 0 {
                let next = self.next(index);
                if keep(index) {
                    if prev == 0 {
                        self.buckets[b] = index;
                    } else {
                        self.set_next(prev, index);
                    }
                    prev = index;
                } else {
                    self.drop(index);
                    dropped += 1;
                }
                index = next;
            }
            if prev == 0 {
                self.buckets[b] = 0;
            } else {
                self.set_next(prev, 0);
            }
        }
        dropped
    }
}

impl<T> Table<T>
where
    T: MyHash,
{
    fn bucket_index(&self, value: &T) -> usize {
        (value.hash() & self.bitmask) as usize
    }

    /// Put a value into the table and return its index.
    ///
    /// If an equal value is already present, its index is returned instead.
    pub fn put(&mut self, value: T) -> usize
    where
        T: Eq,
    {
        let bucket_index = self.bucket_index(&value);
        let mut index = self.buckets[bucket_index];

        while index != 0 {
            if &value == self.value(index) {
                return index;
            }
            index = self.next(index);
        }

        // Not found: create a new cell and prepend it to the bucket.
        let i = self.add(value);
        self.set_next(i, self.buckets[bucket_index]);
        self.buckets[bucket_index] = i;

        if self.real_size > 2 * self.buckets.len() {
            self.grow_buckets();
        }

        i
    }

    fn grow_buckets(&mut self) {
        let size = self.buckets.len() * 2;
        debug!("Growing buckets from {} to {}", self.buckets.len(), size);

        let old = std::mem::replace(&mut self.buckets, vec![0; size]);
        self.bitmask = (size - 1) as u64;

        for head in old {
            let mut index = head;
            while index != 0 {
                let next = self.next(index);
                let b = self.bucket_index(self.value(index));
                self.set_next(index, self.buckets[b]);
                self.buckets[b] = index;
                index = next;
            }
        }
    }
}

impl<T> Index<usize> for Table<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.value(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
    struct Item(i32);

    impl MyHash for Item {
        fn hash(&self) -> u64 {
            self.0.unsigned_abs() as u64
        }
    }

    #[test]
    fn test_add() {
        let mut table = Table::<Item>::new(2);
        assert_eq!(table.add(Item(1)), 1);
        assert_eq!(table.add(Item(2)), 2);
        assert_eq!(table[2], Item(2));
        assert_eq!(table.real_size(), 2);
    }

    #[test]
    fn test_grows_past_initial_capacity() {
        let mut table = Table::<Item>::new(1);
        for i in 0..100 {
            table.put(Item(i));
        }
        assert_eq!(table.real_size(), 100);
        assert!(table.num_buckets() > 2);
        for i in 0..100 {
            let index = table.put(Item(i));
            assert_eq!(table[index], Item(i));
        }
        assert_eq!(table.real_size(), 100);
    }

    #[test]
    fn test_put_dedup() {
        let mut table = Table::new(2);
        let index1 = table.put(Item(5));
        let index2 = table.put(Item(-5));
        assert_ne!(index1, index2);
        assert_eq!(table.put(Item(5)), index1);
        assert_eq!(table.put(Item(-5)), index2);
        assert_eq!(table[index1], Item(5));
        assert_eq!(table[index2], Item(-5));
    }

    #[test]
    fn test_retain() {
        let mut table = Table::new(2);
        let a = table.put(Item(1));
        let b = table.put(Item(5));
        let c = table.put(Item(9));

        let dropped = table.retain(|i| i != b);
        assert_eq!(dropped, 1);
        assert!(table.is_occupied(a));
        assert!(!table.is_occupied(b));
        assert!(table.is_occupied(c));

        // Lookups still resolve, and the freed cell is reused.
        assert_eq!(table.put(Item(1)), a);
        assert_eq!(table.put(Item(9)), c);
        assert_eq!(table.put(Item(13)), b);
    }

    #[test]
    fn test_retain_keeps_unchained() {
        let mut table = Table::new(2);
        let t = table.add(Item(0));
        table.put(Item(3));
        table.retain(|_| false);
        assert!(table.is_occupied(t));
        assert_eq!(table.real_size(), 1);
    }
}
