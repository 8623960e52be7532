//! Concurrent hash table split into independently locked segments.
//!
//! A key is hashed once. The low bits of the hash pick the segment, the remaining bits pick the
//! bucket inside that segment's table, so keys that share a segment still spread over all of its
//! buckets. Writers take the segment's write lock; readers share its read lock, so any number of
//! lookups run alongside each other and alongside writers on other segments. A segment doubles
//! its table once it holds more than `capacity * LOAD_FACTOR` entries, touching no other segment.

use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};
use std::mem;

use ahash::RandomState;
use parking_lot::RwLock;
use rand::Rng;

pub const DEFAULT_SEGMENTS: usize = 16;
const INITIAL_BUCKETS: usize = 4;
const LOAD_FACTOR: f64 = 0.75;
// Random bucket probes per segment before `random_key` falls back to a scan.
const RANDOM_PROBES: usize = 8;

type Link<K, V> = Option<Box<Entry<K, V>>>;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
    next: Link<K, V>,
}

#[derive(Debug)]
struct Segment<K, V> {
    buckets: Vec<Link<K, V>>,
    count: usize,
}

impl<K, V> Segment<K, V> {
    fn new() -> Self {
        Segment {
            buckets: Vec::new(),
            count: 0,
        }
    }

    fn bucket_index(&self, hash: u64, shift: u32) -> usize {
        (hash >> shift) as usize & (self.buckets.len() - 1)
    }

    fn find<Q>(&self, hash: u64, shift: u32, key: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        if self.buckets.is_empty() {
            return None;
        }
        let mut cursor = self.buckets[self.bucket_index(hash, shift)].as_deref();
        while let Some(entry) = cursor {
            if entry.hash == hash && entry.key.borrow() == key {
                return Some(entry);
            }
            cursor = entry.next.as_deref();
        }
        None
    }

    fn find_mut<Q>(&mut self, hash: u64, shift: u32, key: &Q) -> Option<&mut Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        if self.buckets.is_empty() {
            return None;
        }
        let index = self.bucket_index(hash, shift);
        let mut cursor = self.buckets[index].as_deref_mut();
        while let Some(entry) = cursor {
            if entry.hash == hash && entry.key.borrow() == key {
                return Some(entry);
            }
            cursor = entry.next.as_deref_mut();
        }
        None
    }

    /// Detaches the entry for `key` from its chain.
    fn unlink<Q>(&mut self, hash: u64, shift: u32, key: &Q) -> Option<Box<Entry<K, V>>>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        if self.buckets.is_empty() {
            return None;
        }
        let index = self.bucket_index(hash, shift);
        let mut link = &mut self.buckets[index];
        loop {
            let found = match link {
                None => return None,
                Some(entry) => entry.hash == hash && entry.key.borrow() == key,
            };
            if found {
                let mut entry = link.take()?;
                *link = entry.next.take();
                self.count -= 1;
                return Some(entry);
            }
            link = &mut link.as_mut()?.next;
        }
    }

    /// Prepends a new entry. The caller guarantees the key is not present.
    fn push(&mut self, mut entry: Box<Entry<K, V>>, shift: u32) {
        if self.buckets.is_empty() {
            self.buckets.resize_with(INITIAL_BUCKETS, || None);
        }
        let index = self.bucket_index(entry.hash, shift);
        entry.next = self.buckets[index].take();
        self.buckets[index] = Some(entry);
        self.count += 1;

        if self.count as f64 > self.buckets.len() as f64 * LOAD_FACTOR {
            self.grow(shift);
        }
    }

    /// Detaches `key` for a read-modify-write, handing back the owned key to reinsert it under.
    fn take_slot<Q>(&mut self, hash: u64, shift: u32, key: &Q) -> (K, Option<V>)
    where
        K: Borrow<Q>,
        Q: Eq + ToOwned<Owned = K> + ?Sized,
    {
        match self.unlink(hash, shift, key) {
            Some(entry) => (entry.key, Some(entry.value)),
            None => (key.to_owned(), None),
        }
    }

    fn restore_slot(&mut self, key: K, hash: u64, shift: u32, slot: Option<V>) {
        if let Some(value) = slot {
            let entry = Box::new(Entry {
                key,
                value,
                hash,
                next: None,
            });
            self.push(entry, shift);
        }
    }

    fn grow(&mut self, shift: u32) {
        let size = self.buckets.len() * 2;
        let old = mem::replace(&mut self.buckets, Vec::with_capacity(size));
        self.buckets.resize_with(size, || None);

        for mut link in old {
            while let Some(mut entry) = link {
                link = entry.next.take();
                let index = self.bucket_index(entry.hash, shift);
                entry.next = self.buckets[index].take();
                self.buckets[index] = Some(entry);
            }
        }
    }

    fn entries(&self) -> impl Iterator<Item = &Entry<K, V>> {
        self.buckets.iter().flat_map(|bucket| {
            let mut cursor = bucket.as_deref();
            std::iter::from_fn(move || {
                let entry = cursor?;
                cursor = entry.next.as_deref();
                Some(entry)
            })
        })
    }
}

impl<K, V> Drop for Segment<K, V> {
    // Chains are dropped iteratively so a long chain cannot overflow the stack.
    fn drop(&mut self) {
        for bucket in self.buckets.iter_mut() {
            let mut link = bucket.take();
            while let Some(mut entry) = link {
                link = entry.next.take();
            }
        }
    }
}

pub struct Dict<K, V> {
    segments: Box<[RwLock<Segment<K, V>>]>,
    hasher: RandomState,
    // Number of hash bits consumed by segment selection.
    shift: u32,
}

impl<K, V> Dict<K, V>
where
    K: Hash + Eq,
{
    pub fn new() -> Self {
        Dict::with_segments(DEFAULT_SEGMENTS)
    }

    /// Creates a dictionary with `segments` locks, rounded up to a power of two.
    pub fn with_segments(segments: usize) -> Self {
        let segments = segments.max(1).next_power_of_two();
        Dict {
            segments: (0..segments).map(|_| RwLock::new(Segment::new())).collect(),
            hasher: RandomState::new(),
            shift: segments.trailing_zeros(),
        }
    }

    fn hash<Q: Hash + ?Sized>(&self, key: &Q) -> u64 {
        self.hasher.hash_one(key)
    }

    fn index(&self, hash: u64) -> usize {
        hash as usize & (self.segments.len() - 1)
    }

    fn segment(&self, hash: u64) -> &RwLock<Segment<K, V>> {
        &self.segments[self.index(hash)]
    }

    /// Returns a copy of the value stored under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.get_with(key, V::clone)
    }

    /// Runs `f` against the value stored under `key` while the segment is read-locked.
    pub fn get_with<Q, R>(&self, key: &Q, f: impl FnOnce(&V) -> R) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash(key);
        let segment = self.segment(hash).read();
        segment.find(hash, self.shift, key).map(|entry| f(&entry.value))
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_with(key, |_| ()).is_some()
    }

    /// Inserts or overwrites `key`, returning the previous value.
    pub fn put(&self, key: K, value: V) -> Option<V> {
        let hash = self.hash(&key);
        let mut segment = self.segment(hash).write();

        if let Some(entry) = segment.find_mut(hash, self.shift, &key) {
            return Some(mem::replace(&mut entry.value, value));
        }

        let entry = Box::new(Entry {
            key,
            value,
            hash,
            next: None,
        });
        segment.push(entry, self.shift);
        None
    }

    /// Inserts `key` only if it is absent. Returns whether the insert happened.
    pub fn put_if_absent(&self, key: K, value: V) -> bool {
        let hash = self.hash(&key);
        let mut segment = self.segment(hash).write();

        if segment.find(hash, self.shift, &key).is_some() {
            return false;
        }

        let entry = Box::new(Entry {
            key,
            value,
            hash,
            next: None,
        });
        segment.push(entry, self.shift);
        true
    }

    /// Overwrites `key` only if it is present, returning the previous value.
    pub fn replace<Q>(&self, key: &Q, value: V) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash(key);
        let mut segment = self.segment(hash).write();
        segment
            .find_mut(hash, self.shift, key)
            .map(|entry| mem::replace(&mut entry.value, value))
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_if(key, |_| true)
    }

    /// Removes `key` if `predicate` accepts its current value.
    pub fn remove_if<Q>(&self, key: &Q, predicate: impl FnOnce(&V) -> bool) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash(key);
        let mut segment = self.segment(hash).write();

        let matches = segment
            .find(hash, self.shift, key)
            .is_some_and(|entry| predicate(&entry.value));
        if !matches {
            return None;
        }

        segment
            .unlink(hash, self.shift, key)
            .map(|entry| entry.value)
    }

    /// Atomically reads and rewrites the slot for `key`.
    ///
    /// `f` sees `Some(value)` when the key is present and `None` otherwise. Whatever the slot
    /// holds when `f` returns is stored back: leaving `None` removes the key. The segment stays
    /// write-locked for the duration of `f`, so `f` must not touch the same dictionary.
    pub fn compute<Q, R>(&self, key: &Q, f: impl FnOnce(&mut Option<V>) -> R) -> R
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        let hash = self.hash(key);
        let mut segment = self.segment(hash).write();

        let (owned, mut slot) = segment.take_slot(hash, self.shift, key);
        let result = f(&mut slot);
        segment.restore_slot(owned, hash, self.shift, slot);
        result
    }

    /// `compute` over two distinct keys at once.
    ///
    /// Both segments are write-locked, lower index first, so the pair is seen as one update by
    /// every other operation. Keys sharing a segment take its lock once.
    pub fn compute_pair<Q, R>(
        &self,
        first: &Q,
        second: &Q,
        f: impl FnOnce(&mut Option<V>, &mut Option<V>) -> R,
    ) -> R
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        debug_assert!(first != second, "compute_pair needs two distinct keys");

        let (first_hash, second_hash) = (self.hash(first), self.hash(second));
        let (first_index, second_index) = (self.index(first_hash), self.index(second_hash));

        if first_index == second_index {
            let mut segment = self.segments[first_index].write();
            let (first_key, mut first_slot) = segment.take_slot(first_hash, self.shift, first);
            let (second_key, mut second_slot) = segment.take_slot(second_hash, self.shift, second);
            let result = f(&mut first_slot, &mut second_slot);
            segment.restore_slot(first_key, first_hash, self.shift, first_slot);
            segment.restore_slot(second_key, second_hash, self.shift, second_slot);
            return result;
        }

        let mut low = self.segments[first_index.min(second_index)].write();
        let mut high = self.segments[first_index.max(second_index)].write();
        let (first_segment, second_segment) = if first_index < second_index {
            (&mut *low, &mut *high)
        } else {
            (&mut *high, &mut *low)
        };

        let (first_key, mut first_slot) = first_segment.take_slot(first_hash, self.shift, first);
        let (second_key, mut second_slot) =
            second_segment.take_slot(second_hash, self.shift, second);
        let result = f(&mut first_slot, &mut second_slot);
        first_segment.restore_slot(first_key, first_hash, self.shift, first_slot);
        second_segment.restore_slot(second_key, second_hash, self.shift, second_slot);
        result
    }

    /// Any key currently stored, or `None` when the dictionary is empty.
    pub fn random_key(&self) -> Option<K>
    where
        K: Clone,
    {
        let mut rng = rand::thread_rng();
        let start = rng.gen_range(0..self.segments.len());

        for i in 0..self.segments.len() {
            let segment = self.segments[(start + i) % self.segments.len()].read();
            if segment.count == 0 {
                continue;
            }

            for _ in 0..RANDOM_PROBES {
                let bucket = rng.gen_range(0..segment.buckets.len());
                if let Some(key) = random_in_chain(&segment.buckets[bucket], &mut rng) {
                    return Some(key);
                }
            }

            let offset = rng.gen_range(0..segment.buckets.len());
            for j in 0..segment.buckets.len() {
                let bucket = (offset + j) % segment.buckets.len();
                if let Some(key) = random_in_chain(&segment.buckets[bucket], &mut rng) {
                    return Some(key);
                }
            }
        }
        None
    }

    /// Total number of entries. Segments are visited one at a time, so under concurrent writes
    /// the sum may not correspond to any single instant.
    pub fn len(&self) -> usize {
        self.segments.iter().map(|segment| segment.read().count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|segment| segment.read().count == 0)
    }

    pub fn clear(&self) {
        for segment in self.segments.iter() {
            let old = mem::replace(&mut *segment.write(), Segment::new());
            drop(old);
        }
    }

    /// Calls `f` for every entry, one segment at a time under its read lock.
    pub fn for_each(&self, mut f: impl FnMut(&K, &V)) {
        for segment in self.segments.iter() {
            let segment = segment.read();
            for entry in segment.entries() {
                f(&entry.key, &entry.value);
            }
        }
    }

    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        let mut keys = Vec::new();
        self.for_each(|key, _| keys.push(key.clone()));
        keys
    }

    /// Copies every entry out of the dictionary.
    pub fn snapshot(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        let mut entries = Vec::new();
        self.for_each(|key, value| entries.push((key.clone(), value.clone())));
        entries
    }
}

fn random_in_chain<K: Clone, V>(link: &Link<K, V>, rng: &mut impl Rng) -> Option<K> {
    let mut len = 0;
    let mut cursor = link.as_deref();
    while let Some(entry) = cursor {
        len += 1;
        cursor = entry.next.as_deref();
    }
    if len == 0 {
        return None;
    }

    let mut cursor = link.as_deref();
    for _ in 0..rng.gen_range(0..len) {
        cursor = cursor?.next.as_deref();
    }
    cursor.map(|entry| entry.key.clone())
}

impl<K: Hash + Eq, V> Default for Dict<K, V> {
    fn default() -> Self {
        Dict::new()
    }
}

impl<K: Hash + Eq + std::fmt::Debug, V: std::fmt::Debug> std::fmt::Debug for Dict<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for segment in self.segments.iter() {
            let segment = segment.read();
            for entry in segment.entries() {
                map.entry(&entry.key, &entry.value);
            }
        }
        map.finish()
    }
}
