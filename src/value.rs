use ahash::AHashMap;
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::store::DbError;
use crate::structures::dict::Dict;
use crate::structures::list::LinkedList;
use crate::structures::skiplist::{RangeSpec, SkipList};

// Strings up to this length would be stored inline by Redis ("embstr").
const EMBSTR_SIZE_LIMIT: usize = 44;
const NO_EXPIRY: u64 = 0;

/// Milliseconds since the unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ValueType {
    String,
    List,
    Hash,
    Set,
    #[strum(serialize = "zset")]
    SortedSet,
}

#[derive(Debug)]
pub enum Data {
    String(Bytes),
    List(Mutex<LinkedList>),
    Hash(Dict<String, Bytes>),
    Set(Dict<String, ()>),
    SortedSet(Mutex<SortedSet>),
}

/// Anything stored under a key, together with its optional deadline.
///
/// Strings are immutable once stored; commands that rewrite them store a new `Value`.
/// Collections are mutated in place through their own locks.
#[derive(Debug)]
pub struct Value {
    data: Data,
    // Unix milliseconds, `NO_EXPIRY` when the key is persistent.
    expires_at: AtomicU64,
}

impl Value {
    pub fn new(data: Data) -> Value {
        Value {
            data,
            expires_at: AtomicU64::new(NO_EXPIRY),
        }
    }

    pub fn with_expiry(data: Data, expires_at: Option<u64>) -> Value {
        let value = Value::new(data);
        value.set_expires_at(expires_at);
        value
    }

    pub fn string(bytes: impl Into<Bytes>) -> Value {
        Value::new(Data::String(bytes.into()))
    }

    pub fn list() -> Value {
        Value::new(Data::List(Mutex::new(LinkedList::new())))
    }

    pub fn hash() -> Value {
        Value::new(Data::Hash(Dict::new()))
    }

    pub fn set() -> Value {
        Value::new(Data::Set(Dict::new()))
    }

    pub fn sorted_set() -> Value {
        Value::new(Data::SortedSet(Mutex::new(SortedSet::default())))
    }

    pub fn value_type(&self) -> ValueType {
        match self.data {
            Data::String(_) => ValueType::String,
            Data::List(_) => ValueType::List,
            Data::Hash(_) => ValueType::Hash,
            Data::Set(_) => ValueType::Set,
            Data::SortedSet(_) => ValueType::SortedSet,
        }
    }

    /// Name of the representation Redis would report for this value. Informational only.
    pub fn encoding(&self) -> &'static str {
        match &self.data {
            Data::String(bytes) => {
                let is_int = std::str::from_utf8(bytes)
                    .ok()
                    .and_then(|s| s.parse::<i64>().ok())
                    .is_some();
                if is_int {
                    "int"
                } else if bytes.len() <= EMBSTR_SIZE_LIMIT {
                    "embstr"
                } else {
                    "raw"
                }
            }
            Data::List(_) => "linkedlist",
            Data::Hash(_) | Data::Set(_) => "hashtable",
            Data::SortedSet(_) => "skiplist",
        }
    }

    pub fn expires_at(&self) -> Option<u64> {
        match self.expires_at.load(Ordering::Acquire) {
            NO_EXPIRY => None,
            at => Some(at),
        }
    }

    pub fn set_expires_at(&self, expires_at: Option<u64>) {
        // A deadline of exactly 0 would read back as "persistent".
        let raw = expires_at.map_or(NO_EXPIRY, |at| at.max(1));
        self.expires_at.store(raw, Ordering::Release);
    }

    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at().is_some_and(|at| at <= now)
    }

    pub fn as_string(&self) -> Result<&Bytes, DbError> {
        match &self.data {
            Data::String(bytes) => Ok(bytes),
            _ => Err(DbError::WrongType),
        }
    }

    pub fn as_list(&self) -> Result<&Mutex<LinkedList>, DbError> {
        match &self.data {
            Data::List(list) => Ok(list),
            _ => Err(DbError::WrongType),
        }
    }

    pub fn as_hash(&self) -> Result<&Dict<String, Bytes>, DbError> {
        match &self.data {
            Data::Hash(hash) => Ok(hash),
            _ => Err(DbError::WrongType),
        }
    }

    pub fn as_set(&self) -> Result<&Dict<String, ()>, DbError> {
        match &self.data {
            Data::Set(set) => Ok(set),
            _ => Err(DbError::WrongType),
        }
    }

    pub fn as_sorted_set(&self) -> Result<&Mutex<SortedSet>, DbError> {
        match &self.data {
            Data::SortedSet(zset) => Ok(zset),
            _ => Err(DbError::WrongType),
        }
    }
}

/// Members with scores, indexed both by member and by `(score, member)` order.
#[derive(Debug, Default)]
pub struct SortedSet {
    scores: AHashMap<String, f64>,
    index: SkipList,
}

impl SortedSet {
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn score(&self, member: &str) -> Option<f64> {
        self.scores.get(member).copied()
    }

    /// Adds `member` or moves it to `score`. Returns whether the member is new.
    pub fn insert(&mut self, member: &str, score: f64) -> bool {
        match self.scores.get_mut(member) {
            Some(current) => {
                if *current != score {
                    self.index.delete(member, *current);
                    self.index.insert(member.to_string(), score);
                    *current = score;
                }
                false
            }
            None => {
                self.index.insert(member.to_string(), score);
                self.scores.insert(member.to_string(), score);
                true
            }
        }
    }

    /// Adds `delta` to the member's score, creating it at `delta`. `None` if the result is NaN.
    pub fn incr(&mut self, member: &str, delta: f64) -> Option<f64> {
        let score = self.score(member).unwrap_or(0.0) + delta;
        if score.is_nan() {
            return None;
        }
        self.insert(member, score);
        Some(score)
    }

    pub fn remove(&mut self, member: &str) -> bool {
        match self.scores.remove(member) {
            Some(score) => self.index.delete(member, score),
            None => false,
        }
    }

    /// 0-based position of `member`, counted from the highest score when `reverse`.
    pub fn rank(&self, member: &str, reverse: bool) -> Option<usize> {
        let score = self.score(member)?;
        let rank = self.index.rank(member, score)?;
        Some(if reverse { self.len() - rank } else { rank - 1 })
    }

    /// Elements at 0-based positions `start..=stop`, which must already be clamped to the set.
    pub fn range_by_rank(&self, start: usize, stop: usize, reverse: bool) -> Vec<(String, f64)> {
        if start > stop || stop >= self.len() {
            return vec![];
        }
        let take = stop - start + 1;
        let collect = |(member, score): (&str, f64)| (member.to_string(), score);

        if reverse {
            let first = self.index.get_by_rank(self.len() - start);
            self.index.iter_back_from(first).take(take).map(collect).collect()
        } else {
            let first = self.index.get_by_rank(start + 1);
            self.index.iter_from(first).take(take).map(collect).collect()
        }
    }

    pub fn range_by_score(&self, range: &RangeSpec) -> Vec<(String, f64)> {
        let first = self.index.first_in_range(range);
        self.index
            .iter_from(first)
            .take_while(|(_, score)| range.lte_max(*score))
            .map(|(member, score)| (member.to_string(), score))
            .collect()
    }

    pub fn count(&self, range: &RangeSpec) -> usize {
        let (Some(first), Some(last)) = (
            self.index.first_in_range(range),
            self.index.last_in_range(range),
        ) else {
            return 0;
        };
        let rank_of = |id| self.index.rank(self.index.member(id), self.index.score(id));
        match (rank_of(first), rank_of(last)) {
            (Some(first), Some(last)) if last >= first => last - first + 1,
            _ => 0,
        }
    }

    pub fn remove_range_by_score(&mut self, range: &RangeSpec) -> usize {
        let removed = self.index.delete_range_by_score(range);
        for (member, _) in &removed {
            self.scores.remove(member);
        }
        removed.len()
    }

    /// Removes 0-based positions `start..=stop`.
    pub fn remove_range_by_rank(&mut self, start: usize, stop: usize) -> usize {
        let removed = self.index.delete_range_by_rank(start + 1, stop + 1);
        for (member, _) in &removed {
            self.scores.remove(member);
        }
        removed.len()
    }
}

/// Resolves Redis-style `start`/`stop` indexes (negative counts from the end) against a
/// collection of `len` elements. `None` when the range selects nothing.
pub fn normalize_range(start: i64, stop: i64, len: usize) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

    if start > stop || start >= len || stop < 0 {
        return None;
    }
    Some((start as usize, stop as usize))
}
