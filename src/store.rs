use bytes::Bytes;
use glob_match::glob_match;
use num_traits::CheckedAdd;
use std::ops::Deref;
use std::str::{self, FromStr};
use std::sync::Arc;
use thiserror::Error as ThisError;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::debug;

use crate::frame::{format_float, Frame};
use crate::structures::dict::Dict;
use crate::value::{now_ms, Data, Value};

pub const ACTIVE_EXPIRY_INTERVAL: Duration = Duration::from_millis(100);
// Keys sampled per database per round of active expiry.
const ACTIVE_EXPIRY_SAMPLES: usize = 20;
const ACTIVE_EXPIRY_MAX_ROUNDS: usize = 16;
// Attempts `random_key` makes before concluding only expired keys are left.
const RANDOM_KEY_ATTEMPTS: usize = 100;

/// Failures a command can hit while working on the keyspace. Each maps onto one error reply.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum DbError {
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,
    #[error("ERR value is not an integer or out of range")]
    NotInteger,
    #[error("ERR value is not a valid float")]
    NotFloat,
    #[error("ERR hash value is not an integer")]
    HashNotInteger,
    #[error("ERR increment or decrement would overflow")]
    Overflow,
    #[error("ERR increment would produce NaN or Infinity")]
    NotFinite,
    #[error("ERR resulting score is not a number (NaN)")]
    ScoreNaN,
    #[error("ERR index out of range")]
    IndexOutOfRange,
    #[error("ERR no such key")]
    NoSuchKey,
    #[error("ERR DB index is out of range")]
    DbIndexOutOfRange,
}

impl From<DbError> for Frame {
    fn from(err: DbError) -> Self {
        Frame::Error(err.to_string())
    }
}

/// Remaining lifetime of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    Missing,
    Persistent,
    /// Milliseconds left.
    ExpiresIn(u64),
}

/// Every logical database of the server. Cloning is cheap; clones share the same keyspaces.
#[derive(Clone, Debug)]
pub struct Store {
    inner: Arc<InnerStore>,
}

#[derive(Debug)]
pub struct InnerStore {
    dbs: Box<[Db]>,
}

impl Store {
    pub fn new(databases: usize) -> Store {
        let dbs = (0..databases.max(1)).map(|_| Db::new()).collect();
        Store {
            inner: Arc::new(InnerStore { dbs }),
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Store::new(16)
    }
}

impl Deref for Store {
    type Target = InnerStore;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl InnerStore {
    pub fn db(&self, index: usize) -> Option<&Db> {
        self.dbs.get(index)
    }

    pub fn databases(&self) -> usize {
        self.dbs.len()
    }

    pub fn flush_all(&self) {
        for db in self.dbs.iter() {
            db.flush();
        }
    }

    /// One pass of active expiry over every database. Returns the number of keys evicted.
    ///
    /// A database keeps being sampled while more than a quarter of its sample turned out to be
    /// expired, up to a fixed number of rounds.
    pub fn expire_cycle(&self) -> usize {
        let mut total = 0;
        for db in self.dbs.iter() {
            for _ in 0..ACTIVE_EXPIRY_MAX_ROUNDS {
                let expired = db.expire_sample(ACTIVE_EXPIRY_SAMPLES);
                total += expired;
                if expired * 4 <= ACTIVE_EXPIRY_SAMPLES {
                    break;
                }
            }
        }
        total
    }
}

/// Evicts expired keys in the background so keys nobody reads again still go away.
pub fn spawn_active_expiry(store: Store) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(ACTIVE_EXPIRY_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let removed = store.expire_cycle();
            if removed > 0 {
                debug!(removed, "Evicted expired keys");
            }
        }
    })
}

/// One keyspace. Expired values are invisible to every read and are dropped when met.
#[derive(Debug, Default)]
pub struct Db {
    keys: Dict<String, Arc<Value>>,
}

impl Db {
    pub fn new() -> Db {
        Db { keys: Dict::new() }
    }

    pub fn get(&self, key: &str) -> Option<Arc<Value>> {
        let value = self.keys.get(key)?;
        if value.is_expired(now_ms()) {
            self.keys
                .remove_if(key, |current| Arc::ptr_eq(current, &value));
            return None;
        }
        Some(value)
    }

    /// The subset of `keys` that exist, in request order.
    pub fn get_all(&self, keys: &[String]) -> Vec<(String, Arc<Value>)> {
        keys.iter()
            .filter_map(|key| self.get(key).map(|value| (key.clone(), value)))
            .collect()
    }

    pub fn set(&self, key: String, value: Value) {
        self.keys.put(key, Arc::new(value));
    }

    /// Stores `value` unless a live value is already there. Returns whether it was stored.
    pub fn set_if_absent(&self, key: &str, value: Value) -> bool {
        self.compute(key, |slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(Arc::new(value));
            true
        })
    }

    /// Removes `keys`, returning how many of them were live.
    pub fn delete(&self, keys: &[String]) -> usize {
        keys.iter().filter(|key| self.take(key).is_some()).count()
    }

    /// Removes `key` and hands back its value if it was live.
    pub fn take(&self, key: &str) -> Option<Arc<Value>> {
        self.keys
            .remove(key)
            .filter(|value| !value.is_expired(now_ms()))
    }

    pub fn exists(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of stored keys, including expired keys not evicted yet.
    pub fn size(&self) -> usize {
        self.keys.len()
    }

    pub fn flush(&self) {
        self.keys.clear();
    }

    /// Atomically reads and rewrites the value under `key`. An expired value is presented as
    /// absent; leaving the slot empty deletes the key.
    ///
    /// The key's segment is locked while `f` runs, so `f` must not call back into this `Db`.
    pub fn compute<R>(&self, key: &str, f: impl FnOnce(&mut Option<Arc<Value>>) -> R) -> R {
        let now = now_ms();
        self.keys.compute(key, |slot| {
            if slot.as_ref().is_some_and(|value| value.is_expired(now)) {
                *slot = None;
            }
            f(slot)
        })
    }

    /// `compute` over two distinct keys, both locked for the duration of `f`.
    pub fn compute_pair<R>(
        &self,
        first: &str,
        second: &str,
        f: impl FnOnce(&mut Option<Arc<Value>>, &mut Option<Arc<Value>>) -> R,
    ) -> R {
        let now = now_ms();
        self.keys.compute_pair(first, second, |first, second| {
            for slot in [&mut *first, &mut *second] {
                if slot.as_ref().is_some_and(|value| value.is_expired(now)) {
                    *slot = None;
                }
            }
            f(first, second)
        })
    }

    /// Live keys matching a glob `pattern`.
    pub fn keys(&self, pattern: &str) -> Vec<String> {
        let now = now_ms();
        let mut keys = vec![];
        self.keys.for_each(|key, value| {
            if !value.is_expired(now) && (pattern == "*" || glob_match(pattern, key)) {
                keys.push(key.clone());
            }
        });
        keys
    }

    pub fn random_key(&self) -> Option<String> {
        for _ in 0..RANDOM_KEY_ATTEMPTS {
            let key = self.keys.random_key()?;
            if self.get(&key).is_some() {
                return Some(key);
            }
        }
        None
    }

    /// Every live `(key, value)` pair, one segment at a time.
    pub fn snapshot(&self) -> Vec<(String, Arc<Value>)> {
        let now = now_ms();
        self.keys
            .snapshot()
            .into_iter()
            .filter(|(_, value)| !value.is_expired(now))
            .collect()
    }

    pub fn ttl(&self, key: &str) -> Ttl {
        match self.get(key) {
            None => Ttl::Missing,
            Some(value) => match value.expires_at() {
                None => Ttl::Persistent,
                Some(at) => Ttl::ExpiresIn(at.saturating_sub(now_ms())),
            },
        }
    }

    /// Sets the deadline of `key` to `at` unix milliseconds. A deadline already in the past
    /// deletes the key. Returns whether the key existed.
    pub fn expire_at(&self, key: &str, at: u64) -> bool {
        self.compute(key, |slot| {
            let Some(value) = slot.as_ref() else {
                return false;
            };
            if at <= now_ms() {
                *slot = None;
            } else {
                value.set_expires_at(Some(at));
            }
            true
        })
    }

    /// Clears the deadline of `key`. Returns whether there was one.
    pub fn persist(&self, key: &str) -> bool {
        self.compute(key, |slot| match slot.as_ref() {
            Some(value) if value.expires_at().is_some() => {
                value.set_expires_at(None);
                true
            }
            _ => false,
        })
    }

    /// Adds `delta` to the integer stored at `key`, starting from zero. The deadline is kept.
    pub fn incr_by<T>(&self, key: &str, delta: T) -> Result<T, DbError>
    where
        T: FromStr + ToString + CheckedAdd + Default,
    {
        self.compute(key, |slot| {
            let (current, expires_at) = match slot.as_ref() {
                Some(value) => {
                    let current = parse::<T>(value.as_string()?).ok_or(DbError::NotInteger)?;
                    (current, value.expires_at())
                }
                None => (T::default(), None),
            };

            let next = current.checked_add(&delta).ok_or(DbError::Overflow)?;
            let data = Data::String(Bytes::from(next.to_string()));
            *slot = Some(Arc::new(Value::with_expiry(data, expires_at)));
            Ok(next)
        })
    }

    /// Float flavor of `incr_by`. The result must stay finite.
    pub fn incr_by_float(&self, key: &str, delta: f64) -> Result<f64, DbError> {
        self.compute(key, |slot| {
            let (current, expires_at) = match slot.as_ref() {
                Some(value) => {
                    let current = parse::<f64>(value.as_string()?)
                        .filter(|current| current.is_finite())
                        .ok_or(DbError::NotFloat)?;
                    (current, value.expires_at())
                }
                None => (0.0, None),
            };

            let next = current + delta;
            if !next.is_finite() {
                return Err(DbError::NotFinite);
            }
            let data = Data::String(Bytes::from(format_float(next)));
            *slot = Some(Arc::new(Value::with_expiry(data, expires_at)));
            Ok(next)
        })
    }

    /// Samples random keys and evicts the expired ones. Returns how many were evicted.
    pub fn expire_sample(&self, samples: usize) -> usize {
        let now = now_ms();
        let mut expired = 0;
        for _ in 0..samples {
            let Some(key) = self.keys.random_key() else {
                break;
            };
            if self.keys.remove_if(&key, |value| value.is_expired(now)).is_some() {
                expired += 1;
            }
        }
        expired
    }
}

/// Parses a number out of a stored or received byte string.
pub fn parse<T: FromStr>(bytes: &[u8]) -> Option<T> {
    str::from_utf8(bytes).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expired(data: &'static str) -> Value {
        let value = Value::string(data);
        value.set_expires_at(Some(now_ms() - 1_000));
        value
    }

    #[test]
    fn expired_keys_are_invisible() {
        let db = Db::new();
        db.set("live".to_string(), Value::string("1"));
        db.set("dead".to_string(), expired("2"));

        assert!(db.exists("live"));
        assert!(!db.exists("dead"));
        assert_eq!(db.size(), 1, "lazy eviction removes the expired key on access");
        assert_eq!(db.keys("*"), vec!["live".to_string()]);
    }

    #[test]
    fn delete_counts_live_keys_only() {
        let db = Db::new();
        db.set("a".to_string(), Value::string("1"));
        db.set("b".to_string(), expired("2"));

        let removed = db.delete(&["a".to_string(), "b".to_string(), "c".to_string()]);

        assert_eq!(removed, 1);
        assert_eq!(db.size(), 0);
    }

    #[test]
    fn get_all_returns_existing_subset() {
        let db = Db::new();
        db.set("a".to_string(), Value::string("1"));
        db.set("c".to_string(), Value::string("3"));

        let found = db.get_all(&["a".to_string(), "b".to_string(), "c".to_string()]);

        let keys: Vec<_> = found.into_iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn set_if_absent_treats_expired_as_absent() {
        let db = Db::new();
        db.set("k".to_string(), expired("old"));

        assert!(db.set_if_absent("k", Value::string("new")));
        assert!(!db.set_if_absent("k", Value::string("newer")));
        assert_eq!(db.get("k").unwrap().as_string().unwrap(), &Bytes::from("new"));
    }

    #[test]
    fn ttl_and_persist() {
        let db = Db::new();
        db.set("k".to_string(), Value::string("v"));

        assert_eq!(db.ttl("missing"), Ttl::Missing);
        assert_eq!(db.ttl("k"), Ttl::Persistent);

        assert!(db.expire_at("k", now_ms() + 10_000));
        assert!(matches!(db.ttl("k"), Ttl::ExpiresIn(ms) if ms > 9_000 && ms <= 10_000));

        assert!(db.persist("k"));
        assert!(!db.persist("k"));
        assert_eq!(db.ttl("k"), Ttl::Persistent);

        assert!(db.expire_at("k", now_ms() - 1));
        assert_eq!(db.ttl("k"), Ttl::Missing);
        assert!(!db.expire_at("k", now_ms() + 1_000));
    }

    #[test]
    fn incr_by_keeps_deadline() {
        let db = Db::new();
        let at = now_ms() + 60_000;
        db.set("n".to_string(), Value::with_expiry(Data::String(Bytes::from("41")), Some(at)));

        assert_eq!(db.incr_by("n", 1i64), Ok(42));
        assert_eq!(db.get("n").unwrap().expires_at(), Some(at));
        assert_eq!(db.incr_by("fresh", -3i64), Ok(-3));
    }

    #[test]
    fn incr_by_errors() {
        let db = Db::new();
        db.set("s".to_string(), Value::string("abc"));
        db.set("max".to_string(), Value::string(i64::MAX.to_string()));
        db.set("l".to_string(), Value::list());

        assert_eq!(db.incr_by("s", 1i64), Err(DbError::NotInteger));
        assert_eq!(db.incr_by("max", 1i64), Err(DbError::Overflow));
        assert_eq!(db.incr_by("l", 1i64), Err(DbError::WrongType));
        assert_eq!(
            db.get("max").unwrap().as_string().unwrap(),
            &Bytes::from(i64::MAX.to_string())
        );
    }

    #[test]
    fn incr_by_float() {
        let db = Db::new();
        db.set("f".to_string(), Value::string("10.5"));

        assert_eq!(db.incr_by_float("f", 0.25), Ok(10.75));
        assert_eq!(db.get("f").unwrap().as_string().unwrap(), &Bytes::from("10.75"));
        assert_eq!(db.incr_by_float("f", f64::INFINITY), Err(DbError::NotFinite));

        db.set("s".to_string(), Value::string("nope"));
        assert_eq!(db.incr_by_float("s", 1.0), Err(DbError::NotFloat));
    }

    #[test]
    fn compute_deletes_when_slot_is_emptied() {
        let db = Db::new();
        db.set("k".to_string(), Value::string("v"));

        db.compute("k", |slot| *slot = None);

        assert!(!db.exists("k"));
    }

    #[test]
    fn expire_cycle_evicts_without_reads() {
        let store = Store::new(2);
        let db = store.db(1).unwrap();
        for i in 0..50 {
            db.set(format!("dead{i}"), expired("x"));
        }
        db.set("live".to_string(), Value::string("y"));

        let mut evicted = 0;
        for _ in 0..100 {
            evicted += store.expire_cycle();
            if db.size() == 1 {
                break;
            }
        }

        assert_eq!(evicted, 50);
        assert_eq!(db.size(), 1);
    }

    #[tokio::test]
    async fn active_expiry_task_runs_in_background() {
        tokio::time::pause();

        let store = Store::new(1);
        store.db(0).unwrap().set("dead".to_string(), expired("x"));

        let task = spawn_active_expiry(store.clone());
        tokio::time::sleep(ACTIVE_EXPIRY_INTERVAL * 3).await;

        assert_eq!(store.db(0).unwrap().size(), 0);
        task.abort();
    }

    #[test]
    fn flush_all_empties_every_db() {
        let store = Store::new(3);
        for index in 0..3 {
            store.db(index).unwrap().set("k".to_string(), Value::string("v"));
        }

        store.flush_all();

        assert!((0..3).all(|index| store.db(index).unwrap().size() == 0));
        assert!(store.db(3).is_none());
    }
}
