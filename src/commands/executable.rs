use crate::frame::Frame;
use crate::store::{Db, DbError, Store};
use crate::Error;

pub trait Executable {
    fn exec(self, session: &mut Session) -> Result<Frame, Error>;
}

/// What a command runs against: the shared store plus the database the connection selected.
#[derive(Debug, Clone)]
pub struct Session {
    store: Store,
    db: usize,
}

impl Session {
    pub fn new(store: Store) -> Session {
        Session { store, db: 0 }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn db_index(&self) -> usize {
        self.db
    }

    pub fn db(&self) -> &Db {
        // `select` only ever stores indexes the store has, and a store has at least one db.
        match self.store.db(self.db) {
            Some(db) => db,
            None => unreachable!("selected database {} does not exist", self.db),
        }
    }

    pub fn select(&mut self, index: usize) -> Result<(), DbError> {
        if index >= self.store.databases() {
            return Err(DbError::DbIndexOutOfRange);
        }
        self.db = index;
        Ok(())
    }
}
