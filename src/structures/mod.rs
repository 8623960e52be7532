//! Data structures backing the collection value types.

pub mod dict;
pub mod list;
pub mod skiplist;
