//! Persistence collaborator for the [Store](crate::store::Store).
//!
//! The store only needs a string-valued key-value slot:
//!  - `get` returns `None` when the key was never written or has been removed.
//!  - `set` fully overwrites the value, there are no partial updates.
//!  - `remove` deletes the key, removing a missing key is not an error.

pub mod file;
pub mod memory;

use std::ops::Deref;

use anyhow::Result;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Interface for abstracting where the serialized collection lives.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: Deref> KeyValueStorage for T
where
    T::Target: KeyValueStorage,
{
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.deref().get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.deref().set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.deref().remove(key)
    }
}
