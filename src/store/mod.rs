//! File Store Module
//!
//! The filesystem seen by the protocol layer.
//!
//! ## Responsibilities
//! - Read, write, rename and stat files by name
//! - Nothing else: name length limits are enforced by the protocol layer
//!   before a store is called
//!
//! Methods take `&self` so a store can be shared behind an `Arc`.

mod dir;
mod memory;

use std::sync::Arc;

use crate::error::Result;

pub use dir::DirStore;
pub use memory::MemoryStore;

/// Storage backend used by client and server sessions
pub trait FileStore {
    /// True if `name` refers to an existing file
    fn exists(&self, name: &str) -> bool;

    /// Size of the file in bytes
    fn size(&self, name: &str) -> Result<u32>;

    /// Whole contents of the file
    fn read(&self, name: &str) -> Result<Vec<u8>>;

    /// Create or replace the file
    fn write(&self, name: &str, data: &[u8]) -> Result<()>;

    /// Rename `old` to `new`
    fn rename(&self, old: &str, new: &str) -> Result<()>;
}

impl<S: FileStore + ?Sized> FileStore for Arc<S> {
    fn exists(&self, name: &str) -> bool {
        (**self).exists(name)
    }

    fn size(&self, name: &str) -> Result<u32> {
        (**self).size(name)
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        (**self).read(name)
    }

    fn write(&self, name: &str, data: &[u8]) -> Result<()> {
        (**self).write(name, data)
    }

    fn rename(&self, old: &str, new: &str) -> Result<()> {
        (**self).rename(old, new)
    }
}
