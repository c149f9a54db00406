//! In-memory file store

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::{FtpError, Result};
use super::FileStore;

/// File store kept entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of all stored files, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

impl FileStore for MemoryStore {
    fn exists(&self, name: &str) -> bool {
        self.files.read().contains_key(name)
    }

    fn size(&self, name: &str) -> Result<u32> {
        let files = self.files.read();
        let data = files
            .get(name)
            .ok_or_else(|| FtpError::FileNotFound(name.to_string()))?;
        u32::try_from(data.len()).map_err(|_| {
            FtpError::Encoding(format!("'{}' is larger than 4 GiB", name))
        })
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        self.files
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| FtpError::FileNotFound(name.to_string()))
    }

    fn write(&self, name: &str, data: &[u8]) -> Result<()> {
        self.files.write().insert(name.to_string(), data.to_vec());
        Ok(())
    }

    fn rename(&self, old: &str, new: &str) -> Result<()> {
        let mut files = self.files.write();
        let data = files
            .remove(old)
            .ok_or_else(|| FtpError::FileNotFound(old.to_string()))?;
        files.insert(new.to_string(), data);
        Ok(())
    }
}
