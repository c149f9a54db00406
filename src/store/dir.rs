//! Directory-backed file store
//!
//! All names resolve relative to a root directory.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{FtpError, Result};
use super::FileStore;

/// File store rooted at a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a wire name to a path under the root.
    ///
    /// Absolute names and `..` components are refused so a peer cannot
    /// reach outside the root.
    fn resolve(&self, name: &str) -> Result<PathBuf> {
        let relative = Path::new(name);
        let mut components = relative.components().peekable();
        if components.peek().is_none() {
            return Err(FtpError::Storage("empty file name".to_string()));
        }
        for component in components {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    return Err(FtpError::Storage(format!(
                        "'{}' escapes the store root",
                        name
                    )))
                }
            }
        }
        Ok(self.root.join(relative))
    }

    fn map_io(name: &str, err: io::Error) -> FtpError {
        match err.kind() {
            io::ErrorKind::NotFound => FtpError::FileNotFound(name.to_string()),
            _ => FtpError::Storage(format!("{}: {}", name, err)),
        }
    }
}

impl FileStore for DirStore {
    fn exists(&self, name: &str) -> bool {
        self.resolve(name).map(|p| p.is_file()).unwrap_or(false)
    }

    fn size(&self, name: &str) -> Result<u32> {
        let path = self.resolve(name)?;
        let len = fs::metadata(&path).map_err(|e| Self::map_io(name, e))?.len();
        u32::try_from(len).map_err(|_| {
            FtpError::Encoding(format!("'{}' is {} bytes, larger than 4 GiB", name, len))
        })
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.resolve(name)?;
        if path.is_dir() {
            return Err(FtpError::FileNotFound(name.to_string()));
        }
        fs::read(&path).map_err(|e| Self::map_io(name, e))
    }

    fn write(&self, name: &str, data: &[u8]) -> Result<()> {
        let path = self.resolve(name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Self::map_io(name, e))?;
        }
        fs::write(&path, data).map_err(|e| Self::map_io(name, e))
    }

    fn rename(&self, old: &str, new: &str) -> Result<()> {
        let from = self.resolve(old)?;
        let to = self.resolve(new)?;
        if !from.is_file() {
            return Err(FtpError::FileNotFound(old.to_string()));
        }
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).map_err(|e| Self::map_io(new, e))?;
        }
        fs::rename(&from, &to).map_err(|e| Self::map_io(old, e))
    }
}
