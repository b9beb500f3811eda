use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::errors::{Error, Result};
use crate::io::FileSystem;

/// Thread-safe in-memory file tree.
///
/// Directories exist implicitly as prefixes of stored file paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: Arc<RwLock<BTreeMap<PathBuf, String>>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn with_files<P, C>(self, files: impl IntoIterator<Item = (P, C)>) -> Self
    where
        P: Into<PathBuf>,
        C: Into<String>,
    {
        for (path, content) in files {
            self.insert(path, content);
        }
        self
    }

    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), content.into());
    }

    pub fn remove(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path.as_ref())
    }

    /// Current content of a file, if present
    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path.as_ref())
            .cloned()
    }

    /// Every stored path, sorted
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.get(path).ok_or_else(|| Error::FileNotFound {
            path: path.to_path_buf(),
        })
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        self.insert(path, content);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .any(|p| p.starts_with(path))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.get(path).is_some()
    }

    fn list_dirs(&self, path: &Path) -> Result<Vec<String>> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        let dirs: BTreeSet<String> = files
            .keys()
            .filter_map(|p| p.strip_prefix(path).ok())
            .filter(|rest| rest.components().count() > 1)
            .filter_map(|rest| rest.components().next())
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Ok(dirs.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directories_are_implicit() {
        let fs = MemoryFileSystem::new()
            .with_file("/p/a/x.ts", "")
            .with_file("/p/b/c/y.ts", "")
            .with_file("/p/z.ts", "");

        assert_eq!(fs.list_dirs(Path::new("/p")).unwrap(), vec!["a", "b"]);
        assert!(fs.exists(Path::new("/p/b/c")));
        assert!(!fs.is_file(Path::new("/p/b")));
        assert!(fs.list_dirs(Path::new("/missing")).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let fs = MemoryFileSystem::new();
        let err = fs.read_to_string(Path::new("/nope.ts")).unwrap_err();
        assert!(err.is_file_not_found());
    }

    #[test]
    fn test_writes_are_visible_to_clones() {
        let fs = MemoryFileSystem::new();
        let clone = fs.clone();
        fs.write(Path::new("/out/m.json"), "{}").unwrap();
        assert_eq!(clone.get("/out/m.json").as_deref(), Some("{}"));
    }
}
