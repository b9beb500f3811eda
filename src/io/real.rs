//! Production implementation of [`FileSystem`].

use crate::errors::{Error, Result};
use crate::io::traits::FileSystem;
use std::fs;
use std::path::Path;

/// Production file system implementation.
///
/// Delegates directly to `std::fs`. It is stateless and can be shared across
/// validation threads.
#[derive(Debug, Default, Clone)]
pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| Error::from_io(path, e))
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::from_io(parent, e))?;
        }
        fs::write(path, content).map_err(|e| Error::from_io(path, e))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn list_dirs(&self, path: &Path) -> Result<Vec<String>> {
        if !path.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(path).map_err(|e| Error::from_io(path, e))? {
            let entry = entry.map_err(|e| Error::from_io(path, e))?;
            if entry.path().is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let fs = RealFileSystem::new();
        let target = dir.path().join("manifests/users/get.manifest.json");

        fs.write(&target, "{}").unwrap();

        assert!(fs.is_file(&target));
        assert_eq!(fs.read_to_string(&target).unwrap(), "{}");
    }

    #[test]
    fn test_missing_file_reports_not_found() {
        let dir = TempDir::new().unwrap();
        let fs = RealFileSystem::new();

        let err = fs.read_to_string(&dir.path().join("absent.ts")).unwrap_err();
        assert!(err.is_file_not_found());
    }

    #[test]
    fn test_list_dirs_sorted_and_ignores_files() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("users")).unwrap();
        std::fs::create_dir(dir.path().join("auth")).unwrap();
        std::fs::write(dir.path().join("README.md"), "x").unwrap();

        let fs = RealFileSystem::new();
        assert_eq!(fs.list_dirs(dir.path()).unwrap(), vec!["auth", "users"]);
        assert!(fs.list_dirs(&dir.path().join("nope")).unwrap().is_empty());
    }
}
