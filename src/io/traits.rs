//! I/O trait definitions for validation runs.
//!
//! # Example
//!
//! ```rust,ignore
//! use fluxcheck::io::FileSystem;
//!
//! fn read_contract<F: FileSystem + ?Sized>(fs: &F, path: &Path) -> Result<String> {
//!     fs.read_to_string(path)
//! }
//! ```

use crate::errors::Result;
use std::path::Path;

/// File system operations trait.
///
/// Implementations must be thread-safe (`Send + Sync`) because endpoint
/// validation may fan out across rayon worker threads.
pub trait FileSystem: Send + Sync {
    /// Read a file's contents as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns `Error::FileNotFound` when the file does not exist and
    /// `Error::Io` for every other failure. The two are never conflated.
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Write content to a file, creating parent directories as needed.
    fn write(&self, path: &Path, content: &str) -> Result<()>;

    /// Check if a path exists (file or directory).
    fn exists(&self, path: &Path) -> bool;

    /// Check if a path is a file.
    fn is_file(&self, path: &Path) -> bool;

    /// Names of the immediate child directories of `path`, sorted.
    ///
    /// A missing directory yields an empty list.
    fn list_dirs(&self, path: &Path) -> Result<Vec<String>>;
}
