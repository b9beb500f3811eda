//! File-system collaborator.
//!
//! Validation logic never touches `std::fs` directly; it reads artifacts and
//! writes manifests through [`traits::FileSystem`] so tests can run against
//! an in-memory tree.

pub mod real;
pub mod traits;

pub use real::RealFileSystem;
pub use traits::FileSystem;
