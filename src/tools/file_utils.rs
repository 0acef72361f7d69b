//! File utilities module for sandbox path validation and file operations
//!
//! This module provides core utilities for safe file operations:
//! - Confinement of requested paths to the sandbox root
//! - Parent directory creation
//! - File size checking

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Error type for file utilities operations
#[derive(Error, Debug)]
pub enum FileUtilsError {
    /// Path resolves outside the sandbox root
    #[error("Path outside sandbox: {0}")]
    OutsideSandbox(String),

    /// Path cannot be interpreted
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// File size exceeds maximum allowed
    #[error("File size {0} bytes exceeds maximum {1} bytes")]
    FileTooLarge(u64, u64),

    /// Parent directory creation failed
    #[error("Parent directory creation failed: {0}")]
    ParentDirCreation(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Confines requested paths to a sandbox root
///
/// Requested paths are treated as rooted at the sandbox: leading `/` is
/// stripped before joining. Resolution happens in two stages:
///
/// 1. [`PathValidator::normalize`] is purely lexical and rejects any path
///    whose `..` components climb above the root. It never touches the
///    filesystem.
/// 2. [`PathValidator::confine`] canonicalizes the deepest existing ancestor
///    and rejects symlinks that lead out of the root.
///
/// # Examples
///
/// ```
/// use nexus::tools::file_utils::PathValidator;
/// use std::path::PathBuf;
///
/// let validator = PathValidator::new(PathBuf::from("/tmp/pentest_sandbox"));
/// assert_eq!(
///     validator.normalize("/scans/nmap.txt").unwrap(),
///     PathBuf::from("/tmp/pentest_sandbox/scans/nmap.txt")
/// );
/// assert!(validator.normalize("../../etc/passwd").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct PathValidator {
    root: PathBuf,
}

impl PathValidator {
    /// Creates a new path validator for `root`
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Returns a reference to the sandbox root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lexically resolves `requested` under the root
    ///
    /// # Errors
    ///
    /// Returns `FileUtilsError::OutsideSandbox` if the path climbs above the
    /// root, and `FileUtilsError::InvalidPath` if it contains a NUL byte.
    pub fn normalize(&self, requested: &str) -> Result<PathBuf, FileUtilsError> {
        if requested.contains('\0') {
            return Err(FileUtilsError::InvalidPath(
                "embedded null byte".to_string(),
            ));
        }

        let relative = requested.trim_start_matches('/');
        let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => parts.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    if parts.pop().is_none() {
                        return Err(FileUtilsError::OutsideSandbox(requested.to_string()));
                    }
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(FileUtilsError::OutsideSandbox(requested.to_string()));
                }
            }
        }

        let mut resolved = self.root.clone();
        resolved.extend(parts);
        Ok(resolved)
    }

    /// Rejects `candidate` if its deepest existing ancestor resolves outside
    /// the root
    ///
    /// Returns the canonical path when `candidate` exists, otherwise the
    /// candidate unchanged.
    ///
    /// # Errors
    ///
    /// Returns `FileUtilsError::OutsideSandbox` on a symlink escape and
    /// `FileUtilsError::Io` if canonicalization fails.
    pub fn confine(&self, candidate: &Path) -> Result<PathBuf, FileUtilsError> {
        let canonical_root = self
            .root
            .canonicalize()
            .unwrap_or_else(|_| self.root.clone());

        let existing = candidate
            .ancestors()
            .find(|p| p.symlink_metadata().is_ok())
            .unwrap_or(candidate);

        if existing.symlink_metadata().is_err() {
            return Ok(candidate.to_path_buf());
        }

        let canonical = existing.canonicalize()?;
        if !canonical.starts_with(&canonical_root) {
            return Err(FileUtilsError::OutsideSandbox(format!(
                "{} resolves to {}",
                candidate.display(),
                canonical.display()
            )));
        }

        if existing == candidate {
            Ok(canonical)
        } else {
            Ok(candidate.to_path_buf())
        }
    }

    /// Runs both resolution stages
    pub fn resolve(&self, requested: &str) -> Result<PathBuf, FileUtilsError> {
        let candidate = self.normalize(requested)?;
        self.confine(&candidate)
    }
}

/// Ensures parent directories exist for a given path
///
/// # Errors
///
/// Returns `FileUtilsError::ParentDirCreation` if directory creation fails
///
/// # Examples
///
/// ```
/// use nexus::tools::file_utils::ensure_parent_dirs;
///
/// # tokio_test::block_on(async {
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("nested/file.txt");
/// ensure_parent_dirs(&path).await.unwrap();
/// assert!(dir.path().join("nested").is_dir());
/// # });
/// ```
pub async fn ensure_parent_dirs(path: &Path) -> Result<(), FileUtilsError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                FileUtilsError::ParentDirCreation(format!(
                    "Failed to create parent directories for {:?}: {}",
                    path, e
                ))
            })?;
        }
    }
    Ok(())
}

/// Checks if a file's size exceeds the maximum allowed
///
/// # Errors
///
/// Returns `FileUtilsError::FileTooLarge` if file exceeds max_size
pub async fn check_file_size(path: &Path, max_size: u64) -> Result<u64, FileUtilsError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(FileUtilsError::Io)?;

    let file_size = metadata.len();
    if file_size > max_size {
        return Err(FileUtilsError::FileTooLarge(file_size, max_size));
    }

    Ok(file_size)
}
