//! Sandboxed virtual filesystem
//!
//! Requests name paths relative to the sandbox root. Every outcome, including
//! a rejected path, is reported in-band as a [`FileOperationResult`]; only
//! sandbox initialization returns a Rust error.

use crate::error::{NexusError, Result};
use crate::tools::file_utils::{check_file_size, ensure_parent_dirs, FileUtilsError, PathValidator};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Message returned for any path that leaves the sandbox
pub const ACCESS_DENIED: &str = "Access denied: Path outside sandbox";

/// Largest file `read` will return
pub const MAX_READ_BYTES: u64 = 10 * 1024 * 1024;

/// Subdirectories created by [`Sandbox::init`]
const SANDBOX_DIRS: [&str; 4] = ["scans", "results", "scripts", "wordlists"];

/// Sample files created by [`Sandbox::init`]
const SANDBOX_SAMPLES: [(&str, &str); 4] = [
    (
        "scans/nmap_results.txt",
        "# Nmap scan results\n# Run scans to populate",
    ),
    (
        "scripts/recon.sh",
        "#!/bin/bash\n# Reconnaissance script\necho 'Starting recon...'",
    ),
    ("wordlists/common.txt", "admin\npassword\n123456\nroot\ntest"),
    (
        "README.txt",
        "NEXUS Pentest Sandbox\n===================\nStore your scan results and scripts here.",
    ),
];

/// A file operation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOperation {
    /// One of `read`, `write`, `list`, `delete`, `execute`
    pub operation: String,
    /// Path relative to the sandbox root
    pub path: String,
    /// Content for `write`
    #[serde(default)]
    pub content: Option<String>,
}

impl FileOperation {
    /// Builds a request without content
    pub fn new(operation: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            path: path.into(),
            content: None,
        }
    }

    /// Attaches content, for `write`
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// Supported file operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperationKind {
    Read,
    Write,
    List,
    Delete,
    Execute,
}

impl FromStr for FileOperationKind {
    type Err = NexusError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "list" => Ok(Self::List),
            "delete" => Ok(Self::Delete),
            "execute" => Ok(Self::Execute),
            other => Err(NexusError::Sandbox(format!("Unknown operation: {}", other))),
        }
    }
}

/// Outcome status of a file operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    Success,
    Error,
}

/// Kind of a directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One entry of a `list` result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Size in bytes; zero for directories
    pub size: u64,
}

/// Result of a file operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOperationResult {
    pub status: OperationStatus,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<FileEntry>>,
}

impl FileOperationResult {
    /// Successful result with `output`
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            status: OperationStatus::Success,
            output: output.into(),
            items: None,
        }
    }

    /// Failed result with `output`
    pub fn error(output: impl Into<String>) -> Self {
        Self {
            status: OperationStatus::Error,
            output: output.into(),
            items: None,
        }
    }

    /// Whether the operation succeeded
    pub fn is_success(&self) -> bool {
        self.status == OperationStatus::Success
    }
}

/// Acknowledgement returned by sandbox initialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxInitResult {
    pub status: OperationStatus,
    pub message: String,
}

/// File operations confined to one root directory
#[derive(Debug, Clone)]
pub struct Sandbox {
    validator: PathValidator,
}

impl Sandbox {
    /// Creates a sandbox rooted at `root`
    ///
    /// The directory is created lazily on the first accepted operation.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            validator: PathValidator::new(root.into()),
        }
    }

    /// The sandbox root
    pub fn root(&self) -> &Path {
        self.validator.root()
    }

    /// Runs one file operation
    ///
    /// Never fails: rejected paths, missing files and IO faults all come
    /// back as an error-status result.
    pub async fn execute(&self, op: &FileOperation) -> FileOperationResult {
        // Lexical check first; an escaping path must not touch the disk.
        let candidate = match self.validator.normalize(&op.path) {
            Ok(path) => path,
            Err(FileUtilsError::OutsideSandbox(path)) => {
                tracing::warn!(path = %path, "Rejected sandbox path");
                return FileOperationResult::error(ACCESS_DENIED);
            }
            Err(e) => return FileOperationResult::error(e.to_string()),
        };

        if let Err(e) = tokio::fs::create_dir_all(self.root()).await {
            return FileOperationResult::error(e.to_string());
        }

        let target = match self.validator.confine(&candidate) {
            Ok(path) => path,
            Err(FileUtilsError::OutsideSandbox(path)) => {
                tracing::warn!(path = %path, "Rejected sandbox symlink");
                return FileOperationResult::error(ACCESS_DENIED);
            }
            Err(e) => return FileOperationResult::error(e.to_string()),
        };

        let kind = match op.operation.parse::<FileOperationKind>() {
            Ok(kind) => kind,
            Err(_) => return FileOperationResult::error("Unknown operation"),
        };

        tracing::debug!(operation = %op.operation, path = %op.path, "Sandbox file operation");

        let outcome = match kind {
            FileOperationKind::Read => self.read(&target, &op.path).await,
            FileOperationKind::Write => {
                self.write(&target, &op.path, op.content.as_deref().unwrap_or(""))
                    .await
            }
            FileOperationKind::List => self.list_dir(&target).await,
            // Unlink the entry itself; a symlink is removed, never its target.
            FileOperationKind::Delete => self.delete(&candidate, &op.path).await,
            FileOperationKind::Execute => Ok(FileOperationResult::success(format!(
                "[SIMULATED] Script execution: {}\n[OUTPUT] Script ran successfully",
                op.path
            ))),
        };

        outcome.unwrap_or_else(|e| FileOperationResult::error(e.to_string()))
    }

    /// Lists a directory; shorthand for a `list` operation
    pub async fn list(&self, path: &str) -> FileOperationResult {
        self.execute(&FileOperation::new("list", path)).await
    }

    /// Creates the standard directory layout and sample files
    ///
    /// Existing sample files are overwritten.
    ///
    /// # Errors
    ///
    /// Returns `NexusError::Io` wrapped with the failing path.
    pub async fn init(&self) -> Result<SandboxInitResult> {
        let root = self.root();
        for dir in SANDBOX_DIRS {
            let path = root.join(dir);
            tokio::fs::create_dir_all(&path)
                .await
                .map_err(NexusError::Io)
                .with_context(|| format!("Failed to create {}", path.display()))?;
        }

        for (relative, content) in SANDBOX_SAMPLES {
            let path = root.join(relative);
            tokio::fs::write(&path, content)
                .await
                .map_err(NexusError::Io)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }

        tracing::info!(root = %root.display(), "Sandbox initialized");
        Ok(SandboxInitResult {
            status: OperationStatus::Success,
            message: "Sandbox initialized".to_string(),
        })
    }

    async fn read(
        &self,
        target: &Path,
        requested: &str,
    ) -> std::result::Result<FileOperationResult, FileUtilsError> {
        if tokio::fs::metadata(target).await.is_err() {
            return Ok(FileOperationResult::error(format!(
                "File not found: {}",
                requested
            )));
        }
        check_file_size(target, MAX_READ_BYTES).await?;
        let content = tokio::fs::read_to_string(target).await?;
        Ok(FileOperationResult::success(content))
    }

    async fn write(
        &self,
        target: &Path,
        requested: &str,
        content: &str,
    ) -> std::result::Result<FileOperationResult, FileUtilsError> {
        ensure_parent_dirs(target).await?;
        tokio::fs::write(target, content).await?;
        Ok(FileOperationResult::success(format!(
            "File written: {}",
            requested
        )))
    }

    async fn list_dir(
        &self,
        target: &Path,
    ) -> std::result::Result<FileOperationResult, FileUtilsError> {
        let is_dir = tokio::fs::metadata(target)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Ok(FileOperationResult::error("Not a directory"));
        }

        let mut items = Vec::new();
        let mut entries = tokio::fs::read_dir(target).await?;
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            let (kind, size) = if metadata.is_dir() {
                (EntryKind::Directory, 0)
            } else {
                (EntryKind::File, metadata.len())
            };
            items.push(FileEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
                size,
            });
        }
        items.sort_by(|a, b| a.name.cmp(&b.name));

        let output = serde_json::to_string_pretty(&items)
            .map_err(|e| FileUtilsError::InvalidPath(e.to_string()))?;
        Ok(FileOperationResult {
            status: OperationStatus::Success,
            output,
            items: Some(items),
        })
    }

    async fn delete(
        &self,
        target: &Path,
        requested: &str,
    ) -> std::result::Result<FileOperationResult, FileUtilsError> {
        let metadata = match tokio::fs::symlink_metadata(target).await {
            Ok(metadata) => metadata,
            Err(_) => return Ok(FileOperationResult::error("File not found")),
        };

        if metadata.is_dir() {
            tokio::fs::remove_dir_all(target).await?;
        } else {
            tokio::fs::remove_file(target).await?;
        }
        tracing::info!(path = %requested, "Deleted sandbox path");
        Ok(FileOperationResult::success(format!("Deleted: {}", requested)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sandbox(dir: &TempDir) -> Sandbox {
        Sandbox::new(dir.path().join("sandbox"))
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let sandbox = sandbox(&dir);

        let written = sandbox
            .execute(&FileOperation::new("write", "/results/out.txt").with_content("open ports"))
            .await;
        assert_eq!(written, FileOperationResult::success("File written: /results/out.txt"));

        let read = sandbox
            .execute(&FileOperation::new("read", "/results/out.txt"))
            .await;
        assert!(read.is_success());
        assert_eq!(read.output, "open ports");
    }

    #[tokio::test]
    async fn test_write_without_content_creates_empty_file() {
        let dir = TempDir::new().unwrap();
        let sandbox = sandbox(&dir);
        let result = sandbox.execute(&FileOperation::new("write", "empty.txt")).await;
        assert!(result.is_success());
        let content = std::fs::read_to_string(dir.path().join("sandbox/empty.txt")).unwrap();
        assert!(content.is_empty());
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = sandbox(&dir)
            .execute(&FileOperation::new("read", "/nope.txt"))
            .await;
        assert_eq!(result, FileOperationResult::error("File not found: /nope.txt"));
    }

    #[tokio::test]
    async fn test_escape_is_denied_without_touching_disk() {
        let dir = TempDir::new().unwrap();
        let sandbox = sandbox(&dir);
        let result = sandbox
            .execute(&FileOperation::new("read", "../../etc/passwd"))
            .await;
        assert_eq!(result, FileOperationResult::error(ACCESS_DENIED));
        assert!(!sandbox.root().exists());
    }

    #[tokio::test]
    async fn test_list_directory_sorted_with_sizes() {
        let dir = TempDir::new().unwrap();
        let sandbox = sandbox(&dir);
        sandbox
            .execute(&FileOperation::new("write", "b.txt").with_content("12345"))
            .await;
        sandbox
            .execute(&FileOperation::new("write", "a/inner.txt").with_content("x"))
            .await;

        let result = sandbox.list("/").await;
        assert!(result.is_success());
        let items = result.items.unwrap();
        assert_eq!(
            items,
            vec![
                FileEntry {
                    name: "a".to_string(),
                    kind: EntryKind::Directory,
                    size: 0
                },
                FileEntry {
                    name: "b.txt".to_string(),
                    kind: EntryKind::File,
                    size: 5
                },
            ]
        );
        assert!(result.output.contains("\"type\": \"directory\""));
    }

    #[tokio::test]
    async fn test_list_file_is_not_a_directory() {
        let dir = TempDir::new().unwrap();
        let sandbox = sandbox(&dir);
        sandbox
            .execute(&FileOperation::new("write", "f.txt").with_content("x"))
            .await;
        let result = sandbox.list("f.txt").await;
        assert_eq!(result, FileOperationResult::error("Not a directory"));
    }

    #[tokio::test]
    async fn test_delete_file_and_directory() {
        let dir = TempDir::new().unwrap();
        let sandbox = sandbox(&dir);
        sandbox
            .execute(&FileOperation::new("write", "tree/leaf.txt").with_content("x"))
            .await;

        let result = sandbox.execute(&FileOperation::new("delete", "tree")).await;
        assert_eq!(result, FileOperationResult::success("Deleted: tree"));
        assert!(!dir.path().join("sandbox/tree").exists());

        let again = sandbox.execute(&FileOperation::new("delete", "tree")).await;
        assert_eq!(again, FileOperationResult::error("File not found"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_delete_symlink_removes_link_not_target() {
        let dir = TempDir::new().unwrap();
        let sandbox = sandbox(&dir);
        sandbox
            .execute(&FileOperation::new("write", "results/keep.txt").with_content("loot"))
            .await;
        let root = dir.path().join("sandbox");
        std::os::unix::fs::symlink(root.join("results/keep.txt"), root.join("alias.txt"))
            .unwrap();

        let result = sandbox.execute(&FileOperation::new("delete", "alias.txt")).await;
        assert_eq!(result, FileOperationResult::success("Deleted: alias.txt"));
        assert!(std::fs::symlink_metadata(root.join("alias.txt")).is_err());
        assert_eq!(
            std::fs::read_to_string(root.join("results/keep.txt")).unwrap(),
            "loot"
        );
    }

    #[tokio::test]
    async fn test_execute_is_simulated() {
        let dir = TempDir::new().unwrap();
        let result = sandbox(&dir)
            .execute(&FileOperation::new("execute", "/scripts/recon.sh"))
            .await;
        assert_eq!(
            result.output,
            "[SIMULATED] Script execution: /scripts/recon.sh\n[OUTPUT] Script ran successfully"
        );
    }

    #[tokio::test]
    async fn test_unknown_operation() {
        let dir = TempDir::new().unwrap();
        let result = sandbox(&dir)
            .execute(&FileOperation::new("chmod", "x"))
            .await;
        assert_eq!(result, FileOperationResult::error("Unknown operation"));
    }

    #[tokio::test]
    async fn test_init_creates_layout() {
        let dir = TempDir::new().unwrap();
        let sandbox = sandbox(&dir);
        let ack = sandbox.init().await.unwrap();
        assert_eq!(ack.status, OperationStatus::Success);
        assert_eq!(ack.message, "Sandbox initialized");

        for sub in SANDBOX_DIRS {
            assert!(sandbox.root().join(sub).is_dir());
        }
        let words = std::fs::read_to_string(sandbox.root().join("wordlists/common.txt")).unwrap();
        assert_eq!(words.lines().count(), 5);
        assert!(sandbox.root().join("README.txt").is_file());
    }

    #[test]
    fn test_result_serialization_omits_missing_items() {
        let json = serde_json::to_value(FileOperationResult::error(ACCESS_DENIED)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "error", "output": ACCESS_DENIED})
        );
    }
}
