//! Tools module for NEXUS
//!
//! This module contains the sandboxed virtual filesystem the assistant and
//! the user browse scan results through, and the path utilities it is built
//! on.

pub mod file_utils;
pub mod sandbox;

pub use sandbox::{
    EntryKind, FileEntry, FileOperation, FileOperationKind, FileOperationResult,
    OperationStatus, Sandbox, SandboxInitResult, ACCESS_DENIED,
};
