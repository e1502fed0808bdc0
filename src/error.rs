//! Error types for lockmend
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Lockfile reconciliation errors
///
/// None of these are retried: they mean the lockfile is not mechanically
/// reconcilable and a human has to intervene. They are always raised before
/// anything is written back to disk, so the conflicted file survives intact.
#[derive(Error, Debug)]
pub enum LockfileError {
    /// Merge markers are structurally invalid (bad ordering or nesting)
    #[error("Malformed merge markers at line {line}: {reason}")]
    MalformedMergeMarkers { line: usize, reason: String },

    /// A fragment matches no known lockfile schema
    #[error("Unrecognized lockfile format near: {snippet}")]
    UnrecognizedLockfileFormat { snippet: String },

    /// The schema matched but an entry is invalid
    #[error("Corrupt lockfile entry '{line}': {reason}")]
    CorruptLockfileEntry { line: String, reason: String },
}

/// Manifest-related errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest not found
    #[error("Manifest not found at '{path}'")]
    NotFound { path: PathBuf },

    /// Manifest parse error
    #[error("Failed to parse manifest: {source}")]
    Parse { source: toml::de::Error },

    /// IO error reading the manifest
    #[error("IO error for '{path}': {error}")]
    Io { path: PathBuf, error: String },
}

/// Downstream resolution errors
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Package not found in registry
    #[error("Package '{name}' not found in registry")]
    PackageNotFound { name: String },

    /// No published version satisfies the requested range
    #[error("No version of '{name}' satisfies '{range}'")]
    NoMatchingVersion { name: String, range: String },

    /// Network error
    #[error("Network error fetching '{url}': {error}")]
    Network { url: String, error: String },

    /// Registry returned an unusable document
    #[error("Invalid registry document for '{name}': {reason}")]
    InvalidIndex { name: String, reason: String },

    /// Max retries exceeded
    #[error("Registry fetch failed after {retries} retries: {url}")]
    MaxRetriesExceeded { url: String, retries: u32 },

    /// Offline and a reconciled guess does not satisfy the manifest range
    #[error(
        "Pinned version {version} of '{descriptor}' does not satisfy the manifest range (network disabled)"
    )]
    OfflinePinMismatch { descriptor: String, version: String },

    /// Offline and a descriptor has no usable entry at all
    #[error("Cannot resolve '{descriptor}' with network disabled")]
    OfflineMiss { descriptor: String },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },
}

/// Top-level lockmend error type
#[derive(Error, Debug)]
pub enum LockmendError {
    /// Lockfile reconciliation error
    #[error("Lockfile error: {0}")]
    Lockfile(#[from] LockfileError),

    /// Manifest error
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Resolution error
    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),
}
