//! Default configuration values

/// Manifest file name, relative to the project root
pub const MANIFEST_FILE: &str = "package.toml";

/// Lockfile name, relative to the project root
pub const LOCKFILE_FILE: &str = "package.lock";

/// Header written at the top of every generated lockfile
pub const LOCKFILE_HEADER: &str = "# This file is generated by lockmend. Do not edit by hand.";

/// Version-declaration comment that opens a legacy (v1) lockfile
pub const LEGACY_HEADER: &str = "# lockmend lockfile v1";

/// Schema number written into current-format lockfiles
pub const CURRENT_SCHEMA: u32 = 2;

/// Maximum number of registry fetch retry attempts
pub const MAX_FETCH_RETRIES: u32 = 3;

/// Base delay for fetch retry backoff (in milliseconds)
pub const FETCH_RETRY_BASE_DELAY_MS: u64 = 1000;
