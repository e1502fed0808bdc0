//! Lockfile format detection
//!
//! Classifies a text fragment (one side of a conflict region, or a whole
//! file) as one of the supported lockfile schema versions. The two sides of
//! one conflict may well be in different versions: one branch upgraded the
//! tool, the other did not.

use regex::Regex;
use std::sync::OnceLock;

use crate::config::defaults;
use crate::error::LockfileError;

/// Supported on-disk lockfile dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    /// Legacy single-line format (`descriptors version source checksum`)
    V1,

    /// Current structured TOML format (`[meta]` + `[[package]]` blocks)
    V2,
}

impl SchemaVersion {
    /// The schema every reconciled lockfile is serialized in
    pub const CURRENT: Self = Self::V2;
}

/// Shape of a legacy entry line: descriptors, version, source, checksum
fn legacy_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\S+\s+\S+\s+\S+\s+\S+$").expect("invalid legacy line regex"))
}

/// Whether a single line has the legacy entry shape
pub fn is_legacy_entry_line(line: &str) -> bool {
    legacy_line_regex().is_match(line.trim())
}

/// Detect which schema a fragment is written in
///
/// Signature checks run most-specific first: the legacy version-declaration
/// comment, then the structured table headers of the current format, then
/// the legacy per-line shape. Blank or comment-only fragments classify as
/// the current schema and parse to an empty map.
pub fn detect(fragment: &str) -> Result<SchemaVersion, LockfileError> {
    for line in fragment.lines() {
        if line.trim() == defaults::LEGACY_HEADER {
            return Ok(SchemaVersion::V1);
        }
    }

    for line in fragment.lines() {
        let trimmed = line.trim();
        if trimmed == "[meta]" || trimmed.starts_with("[[package]]") {
            return Ok(SchemaVersion::V2);
        }
    }

    let mut saw_entry = false;
    for line in fragment.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if is_legacy_entry_line(trimmed) {
            saw_entry = true;
        } else {
            return Err(LockfileError::UnrecognizedLockfileFormat {
                snippet: trimmed.chars().take(80).collect(),
            });
        }
    }

    if saw_entry {
        Ok(SchemaVersion::V1)
    } else {
        Ok(SchemaVersion::V2)
    }
}
