//! Lockfile fragment parsing
//!
//! Parses a classified fragment into the canonical entry map, regardless of
//! which schema version produced it. Parsing never drops entries silently: a
//! field that does not match its schema's shape aborts the whole
//! reconciliation with the offending line attached, because silent loss
//! would corrupt the merged graph.

use semver::Version;
use serde::Deserialize;

use crate::core::descriptor::Descriptor;
use crate::core::entry::{EntryMap, ResolutionEntry};
use crate::core::schema::SchemaVersion;
use crate::error::LockfileError;

/// Parse a fragment in the given schema into an entry map
///
/// Composite descriptor lines (several aliases sharing one resolution)
/// expand into one map entry per alias, all pointing at the same resolution.
pub fn parse_fragment(fragment: &str, schema: SchemaVersion) -> Result<EntryMap, LockfileError> {
    match schema {
        SchemaVersion::V1 => parse_v1(fragment),
        SchemaVersion::V2 => parse_v2(fragment),
    }
}

/// Detect the fragment's schema, then parse it
pub fn detect_and_parse(fragment: &str) -> Result<EntryMap, LockfileError> {
    let schema = crate::core::schema::detect(fragment)?;
    parse_fragment(fragment, schema)
}

fn corrupt(line: &str, reason: impl Into<String>) -> LockfileError {
    LockfileError::CorruptLockfileEntry {
        line: line.trim().chars().take(120).collect(),
        reason: reason.into(),
    }
}

/// Validate an `algo:hex` integrity token
fn validate_checksum(token: &str) -> Result<(), String> {
    let Some((algo, payload)) = token.split_once(':') else {
        return Err(format!("checksum '{token}' is not of the form algo:hex"));
    };
    if algo.is_empty() || !algo.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(format!("checksum algorithm '{algo}' is invalid"));
    }
    hex::decode(payload).map_err(|e| format!("checksum payload is not hex: {e}"))?;
    Ok(())
}

fn parse_resolution(
    line: &str,
    version: &str,
    source: &str,
    checksum: &str,
) -> Result<ResolutionEntry, LockfileError> {
    let version = Version::parse(version)
        .map_err(|e| corrupt(line, format!("invalid version '{version}': {e}")))?;
    if source.is_empty() {
        return Err(corrupt(line, "empty source"));
    }
    validate_checksum(checksum).map_err(|reason| corrupt(line, reason))?;
    Ok(ResolutionEntry::new(version, source, checksum))
}

/// Legacy format: one entry per line, four whitespace-separated fields
fn parse_v1(fragment: &str) -> Result<EntryMap, LockfileError> {
    let mut map = EntryMap::new();

    for line in fragment.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        let [descriptors, version, source, checksum] = fields.as_slice() else {
            return Err(corrupt(
                line,
                format!("expected 4 fields, found {}", fields.len()),
            ));
        };

        let entry = parse_resolution(line, version, source, checksum)?;
        for alias in descriptors.split(',') {
            let descriptor =
                Descriptor::parse(alias).map_err(|reason| corrupt(line, reason))?;
            map.insert(descriptor, entry.clone());
        }
    }

    Ok(map)
}

/// Current format: TOML document with `[meta]` and `[[package]]` blocks
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LockDocument {
    #[allow(dead_code)]
    meta: Option<MetaBlock>,

    #[serde(default)]
    package: Vec<PackageBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MetaBlock {
    #[allow(dead_code)]
    schema: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PackageBlock {
    requests: Vec<String>,
    version: String,
    source: String,
    checksum: String,
}

fn parse_v2(fragment: &str) -> Result<EntryMap, LockfileError> {
    let document: LockDocument = toml::from_str(fragment).map_err(|e| {
        let snippet = e
            .span()
            .and_then(|span| fragment.get(span.start..span.end.min(span.start + 80)))
            .unwrap_or("");
        corrupt(snippet, e.message().to_string())
    })?;

    let mut map = EntryMap::new();
    for block in document.package {
        if block.requests.is_empty() {
            return Err(corrupt(&block.version, "package block with no requests"));
        }
        let entry = parse_resolution(
            &block.requests.join(","),
            &block.version,
            &block.source,
            &block.checksum,
        )?;
        for alias in &block.requests {
            let descriptor = Descriptor::parse(alias)
                .map_err(|reason| corrupt(alias, reason))?;
            map.insert(descriptor, entry.clone());
        }
    }

    Ok(map)
}
