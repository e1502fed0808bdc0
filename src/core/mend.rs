//! Lockfile mending
//!
//! The driver's reconciliation half: detect conflict markers, split, parse
//! both sides of every region, reconcile, drop stale conflict remnants, and
//! serialize. The reconciled file is written back to disk before any network
//! activity happens, so a crash mid-install leaves a syntactically valid
//! lockfile instead of a half-merged one. Failures here never write: the
//! conflicted file survives untouched for manual inspection.

use std::path::Path;

use crate::config::defaults;
use crate::core::descriptor::Descriptor;
use crate::core::entry::ReconciledState;
use crate::core::manifest::Manifest;
use crate::core::markers::{self, Segment};
use crate::core::parse;
use crate::core::reconcile::{self, ParsedSegment};
use crate::core::serialize;
use crate::error::{LockfileError, LockmendError};
use crate::infra::filesystem;

/// What mending a lockfile produced
#[derive(Debug)]
pub enum MendOutcome {
    /// No conflict markers: the file is passed through unmodified
    Clean,

    /// Markers were found and reconciled away
    Mended(MendReport),
}

/// Details of a successful reconciliation
#[derive(Debug)]
pub struct MendReport {
    /// Number of conflicted regions in the file
    pub regions: usize,

    /// Descriptors that were genuine conflicts (kept deterministically,
    /// re-validated downstream)
    pub conflicts: Vec<Descriptor>,

    /// Stale conflict remnants dropped because no manifest declaration
    /// requests them anymore
    pub dropped: Vec<Descriptor>,

    /// The reconciled state handed to the downstream resolver
    pub state: ReconciledState,

    /// Canonical current-schema text of the reconciled lockfile
    pub serialized: String,
}

/// Reconcile conflicted lockfile text against the manifest's live set
///
/// Pure: no I/O. Returns [`MendOutcome::Clean`] without parsing anything
/// when the text carries no markers.
pub fn mend_content(content: &str, manifest: &Manifest) -> Result<MendOutcome, LockfileError> {
    let segments = markers::split_conflicts(content)?;
    let regions = segments
        .iter()
        .filter(|s| matches!(s, Segment::Conflict(_)))
        .count();
    if regions == 0 {
        return Ok(MendOutcome::Clean);
    }

    let mut parsed = Vec::with_capacity(segments.len());
    for segment in segments {
        parsed.push(match segment {
            Segment::Text(text) => ParsedSegment::Plain(parse::detect_and_parse(&text)?),
            Segment::Conflict(region) => {
                tracing::debug!("reconciling conflict region at line {}", region.line);
                ParsedSegment::Conflict {
                    ours: parse::detect_and_parse(&region.ours)?,
                    theirs: parse::detect_and_parse(&region.theirs)?,
                }
            }
        });
    }

    let mut state = reconcile::reconcile(parsed);

    // Conflict remnants are only worth keeping while something still
    // requests them; everything else passes through untouched (transitive
    // dependencies never appear in a manifest).
    let stale: Vec<Descriptor> = state
        .entries
        .iter()
        .filter(|(d, e)| e.provenance.is_conflict() && !manifest.requests(d))
        .map(|(d, _)| d.clone())
        .collect();
    for descriptor in &stale {
        tracing::info!("dropping stale conflict remnant '{descriptor}'");
        state.entries.shift_remove(descriptor);
    }

    let conflicts: Vec<Descriptor> = state
        .entries
        .iter()
        .filter(|(_, e)| e.provenance.is_conflict())
        .map(|(d, _)| d.clone())
        .collect();

    let serialized = serialize::serialize(&state.to_entry_map());

    Ok(MendOutcome::Mended(MendReport {
        regions,
        conflicts,
        dropped: stale,
        state,
        serialized,
    }))
}

/// Mend the project's lockfile on disk
///
/// Reads the lockfile at its well-known path, reconciles it, and overwrites
/// it with the canonical result (unless `dry_run`). A lockfile that does not
/// exist or carries no markers is left exactly as it is.
pub fn mend_lockfile(project_path: &Path, dry_run: bool) -> Result<MendOutcome, LockmendError> {
    let lock_path = project_path.join(defaults::LOCKFILE_FILE);
    if !lock_path.exists() {
        tracing::debug!("no lockfile at {}, nothing to mend", lock_path.display());
        return Ok(MendOutcome::Clean);
    }

    let content = filesystem::read_file(&lock_path)?;
    if !markers::has_conflict_markers(&content) {
        return Ok(MendOutcome::Clean);
    }

    let manifest = Manifest::load(&project_path.join(defaults::MANIFEST_FILE))?;
    let outcome = mend_content(&content, &manifest)?;

    if let MendOutcome::Mended(report) = &outcome {
        if dry_run {
            tracing::info!("dry run: leaving {} untouched", lock_path.display());
        } else {
            filesystem::write_file(&lock_path, &report.serialized)?;
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entry::Provenance;
    use crate::core::parse::detect_and_parse;

    fn manifest(deps: &[(&str, &str)]) -> Manifest {
        let body = deps
            .iter()
            .map(|(name, range)| format!("\"{name}\" = \"{range}\"\n"))
            .collect::<String>();
        Manifest::from_toml(&format!("[project]\nname = \"t\"\n[dependencies]\n{body}")).unwrap()
    }

    const CONFLICTED: &str = r#"# This file is generated by lockmend. Do not edit by hand.

[meta]
schema = 2

<<<<<<< HEAD
[[package]]
requests = ["no-deps@*"]
version = "1.0.0"
source = "https://registry.example/no-deps-1.0.0.tar.gz"
checksum = "sha256:8d556c1e"
=======
[[package]]
requests = ["no-deps@*"]
version = "2.0.0"
source = "https://registry.example/no-deps-2.0.0.tar.gz"
checksum = "sha256:87428fc5"
>>>>>>> branch-2.0.0
"#;

    #[test]
    fn test_clean_content_short_circuits() {
        let outcome = mend_content("anything, even garbage\n", &manifest(&[])).unwrap();
        assert!(matches!(outcome, MendOutcome::Clean));
    }

    #[test]
    fn test_conflict_resolved_to_higher_version() {
        let outcome = mend_content(CONFLICTED, &manifest(&[("no-deps", "*")])).unwrap();
        let MendOutcome::Mended(report) = outcome else {
            panic!("expected a mended outcome");
        };

        assert_eq!(report.regions, 1);
        assert_eq!(report.conflicts, vec![Descriptor::new("no-deps", "*")]);
        assert!(report.dropped.is_empty());

        let merged = &report.state.entries[&Descriptor::new("no-deps", "*")];
        assert_eq!(merged.provenance, Provenance::ConflictKeptTheirs);
        assert_eq!(merged.entry.version.to_string(), "2.0.0");

        assert!(!report.serialized.contains("<<<<<<<"));
        assert!(!report.serialized.contains(">>>>>>>"));
        let reparsed = detect_and_parse(&report.serialized).unwrap();
        assert_eq!(reparsed.len(), 1);
    }

    #[test]
    fn test_stale_conflict_remnant_dropped_without_manifest_request() {
        let outcome = mend_content(CONFLICTED, &manifest(&[])).unwrap();
        let MendOutcome::Mended(report) = outcome else {
            panic!("expected a mended outcome");
        };

        assert_eq!(report.dropped, vec![Descriptor::new("no-deps", "*")]);
        assert!(report.state.entries.is_empty());
        assert!(!report.serialized.contains("no-deps"));
    }

    #[test]
    fn test_legacy_side_merges_into_current_schema() {
        let content = r#"<<<<<<< HEAD
# lockmend lockfile v1
no-deps@* 1.0.0 https://registry.example/no-deps-1.0.0.tar.gz sha256:8d556c1e
=======
[[package]]
requests = ["no-deps@*"]
version = "2.0.0"
source = "https://registry.example/no-deps-2.0.0.tar.gz"
checksum = "sha256:87428fc5"
>>>>>>> upgraded
"#;
        let outcome = mend_content(content, &manifest(&[("no-deps", "*")])).unwrap();
        let MendOutcome::Mended(report) = outcome else {
            panic!("expected a mended outcome");
        };

        assert!(report.serialized.contains("schema = 2"));
        assert!(report.serialized.contains("[[package]]"));
        assert!(!report.serialized.contains("lockfile v1"));
    }

    #[test]
    fn test_parse_failure_aborts_without_result() {
        let content = "<<<<<<< HEAD\nnot a lockfile at all\n=======\nstill not one\n>>>>>>> x\n";
        let err = mend_content(content, &manifest(&[])).unwrap_err();
        assert!(matches!(
            err,
            LockfileError::UnrecognizedLockfileFormat { .. }
        ));
    }

    #[test]
    fn test_two_regions_reconciled_in_order() {
        let content = r#"<<<<<<< HEAD
[[package]]
requests = ["a@*"]
version = "1.0.0"
source = "https://registry.example/a-1.0.0.tar.gz"
checksum = "sha256:aa"
=======
[[package]]
requests = ["a@*"]
version = "1.0.0"
source = "https://registry.example/a-1.0.0.tar.gz"
checksum = "sha256:aa"
>>>>>>> pick-1

[[package]]
requests = ["between@*"]
version = "3.0.0"
source = "https://registry.example/between-3.0.0.tar.gz"
checksum = "sha256:cc"

<<<<<<< HEAD
[[package]]
requests = ["z@*"]
version = "1.5.0"
source = "https://registry.example/z-1.5.0.tar.gz"
checksum = "sha256:dd"
=======
[[package]]
requests = ["z@*"]
version = "1.6.0"
source = "https://registry.example/z-1.6.0.tar.gz"
checksum = "sha256:ee"
>>>>>>> pick-2
"#;
        let outcome = mend_content(content, &manifest(&[("z", "*")])).unwrap();
        let MendOutcome::Mended(report) = outcome else {
            panic!("expected a mended outcome");
        };

        assert_eq!(report.regions, 2);
        let order: Vec<String> = report.state.entries.keys().map(ToString::to_string).collect();
        assert_eq!(order, vec!["a@*", "between@*", "z@*"]);
        assert_eq!(
            report.state.entries[&Descriptor::new("a", "*")].provenance,
            Provenance::BothAgree
        );
        assert_eq!(
            report.state.entries[&Descriptor::new("z", "*")]
                .entry
                .version
                .to_string(),
            "1.6.0"
        );
    }
}
