//! Resolution entries and reconciled state
//!
//! The canonical in-memory form of a lockfile: an ordered map from
//! [`Descriptor`] to the concrete resolution it is locked to. Reconciliation
//! produces the same map annotated with per-entry provenance.

use indexmap::IndexMap;
use semver::Version;

use crate::core::descriptor::Descriptor;

/// The concrete resolution a descriptor is locked to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionEntry {
    /// Exact resolved version
    pub version: Version,

    /// Resolved location (tarball URL or equivalent locator)
    pub source: String,

    /// Integrity token (`algo:hex`)
    pub checksum: String,
}

impl ResolutionEntry {
    /// Create a new entry
    pub fn new(version: Version, source: impl Into<String>, checksum: impl Into<String>) -> Self {
        Self {
            version,
            source: source.into(),
            checksum: checksum.into(),
        }
    }

    /// Whether two entries lock the same package contents
    ///
    /// Version and integrity token must match; the source string may differ
    /// cosmetically (mirror URLs, trailing slashes) without being a genuine
    /// conflict.
    pub fn is_equivalent(&self, other: &Self) -> bool {
        self.version == other.version && self.checksum == other.checksum
    }
}

/// Ordered descriptor -> resolution map
///
/// Insertion order matters for deterministic output. Within one parse pass a
/// later entry for the same descriptor overwrites the earlier one; merging
/// across maps is the reconciliation engine's job.
pub type EntryMap = IndexMap<Descriptor, ResolutionEntry>;

/// How a reconciled entry was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Outside every conflicted region
    Unchanged,

    /// Present only in an "ours" fragment
    OursOnly,

    /// Present only in a "theirs" fragment
    TheirsOnly,

    /// Present on both sides with equivalent resolutions
    BothAgree,

    /// Genuine conflict, ours won the deterministic pick
    ConflictKeptOurs,

    /// Genuine conflict, theirs won the deterministic pick
    ConflictKeptTheirs,
}

impl Provenance {
    /// Entries both branches already agree on are pinned: the downstream
    /// resolver must not refetch their metadata.
    pub fn is_pinned(self) -> bool {
        matches!(self, Self::Unchanged | Self::BothAgree)
    }

    /// Entries whose correctness is unconfirmed after a genuine conflict
    pub fn is_conflict(self) -> bool {
        matches!(self, Self::ConflictKeptOurs | Self::ConflictKeptTheirs)
    }
}

/// A reconciled entry with its provenance and, for genuine conflicts, the
/// losing candidate (kept as a parallel hint, never synthesized away)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledEntry {
    /// The resolution the emitted lockfile carries
    pub entry: ResolutionEntry,

    /// How this entry was derived
    pub provenance: Provenance,

    /// The candidate that lost the deterministic pick, if any
    pub rejected: Option<ResolutionEntry>,
}

/// The single entry map produced by merging all regions plus the
/// unconflicted surrounding text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciledState {
    /// Reconciled entries in first-seen order
    pub entries: IndexMap<Descriptor, ReconciledEntry>,
}

impl ReconciledState {
    /// Descriptors whose entries the downstream resolver must re-validate
    pub fn stale_descriptors(&self) -> Vec<&Descriptor> {
        self.entries
            .iter()
            .filter(|(_, e)| !e.provenance.is_pinned())
            .map(|(d, _)| d)
            .collect()
    }

    /// Collapse to a plain entry map, dropping provenance
    pub fn to_entry_map(&self) -> EntryMap {
        self.entries
            .iter()
            .map(|(d, e)| (d.clone(), e.entry.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(version: &str, source: &str, checksum: &str) -> ResolutionEntry {
        ResolutionEntry::new(Version::parse(version).unwrap(), source, checksum)
    }

    #[test]
    fn test_equivalence_ignores_source() {
        let a = entry("1.0.0", "https://a.example/pkg.tar.gz", "sha256:aa");
        let b = entry("1.0.0", "https://mirror.example/pkg.tar.gz", "sha256:aa");
        assert!(a.is_equivalent(&b));
    }

    #[test]
    fn test_equivalence_requires_matching_checksum() {
        let a = entry("1.0.0", "https://a.example/pkg.tar.gz", "sha256:aa");
        let b = entry("1.0.0", "https://a.example/pkg.tar.gz", "sha256:bb");
        assert!(!a.is_equivalent(&b));
    }

    #[test]
    fn test_pinned_provenance() {
        assert!(Provenance::Unchanged.is_pinned());
        assert!(Provenance::BothAgree.is_pinned());
        assert!(!Provenance::OursOnly.is_pinned());
        assert!(!Provenance::ConflictKeptTheirs.is_pinned());
    }

    #[test]
    fn test_stale_descriptors_excludes_pinned() {
        let mut state = ReconciledState::default();
        state.entries.insert(
            Descriptor::new("a", "*"),
            ReconciledEntry {
                entry: entry("1.0.0", "src-a", "sha256:aa"),
                provenance: Provenance::BothAgree,
                rejected: None,
            },
        );
        state.entries.insert(
            Descriptor::new("b", "*"),
            ReconciledEntry {
                entry: entry("2.0.0", "src-b", "sha256:bb"),
                provenance: Provenance::ConflictKeptTheirs,
                rejected: Some(entry("1.0.0", "src-b1", "sha256:cc")),
            },
        );

        let stale = state.stale_descriptors();
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].name(), "b");
    }
}
