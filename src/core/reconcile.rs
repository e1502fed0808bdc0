//! Reconciliation engine
//!
//! Merges the entry maps parsed from both sides of every conflicted region,
//! plus the unconflicted surrounding text, into one candidate state. The
//! engine is schema-agnostic: it only ever sees canonical entry maps, never
//! raw lockfile text.

use crate::core::descriptor::Descriptor;
use crate::core::entry::{EntryMap, Provenance, ReconciledEntry, ReconciledState, ResolutionEntry};

/// A file segment after parsing, in original file order
#[derive(Debug, Clone)]
pub enum ParsedSegment {
    /// Entries from unconflicted text
    Plain(EntryMap),

    /// Entries from the two sides of one conflicted region
    Conflict {
        /// Entries parsed from the "ours" side
        ours: EntryMap,
        /// Entries parsed from the "theirs" side
        theirs: EntryMap,
    },
}

/// Pick the winner of a genuine conflict
///
/// Deterministic policy: the higher concrete version wins; equal versions
/// fall back to lexical order of the source string. The loser is not
/// discarded; the caller keeps it as a parallel candidate for the
/// downstream resolver.
fn pick_winner(ours: ResolutionEntry, theirs: ResolutionEntry) -> ReconciledEntry {
    let ours_wins = match ours.version.cmp(&theirs.version) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => ours.source >= theirs.source,
    };

    if ours_wins {
        ReconciledEntry {
            entry: ours,
            provenance: Provenance::ConflictKeptOurs,
            rejected: Some(theirs),
        }
    } else {
        ReconciledEntry {
            entry: theirs,
            provenance: Provenance::ConflictKeptTheirs,
            rejected: Some(ours),
        }
    }
}

/// Merge one region's two sides over the union of their descriptors
fn reconcile_region(ours: EntryMap, mut theirs: EntryMap) -> Vec<(Descriptor, ReconciledEntry)> {
    let mut merged = Vec::with_capacity(ours.len() + theirs.len());

    for (descriptor, ours_entry) in ours {
        let reconciled = match theirs.shift_remove(&descriptor) {
            None => ReconciledEntry {
                entry: ours_entry,
                provenance: Provenance::OursOnly,
                rejected: None,
            },
            Some(theirs_entry) if ours_entry.is_equivalent(&theirs_entry) => ReconciledEntry {
                entry: ours_entry,
                provenance: Provenance::BothAgree,
                rejected: None,
            },
            Some(theirs_entry) => pick_winner(ours_entry, theirs_entry),
        };
        merged.push((descriptor, reconciled));
    }

    for (descriptor, theirs_entry) in theirs {
        merged.push((
            descriptor,
            ReconciledEntry {
                entry: theirs_entry,
                provenance: Provenance::TheirsOnly,
                rejected: None,
            },
        ));
    }

    merged
}

/// Reconcile all parsed segments into a single state
///
/// Regions are processed independently and in file order; results are
/// concatenated preserving first-seen order. A descriptor reappearing in a
/// later segment overwrites the earlier value; that should not happen in a
/// well-formed file and is logged as a non-fatal anomaly.
pub fn reconcile(segments: Vec<ParsedSegment>) -> ReconciledState {
    let mut state = ReconciledState::default();

    for segment in segments {
        let reconciled = match segment {
            ParsedSegment::Plain(map) => map
                .into_iter()
                .map(|(descriptor, entry)| {
                    (
                        descriptor,
                        ReconciledEntry {
                            entry,
                            provenance: Provenance::Unchanged,
                            rejected: None,
                        },
                    )
                })
                .collect(),
            ParsedSegment::Conflict { ours, theirs } => reconcile_region(ours, theirs),
        };

        for (descriptor, entry) in reconciled {
            if state.entries.contains_key(&descriptor) {
                tracing::warn!(
                    "descriptor '{descriptor}' appears in more than one lockfile segment; \
                     keeping the later entry"
                );
            }
            state.entries.insert(descriptor, entry);
        }
    }

    state
}
