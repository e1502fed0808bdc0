//! Install orchestration
//!
//! The full driver pipeline: mend the lockfile (writing the provisional
//! result to disk before any network activity), then hand the
//! provenance-tagged state to the downstream resolution step. Entries both
//! branches agree on are pinned and never refetched; everything else is
//! stale and re-resolved normally. The resolver's answer is serialized and
//! written as the second physical write.

use semver::{Version, VersionReq};
use std::collections::HashMap;
use std::path::Path;

use crate::config::defaults;
use crate::core::descriptor::Descriptor;
use crate::core::entry::{EntryMap, Provenance, ReconciledEntry, ReconciledState, ResolutionEntry};
use crate::core::manifest::Manifest;
use crate::core::mend::{self, MendOutcome};
use crate::core::parse;
use crate::core::serialize;
use crate::error::{LockmendError, ResolveError};
use crate::infra::filesystem;
use crate::registry::client::RegistryClient;

/// Install options
#[derive(Debug, Default)]
pub struct InstallOptions {
    /// Never touch the network; stale entries must validate against the
    /// manifest range from the lockfile alone
    pub offline: bool,
}

/// Result of an install run
#[derive(Debug, Default)]
pub struct InstallReport {
    /// Conflicted regions reconciled away (0 for a clean lockfile)
    pub regions: usize,

    /// Descriptors that were genuine conflicts
    pub conflicts: Vec<Descriptor>,

    /// Stale conflict remnants dropped against the manifest
    pub dropped: Vec<Descriptor>,

    /// Entries accepted without any network traffic
    pub pinned: usize,

    /// Stale entries re-resolved (or offline-validated)
    pub refreshed: usize,

    /// Manifest descriptors that had no lockfile entry and were added
    pub added: Vec<Descriptor>,

    /// Whether the final write changed the lockfile on disk
    pub lockfile_updated: bool,
}

/// Whether a version satisfies a requested range
///
/// Ranges that are not semver requirements (dist-tags like `latest`) accept
/// anything here; only the registry can interpret them.
fn range_accepts(range: &str, version: &Version) -> bool {
    match VersionReq::parse(range) {
        Ok(req) => req.matches(version),
        Err(_) => {
            tracing::debug!("range '{range}' is not a semver requirement, accepting {version}");
            true
        }
    }
}

/// Run a full install against the project at `project_path`
pub async fn install(
    project_path: &Path,
    client: &RegistryClient,
    options: &InstallOptions,
) -> Result<InstallReport, LockmendError> {
    let manifest = Manifest::load(&project_path.join(defaults::MANIFEST_FILE))?;
    let lock_path = project_path.join(defaults::LOCKFILE_FILE);

    let mut report = InstallReport::default();

    // Reconciliation half: writes the provisional lockfile before any
    // network traffic, so an interrupted install leaves a valid file.
    let state = match mend::mend_lockfile(project_path, false)? {
        MendOutcome::Mended(mended) => {
            report.regions = mended.regions;
            report.conflicts = mended.conflicts.clone();
            report.dropped = mended.dropped.clone();
            mended.state
        }
        MendOutcome::Clean => {
            let content = if lock_path.exists() {
                filesystem::read_file(&lock_path)?
            } else {
                String::new()
            };
            let mut state = ReconciledState::default();
            for (descriptor, entry) in parse::detect_and_parse(&content)? {
                state.entries.insert(
                    descriptor,
                    ReconciledEntry {
                        entry,
                        provenance: Provenance::Unchanged,
                        rejected: None,
                    },
                );
            }
            state
        }
    };

    let resolved = resolve_entries(&state, &manifest, client, options, &mut report).await?;

    let serialized = serialize::serialize(&resolved);
    let on_disk = if lock_path.exists() {
        filesystem::read_file(&lock_path)?
    } else {
        String::new()
    };
    if serialized != on_disk {
        filesystem::write_file(&lock_path, &serialized)?;
        report.lockfile_updated = true;
    }

    Ok(report)
}

/// Re-resolve the reconciled state into a final entry map
///
/// Pinned entries pass through untouched. Stale entries are validated
/// against the manifest range: offline from the lockfile alone (falling
/// back to the rejected conflict candidate when the winner misses), online
/// by fetching the index and taking the highest satisfying release.
/// Manifest descriptors with no entry at all are resolved fresh.
async fn resolve_entries(
    state: &ReconciledState,
    manifest: &Manifest,
    client: &RegistryClient,
    options: &InstallOptions,
    report: &mut InstallReport,
) -> Result<EntryMap, LockmendError> {
    let mut resolved = EntryMap::new();
    let mut indexes: HashMap<String, crate::registry::client::PackageIndex> = HashMap::new();

    for (descriptor, reconciled) in &state.entries {
        if reconciled.provenance.is_pinned() {
            report.pinned += 1;
            resolved.insert(descriptor.clone(), reconciled.entry.clone());
            continue;
        }

        let entry = if options.offline {
            resolve_offline(descriptor, reconciled)?
        } else {
            resolve_online(descriptor, reconciled, client, &mut indexes).await?
        };
        report.refreshed += 1;
        resolved.insert(descriptor.clone(), entry);
    }

    // Descriptors the manifest requests but the lockfile has never seen.
    for descriptor in manifest.live_descriptors() {
        if resolved.contains_key(&descriptor) {
            continue;
        }
        if options.offline {
            return Err(ResolveError::OfflineMiss {
                descriptor: descriptor.to_string(),
            }
            .into());
        }
        let entry = fetch_best(&descriptor, client, &mut indexes).await?;
        tracing::info!("adding '{descriptor}' -> {}", entry.version);
        report.added.push(descriptor.clone());
        resolved.insert(descriptor, entry);
    }

    Ok(resolved)
}

fn resolve_offline(
    descriptor: &Descriptor,
    reconciled: &ReconciledEntry,
) -> Result<ResolutionEntry, LockmendError> {
    if range_accepts(descriptor.range(), &reconciled.entry.version) {
        return Ok(reconciled.entry.clone());
    }

    // The losing conflict candidate is still one of the two original
    // entries; preferring it over a hard failure is not synthesis.
    if let Some(rejected) = &reconciled.rejected {
        if range_accepts(descriptor.range(), &rejected.version) {
            tracing::info!(
                "offline: '{descriptor}' falls back to rejected candidate {}",
                rejected.version
            );
            return Ok(rejected.clone());
        }
    }

    Err(ResolveError::OfflinePinMismatch {
        descriptor: descriptor.to_string(),
        version: reconciled.entry.version.to_string(),
    }
    .into())
}

async fn resolve_online(
    descriptor: &Descriptor,
    reconciled: &ReconciledEntry,
    client: &RegistryClient,
    indexes: &mut HashMap<String, crate::registry::client::PackageIndex>,
) -> Result<ResolutionEntry, LockmendError> {
    let best = fetch_best(descriptor, client, indexes).await?;

    // Keep the reconciled entry when the registry agrees with it; its
    // source string may be a mirror we should not clobber.
    if best.version == reconciled.entry.version
        && best.checksum == reconciled.entry.checksum
    {
        Ok(reconciled.entry.clone())
    } else {
        tracing::info!(
            "re-resolved '{descriptor}': {} -> {}",
            reconciled.entry.version,
            best.version
        );
        Ok(best)
    }
}

async fn fetch_best(
    descriptor: &Descriptor,
    client: &RegistryClient,
    indexes: &mut HashMap<String, crate::registry::client::PackageIndex>,
) -> Result<ResolutionEntry, LockmendError> {
    if !indexes.contains_key(descriptor.name()) {
        let index = client.fetch_package(descriptor.name()).await?;
        indexes.insert(descriptor.name().to_string(), index);
    }
    let index = &indexes[descriptor.name()];

    let best = index.best_release(|v| range_accepts(descriptor.range(), v))?;
    let Some((version, release)) = best else {
        return Err(ResolveError::NoMatchingVersion {
            name: descriptor.name().to_string(),
            range: descriptor.range().to_string(),
        }
        .into());
    };

    Ok(ResolutionEntry::new(
        version,
        release.source.clone(),
        release.checksum.clone(),
    ))
}
