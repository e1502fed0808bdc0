//! `lockmend fix` command
//!
//! Runs the reconciliation half of an install: strips conflict markers and
//! writes a valid, provisional lockfile. The downstream re-resolution of
//! conflicted entries happens on the next `lockmend install`.

use anyhow::Result;

use crate::cli::output::{self, status};
use crate::core::mend::{self, MendOutcome};

pub fn run(dry_run: bool) -> Result<()> {
    let project = std::env::current_dir()?;

    match mend::mend_lockfile(&project, dry_run)? {
        MendOutcome::Clean => {
            if output::is_json() {
                println!("{}", serde_json::json!({ "status": "clean" }));
            } else {
                output::status_line(&format!(
                    "{} lockfile has no merge conflicts",
                    status::SUCCESS
                ));
            }
        }
        MendOutcome::Mended(report) => {
            if output::is_json() {
                let as_strings =
                    |ds: &[crate::core::descriptor::Descriptor]| -> Vec<String> {
                        ds.iter().map(ToString::to_string).collect()
                    };
                println!(
                    "{}",
                    serde_json::json!({
                        "status": if dry_run { "would-mend" } else { "mended" },
                        "regions": report.regions,
                        "entries": report.state.entries.len(),
                        "conflicts": as_strings(&report.conflicts),
                        "dropped": as_strings(&report.dropped),
                    })
                );
            } else {
                let verb = if dry_run { "would resolve" } else { "resolved" };
                output::status_line(&format!(
                    "{} {verb} {} conflict region{} ({} entries)",
                    status::SUCCESS,
                    report.regions,
                    if report.regions == 1 { "" } else { "s" },
                    report.state.entries.len()
                ));
                for descriptor in &report.conflicts {
                    output::status_line(&format!(
                        "{} '{descriptor}' diverged; kept {} pending re-validation",
                        status::WARNING,
                        report.state.entries[descriptor].entry.version
                    ));
                }
                for descriptor in &report.dropped {
                    output::status_line(&format!(
                        "{} dropped '{descriptor}' (no longer in the manifest)",
                        status::INFO
                    ));
                }
            }
        }
    }

    Ok(())
}
