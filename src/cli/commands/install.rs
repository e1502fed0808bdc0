//! `lockmend install` command
//!
//! The full pipeline: mend the lockfile, then re-resolve stale entries
//! against the registry (or validate them offline) and finalize the file.

use anyhow::Result;

use crate::cli::output::{self, status};
use crate::core::install::{self, InstallOptions};
use crate::registry::client::RegistryClient;

pub async fn run(offline: bool, registry: Option<String>) -> Result<()> {
    let project = std::env::current_dir()?;
    let client = registry.map_or_else(RegistryClient::new, RegistryClient::with_base_url);
    let options = InstallOptions { offline };

    let spinner = output::create_spinner(if offline {
        "Validating lockfile entries (offline)..."
    } else {
        "Resolving lockfile entries..."
    });
    let result = install::install(&project, &client, &options).await;
    spinner.finish_and_clear();

    let report = result?;

    if output::is_json() {
        println!(
            "{}",
            serde_json::json!({
                "regions": report.regions,
                "conflicts": report.conflicts.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "dropped": report.dropped.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "pinned": report.pinned,
                "refreshed": report.refreshed,
                "added": report.added.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "lockfile_updated": report.lockfile_updated,
            })
        );
        return Ok(());
    }

    if report.regions > 0 {
        output::status_line(&format!(
            "{} resolved {} merge conflict region{}",
            status::SUCCESS,
            report.regions,
            if report.regions == 1 { "" } else { "s" }
        ));
    }
    output::status_line(&format!(
        "{} {} pinned, {} refreshed, {} added",
        status::SUCCESS,
        report.pinned,
        report.refreshed,
        report.added.len()
    ));
    if !report.lockfile_updated {
        output::status_line(&format!("{} lockfile already up to date", status::INFO));
    }

    Ok(())
}
