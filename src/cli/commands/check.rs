//! `lockmend check` command
//!
//! Read-only inspection: reports whether the lockfile is conflicted and,
//! when it is clean, validates that it parses. Exits non-zero on a
//! conflicted or invalid lockfile so CI can gate on it.

use anyhow::{bail, Result};

use crate::cli::output::{self, status};
use crate::config::defaults;
use crate::core::{markers, parse};
use crate::infra::filesystem;

pub fn run() -> Result<()> {
    let project = std::env::current_dir()?;
    let lock_path = project.join(defaults::LOCKFILE_FILE);

    if !lock_path.exists() {
        output::status_line(&format!(
            "{} no lockfile at {}",
            status::INFO,
            lock_path.display()
        ));
        return Ok(());
    }

    let content = filesystem::read_file(&lock_path)?;
    let segments = markers::split_conflicts(&content)?;
    let regions = segments
        .iter()
        .filter(|s| matches!(s, markers::Segment::Conflict(_)))
        .count();

    if regions > 0 {
        bail!(
            "lockfile has {regions} unresolved merge conflict region{}; run 'lockmend fix'",
            if regions == 1 { "" } else { "s" }
        );
    }

    let entries = parse::detect_and_parse(&content)?;
    if output::is_json() {
        println!(
            "{}",
            serde_json::json!({ "status": "clean", "entries": entries.len() })
        );
    } else {
        output::status_line(&format!(
            "{} lockfile is clean ({} entries)",
            status::SUCCESS,
            entries.len()
        ));
    }

    Ok(())
}
