//! Manifest (package.toml) reading
//!
//! The manifest declares which dependencies a project actually requests.
//! During reconciliation it is the authority on which descriptors are still
//! live: conflict remnants no longer requested by any declaration get
//! dropped instead of haunting the lockfile forever.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::core::descriptor::Descriptor;
use crate::error::ManifestError;

/// The project manifest (package.toml)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    /// Project configuration
    pub project: ProjectConfig,

    /// Runtime dependencies: package name -> requested range
    #[serde(default)]
    pub dependencies: HashMap<String, String>,

    /// Development dependencies: package name -> requested range
    #[serde(default, rename = "dev-dependencies")]
    pub dev_dependencies: HashMap<String, String>,
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectConfig {
    /// Project name
    pub name: String,

    /// Project version
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

impl Manifest {
    /// Load manifest from file path
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        if !path.exists() {
            return Err(ManifestError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| ManifestError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Load manifest from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ManifestError> {
        toml::from_str(content).map_err(|source| ManifestError::Parse { source })
    }

    /// The set of descriptors currently requested by any live declaration
    pub fn live_descriptors(&self) -> HashSet<Descriptor> {
        self.dependencies
            .iter()
            .chain(&self.dev_dependencies)
            .map(|(name, range)| Descriptor::new(name, range))
            .collect()
    }

    /// Whether the manifest still requests this exact descriptor
    pub fn requests(&self, descriptor: &Descriptor) -> bool {
        let matches = |deps: &HashMap<String, String>| {
            deps.get(descriptor.name())
                .is_some_and(|range| range == descriptor.range())
        };
        matches(&self.dependencies) || matches(&self.dev_dependencies)
    }
}
