//! Registry client implementation
//!
//! Fetches per-package index documents (`<base>/<name>.json`) listing the
//! published releases. Transient network failures are retried with a capped
//! exponential backoff; a missing package is not transient and fails
//! immediately.

use semver::Version;
use serde::Deserialize;
use std::time::Duration;

use crate::config::{defaults, urls};
use crate::error::ResolveError;

/// One published release of a package
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Release version
    pub version: String,

    /// Tarball location
    pub source: String,

    /// Integrity token (`algo:hex`)
    pub checksum: String,
}

/// Index document for a single package
#[derive(Debug, Clone, Deserialize)]
pub struct PackageIndex {
    /// Package name
    pub name: String,

    /// Published releases, newest last
    pub releases: Vec<Release>,
}

impl PackageIndex {
    /// The highest published version accepted by `accept`
    pub fn best_release(
        &self,
        accept: impl Fn(&Version) -> bool,
    ) -> Result<Option<(Version, &Release)>, ResolveError> {
        let mut best: Option<(Version, &Release)> = None;
        for release in &self.releases {
            let version =
                Version::parse(&release.version).map_err(|e| ResolveError::InvalidIndex {
                    name: self.name.clone(),
                    reason: format!("release version '{}': {e}", release.version),
                })?;
            if accept(&version) && best.as_ref().map_or(true, |(v, _)| version > *v) {
                best = Some((version, release));
            }
        }
        Ok(best)
    }
}

/// Registry client for fetching package indexes
#[derive(Debug)]
pub struct RegistryClient {
    /// HTTP client
    client: reqwest::Client,

    /// Registry base URL
    base_url: String,

    /// Maximum retry attempts
    max_retries: u32,

    /// Base delay for exponential backoff (in milliseconds)
    base_delay_ms: u64,
}

impl RegistryClient {
    /// Create a new registry client with the default URL
    pub fn new() -> Self {
        Self::with_base_url(urls::PACKAGE_REGISTRY.to_string())
    }

    /// Create a registry client with a custom base URL
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url,
            max_retries: defaults::MAX_FETCH_RETRIES,
            base_delay_ms: defaults::FETCH_RETRY_BASE_DELAY_MS,
        }
    }

    /// Get the registry base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the index document for a package, with retry
    pub async fn fetch_package(&self, name: &str) -> Result<PackageIndex, ResolveError> {
        let url = format!("{}/{name}.json", self.base_url.trim_end_matches('/'));

        let mut attempts = 0;
        let mut delay_ms = self.base_delay_ms;
        let mut last_error = None;

        while attempts < self.max_retries {
            attempts += 1;

            match self.fetch_once(&url, name).await {
                Ok(index) => return Ok(index),
                // A 404 is definitive; retrying cannot make the package appear.
                Err(e @ ResolveError::PackageNotFound { .. }) => return Err(e),
                Err(e) => {
                    tracing::debug!("fetch attempt {attempts} for '{name}' failed: {e}");
                    last_error = Some(e);

                    if attempts < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        delay_ms = (delay_ms * 2).min(30_000);
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ResolveError::MaxRetriesExceeded {
            url,
            retries: self.max_retries,
        }))
    }

    /// Single fetch attempt without retry
    async fn fetch_once(&self, url: &str, name: &str) -> Result<PackageIndex, ResolveError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ResolveError::Network {
                url: url.to_string(),
                error: e.to_string(),
            })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ResolveError::PackageNotFound {
                name: name.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(ResolveError::Network {
                url: url.to_string(),
                error: format!("registry returned status {}", response.status()),
            });
        }

        response
            .json::<PackageIndex>()
            .await
            .map_err(|e| ResolveError::InvalidIndex {
                name: name.to_string(),
                reason: e.to_string(),
            })
    }
}

impl Default for RegistryClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(releases: &[(&str, &str)]) -> PackageIndex {
        PackageIndex {
            name: "pkg".to_string(),
            releases: releases
                .iter()
                .map(|(version, source)| Release {
                    version: (*version).to_string(),
                    source: (*source).to_string(),
                    checksum: "sha256:aa".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_best_release_picks_highest_accepted() {
        let index = index(&[("1.0.0", "s1"), ("2.1.0", "s2"), ("1.9.3", "s3")]);
        let (version, release) = index
            .best_release(|v| v.major == 1)
            .unwrap()
            .expect("a 1.x release exists");
        assert_eq!(version.to_string(), "1.9.3");
        assert_eq!(release.source, "s3");
    }

    #[test]
    fn test_best_release_none_when_nothing_accepted() {
        let index = index(&[("1.0.0", "s1")]);
        assert!(index.best_release(|v| v.major == 9).unwrap().is_none());
    }

    #[test]
    fn test_best_release_rejects_bad_version_in_index() {
        let index = index(&[("not-semver", "s1")]);
        assert!(matches!(
            index.best_release(|_| true),
            Err(ResolveError::InvalidIndex { .. })
        ));
    }
}
