//! Registry URLs

/// Package registry base URL (GitHub raw)
pub const PACKAGE_REGISTRY: &str =
    "https://raw.githubusercontent.com/lockmend/lockmend-registry/main/packages";
