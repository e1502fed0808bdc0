//! Configuration and constants
//!
//! Well-known file names, lockfile schema constants and registry URLs.

pub mod defaults;
pub mod urls;
