//! Package registry access
//!
//! The downstream half of an install: fetching package index documents and
//! re-resolving the descriptors the reconciliation pass marked stale.

pub mod client;
