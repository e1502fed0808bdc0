//! Canonical lockfile serialization
//!
//! Renders an entry map back into the current schema's on-disk form. Output
//! is deterministic: identical states serialize to byte-identical text, so
//! repeated runs and repository history stay diff-minimal. Merging a legacy
//! side with a current side therefore always upgrades the file, never
//! regresses it.

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::defaults;
use crate::core::descriptor::Descriptor;
use crate::core::entry::{EntryMap, ResolutionEntry};

#[derive(Debug, Serialize)]
struct LockDocumentOut {
    meta: MetaOut,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    package: Vec<PackageOut>,
}

#[derive(Debug, Serialize)]
struct MetaOut {
    schema: u32,
}

#[derive(Debug, Serialize)]
struct PackageOut {
    requests: Vec<String>,
    version: String,
    source: String,
    checksum: String,
}

/// Serialize an entry map into canonical current-schema text
///
/// Descriptors sharing one resolution are grouped into a single package
/// block. Blocks are ordered by their lexically-least descriptor and the
/// requests inside each block are sorted, so the byte output is a pure
/// function of the map's contents.
pub fn serialize(entries: &EntryMap) -> String {
    // Group descriptors by the exact resolution they point at.
    let mut groups: IndexMap<(String, String, String), (ResolutionEntry, Vec<Descriptor>)> =
        IndexMap::new();
    for (descriptor, entry) in entries {
        let key = (
            entry.version.to_string(),
            entry.source.clone(),
            entry.checksum.clone(),
        );
        groups
            .entry(key)
            .or_insert_with(|| (entry.clone(), Vec::new()))
            .1
            .push(descriptor.clone());
    }

    let mut blocks: Vec<(Descriptor, PackageOut)> = groups
        .into_values()
        .map(|(entry, mut descriptors)| {
            descriptors.sort();
            let least = descriptors[0].clone();
            let requests = descriptors.iter().map(ToString::to_string).collect();
            (
                least,
                PackageOut {
                    requests,
                    version: entry.version.to_string(),
                    source: entry.source,
                    checksum: entry.checksum,
                },
            )
        })
        .collect();
    blocks.sort_by(|(a, _), (b, _)| a.cmp(b));

    let document = LockDocumentOut {
        meta: MetaOut {
            schema: defaults::CURRENT_SCHEMA,
        },
        package: blocks.into_iter().map(|(_, block)| block).collect(),
    };

    let body = toml::to_string(&document).expect("lockfile document serializes to TOML");

    format!("{}\n\n{body}", defaults::LOCKFILE_HEADER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parse::{detect_and_parse, parse_fragment};
    use crate::core::schema::SchemaVersion;
    use proptest::prelude::*;
    use semver::Version;

    fn entry(version: &str, source: &str, checksum: &str) -> ResolutionEntry {
        ResolutionEntry::new(Version::parse(version).unwrap(), source, checksum)
    }

    #[test]
    fn test_serialized_output_reparses_as_current_schema() {
        let mut map = EntryMap::new();
        map.insert(
            Descriptor::new("no-deps", "*"),
            entry("2.0.0", "https://registry.example/no-deps-2.0.0.tar.gz", "sha256:87428fc5"),
        );

        let text = serialize(&map);

        assert!(text.starts_with(defaults::LOCKFILE_HEADER));
        assert!(text.contains("schema = 2"));
        let reparsed = detect_and_parse(&text).unwrap();
        assert_eq!(reparsed, map);
    }

    #[test]
    fn test_aliases_grouped_into_one_block() {
        let shared = entry("1.2.3", "https://registry.example/a-1.2.3.tar.gz", "sha256:aa");
        let mut map = EntryMap::new();
        map.insert(Descriptor::new("a", "~1.2"), shared.clone());
        map.insert(Descriptor::new("a", "^1.0"), shared);

        let text = serialize(&map);

        assert_eq!(text.matches("[[package]]").count(), 1);
        assert!(text.contains(r#"requests = ["a@^1.0", "a@~1.2"]"#));
    }

    #[test]
    fn test_output_is_independent_of_insertion_order() {
        let a = entry("1.0.0", "src-a", "sha256:aa");
        let b = entry("2.0.0", "src-b", "sha256:bb");

        let mut forward = EntryMap::new();
        forward.insert(Descriptor::new("alpha", "*"), a.clone());
        forward.insert(Descriptor::new("beta", "*"), b.clone());

        let mut backward = EntryMap::new();
        backward.insert(Descriptor::new("beta", "*"), b);
        backward.insert(Descriptor::new("alpha", "*"), a);

        assert_eq!(serialize(&forward), serialize(&backward));
    }

    #[test]
    fn test_empty_map_serializes_header_and_meta_only() {
        let text = serialize(&EntryMap::new());
        assert!(text.contains("schema = 2"));
        assert!(!text.contains("[[package]]"));
        assert!(detect_and_parse(&text).unwrap().is_empty());
    }

    fn descriptor_strategy() -> impl Strategy<Value = Descriptor> {
        ("[a-z][a-z0-9-]{0,12}", prop_oneof!["\\*", "\\^[0-9]\\.[0-9]", "~[0-9]\\.[0-9]"])
            .prop_map(|(name, range)| Descriptor::new(name, range))
    }

    fn entry_strategy() -> impl Strategy<Value = ResolutionEntry> {
        (0u64..20, 0u64..20, 0u64..20, "[a-f0-9]{8}").prop_map(|(maj, min, patch, digest)| {
            let version = Version::new(maj, min, patch);
            let source = format!("https://registry.example/pkg-{version}.tar.gz");
            ResolutionEntry::new(version, source, format!("sha256:{digest}"))
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Serializing then reparsing recovers the same entry map.
        #[test]
        fn prop_serialize_reparse_roundtrip(
            entries in proptest::collection::btree_map(descriptor_strategy(), entry_strategy(), 0..8)
        ) {
            let map: EntryMap = entries.into_iter().collect();
            let text = serialize(&map);
            let reparsed = parse_fragment(&text, SchemaVersion::V2).unwrap();
            prop_assert_eq!(reparsed, map);
        }

        /// Byte output is a pure function of the map contents, not its order.
        #[test]
        fn prop_serialize_is_order_independent(
            entries in proptest::collection::btree_map(descriptor_strategy(), entry_strategy(), 0..8)
        ) {
            let forward: EntryMap = entries.clone().into_iter().collect();
            let backward: EntryMap = entries.into_iter().rev().collect();
            prop_assert_eq!(serialize(&forward), serialize(&backward));
        }
    }
}
