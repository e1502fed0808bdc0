//! Dependency descriptors
//!
//! A descriptor is the identity under which a dependency is requested: the
//! package name plus the requested range or tag (`no-deps@*`). Several
//! descriptors may resolve to the same package; each descriptor resolves to
//! at most one.

use std::fmt;

/// A requested dependency: package name plus range/tag string
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Descriptor {
    /// Package name, possibly scoped (`@org/pkg`)
    name: String,

    /// Requested range or tag, verbatim (`*`, `^1.0`, `latest`)
    range: String,
}

impl Descriptor {
    /// Create a descriptor from its parts
    pub fn new(name: impl Into<String>, range: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            range: range.into(),
        }
    }

    /// Parse a `name@range` string
    ///
    /// Scoped names keep their leading `@`: `@org/pkg@^1.0` splits at the
    /// second `@`. A bare name is treated as requesting `*`.
    pub fn parse(input: &str) -> Result<Self, String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err("empty descriptor".to_string());
        }

        let split_from = usize::from(trimmed.starts_with('@'));
        let (name, range) = match trimmed[split_from..].find('@') {
            Some(at) => {
                let at = at + split_from;
                (&trimmed[..at], &trimmed[at + 1..])
            }
            None => (trimmed, "*"),
        };

        if name.is_empty() {
            return Err(format!("descriptor '{trimmed}' has no package name"));
        }
        if range.is_empty() {
            return Err(format!("descriptor '{trimmed}' has an empty range"));
        }

        Ok(Self::new(name, range))
    }

    /// Package name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Requested range or tag
    pub fn range(&self) -> &str {
        &self.range
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_descriptor() {
        let d = Descriptor::parse("no-deps@*").unwrap();
        assert_eq!(d.name(), "no-deps");
        assert_eq!(d.range(), "*");
    }

    #[test]
    fn test_parse_scoped_descriptor() {
        let d = Descriptor::parse("@org/pkg@^1.0").unwrap();
        assert_eq!(d.name(), "@org/pkg");
        assert_eq!(d.range(), "^1.0");
    }

    #[test]
    fn test_parse_bare_name_defaults_to_wildcard() {
        let d = Descriptor::parse("serde").unwrap();
        assert_eq!(d.range(), "*");
    }

    #[test]
    fn test_parse_scoped_name_without_range() {
        let d = Descriptor::parse("@org/pkg").unwrap();
        assert_eq!(d.name(), "@org/pkg");
        assert_eq!(d.range(), "*");
    }

    #[test]
    fn test_parse_rejects_empty_input() {
        assert!(Descriptor::parse("").is_err());
        assert!(Descriptor::parse("   ").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_range() {
        assert!(Descriptor::parse("pkg@").is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        let d = Descriptor::parse("@org/pkg@~2.1").unwrap();
        assert_eq!(d.to_string(), "@org/pkg@~2.1");
        assert_eq!(Descriptor::parse(&d.to_string()).unwrap(), d);
    }

    #[test]
    fn test_ordering_is_by_name_then_range() {
        let a = Descriptor::new("aaa", "^2.0");
        let b = Descriptor::new("bbb", "^1.0");
        let c = Descriptor::new("bbb", "^2.0");
        assert!(a < b);
        assert!(b < c);
    }
}
