//! Server capability list built from the `-c` flag.
//!
//! Capability names are separated by `:` (e.g. `DA:HD:LDS`). Empty segments
//! from doubled, leading or trailing separators are dropped.

/// Separator between capability names in the raw flag value.
pub const CAPABILITY_DELIMITER: char = ':';

/// Ordered capability names, never containing an empty entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityList(Vec<String>);

impl CapabilityList {
    /// Split a raw capability string. The input is only borrowed.
    pub fn parse(raw: &str) -> Self {
        let names = raw
            .split(CAPABILITY_DELIMITER)
            .filter(|name| !name.is_empty())
            .inspect(|name| tracing::debug!(capability = name, "capability collected"))
            .map(str::to_string)
            .collect();
        Self(names)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_simple() {
        assert_eq!(CapabilityList::parse("a:b:c").as_slice(), ["a", "b", "c"]);
    }

    #[test]
    fn test_empty_input() {
        let caps = CapabilityList::parse("");
        assert!(caps.is_empty());
        assert_eq!(caps.len(), 0);
    }

    #[test]
    fn test_empty_segments_dropped() {
        assert_eq!(CapabilityList::parse("a::b:").as_slice(), ["a", "b"]);
        assert_eq!(CapabilityList::parse(":::a").as_slice(), ["a"]);
        assert!(CapabilityList::parse(":::").is_empty());
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        assert_eq!(
            CapabilityList::parse("LDS:DA:LDS").into_vec(),
            vec!["LDS", "DA", "LDS"]
        );
    }

    #[test]
    fn test_parse_is_repeatable_and_leaves_source_intact() {
        let raw = String::from("cap1:cap2");
        let first = CapabilityList::parse(&raw);
        let second = CapabilityList::parse(&raw);
        assert_eq!(first, second);
        assert_eq!(raw, "cap1:cap2");
    }
}
