//! Transformed payloads produced by a run.

use std::collections::BTreeMap;

/// Immutable mapping from input identifier to transformed bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedArtifact {
    items: BTreeMap<String, Vec<u8>>,
}

impl ProcessedArtifact {
    pub(crate) fn new(items: BTreeMap<String, Vec<u8>>) -> Self {
        Self { items }
    }

    /// Transformed bytes for one input
    pub fn get(&self, id: &str) -> Option<&[u8]> {
        self.items.get(id).map(Vec::as_slice)
    }

    /// Entries in identifier order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.items.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total size of all payloads in bytes
    pub fn total_bytes(&self) -> u64 {
        self.items.values().map(|v| v.len() as u64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_accessors() {
        let artifact = ProcessedArtifact::new(
            [
                ("b.txt".to_string(), b"BB".to_vec()),
                ("a.txt".to_string(), b"A".to_vec()),
            ]
            .into_iter()
            .collect(),
        );

        assert_eq!(artifact.len(), 2);
        assert_eq!(artifact.get("a.txt"), Some(&b"A"[..]));
        assert_eq!(artifact.get("c.txt"), None);
        assert_eq!(artifact.total_bytes(), 3);

        let ids: Vec<&str> = artifact.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["a.txt", "b.txt"]);
    }
}
