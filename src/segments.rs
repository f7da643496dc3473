//! Cluster id to display name resolution

use std::collections::BTreeMap;

/// Segment display names keyed by integer cluster id.
///
/// Artifacts may store ids as JSON strings; they are normalized to integers
/// when the map is loaded, so each lookup is a single integer key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentNames {
    names: BTreeMap<usize, String>,
}

impl SegmentNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty names are skipped so they resolve to the fallback.
    pub fn insert(&mut self, cluster_id: usize, name: impl Into<String>) {
        let name = name.into();
        if name.trim().is_empty() {
            tracing::warn!(cluster_id, "ignoring empty segment name");
            return;
        }
        self.names.insert(cluster_id, name);
    }

    pub fn get(&self, cluster_id: usize) -> Option<&str> {
        self.names.get(&cluster_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().map(|(id, name)| (*id, name.as_str()))
    }

    /// Mapped name for `cluster_id`, or `"Cluster <id>"`. Never fails.
    pub fn resolve(&self, cluster_id: usize) -> String {
        resolve(cluster_id, self)
    }
}

impl<S: Into<String>> FromIterator<(usize, S)> for SegmentNames {
    fn from_iter<I: IntoIterator<Item = (usize, S)>>(iter: I) -> Self {
        let mut names = SegmentNames::new();
        for (id, name) in iter {
            names.insert(id, name);
        }
        names
    }
}

pub fn resolve(cluster_id: usize, names: &SegmentNames) -> String {
    match names.get(cluster_id) {
        Some(name) => name.to_string(),
        None => fallback_name(cluster_id),
    }
}

pub fn fallback_name(cluster_id: usize) -> String {
    format!("Cluster {}", cluster_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_names() -> SegmentNames {
        [(0, "Balanced"), (1, "Younger / Short-Duration")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_resolve_mapped() {
        let names = create_test_names();
        assert_eq!(names.resolve(0), "Balanced");
        assert_eq!(names.resolve(1), "Younger / Short-Duration");
    }

    #[test]
    fn test_resolve_fallback() {
        let names = create_test_names();
        assert_eq!(names.resolve(2), "Cluster 2");
        assert_eq!(SegmentNames::new().resolve(0), "Cluster 0");

        for id in [0usize, 7, 1000, usize::MAX] {
            assert!(!SegmentNames::new().resolve(id).is_empty());
        }
    }

    #[test]
    fn test_empty_name_falls_back() {
        let names: SegmentNames = [(0, ""), (1, "  ")].into_iter().collect();
        assert!(names.is_empty());
        assert_eq!(names.resolve(1), "Cluster 1");
    }
}
