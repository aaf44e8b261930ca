//! URL-keyed deduplication of input descriptors.

use crate::model::descriptor::ResourceDescriptor;
use std::collections::HashSet;

/// Result of one deduplication pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deduplicated {
    /// First occurrence of each url, in input order.
    pub kept: Vec<ResourceDescriptor>,
    /// Every later occurrence, in input order.
    pub dropped: Vec<ResourceDescriptor>,
}

/// Keeps the first descriptor for each url and preserves relative order.
///
/// Urls are compared exactly; no normalization is applied.
pub fn remove_duplicates(descriptors: Vec<ResourceDescriptor>) -> Deduplicated {
    let mut seen: HashSet<String> = HashSet::with_capacity(descriptors.len());
    let mut result = Deduplicated::default();

    for descriptor in descriptors {
        if seen.insert(descriptor.url.clone()) {
            result.kept.push(descriptor);
        } else {
            result.dropped.push(descriptor);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::remove_duplicates;
    use crate::model::descriptor::ResourceDescriptor;
    use std::collections::HashSet;

    fn descriptor(name: &str, url: &str) -> ResourceDescriptor {
        ResourceDescriptor::new(name, url, "X")
    }

    #[test]
    fn first_occurrence_wins_and_order_is_preserved() {
        let result = remove_duplicates(vec![
            descriptor("a1", "http://a"),
            descriptor("b1", "http://b"),
            descriptor("a2", "http://a"),
            descriptor("c1", "http://c"),
            descriptor("b2", "http://b"),
        ]);

        let kept: Vec<&str> = result.kept.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(kept, vec!["a1", "b1", "c1"]);
        let dropped: Vec<&str> = result.dropped.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(dropped, vec!["a2", "b2"]);
    }

    #[test]
    fn kept_urls_are_unique() {
        let input: Vec<_> = (0..40)
            .map(|idx| descriptor(&format!("r{idx}"), &format!("http://host/{}", idx % 7)))
            .collect();
        let result = remove_duplicates(input);

        let urls: HashSet<&str> = result.kept.iter().map(|d| d.url.as_str()).collect();
        assert_eq!(urls.len(), result.kept.len());
        assert_eq!(result.kept.len(), 7);
        assert_eq!(result.kept[3].name, "r3");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let result = remove_duplicates(Vec::new());
        assert!(result.kept.is_empty());
        assert!(result.dropped.is_empty());
    }
}
