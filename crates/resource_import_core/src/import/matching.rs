//! Equality check between an input descriptor and a persisted resource.

use crate::model::descriptor::ResourceDescriptor;
use crate::model::resource::{Language, Resource};

/// Returns `true` when persisting `descriptor` would not change `existing`.
///
/// Compares `name`, `paid`, `notes`, category name and the resolved language
/// sequence (ordered, by id). Counters and `url` are not compared.
pub fn descriptor_matches(
    descriptor: &ResourceDescriptor,
    existing: &Resource,
    languages: &[Language],
) -> bool {
    if descriptor.name != existing.name {
        return false;
    }
    if descriptor.paid != existing.paid {
        return false;
    }
    if descriptor.notes != existing.notes {
        return false;
    }
    if descriptor.category != existing.category.name {
        return false;
    }
    languages
        .iter()
        .map(|language| language.id)
        .eq(existing.languages.iter().map(|language| language.id))
}

#[cfg(test)]
mod tests {
    use super::descriptor_matches;
    use crate::model::descriptor::ResourceDescriptor;
    use crate::model::resource::{Category, Language, Resource};

    fn language(id: i64, name: &str) -> Language {
        Language {
            id,
            name: name.to_string(),
        }
    }

    fn existing() -> Resource {
        let descriptor = ResourceDescriptor::new("A", "http://a", "X");
        let category = Category {
            id: 1,
            name: "X".to_string(),
        };
        Resource::from_descriptor(
            &descriptor,
            category,
            vec![language(1, "Go"), language(2, "C")],
        )
    }

    #[test]
    fn identical_fields_match() {
        let descriptor = ResourceDescriptor::new("A", "http://a", "X");
        let resource = existing();
        assert!(descriptor_matches(&descriptor, &resource, &resource.languages));
    }

    #[test]
    fn each_compared_field_breaks_the_match() {
        let resource = existing();
        let langs = resource.languages.clone();

        let mut renamed = ResourceDescriptor::new("A", "http://a", "X");
        renamed.name = "B".to_string();
        assert!(!descriptor_matches(&renamed, &resource, &langs));

        let mut paid = ResourceDescriptor::new("A", "http://a", "X");
        paid.paid = Some(true);
        assert!(!descriptor_matches(&paid, &resource, &langs));

        let mut notes = ResourceDescriptor::new("A", "http://a", "X");
        notes.notes = "new".to_string();
        assert!(!descriptor_matches(&notes, &resource, &langs));

        let recategorized = ResourceDescriptor::new("A", "http://a", "Y");
        assert!(!descriptor_matches(&recategorized, &resource, &langs));
    }

    #[test]
    fn language_order_matters() {
        let descriptor = ResourceDescriptor::new("A", "http://a", "X");
        let resource = existing();
        let reordered = vec![language(2, "C"), language(1, "Go")];
        assert!(!descriptor_matches(&descriptor, &resource, &reordered));
        assert!(!descriptor_matches(&descriptor, &resource, &[]));
    }

    #[test]
    fn counters_are_not_compared() {
        let mut descriptor = ResourceDescriptor::new("A", "http://a", "X");
        descriptor.upvotes = 99;
        let resource = existing();
        assert!(descriptor_matches(&descriptor, &resource, &resource.languages));
    }
}
