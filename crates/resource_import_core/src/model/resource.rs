//! Persisted catalog entities.
//!
//! # Responsibility
//! - Define `Resource` and its lookup entities `Category` / `Language`.
//! - Provide the create/overwrite transitions used by the reconciler.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another resource.
//! - Counters (`upvotes`, `downvotes`, `times_clicked`) are only set at
//!   creation; `apply_descriptor` never touches them.
//! - `languages` keeps association order from input.

use crate::model::descriptor::ResourceDescriptor;
use uuid::Uuid;

/// Stable identifier of a persisted resource.
pub type ResourceId = Uuid;
pub type CategoryId = i64;
pub type LanguageId = i64;

/// Resource category, unique by `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Programming language tag, unique by `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    pub id: LanguageId,
    pub name: String,
}

/// Canonical persisted resource record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub uuid: ResourceId,
    pub name: String,
    pub url: String,
    pub category: Category,
    pub languages: Vec<Language>,
    pub paid: Option<bool>,
    pub notes: String,
    pub upvotes: i64,
    pub downvotes: i64,
    pub times_clicked: i64,
}

impl Resource {
    /// Builds a new, not yet persisted resource from a descriptor.
    ///
    /// Counters are copied from the descriptor (defaulted to 0 at parse time).
    pub fn from_descriptor(
        descriptor: &ResourceDescriptor,
        category: Category,
        languages: Vec<Language>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: descriptor.name.clone(),
            url: descriptor.url.clone(),
            category,
            languages,
            paid: descriptor.paid,
            notes: descriptor.notes.clone(),
            upvotes: descriptor.upvotes,
            downvotes: descriptor.downvotes,
            times_clicked: descriptor.times_clicked,
        }
    }

    /// Overwrites every mutable field from the descriptor.
    ///
    /// Counters keep their persisted values.
    pub fn apply_descriptor(
        &mut self,
        descriptor: &ResourceDescriptor,
        category: Category,
        languages: Vec<Language>,
    ) {
        self.name = descriptor.name.clone();
        self.url = descriptor.url.clone();
        self.category = category;
        self.paid = descriptor.paid;
        self.notes = descriptor.notes.clone();
        self.languages = languages;
    }
}
