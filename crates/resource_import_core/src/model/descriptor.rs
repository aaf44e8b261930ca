//! Input descriptor for one curated resource.
//!
//! # Responsibility
//! - Mirror one mapping from the resources file.
//! - Apply input defaults (`languages`, `notes`, counters) at parse time.
//! - Reject descriptors that the catalog schema cannot store.
//!
//! # Invariants
//! - `languages` preserves input order.
//! - Explicit `null` for a defaulted field is treated like an absent key.
//! - Field contents (url shape, blank names, counter signs) are stored as
//!   given; only shapes that would violate a schema key are rejected.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One resource entry as read from the input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub name: String,
    /// Dedup and match key.
    pub url: String,
    /// Category name; resolved to a `Category` entity during import.
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages: Vec<String>,
    /// `None` means "unknown", not "free".
    #[serde(default)]
    pub paid: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
    /// Only applied when the resource is created.
    #[serde(default, deserialize_with = "null_as_default")]
    pub upvotes: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub downvotes: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub times_clicked: i64,
}

/// Descriptor shapes the catalog schema cannot store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorValidationError {
    /// One resource can link a language only once.
    DuplicateLanguage(String),
}

impl Display for DescriptorValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateLanguage(name) => {
                write!(f, "language `{name}` is listed more than once")
            }
        }
    }
}

impl Error for DescriptorValidationError {}

impl ResourceDescriptor {
    /// Creates a descriptor with required fields and input defaults.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            category: category.into(),
            languages: Vec::new(),
            paid: None,
            notes: String::new(),
            upvotes: 0,
            downvotes: 0,
            times_clicked: 0,
        }
    }

    /// Builder-style helper used by callers that assemble descriptors in code.
    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    /// Checks that the descriptor can be stored.
    ///
    /// # Errors
    /// - A language name repeated within `languages`.
    pub fn validate(&self) -> Result<(), DescriptorValidationError> {
        let mut seen = HashSet::new();
        for language in &self.languages {
            if !seen.insert(language.as_str()) {
                return Err(DescriptorValidationError::DuplicateLanguage(
                    language.clone(),
                ));
            }
        }
        Ok(())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
