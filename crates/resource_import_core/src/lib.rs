//! Core logic for importing curated resources into the catalog store.
//! This crate is the single source of truth for the import invariants.

pub mod config;
pub mod db;
pub mod import;
pub mod input;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::{ConfigError, ImportConfig};
pub use import::dedup::{remove_duplicates, Deduplicated};
pub use import::lookup::{LookupCache, ResolvedLookups};
pub use import::matching::descriptor_matches;
pub use import::reconcile::{reconcile_descriptor, ReconcileFailure, ReconcileOutcome};
pub use import::{
    import_file, run_import, DescriptorOutcome, DescriptorStatus, ImportContext, ImportError,
    ImportReport, ImportSummary,
};
pub use input::loader::{
    load_descriptors, parse_descriptors_json, parse_descriptors_yaml, InputError,
};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::descriptor::{DescriptorValidationError, ResourceDescriptor};
pub use model::resource::{Category, CategoryId, Language, LanguageId, Resource, ResourceId};
pub use repo::catalog_repo::{CatalogRepository, RepoError, RepoResult, SqliteCatalogRepository};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
