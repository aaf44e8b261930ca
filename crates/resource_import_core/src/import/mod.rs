//! Resource import pipeline.
//!
//! # Responsibility
//! - Run one synchronization pass: dedup, resolve lookups, reconcile.
//! - Report a typed terminal state for every input descriptor.
//!
//! # Invariants
//! - The pass is sequential; lookup caches are owned by one `ImportContext`.
//! - A failing descriptor never aborts the run.
//! - A failing initial bulk read aborts the run before any write.
//!
//! Descriptor lifecycle:
//! `Loaded -> Deduplicated(kept|dropped) -> Resolved -> Created|Updated|Unchanged|Failed`.

pub mod dedup;
pub mod lookup;
pub mod matching;
pub mod reconcile;

use crate::input::loader::{load_descriptors, InputError};
use crate::logging::sanitize_message;
use crate::model::descriptor::ResourceDescriptor;
use crate::model::resource::{Resource, ResourceId};
use crate::repo::catalog_repo::{CatalogRepository, RepoError, SqliteCatalogRepository};
use dedup::remove_duplicates;
use log::{error, info, warn};
use lookup::LookupCache;
use reconcile::{reconcile_descriptor, ReconcileFailure, ReconcileOutcome};
use rusqlite::Connection;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Instant;

const MAX_LOGGED_DESCRIPTOR_CHARS: usize = 400;

/// Run-level errors. Per-descriptor failures are reported in `ImportReport`.
#[derive(Debug)]
pub enum ImportError {
    /// Initial bulk read of existing catalog rows failed.
    StorageRead(RepoError),
    /// Resources file could not be loaded.
    Load(InputError),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageRead(err) => write!(f, "failed to read existing catalog: {err}"),
            Self::Load(err) => write!(f, "failed to load resources: {err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageRead(err) => Some(err),
            Self::Load(err) => Some(err),
        }
    }
}

impl From<InputError> for ImportError {
    fn from(value: InputError) -> Self {
        Self::Load(value)
    }
}

/// Terminal state of one input descriptor.
#[derive(Debug)]
pub enum DescriptorStatus {
    Created(ResourceId),
    Updated(ResourceId),
    Unchanged(ResourceId),
    /// Later duplicate of an url seen earlier in the input.
    Dropped,
    Failed(ReconcileFailure),
}

impl From<ReconcileOutcome> for DescriptorStatus {
    fn from(value: ReconcileOutcome) -> Self {
        match value {
            ReconcileOutcome::Created(id) => Self::Created(id),
            ReconcileOutcome::Updated(id) => Self::Updated(id),
            ReconcileOutcome::Unchanged(id) => Self::Unchanged(id),
        }
    }
}

/// Outcome of one descriptor, keyed by its url.
#[derive(Debug)]
pub struct DescriptorOutcome {
    pub url: String,
    pub status: DescriptorStatus,
}

/// Counters derived from an `ImportReport`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub dropped: usize,
    pub failed: usize,
}

impl ImportSummary {
    /// Number of resource writes committed during the run.
    pub fn writes(&self) -> usize {
        self.created + self.updated
    }

    pub fn total(&self) -> usize {
        self.created + self.updated + self.unchanged + self.dropped + self.failed
    }
}

impl Display for ImportSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "created={} updated={} unchanged={} dropped={} failed={}",
            self.created, self.updated, self.unchanged, self.dropped, self.failed
        )
    }
}

/// Per-descriptor results of one import run, in processing order.
///
/// Kept descriptors come first in input order, then dropped duplicates.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub outcomes: Vec<DescriptorOutcome>,
}

impl ImportReport {
    pub fn summary(&self) -> ImportSummary {
        let mut summary = ImportSummary::default();
        for outcome in &self.outcomes {
            match outcome.status {
                DescriptorStatus::Created(_) => summary.created += 1,
                DescriptorStatus::Updated(_) => summary.updated += 1,
                DescriptorStatus::Unchanged(_) => summary.unchanged += 1,
                DescriptorStatus::Dropped => summary.dropped += 1,
                DescriptorStatus::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }

    /// Iterates over failed descriptors and their failure.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &ReconcileFailure)> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match &outcome.status {
                DescriptorStatus::Failed(failure) => Some((outcome.url.as_str(), failure)),
                _ => None,
            })
    }

    /// Returns the status recorded for the first outcome with `url`.
    pub fn status_of(&self, url: &str) -> Option<&DescriptorStatus> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.url == url)
            .map(|outcome| &outcome.status)
    }
}

/// State of one import run: repository handle, lookup caches and the
/// existing resources keyed by url.
///
/// Built once per run by `ImportContext::load` and dropped at the end.
pub struct ImportContext<'r, R: CatalogRepository + ?Sized> {
    repo: &'r mut R,
    lookups: LookupCache,
    existing: HashMap<String, Resource>,
}

impl<'r, R: CatalogRepository + ?Sized> ImportContext<'r, R> {
    /// Reads existing resources, categories and languages from the store.
    ///
    /// # Errors
    /// - `ImportError::StorageRead` when any bulk read fails.
    pub fn load(repo: &'r mut R) -> Result<Self, ImportError> {
        let resources = repo.list_resources().map_err(ImportError::StorageRead)?;
        let categories = repo.list_categories().map_err(ImportError::StorageRead)?;
        let languages = repo.list_languages().map_err(ImportError::StorageRead)?;

        info!(
            "event=import_context module=import status=ok resources={} categories={} languages={}",
            resources.len(),
            categories.len(),
            languages.len()
        );

        Ok(Self {
            repo,
            lookups: LookupCache::new(categories, languages),
            existing: resources
                .into_iter()
                .map(|resource| (resource.url.clone(), resource))
                .collect(),
        })
    }

    /// Processes one deduplicated descriptor to its terminal state.
    pub fn process(&mut self, descriptor: &ResourceDescriptor) -> DescriptorStatus {
        let is_update = self.existing.contains_key(descriptor.url.as_str());
        match self.try_process(descriptor) {
            Ok(outcome) => outcome.into(),
            Err(failure) => {
                let event = if is_update {
                    "resource_update"
                } else {
                    "resource_create"
                };
                error!(
                    "event={} module=import status=error url={} error={} descriptor={}",
                    event,
                    descriptor.url,
                    failure,
                    describe_descriptor(descriptor)
                );
                DescriptorStatus::Failed(failure)
            }
        }
    }

    fn try_process(
        &mut self,
        descriptor: &ResourceDescriptor,
    ) -> Result<ReconcileOutcome, ReconcileFailure> {
        descriptor.validate()?;
        let lookups = self
            .lookups
            .resolve(&mut *self.repo, descriptor)
            .map_err(ReconcileFailure::Lookup)?;
        reconcile_descriptor(&mut *self.repo, &mut self.existing, descriptor, lookups)
    }

    pub fn lookups(&self) -> &LookupCache {
        &self.lookups
    }
}

/// Runs one import pass over `descriptors`.
///
/// # Errors
/// - `ImportError::StorageRead` when existing catalog rows cannot be read;
///   nothing is written in that case.
pub fn run_import<R>(
    repo: &mut R,
    descriptors: Vec<ResourceDescriptor>,
) -> Result<ImportReport, ImportError>
where
    R: CatalogRepository + ?Sized,
{
    let started_at = Instant::now();
    let loaded = descriptors.len();
    info!("event=import_run module=import status=start descriptors={loaded}");

    let deduplicated = remove_duplicates(descriptors);
    if !deduplicated.dropped.is_empty() {
        warn!(
            "event=import_dedup module=import status=ok dropped={}",
            deduplicated.dropped.len()
        );
    }

    let mut context = match ImportContext::load(repo) {
        Ok(context) => context,
        Err(err) => {
            error!(
                "event=import_run module=import status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }
    };

    let mut report = ImportReport::default();
    for descriptor in &deduplicated.kept {
        let status = context.process(descriptor);
        report.outcomes.push(DescriptorOutcome {
            url: descriptor.url.clone(),
            status,
        });
    }
    for descriptor in deduplicated.dropped {
        report.outcomes.push(DescriptorOutcome {
            url: descriptor.url,
            status: DescriptorStatus::Dropped,
        });
    }

    let summary = report.summary();
    info!(
        "event=import_run module=import status=ok duration_ms={} {} categories={} languages={}",
        started_at.elapsed().as_millis(),
        summary,
        context.lookups().category_count(),
        context.lookups().language_count()
    );
    Ok(report)
}

/// Renders a descriptor as one bounded JSON line for failure events.
pub(crate) fn describe_descriptor(descriptor: &ResourceDescriptor) -> String {
    let rendered = serde_json::to_string(descriptor)
        .unwrap_or_else(|err| format!("<unserializable descriptor: {err}>"));
    sanitize_message(&rendered, MAX_LOGGED_DESCRIPTOR_CHARS)
}

/// Loads `path` and imports it into the catalog behind `conn`.
pub fn import_file(
    conn: &mut Connection,
    path: impl AsRef<Path>,
) -> Result<ImportReport, ImportError> {
    let descriptors = load_descriptors(path)?;
    let mut repo = SqliteCatalogRepository::try_new(conn).map_err(ImportError::StorageRead)?;
    run_import(&mut repo, descriptors)
}

#[cfg(test)]
mod tests {
    use super::describe_descriptor;
    use crate::model::descriptor::ResourceDescriptor;

    #[test]
    fn descriptor_is_rendered_as_json_mapping() {
        let mut descriptor =
            ResourceDescriptor::new("A", "http://a", "X").with_languages(["Go"]);
        descriptor.notes = "two\nlines".to_string();

        let rendered = describe_descriptor(&descriptor);
        assert!(rendered.starts_with('{'));
        assert!(rendered.contains(r#""url":"http://a""#));
        assert!(rendered.contains(r#""languages":["Go"]"#));
        assert!(!rendered.contains('\n'));
    }

    #[test]
    fn long_descriptor_is_truncated() {
        let mut descriptor = ResourceDescriptor::new("A", "http://a", "X");
        descriptor.notes = "n".repeat(2000);

        let rendered = describe_descriptor(&descriptor);
        assert!(rendered.ends_with("..."));
        assert!(rendered.chars().count() < 500);
    }
}
