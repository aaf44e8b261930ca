//! Per-descriptor create-or-update against the catalog.
//!
//! # Responsibility
//! - Decide create vs update vs no-op for one descriptor.
//! - Persist the change through the repository, one transaction per resource.
//!
//! # Invariants
//! - An existing resource that already matches is never written.
//! - Updates never overwrite `upvotes`, `downvotes` or `times_clicked`.
//! - The in-memory `existing` map only changes after a successful commit.

use crate::import::lookup::ResolvedLookups;
use crate::import::matching::descriptor_matches;
use crate::model::descriptor::{DescriptorValidationError, ResourceDescriptor};
use crate::model::resource::{Resource, ResourceId};
use crate::repo::catalog_repo::{CatalogRepository, RepoError};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Successful terminal state for one descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Created(ResourceId),
    Updated(ResourceId),
    Unchanged(ResourceId),
}

/// Failed terminal state for one descriptor.
///
/// Failures are contained to the descriptor that raised them.
#[derive(Debug)]
pub enum ReconcileFailure {
    /// Descriptor shape was rejected before touching storage.
    InvalidDescriptor(DescriptorValidationError),
    /// Category/language upsert failed.
    Lookup(RepoError),
    /// Resource insert/update failed and was rolled back.
    StorageWrite(RepoError),
}

impl Display for ReconcileFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDescriptor(err) => write!(f, "invalid descriptor: {err}"),
            Self::Lookup(err) => write!(f, "lookup resolution failed: {err}"),
            Self::StorageWrite(err) => write!(f, "storage write failed: {err}"),
        }
    }
}

impl Error for ReconcileFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDescriptor(err) => Some(err),
            Self::Lookup(err) => Some(err),
            Self::StorageWrite(err) => Some(err),
        }
    }
}

impl From<DescriptorValidationError> for ReconcileFailure {
    fn from(value: DescriptorValidationError) -> Self {
        Self::InvalidDescriptor(value)
    }
}

/// Creates or updates the resource described by `descriptor`.
///
/// `existing` maps url to the persisted resource; it is updated in place
/// after every successful write.
pub fn reconcile_descriptor<R>(
    repo: &mut R,
    existing: &mut HashMap<String, Resource>,
    descriptor: &ResourceDescriptor,
    lookups: ResolvedLookups,
) -> Result<ReconcileOutcome, ReconcileFailure>
where
    R: CatalogRepository + ?Sized,
{
    match existing.get(descriptor.url.as_str()).cloned() {
        Some(current) => update_resource(repo, existing, current, descriptor, lookups),
        None => create_resource(repo, existing, descriptor, lookups),
    }
}

fn create_resource<R>(
    repo: &mut R,
    existing: &mut HashMap<String, Resource>,
    descriptor: &ResourceDescriptor,
    lookups: ResolvedLookups,
) -> Result<ReconcileOutcome, ReconcileFailure>
where
    R: CatalogRepository + ?Sized,
{
    let resource = Resource::from_descriptor(descriptor, lookups.category, lookups.languages);
    let id = repo
        .insert_resource(&resource)
        .map_err(ReconcileFailure::StorageWrite)?;
    existing.insert(resource.url.clone(), resource);
    Ok(ReconcileOutcome::Created(id))
}

fn update_resource<R>(
    repo: &mut R,
    existing: &mut HashMap<String, Resource>,
    mut current: Resource,
    descriptor: &ResourceDescriptor,
    lookups: ResolvedLookups,
) -> Result<ReconcileOutcome, ReconcileFailure>
where
    R: CatalogRepository + ?Sized,
{
    if descriptor_matches(descriptor, &current, &lookups.languages) {
        return Ok(ReconcileOutcome::Unchanged(current.uuid));
    }

    current.apply_descriptor(descriptor, lookups.category, lookups.languages);
    repo.update_resource(&current)
        .map_err(ReconcileFailure::StorageWrite)?;
    let id = current.uuid;
    existing.insert(current.url.clone(), current);
    Ok(ReconcileOutcome::Updated(id))
}
