//! Category/language resolution with per-run caches.
//!
//! # Responsibility
//! - Map descriptor category/language names to persisted entities.
//! - Create missing entities on first reference through the repository.
//!
//! # Invariants
//! - At most one entity exists per distinct name, in the cache and in the
//!   store.
//! - Every entity handed out already has a persisted id.
//! - Language order follows descriptor order.

use crate::model::descriptor::ResourceDescriptor;
use crate::model::resource::{Category, Language};
use crate::repo::catalog_repo::{CatalogRepository, RepoResult};
use log::debug;
use std::collections::HashMap;

/// Entities resolved for one descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLookups {
    pub category: Category,
    pub languages: Vec<Language>,
}

/// Name-keyed caches of lookup entities for one import run.
#[derive(Debug, Clone, Default)]
pub struct LookupCache {
    categories: HashMap<String, Category>,
    languages: HashMap<String, Language>,
}

impl LookupCache {
    /// Seeds the caches from the store's current contents.
    pub fn new(categories: Vec<Category>, languages: Vec<Language>) -> Self {
        Self {
            categories: categories
                .into_iter()
                .map(|category| (category.name.clone(), category))
                .collect(),
            languages: languages
                .into_iter()
                .map(|language| (language.name.clone(), language))
                .collect(),
        }
    }

    /// Resolves the category and ordered languages for one descriptor.
    pub fn resolve<R>(
        &mut self,
        repo: &mut R,
        descriptor: &ResourceDescriptor,
    ) -> RepoResult<ResolvedLookups>
    where
        R: CatalogRepository + ?Sized,
    {
        let category = self.resolve_category(repo, descriptor.category.as_str())?;
        let languages = self.resolve_languages(repo, &descriptor.languages)?;
        Ok(ResolvedLookups {
            category,
            languages,
        })
    }

    /// Returns the cached category or upserts it on first reference.
    pub fn resolve_category<R>(&mut self, repo: &mut R, name: &str) -> RepoResult<Category>
    where
        R: CatalogRepository + ?Sized,
    {
        if let Some(category) = self.categories.get(name) {
            return Ok(category.clone());
        }

        let category = repo.ensure_category(name)?;
        debug!(
            "event=lookup_create module=import kind=category id={} name={}",
            category.id, category.name
        );
        self.categories.insert(name.to_string(), category.clone());
        Ok(category)
    }

    /// Returns languages in input order, upserting unknown names.
    pub fn resolve_languages<R>(
        &mut self,
        repo: &mut R,
        names: &[String],
    ) -> RepoResult<Vec<Language>>
    where
        R: CatalogRepository + ?Sized,
    {
        let mut resolved = Vec::with_capacity(names.len());
        for name in names {
            if let Some(language) = self.languages.get(name.as_str()) {
                resolved.push(language.clone());
                continue;
            }

            let language = repo.ensure_language(name)?;
            debug!(
                "event=lookup_create module=import kind=language id={} name={}",
                language.id, language.name
            );
            self.languages.insert(name.clone(), language.clone());
            resolved.push(language);
        }
        Ok(resolved)
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn language_count(&self) -> usize {
        self.languages.len()
    }
}
