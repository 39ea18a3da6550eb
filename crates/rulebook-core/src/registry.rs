//! The specification registry
//!
//! Lifecycle: construct, [`load`](Specification::load) any number of
//! documents, [`finalize`](Specification::finalize), then share read-only.
//! A finalized specification rejects further loads until it is
//! [reopened](Specification::reopen).

use crate::config::LoadOptions;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::feature::{Ability, Modifier};
use crate::merge::{LoadReport, MergeEngine};
use crate::resolve;
use crate::scope::ScopeTarget;
use crate::spec_type::SpecType;
use crate::Id;
use indexmap::IndexMap;
use std::sync::Arc;

/// Lifecycle state of a specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Documents may be loaded; types may be unresolved
    #[default]
    Loading,
    /// Resolved, abstract types purged, read-only
    Finalized,
}

/// Registry of all specification types
#[derive(Debug, Clone, Default)]
pub struct Specification {
    /// Types by id, kept in index order
    types: IndexMap<Id, SpecType>,
    /// Abstract types removed by finalize, kept for later re-resolution
    purged: IndexMap<Id, SpecType>,
    /// Ability id -> types carrying it
    ability_index: IndexMap<Id, Vec<Id>>,
    /// Modifier id -> types carrying it
    modifier_index: IndexMap<Id, Vec<Id>>,
    next_index: usize,
    phase: Phase,
    options: LoadOptions,
}

impl Specification {
    /// Create an empty specification with default load options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty specification with the given load options
    pub fn with_options(options: LoadOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finalized(&self) -> bool {
        self.phase == Phase::Finalized
    }

    /// Merge a document into the current state
    ///
    /// The document is validated before anything is touched: a malformed
    /// document leaves the specification exactly as it was.
    pub fn load(&mut self, document: &Document) -> Result<LoadReport> {
        if self.is_finalized() {
            return Err(Error::Frozen);
        }
        document.validate()?;

        let report =
            MergeEngine::new(&mut self.types, &mut self.next_index, &self.options).merge(document);
        tracing::debug!(
            created = report.created,
            patched = report.patched,
            redefined = report.redefined,
            ignored = report.ignored,
            "loaded document"
        );
        Ok(report)
    }

    /// Resolve inheritance, purge abstract types and freeze
    ///
    /// On error nothing changes and the specification stays in the loading
    /// phase, so corrected documents can be loaded before trying again.
    pub fn finalize(&mut self) -> Result<()> {
        if self.is_finalized() {
            return Ok(());
        }
        resolve::resolve(&mut self.types)?;

        let types = std::mem::take(&mut self.types);
        for (id, spec_type) in types {
            if spec_type.is_abstract_type() {
                self.purged.insert(id, spec_type);
            } else {
                self.types.insert(id, spec_type);
            }
        }
        self.rebuild_indexes();
        self.phase = Phase::Finalized;

        tracing::info!(
            types = self.types.len(),
            purged = self.purged.len(),
            "specification finalized"
        );
        Ok(())
    }

    /// Return a finalized specification to the loading phase
    ///
    /// Purged abstract types become visible again so that override documents
    /// can extend them; they are purged anew by the next finalize.
    pub fn reopen(&mut self) {
        if !self.is_finalized() {
            return;
        }
        self.types.extend(self.purged.drain(..));
        self.types.sort_by(|_, a, _, b| a.index().cmp(&b.index()));
        self.ability_index.clear();
        self.modifier_index.clear();
        self.phase = Phase::Loading;
        tracing::debug!("specification reopened");
    }

    /// Wrap a finalized specification for shared read-only use
    pub fn share(self) -> Result<Arc<Self>> {
        if !self.is_finalized() {
            return Err(Error::NotFinalized);
        }
        Ok(Arc::new(self))
    }

    fn rebuild_indexes(&mut self) {
        self.ability_index.clear();
        self.modifier_index.clear();
        for (id, spec_type) in &self.types {
            if let Some(features) = spec_type.features() {
                for ability_id in features.ability_ids() {
                    self.ability_index
                        .entry(ability_id.clone())
                        .or_default()
                        .push(id.clone());
                }
                for modifier_id in features.modifier_ids() {
                    self.modifier_index
                        .entry(modifier_id.clone())
                        .or_default()
                        .push(id.clone());
                }
            }
        }
    }

    // === Queries ===

    /// Get a type by id
    ///
    /// Abstract types are found while loading but not after finalize.
    pub fn get(&self, id: &str) -> Result<&SpecType> {
        self.types
            .get(id)
            .ok_or_else(|| Error::QueryNotFound(Id::new(id)))
    }

    /// Get a type by id, if present
    pub fn find(&self, id: &str) -> Option<&SpecType> {
        self.types.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.types.contains_key(id)
    }

    /// All abilities of a type
    pub fn get_abilities(&self, type_id: &str) -> Result<Vec<&Ability>> {
        Ok(self.get(type_id)?.abilities().collect())
    }

    /// All modifiers of a type
    pub fn get_modifiers(&self, type_id: &str) -> Result<Vec<&Modifier>> {
        Ok(self.get(type_id)?.modifiers().collect())
    }

    /// Whether a type's scopes admit the candidate
    pub fn applies_to(&self, type_id: &str, candidate: Option<&dyn ScopeTarget>) -> Result<bool> {
        Ok(self.get(type_id)?.applies_to(candidate))
    }

    /// All queryable types in index order
    pub fn types(&self) -> impl Iterator<Item = &SpecType> {
        self.types.values()
    }

    /// Queryable types of one category in index order
    pub fn types_in<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a SpecType> + 'a {
        self.types().filter(move |t| t.category() == category)
    }

    /// Types carrying an ability (available once finalized)
    pub fn types_with_ability(&self, ability_id: &str) -> &[Id] {
        self.ability_index
            .get(ability_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Types carrying a modifier (available once finalized)
    pub fn types_with_modifier(&self, modifier_id: &str) -> &[Id] {
        self.modifier_index
            .get(modifier_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of queryable types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
