//! Specification object types - the nodes of the type hierarchy

use crate::config::ContainerSet;
use crate::container::FeatureContainer;
use crate::document::{Child, Entry};
use crate::feature::{Ability, Modifier, Turn};
use crate::scope::{self, Scope, ScopeTarget};
use crate::Id;

/// One named, inheritable rule type (a unit type, a building type, ...)
///
/// Besides the current feature and scope state, a type keeps the ordered log
/// of the edits its own document elements made. Inheritance is resolved by
/// starting from the parent's resolved state and replaying that log, so a
/// child can delete or override what its parent grants, and resolving twice
/// gives the same result.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecType {
    id: Id,
    tag: String,
    category: String,
    is_abstract: bool,
    extends: Option<Id>,
    /// Created on first use
    features: Option<FeatureContainer>,
    scopes: Vec<Scope>,
    /// Definition order; stable within one load of one ruleset revision
    index: usize,
    edits: Vec<Child>,
}

impl SpecType {
    pub(crate) fn new(
        id: Id,
        tag: impl Into<String>,
        category: impl Into<String>,
        index: usize,
    ) -> Self {
        Self {
            id,
            tag: tag.into(),
            category: category.into(),
            is_abstract: false,
            extends: None,
            features: None,
            scopes: Vec::new(),
            index,
            edits: Vec::new(),
        }
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    /// Tag of the element that defined this type, e.g. `unit-type`
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Tag of the section that defined this type, e.g. `unit-types`
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Is this an inheritance-only type?
    pub fn is_abstract_type(&self) -> bool {
        self.is_abstract
    }

    /// The parent type, if any
    pub fn extends(&self) -> Option<&Id> {
        self.extends.as_ref()
    }

    pub fn name_key(&self) -> String {
        self.id.name_key()
    }

    pub fn description_key(&self) -> String {
        self.id.description_key()
    }

    /// The feature container, if any feature was ever added
    pub fn features(&self) -> Option<&FeatureContainer> {
        self.features.as_ref()
    }

    pub fn abilities(&self) -> impl Iterator<Item = &Ability> {
        self.features.iter().flat_map(FeatureContainer::abilities)
    }

    pub fn modifiers(&self) -> impl Iterator<Item = &Modifier> {
        self.features.iter().flat_map(FeatureContainer::modifiers)
    }

    pub fn abilities_with_id(&self, id: &Id) -> &[Ability] {
        match &self.features {
            Some(features) => features.abilities_with_id(id),
            None => &[],
        }
    }

    pub fn modifiers_with_id(&self, id: &Id) -> &[Modifier] {
        match &self.features {
            Some(features) => features.modifiers_with_id(id),
            None => &[],
        }
    }

    /// See [`FeatureContainer::has_ability`]
    pub fn has_ability(
        &self,
        id: &Id,
        candidate: Option<&dyn ScopeTarget>,
        turn: Option<Turn>,
    ) -> bool {
        self.features
            .as_ref()
            .is_some_and(|f| f.has_ability(id, candidate, turn))
    }

    /// See [`FeatureContainer::apply_modifiers`]
    pub fn apply_modifiers(
        &self,
        base: f32,
        id: &Id,
        candidate: Option<&dyn ScopeTarget>,
        turn: Option<Turn>,
    ) -> f32 {
        match &self.features {
            Some(features) => features.apply_modifiers(base, id, candidate, turn),
            None => base,
        }
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Does at least one of this type's scopes apply to the candidate
    ///
    /// A type without scopes applies to everything.
    pub fn applies_to(&self, candidate: Option<&dyn ScopeTarget>) -> bool {
        scope::applies_to(&self.scopes, candidate)
    }

    /// Feature records the type's own elements added, for reference checks
    pub(crate) fn local_features(&self) -> impl Iterator<Item = (&'static str, Option<&Id>)> {
        self.edits.iter().filter_map(|edit| match edit {
            Child::Ability(Entry::Add(a)) => Some(("ability", a.source.as_ref())),
            Child::Modifier(Entry::Add(m)) => Some(("modifier", m.source.as_ref())),
            _ => None,
        })
    }

    pub(crate) fn set_abstract(&mut self, is_abstract: bool) {
        self.is_abstract = is_abstract;
    }

    pub(crate) fn set_extends(&mut self, parent: Option<Id>) {
        self.extends = parent;
    }

    /// Move the type to the element and section tags of a redefinition
    pub(crate) fn set_origin(&mut self, tag: impl Into<String>, category: impl Into<String>) {
        self.tag = tag.into();
        self.category = category.into();
    }

    /// Apply one child element and record it in the edit log
    ///
    /// A feature without an explicit source gets this type as its source.
    pub(crate) fn apply(&mut self, child: Child) {
        let child = match child {
            Child::Unknown(_) => return,
            Child::Ability(Entry::Add(mut ability)) => {
                ability.source.get_or_insert_with(|| self.id.clone());
                Child::Ability(Entry::Add(ability))
            }
            Child::Modifier(Entry::Add(mut modifier)) => {
                modifier.source.get_or_insert_with(|| self.id.clone());
                Child::Modifier(Entry::Add(modifier))
            }
            other => other,
        };
        self.replay(&child);
        self.edits.push(child);
    }

    /// Reset the selected containers, forgetting the edits that filled them
    pub(crate) fn clear_containers(&mut self, clears: ContainerSet) {
        if let Some(features) = &mut self.features {
            match (clears.abilities, clears.modifiers) {
                (true, true) => features.clear(),
                (true, false) => features.clear_abilities(),
                (false, true) => features.clear_modifiers(),
                (false, false) => {}
            }
        }
        if clears.scopes {
            self.scopes.clear();
        }
        self.edits.retain(|edit| match edit {
            Child::Ability(_) => !clears.abilities,
            Child::Modifier(_) => !clears.modifiers,
            Child::Scope(_) => !clears.scopes,
            Child::Unknown(_) => false,
        });
    }

    /// Rebuild features and scopes from an inherited base plus the edit log
    pub(crate) fn rebuild(&mut self, features: Option<FeatureContainer>, scopes: Vec<Scope>) {
        self.features = features;
        self.scopes = scopes;
        let edits = std::mem::take(&mut self.edits);
        for edit in &edits {
            self.replay(edit);
        }
        self.edits = edits;
    }

    fn replay(&mut self, edit: &Child) {
        match edit {
            Child::Ability(Entry::Add(ability)) => {
                self.features_mut().add_ability(ability.clone());
            }
            Child::Ability(Entry::Delete(id)) => {
                if let Some(features) = &mut self.features {
                    features.remove_abilities(id);
                }
            }
            Child::Modifier(Entry::Add(modifier)) => {
                self.features_mut().add_modifier(modifier.clone());
            }
            Child::Modifier(Entry::Delete(id)) => {
                if let Some(features) = &mut self.features {
                    features.remove_modifiers(id);
                }
            }
            Child::Scope(scope) => self.scopes.push(scope.clone()),
            Child::Unknown(_) => {}
        }
    }

    fn features_mut(&mut self) -> &mut FeatureContainer {
        self.features.get_or_insert_with(FeatureContainer::new)
    }
}

impl ScopeTarget for SpecType {
    fn type_id(&self) -> Option<&Id> {
        Some(&self.id)
    }

    fn has_ability(&self, id: &Id) -> bool {
        SpecType::has_ability(self, id, None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::ModifierType;

    fn colonist() -> SpecType {
        SpecType::new(Id::new("model.unit.freeColonist"), "unit-type", "unit-types", 0)
    }

    #[test]
    fn test_container_created_lazily() {
        let mut unit = colonist();
        assert!(unit.features().is_none());
        assert_eq!(unit.abilities().count(), 0);
        assert!(unit.abilities_with_id(&Id::new("x")).is_empty());

        unit.apply(Child::Ability(Entry::Delete(Id::new("x"))));
        assert!(unit.features().is_none());

        unit.apply(Child::Ability(Entry::Add(Ability::new("x", true))));
        assert!(unit.features().is_some());
    }

    #[test]
    fn test_implicit_source() {
        let mut unit = colonist();
        unit.apply(Child::Ability(Entry::Add(Ability::new("model.ability.bornInColony", true))));
        unit.apply(Child::Modifier(Entry::Add(
            Modifier::new("model.modifier.offence", 1.0, ModifierType::Additive)
                .with_source("model.unit.veteranSoldier"),
        )));

        let ability = unit.abilities().next().unwrap();
        assert_eq!(ability.source.as_ref(), Some(unit.id()));
        let modifier = unit.modifiers().next().unwrap();
        assert_eq!(modifier.source, Some(Id::new("model.unit.veteranSoldier")));
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let mut base = FeatureContainer::new();
        base.add_ability(Ability::new("model.ability.canBeEquipped", true).with_source("parent"));
        base.add_ability(Ability::new("model.ability.bornInColony", true).with_source("parent"));

        let mut unit = colonist();
        unit.apply(Child::Ability(Entry::Delete(Id::new("model.ability.canBeEquipped"))));
        unit.apply(Child::Scope(Scope::for_type("model.unit.freeColonist")));

        for _ in 0..2 {
            unit.rebuild(Some(base.clone()), vec![Scope::for_type("parent")]);
            let ids: Vec<_> = unit.abilities().map(|a| a.id.as_str()).collect();
            assert_eq!(ids, vec!["model.ability.bornInColony"]);
            assert_eq!(unit.scopes().len(), 2);
        }
    }

    #[test]
    fn test_clear_containers_by_category() {
        let mut unit = colonist();
        unit.apply(Child::Ability(Entry::Add(Ability::new("a", true))));
        unit.apply(Child::Modifier(Entry::Add(Modifier::new(
            "m",
            1.0,
            ModifierType::Additive,
        ))));
        unit.apply(Child::Scope(Scope::default()));

        unit.clear_containers(ContainerSet {
            abilities: false,
            modifiers: true,
            scopes: true,
        });
        assert_eq!(unit.abilities().count(), 1);
        assert_eq!(unit.modifiers().count(), 0);
        assert!(unit.scopes().is_empty());

        // The log forgot the cleared edits too
        unit.rebuild(None, Vec::new());
        assert_eq!(unit.abilities().count(), 1);
        assert_eq!(unit.modifiers().count(), 0);
    }

    #[test]
    fn test_clear_all_containers() {
        let mut unit = colonist();
        unit.apply(Child::Ability(Entry::Add(Ability::new("a", true))));
        unit.apply(Child::Modifier(Entry::Add(Modifier::new(
            "m",
            1.0,
            ModifierType::Additive,
        ))));
        unit.apply(Child::Scope(Scope::default()));

        unit.clear_containers(ContainerSet::ALL);
        assert!(unit.features().is_some_and(FeatureContainer::is_empty));
        assert!(unit.scopes().is_empty());

        unit.rebuild(None, Vec::new());
        assert!(unit.features().is_none());
    }

    #[test]
    fn test_modifier_delete_drops_inherited_variants() {
        let mut base = FeatureContainer::new();
        base.add_modifier(
            Modifier::new("model.modifier.offence", 1.0, ModifierType::Additive).with_source("parent"),
        );
        base.add_modifier(
            Modifier::new("model.modifier.offence", 50.0, ModifierType::Percentage)
                .with_source("parent")
                .with_scope(Scope::for_type("model.unit.artillery")),
        );
        base.add_modifier(
            Modifier::new("model.modifier.defence", 1.0, ModifierType::Additive).with_source("parent"),
        );

        let mut unit = colonist();
        unit.apply(Child::Modifier(Entry::Delete(Id::new("model.modifier.offence"))));
        unit.rebuild(Some(base), Vec::new());

        let ids: Vec<_> = unit.modifiers().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["model.modifier.defence"]);
        assert!(unit.modifiers_with_id(&Id::new("model.modifier.offence")).is_empty());
    }

    #[test]
    fn test_type_as_scope_target() {
        let mut unit = colonist();
        unit.apply(Child::Ability(Entry::Add(Ability::new("model.ability.canBeCaptured", true))));

        let by_type = Scope::for_type("model.unit.freeColonist");
        let by_ability = Scope::with_ability("model.ability.canBeCaptured", true);
        assert!(by_type.matches(Some(&unit)));
        assert!(by_ability.matches(Some(&unit)));
        assert_eq!(unit.name_key(), "model.unit.freeColonist.name");
    }
}
