//! Per-type storage of abilities and modifiers
//!
//! Entries are grouped by feature id. Several entries may share an id (for
//! instance the same ability granted under different scopes); adding never
//! overwrites, and removing by id drops every variant at once.

use crate::feature::{Ability, Feature, Modifier, Turn};
use crate::scope::ScopeTarget;
use crate::Id;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Abilities and modifiers of one specification type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureContainer {
    abilities: IndexMap<Id, Vec<Ability>>,
    modifiers: IndexMap<Id, Vec<Modifier>>,
}

impl FeatureContainer {
    /// Create an empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an ability next to any existing ones with the same id
    ///
    /// An entry equal to one already present is not stored twice.
    pub fn add_ability(&mut self, ability: Ability) {
        let entries = self.abilities.entry(ability.id.clone()).or_default();
        if !entries.contains(&ability) {
            entries.push(ability);
        }
    }

    /// Add a modifier next to any existing ones with the same id
    pub fn add_modifier(&mut self, modifier: Modifier) {
        let entries = self.modifiers.entry(modifier.id.clone()).or_default();
        if !entries.contains(&modifier) {
            entries.push(modifier);
        }
    }

    /// Remove every ability with the given id, returning how many were removed
    pub fn remove_abilities(&mut self, id: &Id) -> usize {
        self.abilities
            .shift_remove(id)
            .map_or(0, |entries| entries.len())
    }

    /// Remove every modifier with the given id, returning how many were removed
    pub fn remove_modifiers(&mut self, id: &Id) -> usize {
        self.modifiers
            .shift_remove(id)
            .map_or(0, |entries| entries.len())
    }

    /// Remove all abilities
    pub fn clear_abilities(&mut self) {
        self.abilities.clear();
    }

    /// Remove all modifiers
    pub fn clear_modifiers(&mut self) {
        self.modifiers.clear();
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.clear_abilities();
        self.clear_modifiers();
    }

    /// Add every feature of another container
    pub fn add_all(&mut self, other: &FeatureContainer) {
        for ability in other.abilities() {
            self.add_ability(ability.clone());
        }
        for modifier in other.modifiers() {
            self.add_modifier(modifier.clone());
        }
    }

    /// Check if there are no features at all
    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty() && self.modifiers.is_empty()
    }

    /// All abilities, grouped by id in insertion order
    pub fn abilities(&self) -> impl Iterator<Item = &Ability> {
        self.abilities.values().flatten()
    }

    /// All modifiers, grouped by id in insertion order
    pub fn modifiers(&self) -> impl Iterator<Item = &Modifier> {
        self.modifiers.values().flatten()
    }

    /// Abilities with the given id
    pub fn abilities_with_id(&self, id: &Id) -> &[Ability] {
        self.abilities.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Modifiers with the given id
    pub fn modifiers_with_id(&self, id: &Id) -> &[Modifier] {
        self.modifiers.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ids of all abilities present
    pub fn ability_ids(&self) -> impl Iterator<Item = &Id> {
        self.abilities.keys()
    }

    /// Ids of all modifiers present
    pub fn modifier_ids(&self) -> impl Iterator<Item = &Id> {
        self.modifiers.keys()
    }

    /// Whether an ability is in effect
    ///
    /// True when at least one ability with this id applies to the candidate on
    /// the turn, and every applicable one is `true`.
    pub fn has_ability(
        &self,
        id: &Id,
        candidate: Option<&dyn ScopeTarget>,
        turn: Option<Turn>,
    ) -> bool {
        let mut found = false;
        for ability in self
            .abilities_with_id(id)
            .iter()
            .filter(|a| a.active_on(turn) && a.applies_to(candidate))
        {
            if !ability.value {
                return false;
            }
            found = true;
        }
        found
    }

    /// Apply all applicable modifiers with the given id to a base value
    ///
    /// Modifiers are applied in ascending `index` order; ties keep insertion
    /// order.
    pub fn apply_modifiers(
        &self,
        base: f32,
        id: &Id,
        candidate: Option<&dyn ScopeTarget>,
        turn: Option<Turn>,
    ) -> f32 {
        let mut applicable: Vec<&Modifier> = self
            .modifiers_with_id(id)
            .iter()
            .filter(|m| m.active_on(turn) && m.applies_to(candidate))
            .collect();
        applicable.sort_by_key(|m| m.index);
        applicable.iter().fold(base, |value, m| m.apply(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::ModifierType;
    use crate::scope::tests::Dummy;
    use crate::scope::Scope;

    const EXPERT: &str = "model.ability.expertSoldier";

    #[test]
    fn test_add_is_additive() {
        let mut container = FeatureContainer::new();
        container.add_ability(
            Ability::new(EXPERT, true).with_scope(Scope::for_type("model.unit.veteranSoldier")),
        );
        container.add_ability(
            Ability::new(EXPERT, true).with_scope(Scope::for_type("model.unit.continentalArmy")),
        );

        assert_eq!(container.abilities_with_id(&Id::new(EXPERT)).len(), 2);
        assert_eq!(container.abilities().count(), 2);
    }

    #[test]
    fn test_identical_entries_collapse() {
        let mut container = FeatureContainer::new();
        container.add_ability(Ability::new(EXPERT, true));
        container.add_ability(Ability::new(EXPERT, true));
        assert_eq!(container.abilities().count(), 1);
    }

    #[test]
    fn test_remove_by_id_drops_all_variants() {
        let mut container = FeatureContainer::new();
        container.add_ability(Ability::new(EXPERT, true));
        container.add_ability(Ability::new(EXPERT, false).with_scope(Scope::for_type("x")));
        container.add_ability(Ability::new("model.ability.navalUnit", true));

        assert_eq!(container.remove_abilities(&Id::new(EXPERT)), 2);
        assert!(container.abilities_with_id(&Id::new(EXPERT)).is_empty());
        assert_eq!(container.abilities().count(), 1);
        assert_eq!(container.remove_abilities(&Id::new(EXPERT)), 0);
    }

    #[test]
    fn test_remove_modifiers_drops_all_variants() {
        let offence = Id::new("model.modifier.offence");
        let mut container = FeatureContainer::new();
        container.add_modifier(Modifier::new("model.modifier.offence", 1.0, ModifierType::Additive));
        container.add_modifier(
            Modifier::new("model.modifier.offence", 50.0, ModifierType::Percentage)
                .with_scope(Scope::for_type("model.unit.artillery")),
        );
        container.add_modifier(
            Modifier::new("model.modifier.offence", 2.0, ModifierType::Multiplicative)
                .with_scope(Scope::with_ability("model.ability.navalUnit", true)),
        );
        container.add_modifier(Modifier::new("model.modifier.defence", 1.0, ModifierType::Additive));

        assert_eq!(container.remove_modifiers(&offence), 3);
        assert!(container.modifiers_with_id(&offence).is_empty());
        assert_eq!(container.apply_modifiers(2.0, &offence, None, None), 2.0);
        assert_eq!(container.modifiers().count(), 1);
        assert_eq!(container.remove_modifiers(&offence), 0);
    }

    #[test]
    fn test_clear() {
        let mut container = FeatureContainer::new();
        container.add_ability(Ability::new(EXPERT, true));
        container.add_modifier(Modifier::new("model.modifier.offence", 1.0, ModifierType::Additive));
        assert!(!container.is_empty());

        container.clear();
        assert!(container.is_empty());
    }

    #[test]
    fn test_has_ability() {
        let id = Id::new(EXPERT);
        let mut container = FeatureContainer::new();
        assert!(!container.has_ability(&id, None, None));

        container.add_ability(Ability::new(EXPERT, true));
        assert!(container.has_ability(&id, None, None));

        // A scoped denial only bites where it applies
        container.add_ability(
            Ability::new(EXPERT, false).with_scope(Scope::for_type("model.unit.artillery")),
        );
        let artillery = Dummy::of_type("model.unit.artillery");
        let colonist = Dummy::of_type("model.unit.freeColonist");
        assert!(!container.has_ability(&id, Some(&artillery), None));
        assert!(container.has_ability(&id, Some(&colonist), None));
    }

    #[test]
    fn test_apply_modifiers_in_index_order() {
        let id = Id::new("model.modifier.offence");
        let mut container = FeatureContainer::new();
        container.add_modifier(
            Modifier::new("model.modifier.offence", 50.0, ModifierType::Percentage).with_index(2),
        );
        container.add_modifier(
            Modifier::new("model.modifier.offence", 2.0, ModifierType::Additive).with_index(1),
        );

        // (2 + 2) * 1.5
        assert_eq!(container.apply_modifiers(2.0, &id, None, None), 6.0);
    }

    #[test]
    fn test_apply_modifiers_skips_inactive() {
        let id = Id::new("model.modifier.defence");
        let mut container = FeatureContainer::new();
        let mut late = Modifier::new("model.modifier.defence", 100.0, ModifierType::Additive);
        late.first_turn = Some(50);
        container.add_modifier(late);

        assert_eq!(container.apply_modifiers(1.0, &id, None, Some(10)), 1.0);
        assert_eq!(container.apply_modifiers(1.0, &id, None, Some(50)), 101.0);
    }
}
