//! Merging a parsed document into the registry's type table

use crate::config::{LoadOptions, ReloadMode};
use crate::document::{Child, Document, TypeElement};
use crate::spec_type::SpecType;
use crate::Id;
use indexmap::IndexMap;

/// What one document load did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Types seen for the first time
    pub created: usize,
    /// Known types whose children accumulated onto existing state
    pub patched: usize,
    /// Known types whose containers were reset first
    pub redefined: usize,
    /// Child elements with unsupported tags
    pub ignored: usize,
}

impl std::ops::AddAssign for LoadReport {
    fn add_assign(&mut self, other: Self) {
        self.created += other.created;
        self.patched += other.patched;
        self.redefined += other.redefined;
        self.ignored += other.ignored;
    }
}

/// Applies documents to a type table
pub(crate) struct MergeEngine<'a> {
    types: &'a mut IndexMap<Id, SpecType>,
    next_index: &'a mut usize,
    options: &'a LoadOptions,
}

impl<'a> MergeEngine<'a> {
    pub(crate) fn new(
        types: &'a mut IndexMap<Id, SpecType>,
        next_index: &'a mut usize,
        options: &'a LoadOptions,
    ) -> Self {
        Self {
            types,
            next_index,
            options,
        }
    }

    /// Merge a document that has already been validated
    pub(crate) fn merge(&mut self, document: &Document) -> LoadReport {
        let mut report = LoadReport::default();
        for (category, element) in document.types() {
            self.merge_type(category, element, &mut report);
        }
        report
    }

    fn merge_type(&mut self, category: &str, element: &TypeElement, report: &mut LoadReport) {
        match self.types.get_mut(&element.id) {
            None => {
                let index = *self.next_index;
                *self.next_index += 1;
                let mut spec_type =
                    SpecType::new(element.id.clone(), &element.tag, category, index);
                spec_type.set_abstract(element.is_abstract.unwrap_or(false));
                spec_type.set_extends(element.extends.clone());
                tracing::debug!(type_id = %element.id, index, "created type");
                report.created += 1;
                self.types.insert(element.id.clone(), spec_type);
            }
            Some(existing) => match self.options.reload_mode(element.preserve) {
                ReloadMode::Patch => {
                    if let Some(is_abstract) = element.is_abstract {
                        existing.set_abstract(is_abstract);
                    }
                    if let Some(parent) = &element.extends {
                        existing.set_extends(Some(parent.clone()));
                    }
                    tracing::debug!(type_id = %element.id, "patching type");
                    report.patched += 1;
                }
                ReloadMode::Redefine => {
                    existing.clear_containers(self.options.redefine_clears);
                    existing.set_origin(&element.tag, category);
                    existing.set_abstract(element.is_abstract.unwrap_or(false));
                    existing.set_extends(element.extends.clone());
                    tracing::debug!(type_id = %element.id, "redefining type");
                    report.redefined += 1;
                }
            },
        }

        let Some(spec_type) = self.types.get_mut(&element.id) else {
            return;
        };
        for child in &element.children {
            match child {
                Child::Unknown(tag) => {
                    tracing::warn!(type_id = %element.id, tag = %tag, "ignoring unsupported element");
                    report.ignored += 1;
                }
                child => spec_type.apply(child.clone()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContainerSet;
    use crate::feature::{Ability, Modifier, ModifierType};
    use crate::scope::Scope;

    const UNIT: &str = "model.unit.freeColonist";

    fn merge(
        types: &mut IndexMap<Id, SpecType>,
        next: &mut usize,
        options: &LoadOptions,
        element: TypeElement,
    ) -> LoadReport {
        let doc = Document::new().section("unit-types", vec![element]);
        MergeEngine::new(types, next, options).merge(&doc)
    }

    fn first_load(types: &mut IndexMap<Id, SpecType>, next: &mut usize) {
        let element = TypeElement::new("unit-type", UNIT)
            .ability(Ability::new("model.ability.canBeCaptured", true))
            .modifier(Modifier::new("model.modifier.offence", 1.0, ModifierType::Additive))
            .scope(Scope::for_type(UNIT));
        merge(types, next, &LoadOptions::default(), element);
    }

    #[test]
    fn test_index_assigned_once() {
        let mut types = IndexMap::new();
        let mut next = 0;
        first_load(&mut types, &mut next);
        first_load(&mut types, &mut next);
        merge(
            &mut types,
            &mut next,
            &LoadOptions::default(),
            TypeElement::new("unit-type", "model.unit.expertFarmer"),
        );

        assert_eq!(types[UNIT].index(), 0);
        assert_eq!(types["model.unit.expertFarmer"].index(), 1);
        assert_eq!(next, 2);
    }

    #[test]
    fn test_patch_accumulates() {
        let mut types = IndexMap::new();
        let mut next = 0;
        first_load(&mut types, &mut next);

        let report = merge(
            &mut types,
            &mut next,
            &LoadOptions::default(),
            TypeElement::new("unit-type", UNIT)
                .ability(Ability::new("model.ability.expertSoldier", true)),
        );

        assert_eq!(report.patched, 1);
        assert_eq!(types[UNIT].abilities().count(), 2);
        assert_eq!(types[UNIT].modifiers().count(), 1);
        assert_eq!(types[UNIT].scopes().len(), 1);
    }

    #[test]
    fn test_redefine_clears_selected_containers() {
        let mut types = IndexMap::new();
        let mut next = 0;
        first_load(&mut types, &mut next);

        let options = LoadOptions::default().with_redefine_clears(ContainerSet {
            abilities: true,
            modifiers: false,
            scopes: true,
        });
        let report = merge(
            &mut types,
            &mut next,
            &options,
            TypeElement::new("unit-type", UNIT)
                .preserve(false)
                .ability(Ability::new("model.ability.expertSoldier", true)),
        );

        assert_eq!(report.redefined, 1);
        let ids: Vec<_> = types[UNIT].abilities().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["model.ability.expertSoldier"]);
        assert_eq!(types[UNIT].modifiers().count(), 1);
        assert!(types[UNIT].scopes().is_empty());
    }

    #[test]
    fn test_redefinition_moves_category() {
        let mut types = IndexMap::new();
        let mut next = 0;
        let options = LoadOptions::default();
        first_load(&mut types, &mut next);

        let doc = Document::new().section(
            "naval-unit-types",
            vec![TypeElement::new("naval-unit-type", UNIT)],
        );
        MergeEngine::new(&mut types, &mut next, &options).merge(&doc);
        assert_eq!(types[UNIT].category(), "unit-types");

        let doc = Document::new().section(
            "naval-unit-types",
            vec![TypeElement::new("naval-unit-type", UNIT).preserve(false)],
        );
        MergeEngine::new(&mut types, &mut next, &options).merge(&doc);
        assert_eq!(types[UNIT].category(), "naval-unit-types");
        assert_eq!(types[UNIT].tag(), "naval-unit-type");
        assert_eq!(types[UNIT].index(), 0);
    }

    #[test]
    fn test_unknown_children_are_inert() {
        let mut types = IndexMap::new();
        let mut next = 0;
        let mut element = TypeElement::new("unit-type", UNIT);
        element.children.push(Child::Unknown("upgrade".to_string()));

        let report = merge(&mut types, &mut next, &LoadOptions::default(), element);
        assert_eq!(report.ignored, 1);
        assert!(types[UNIT].features().is_none());
        assert!(types[UNIT].scopes().is_empty());
    }

    #[test]
    fn test_attributes_on_patch_and_redefine() {
        let mut types = IndexMap::new();
        let mut next = 0;
        let options = LoadOptions::default();
        merge(
            &mut types,
            &mut next,
            &options,
            TypeElement::new("unit-type", UNIT).abstract_type().extends("model.unit.default"),
        );

        // Absent attributes leave a patched type alone
        merge(&mut types, &mut next, &options, TypeElement::new("unit-type", UNIT));
        assert!(types[UNIT].is_abstract_type());
        assert_eq!(types[UNIT].extends(), Some(&Id::new("model.unit.default")));

        // ...and reset a redefined one
        merge(
            &mut types,
            &mut next,
            &options,
            TypeElement::new("unit-type", UNIT).preserve(false),
        );
        assert!(!types[UNIT].is_abstract_type());
        assert_eq!(types[UNIT].extends(), None);
    }
}
