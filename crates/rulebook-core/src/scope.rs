//! Scope predicates restricting where a type or feature applies
//!
//! A list of scopes is evaluated with "any-of" semantics: an empty list is
//! unrestricted, otherwise at least one scope has to match the candidate.

use crate::Id;
use serde::{Deserialize, Serialize};

/// Something a scope can be tested against
///
/// Specification types implement this directly; simulation objects outside
/// this crate implement it to ask whether a type or feature applies to them.
pub trait ScopeTarget {
    /// The specification type id this object is, or is an instance of
    fn type_id(&self) -> Option<&Id>;

    /// Whether the object has the given ability
    fn has_ability(&self, id: &Id) -> bool;

    /// A named property of the object rendered as a string
    fn property(&self, _name: &str) -> Option<String> {
        None
    }
}

/// A single applicability predicate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    /// Type the candidate must be
    #[serde(default)]
    pub type_id: Option<Id>,
    /// Ability the candidate must (or must not) have
    #[serde(default)]
    pub ability_id: Option<Id>,
    /// Expected result of the ability check
    #[serde(default = "default_true")]
    pub ability_value: bool,
    /// Property of the candidate to compare
    #[serde(default)]
    pub method_name: Option<String>,
    /// Expected property value
    #[serde(default)]
    pub method_value: Option<String>,
    /// Invert the result of the match
    #[serde(default)]
    pub match_negated: bool,
    /// Result when there is no candidate at all
    #[serde(default = "default_true")]
    pub matches_null: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Scope {
    fn default() -> Self {
        Self {
            type_id: None,
            ability_id: None,
            ability_value: true,
            method_name: None,
            method_value: None,
            match_negated: false,
            matches_null: true,
        }
    }
}

impl Scope {
    /// Scope matching a single type
    pub fn for_type(id: impl Into<Id>) -> Self {
        Self {
            type_id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Scope matching candidates that have an ability
    pub fn with_ability(id: impl Into<Id>, value: bool) -> Self {
        Self {
            ability_id: Some(id.into()),
            ability_value: value,
            ..Self::default()
        }
    }

    /// Scope matching candidates whose property has a value
    pub fn with_method(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            method_name: Some(name.into()),
            method_value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Invert this scope
    pub fn negated(mut self) -> Self {
        self.match_negated = !self.match_negated;
        self
    }

    /// Test this scope against a candidate
    ///
    /// Checks run in order (type, ability, method); the first failing check
    /// yields `match_negated`, passing all of them yields `!match_negated`.
    pub fn matches(&self, candidate: Option<&dyn ScopeTarget>) -> bool {
        let Some(object) = candidate else {
            return self.matches_null;
        };

        if let Some(type_id) = &self.type_id {
            if object.type_id() != Some(type_id) {
                return self.match_negated;
            }
        }

        if let Some(ability_id) = &self.ability_id {
            if object.has_ability(ability_id) != self.ability_value {
                return self.match_negated;
            }
        }

        if let Some(name) = &self.method_name {
            if object.property(name) != self.method_value {
                return self.match_negated;
            }
        }

        !self.match_negated
    }
}

/// Any-of evaluation over a scope list
///
/// An empty list applies to everything.
pub fn applies_to(scopes: &[Scope], candidate: Option<&dyn ScopeTarget>) -> bool {
    scopes.is_empty() || scopes.iter().any(|scope| scope.matches(candidate))
}
