//! Abilities and modifiers attached to specification types

use crate::scope::{self, Scope, ScopeTarget};
use crate::Id;
use serde::{Deserialize, Serialize};

/// Game turn number used to bound when a feature is active
pub type Turn = u32;

/// Common view over abilities and modifiers
pub trait Feature {
    fn id(&self) -> &Id;
    fn source(&self) -> Option<&Id>;
    fn scopes(&self) -> &[Scope];
    fn first_turn(&self) -> Option<Turn>;
    fn last_turn(&self) -> Option<Turn>;

    /// Whether the feature's scopes admit the candidate
    fn applies_to(&self, candidate: Option<&dyn ScopeTarget>) -> bool {
        scope::applies_to(self.scopes(), candidate)
    }

    /// Whether the feature is active on the given turn
    ///
    /// A feature without turn bounds is always active, as is any feature when
    /// no turn is given.
    fn active_on(&self, turn: Option<Turn>) -> bool {
        let Some(turn) = turn else {
            return true;
        };
        self.first_turn().map_or(true, |first| turn >= first)
            && self.last_turn().map_or(true, |last| turn <= last)
    }
}

/// A boolean-valued feature
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ability {
    pub id: Id,
    #[serde(default = "default_value")]
    pub value: bool,
    /// The type that granted this ability
    #[serde(default)]
    pub source: Option<Id>,
    #[serde(default)]
    pub scopes: Vec<Scope>,
    #[serde(default)]
    pub first_turn: Option<Turn>,
    #[serde(default)]
    pub last_turn: Option<Turn>,
}

fn default_value() -> bool {
    true
}

impl Ability {
    /// Create an unscoped ability
    pub fn new(id: impl Into<Id>, value: bool) -> Self {
        Self {
            id: id.into(),
            value,
            source: None,
            scopes: Vec::new(),
            first_turn: None,
            last_turn: None,
        }
    }

    /// Set the granting type
    pub fn with_source(mut self, source: impl Into<Id>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Add a scope
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scopes.push(scope);
        self
    }
}

impl Feature for Ability {
    fn id(&self) -> &Id {
        &self.id
    }

    fn source(&self) -> Option<&Id> {
        self.source.as_ref()
    }

    fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    fn first_turn(&self) -> Option<Turn> {
        self.first_turn
    }

    fn last_turn(&self) -> Option<Turn> {
        self.last_turn
    }
}

/// How a modifier combines with the value it modifies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierType {
    /// Add the value
    #[default]
    Additive,
    /// Multiply by the value
    Multiplicative,
    /// Add the value as a percentage of the base
    Percentage,
}

impl ModifierType {
    /// Apply this operation to a base value
    pub fn apply(&self, base: f32, value: f32) -> f32 {
        match self {
            ModifierType::Additive => base + value,
            ModifierType::Multiplicative => base * value,
            ModifierType::Percentage => base + (base * value) / 100.0,
        }
    }

    /// Parse the document spelling of a modifier type
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "additive" => Some(ModifierType::Additive),
            "multiplicative" => Some(ModifierType::Multiplicative),
            "percentage" => Some(ModifierType::Percentage),
            _ => None,
        }
    }
}

/// A numeric-valued feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub id: Id,
    pub value: f32,
    #[serde(default)]
    pub modifier_type: ModifierType,
    /// Application priority, lower first
    #[serde(default)]
    pub index: i32,
    /// The type that granted this modifier
    #[serde(default)]
    pub source: Option<Id>,
    #[serde(default)]
    pub scopes: Vec<Scope>,
    #[serde(default)]
    pub first_turn: Option<Turn>,
    #[serde(default)]
    pub last_turn: Option<Turn>,
}

impl Modifier {
    /// Create an unscoped modifier
    pub fn new(id: impl Into<Id>, value: f32, modifier_type: ModifierType) -> Self {
        Self {
            id: id.into(),
            value,
            modifier_type,
            index: 0,
            source: None,
            scopes: Vec::new(),
            first_turn: None,
            last_turn: None,
        }
    }

    /// Set the granting type
    pub fn with_source(mut self, source: impl Into<Id>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Add a scope
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scopes.push(scope);
        self
    }

    /// Set the application priority
    pub fn with_index(mut self, index: i32) -> Self {
        self.index = index;
        self
    }

    /// Apply this modifier to a base value
    pub fn apply(&self, base: f32) -> f32 {
        self.modifier_type.apply(base, self.value)
    }
}

impl Feature for Modifier {
    fn id(&self) -> &Id {
        &self.id
    }

    fn source(&self) -> Option<&Id> {
        self.source.as_ref()
    }

    fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    fn first_turn(&self) -> Option<Turn> {
        self.first_turn
    }

    fn last_turn(&self) -> Option<Turn> {
        self.last_turn
    }
}
