//! Load options - what re-loading a known type does
//!
//! A type element whose id is already registered is either a *patch* (its
//! children accumulate onto the existing state) or a *redefinition* (the
//! existing containers are cleared first). The element's `preserve`
//! attribute decides when present; otherwise [`LoadOptions::reload`] does.

use serde::{Deserialize, Serialize};

/// Default handling of a re-loaded type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReloadMode {
    /// Accumulate onto existing features and scopes
    #[default]
    Patch,
    /// Clear existing containers, then apply the new children
    Redefine,
}

/// Which containers a redefinition clears
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSet {
    pub abilities: bool,
    pub modifiers: bool,
    pub scopes: bool,
}

impl ContainerSet {
    /// Every container
    pub const ALL: ContainerSet = ContainerSet {
        abilities: true,
        modifiers: true,
        scopes: true,
    };

    /// No container
    pub const NONE: ContainerSet = ContainerSet {
        abilities: false,
        modifiers: false,
        scopes: false,
    };

    /// Check if nothing is selected
    pub fn is_empty(&self) -> bool {
        !(self.abilities || self.modifiers || self.scopes)
    }
}

impl Default for ContainerSet {
    fn default() -> Self {
        Self::ALL
    }
}

/// Options applied by [`Specification::load`](crate::Specification::load)
///
/// # Example
///
/// ```
/// use rulebook_core::{ContainerSet, LoadOptions, ReloadMode};
///
/// // Redefinitions reset modifiers only, abilities and scopes survive
/// let options = LoadOptions::default()
///     .with_reload(ReloadMode::Redefine)
///     .with_redefine_clears(ContainerSet {
///         abilities: false,
///         modifiers: true,
///         scopes: false,
///     });
/// assert_eq!(options.reload, ReloadMode::Redefine);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// What a re-load does when the element has no `preserve` attribute
    pub reload: ReloadMode,
    /// Containers reset by a redefinition
    pub redefine_clears: ContainerSet,
}

impl LoadOptions {
    /// Set the default reload mode
    pub fn with_reload(mut self, reload: ReloadMode) -> Self {
        self.reload = reload;
        self
    }

    /// Set the containers a redefinition clears
    pub fn with_redefine_clears(mut self, clears: ContainerSet) -> Self {
        self.redefine_clears = clears;
        self
    }

    /// Decide how to treat a re-load given the element's `preserve` attribute
    pub fn reload_mode(&self, preserve: Option<bool>) -> ReloadMode {
        match preserve {
            Some(true) => ReloadMode::Patch,
            Some(false) => ReloadMode::Redefine,
            None => self.reload,
        }
    }
}
