//! Rulebook Core - specification type registry
//!
//! This crate holds the model of a declarative ruleset:
//! - Identifiers for types and features (`Id`)
//! - Scopes, the applicability predicates of types and features
//! - Abilities and modifiers, grouped per type in a `FeatureContainer`
//! - Specification types, which inherit from each other through `extends`
//! - The `Specification` registry: loads parsed documents, resolves
//!   inheritance, purges abstract types and answers queries
//!
//! Documents arrive already parsed (see `rulebook-xml` for the XML reader);
//! nothing in this crate performs I/O.
//!
//! ## Example
//!
//! ```
//! use rulebook_core::{Ability, Document, Specification, TypeElement};
//!
//! let rules = Document::new().section(
//!     "unit-types",
//!     vec![
//!         TypeElement::new("unit-type", "model.unit.default")
//!             .abstract_type()
//!             .ability(Ability::new("model.ability.canBeCaptured", true)),
//!         TypeElement::new("unit-type", "model.unit.freeColonist")
//!             .extends("model.unit.default"),
//!     ],
//! );
//!
//! let mut spec = Specification::new();
//! spec.load(&rules).unwrap();
//! spec.finalize().unwrap();
//!
//! assert_eq!(spec.get_abilities("model.unit.freeColonist").unwrap().len(), 1);
//! assert!(spec.get("model.unit.default").is_err());
//! ```

mod config;
mod container;
mod document;
mod error;
mod feature;
mod identity;
mod merge;
mod registry;
mod resolve;
pub mod scope;
mod spec_type;

pub use config::{ContainerSet, LoadOptions, ReloadMode};
pub use container::FeatureContainer;
pub use document::{Child, Document, Entry, Section, TypeElement};
pub use error::{Error, Result};
pub use feature::{Ability, Feature, Modifier, ModifierType, Turn};
pub use identity::Id;
pub use merge::LoadReport;
pub use registry::{Phase, Specification};
pub use scope::{Scope, ScopeTarget};
pub use spec_type::SpecType;
