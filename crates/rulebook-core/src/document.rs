//! Parsed form of a ruleset document
//!
//! A document is a list of sections (one per category, e.g. `unit-types`),
//! each holding type elements. The children of a type element are parsed
//! once into the closed [`Child`] variant and dispatched by pattern match
//! when the document is merged into a registry.

use crate::error::{Error, Result};
use crate::feature::{Ability, Modifier};
use crate::scope::Scope;
use crate::Id;

/// An ability or modifier element: either a record to add, or a delete
/// marker naming the id whose entries are to be removed
#[derive(Debug, Clone, PartialEq)]
pub enum Entry<T> {
    Add(T),
    Delete(Id),
}

/// One child element of a type element
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Ability(Entry<Ability>),
    Modifier(Entry<Modifier>),
    Scope(Scope),
    /// Element with an unsupported tag; ignored when merging
    Unknown(String),
}

/// One type element
#[derive(Debug, Clone, PartialEq)]
pub struct TypeElement {
    /// Element tag, e.g. `unit-type`
    pub tag: String,
    pub id: Id,
    /// `abstract` attribute, if present
    pub is_abstract: Option<bool>,
    /// `extends` attribute, if present
    pub extends: Option<Id>,
    /// `preserve` attribute, if present
    pub preserve: Option<bool>,
    pub children: Vec<Child>,
}

impl TypeElement {
    /// Create a type element with no attributes or children
    pub fn new(tag: impl Into<String>, id: impl Into<Id>) -> Self {
        Self {
            tag: tag.into(),
            id: id.into(),
            is_abstract: None,
            extends: None,
            preserve: None,
            children: Vec::new(),
        }
    }

    /// Mark the type abstract
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = Some(true);
        self
    }

    /// Set the parent type
    pub fn extends(mut self, parent: impl Into<Id>) -> Self {
        self.extends = Some(parent.into());
        self
    }

    /// Set the `preserve` attribute
    pub fn preserve(mut self, preserve: bool) -> Self {
        self.preserve = Some(preserve);
        self
    }

    /// Add an ability
    pub fn ability(mut self, ability: Ability) -> Self {
        self.children.push(Child::Ability(Entry::Add(ability)));
        self
    }

    /// Delete all abilities with an id
    pub fn delete_ability(mut self, id: impl Into<Id>) -> Self {
        self.children.push(Child::Ability(Entry::Delete(id.into())));
        self
    }

    /// Add a modifier
    pub fn modifier(mut self, modifier: Modifier) -> Self {
        self.children.push(Child::Modifier(Entry::Add(modifier)));
        self
    }

    /// Delete all modifiers with an id
    pub fn delete_modifier(mut self, id: impl Into<Id>) -> Self {
        self.children.push(Child::Modifier(Entry::Delete(id.into())));
        self
    }

    /// Add a scope
    pub fn scope(mut self, scope: Scope) -> Self {
        self.children.push(Child::Scope(scope));
        self
    }

    fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(Error::MalformedDocument(format!(
                "<{}> element without an id",
                self.tag
            )));
        }
        for child in &self.children {
            let (tag, id) = match child {
                Child::Ability(Entry::Add(a)) => ("ability", &a.id),
                Child::Ability(Entry::Delete(id)) => ("ability", id),
                Child::Modifier(Entry::Add(m)) => ("modifier", &m.id),
                Child::Modifier(Entry::Delete(id)) => ("modifier", id),
                Child::Scope(_) | Child::Unknown(_) => continue,
            };
            if id.is_empty() {
                return Err(Error::MalformedDocument(format!(
                    "<{}> without an id in type '{}'",
                    tag, self.id
                )));
            }
            if let Child::Modifier(Entry::Add(m)) = child {
                if !m.value.is_finite() {
                    return Err(Error::MalformedDocument(format!(
                        "modifier '{}' in type '{}' has non-finite value {}",
                        m.id, self.id, m.value
                    )));
                }
            }
        }
        Ok(())
    }
}

/// A group of type elements under one category tag
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Category tag, e.g. `unit-types`
    pub tag: String,
    pub types: Vec<TypeElement>,
}

/// A complete parsed document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub sections: Vec<Section>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a section
    pub fn section(mut self, tag: impl Into<String>, types: Vec<TypeElement>) -> Self {
        self.sections.push(Section {
            tag: tag.into(),
            types,
        });
        self
    }

    /// All type elements with their section tag, in document order
    pub fn types(&self) -> impl Iterator<Item = (&str, &TypeElement)> {
        self.sections
            .iter()
            .flat_map(|s| s.types.iter().map(move |t| (s.tag.as_str(), t)))
    }

    /// Check every element is identifiable
    pub fn validate(&self) -> Result<()> {
        self.types().try_for_each(|(_, t)| t.validate())
    }
}
