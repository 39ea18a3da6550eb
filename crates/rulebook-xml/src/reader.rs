//! XML reader producing parsed documents
//!
//! The expected shape is a root element holding one element per category
//! (`<unit-types>`, `<building-types>`, ...), each holding type elements:
//!
//! ```xml
//! <freecol-rules>
//!   <unit-types>
//!     <unit-type id="model.unit.default" abstract="true">
//!       <ability id="model.ability.canBeCaptured" value="true"/>
//!     </unit-type>
//!     <unit-type id="model.unit.freeColonist" extends="model.unit.default"/>
//!   </unit-types>
//! </freecol-rules>
//! ```
//!
//! Attributes a type element does not understand are skipped. Child
//! elements other than `ability`, `modifier` and `scope` are kept as
//! [`Child::Unknown`] so the registry can report them. So are elements nested
//! in a feature or scope that nothing reads; their tag is prefixed with the
//! enclosing element's, e.g. `ability/upgrade`.

use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use rulebook_core::{
    Ability, Child, Document, Entry, Id, Modifier, ModifierType, Scope, Section, TypeElement,
};
use std::str::FromStr;

/// Parse an XML ruleset into a document
pub fn parse_document(xml: &str) -> Result<Document> {
    let root = parse_tree(xml)?;
    let mut document = Document::new();
    for section in &root.children {
        let types = section
            .children
            .iter()
            .map(type_element)
            .collect::<Result<Vec<_>>>()?;
        document.sections.push(Section {
            tag: section.tag.clone(),
            types,
        });
    }
    Ok(document)
}

/// Generic element tree; text content is not used by rulesets
#[derive(Debug)]
struct Node {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Node {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let tag = utf8(start.name().as_ref())?;
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = utf8(attr.key.as_ref())?;
            let value = attr.unescape_value().map_err(quick_xml::Error::from)?;
            attrs.push((key, value.into_owned()));
        }
        Ok(Self {
            tag,
            attrs,
            children: Vec::new(),
        })
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn id(&self, name: &str) -> Option<Id> {
        self.attr(name).map(Id::new)
    }

    fn required_id(&self) -> Result<Id> {
        match self.attr("id") {
            Some(id) if !id.is_empty() => Ok(Id::new(id)),
            _ => Err(Error::malformed(format!("<{}> element without an id", self.tag))),
        }
    }

    fn flag(&self, name: &str) -> Result<Option<bool>> {
        match self.attr(name) {
            None => Ok(None),
            Some("true") => Ok(Some(true)),
            Some("false") => Ok(Some(false)),
            Some(other) => Err(Error::malformed(format!(
                "<{}> attribute {name}: expected true or false, got {other:?}",
                self.tag
            ))),
        }
    }

    fn number<T: FromStr>(&self, name: &str) -> Result<Option<T>> {
        match self.attr(name) {
            None => Ok(None),
            Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
                Error::malformed(format!(
                    "<{}> attribute {name}: invalid number {raw:?}",
                    self.tag
                ))
            }),
        }
    }

    fn scopes(&self) -> Result<Vec<Scope>> {
        self.children
            .iter()
            .filter(|child| child.tag == "scope")
            .map(scope)
            .collect()
    }
}

fn utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|_| Error::malformed("element or attribute name is not UTF-8"))
}

fn parse_tree(xml: &str) -> Result<Node> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Node> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Node::from_start(&start)?),
            Event::Empty(start) => attach(&mut stack, &mut root, Node::from_start(&start)?)?,
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| Error::malformed("closing tag without an open element"))?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::malformed(format!("<{}> is never closed", open.tag)));
    }
    root.ok_or_else(|| Error::malformed("document has no root element"))
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    } else if root.is_none() {
        *root = Some(node);
    } else {
        return Err(Error::malformed("document has more than one root element"));
    }
    Ok(())
}

fn type_element(node: &Node) -> Result<TypeElement> {
    let mut children = Vec::with_capacity(node.children.len());
    for element in &node.children {
        children.push(child(element)?);
        children.extend(unsupported_within(element).into_iter().map(Child::Unknown));
    }
    Ok(TypeElement {
        tag: node.tag.clone(),
        id: node.required_id()?,
        is_abstract: node.flag("abstract")?,
        extends: node.id("extends"),
        preserve: node.flag("preserve")?,
        children,
    })
}

fn child(node: &Node) -> Result<Child> {
    let deleted = node.flag("delete")?.unwrap_or(false);
    match node.tag.as_str() {
        "ability" if deleted => Ok(Child::Ability(Entry::Delete(node.required_id()?))),
        "ability" => ability(node).map(|a| Child::Ability(Entry::Add(a))),
        "modifier" if deleted => Ok(Child::Modifier(Entry::Delete(node.required_id()?))),
        "modifier" => modifier(node).map(|m| Child::Modifier(Entry::Add(m))),
        "scope" => scope(node).map(Child::Scope),
        other => Ok(Child::Unknown(other.to_string())),
    }
}

/// Elements below a feature or scope that are not read
fn unsupported_within(node: &Node) -> Vec<String> {
    let mut found = Vec::new();
    for nested in &node.children {
        match (node.tag.as_str(), nested.tag.as_str()) {
            ("ability" | "modifier", "scope") => found.extend(unsupported_within(nested)),
            ("ability" | "modifier" | "scope", tag) => found.push(format!("{}/{tag}", node.tag)),
            _ => {}
        }
    }
    found
}

fn ability(node: &Node) -> Result<Ability> {
    Ok(Ability {
        id: node.required_id()?,
        value: node.flag("value")?.unwrap_or(true),
        source: node.id("source"),
        scopes: node.scopes()?,
        first_turn: node.number("first-turn")?,
        last_turn: node.number("last-turn")?,
    })
}

fn modifier(node: &Node) -> Result<Modifier> {
    let modifier_type = match node.attr("type") {
        None => ModifierType::default(),
        Some(raw) => ModifierType::parse(raw).ok_or_else(|| {
            Error::malformed(format!("<modifier> has unknown type {raw:?}"))
        })?,
    };
    let value: f32 = node.number("value")?.unwrap_or(0.0);
    if !value.is_finite() {
        return Err(Error::malformed(format!(
            "<modifier> attribute value: not a finite number ({value})"
        )));
    }
    Ok(Modifier {
        id: node.required_id()?,
        value,
        modifier_type,
        index: node.number("index")?.unwrap_or(0),
        source: node.id("source"),
        scopes: node.scopes()?,
        first_turn: node.number("first-turn")?,
        last_turn: node.number("last-turn")?,
    })
}

fn scope(node: &Node) -> Result<Scope> {
    let defaults = Scope::default();
    Ok(Scope {
        type_id: node.id("type"),
        ability_id: node.id("ability-id"),
        ability_value: node.flag("ability-value")?.unwrap_or(defaults.ability_value),
        method_name: node.attr("method-name").map(str::to_string),
        method_value: node.attr("method-value").map(str::to_string),
        match_negated: node.flag("match-negated")?.unwrap_or(defaults.match_negated),
        matches_null: node.flag("matches-null")?.unwrap_or(defaults.matches_null),
    })
}
