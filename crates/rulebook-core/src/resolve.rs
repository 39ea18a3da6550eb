//! Inheritance resolution over `extends` edges
//!
//! The edges form a forest over type ids. Parents are resolved before their
//! children (Kahn's algorithm); every reference is checked before any type is
//! touched, so a failed resolution leaves all types as they were.

use crate::error::{Error, Result};
use crate::spec_type::SpecType;
use crate::Id;
use indexmap::IndexMap;
use std::collections::{HashMap, VecDeque};

/// Order in which types can be resolved, parents first
pub(crate) fn resolution_order(types: &IndexMap<Id, SpecType>) -> Result<Vec<Id>> {
    let mut children: HashMap<&Id, Vec<&Id>> = HashMap::new();
    let mut queue: VecDeque<&Id> = VecDeque::new();

    for (id, spec_type) in types {
        match spec_type.extends() {
            Some(parent) if !types.contains_key(parent) => {
                return Err(Error::UnresolvedReference {
                    from: id.clone(),
                    target: parent.clone(),
                    kind: "type",
                });
            }
            Some(parent) => children.entry(parent).or_default().push(id),
            None => queue.push_back(id),
        }
    }

    let mut order = Vec::with_capacity(types.len());
    while let Some(id) = queue.pop_front() {
        order.push(id.clone());
        if let Some(kids) = children.get(id) {
            queue.extend(kids.iter().copied());
        }
    }

    if order.len() < types.len() {
        return Err(Error::InheritanceCycle(find_cycle(types, &order)));
    }
    Ok(order)
}

/// Extract one cycle from the types Kahn's algorithm could not order
///
/// Every unordered type has an unordered parent, so following `extends`
/// from any of them must come back around.
fn find_cycle(types: &IndexMap<Id, SpecType>, ordered: &[Id]) -> Vec<Id> {
    let Some(start) = types.keys().find(|id| !ordered.contains(id)) else {
        return Vec::new();
    };

    let mut path: Vec<&Id> = Vec::new();
    let mut current = Some(start);
    while let Some(id) = current {
        if let Some(pos) = path.iter().position(|seen| *seen == id) {
            let mut cycle: Vec<Id> = path[pos..].iter().map(|id| (*id).clone()).collect();
            cycle.sort_by_key(|id| types.get_index_of(id));
            return cycle;
        }
        path.push(id);
        current = types.get(id).and_then(SpecType::extends);
    }
    Vec::new()
}

/// Check explicit feature sources name known types
fn check_sources(types: &IndexMap<Id, SpecType>) -> Result<()> {
    for (id, spec_type) in types {
        for (kind, source) in spec_type.local_features() {
            if let Some(source) = source {
                if !types.contains_key(source) {
                    return Err(Error::UnresolvedReference {
                        from: id.clone(),
                        target: source.clone(),
                        kind,
                    });
                }
            }
        }
    }
    Ok(())
}

/// Resolve every type against its ancestors
///
/// Each type is rebuilt from its parent's resolved features and scopes plus
/// its own edit log, so the pass can be repeated safely.
pub(crate) fn resolve(types: &mut IndexMap<Id, SpecType>) -> Result<()> {
    let order = resolution_order(types)?;
    check_sources(types)?;

    for id in &order {
        let (features, scopes) = match types.get(id).and_then(SpecType::extends) {
            Some(parent) => match types.get(parent) {
                Some(parent) => (parent.features().cloned(), parent.scopes().to_vec()),
                None => (None, Vec::new()),
            },
            None => (None, Vec::new()),
        };
        if let Some(spec_type) = types.get_mut(id) {
            spec_type.rebuild(features, scopes);
            tracing::trace!(type_id = %id, parent = ?spec_type.extends(), "resolved type");
        }
    }
    Ok(())
}
