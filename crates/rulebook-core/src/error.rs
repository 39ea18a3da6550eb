//! Error types for rulebook-core

use crate::Id;
use thiserror::Error;

/// Registry error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Unresolved reference: {from} refers to unknown {kind} '{target}'")]
    UnresolvedReference {
        from: Id,
        target: Id,
        kind: &'static str,
    },

    #[error("Inheritance cycle among types: {}", join_ids(.0))]
    InheritanceCycle(Vec<Id>),

    #[error("Not found: {0}")]
    QueryNotFound(Id),

    #[error("Specification is finalized and can not be modified")]
    Frozen,

    #[error("Specification has not been finalized")]
    NotFinalized,
}

fn join_ids(ids: &[Id]) -> String {
    ids.iter().map(Id::as_str).collect::<Vec<_>>().join(", ")
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_members() {
        let err = Error::InheritanceCycle(vec![Id::new("a"), Id::new("b")]);
        assert_eq!(err.to_string(), "Inheritance cycle among types: a, b");
    }
}
