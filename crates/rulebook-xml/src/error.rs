//! Error types for rulebook-xml

use std::path::PathBuf;
use thiserror::Error;

/// Document loading error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error(transparent)]
    Spec(#[from] rulebook_core::Error),

    #[error("{path}: {source}", path = .path.display())]
    InFile {
        path: PathBuf,
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Error::Spec(rulebook_core::Error::MalformedDocument(message.into()))
    }

    pub(crate) fn in_file(self, path: impl Into<PathBuf>) -> Self {
        Error::InFile {
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// The registry error behind this error, if any
    pub fn spec_error(&self) -> Option<&rulebook_core::Error> {
        match self {
            Error::Spec(err) => Some(err),
            Error::InFile { source, .. } => source.spec_error(),
            _ => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
