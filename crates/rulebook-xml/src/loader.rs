//! XML ruleset loader

use crate::error::{Error, Result};
use crate::reader::parse_document;
use rulebook_core::{LoadOptions, LoadReport, Specification};
use std::fs;
use std::path::Path;

/// Loader feeding XML rulesets into a specification
///
/// Files are applied in the order they are loaded; later files patch or
/// redefine types from earlier ones. `finish` resolves inheritance and
/// hands back the finalized specification.
pub struct Loader {
    spec: Specification,
}

impl Loader {
    /// Create a loader over an empty specification
    pub fn new() -> Self {
        Self {
            spec: Specification::new(),
        }
    }

    /// Create a loader whose reloads follow `options`
    pub fn with_options(options: LoadOptions) -> Self {
        Self {
            spec: Specification::with_options(options),
        }
    }

    /// Continue loading into an existing specification
    ///
    /// A finalized specification is reopened, so override rulesets can be
    /// applied on top of it and finalized again.
    pub fn from_specification(mut spec: Specification) -> Self {
        spec.reopen();
        Self { spec }
    }

    /// Read load options from a RON file
    pub fn load_options_file(path: impl AsRef<Path>) -> Result<LoadOptions> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::from(e).in_file(path))?;
        ron::from_str(&content).map_err(|e| Error::from(e).in_file(path))
    }

    /// Load a ruleset from an XML string
    pub fn load_str(&mut self, xml: &str) -> Result<LoadReport> {
        let document = parse_document(xml)?;
        Ok(self.spec.load(&document)?)
    }

    /// Load a single XML file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<LoadReport> {
        let path = path.as_ref();
        let report = fs::read_to_string(path)
            .map_err(Error::from)
            .and_then(|content| self.load_str(&content))
            .map_err(|e| e.in_file(path))?;
        tracing::debug!(path = %path.display(), created = report.created, "loaded ruleset file");
        Ok(report)
    }

    /// Load every `.xml` file under a directory, recursively
    ///
    /// Entries are visited in file name order so the result does not depend
    /// on the platform's directory listing order.
    pub fn load_directory(&mut self, path: impl AsRef<Path>) -> Result<LoadReport> {
        let path = path.as_ref();

        if !path.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not a directory: {:?}", path),
            )));
        }

        let mut entries = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        let mut report = LoadReport::default();
        for file_path in entries {
            if file_path.is_dir() {
                report += self.load_directory(&file_path)?;
            } else if file_path.extension().map(|e| e == "xml").unwrap_or(false) {
                report += self.load_file(&file_path)?;
            }
        }

        Ok(report)
    }

    /// Resolve inheritance and return the finalized specification
    pub fn finish(mut self) -> Result<Specification> {
        self.spec.finalize()?;
        Ok(self.spec)
    }

    /// Get the specification being loaded (for inspection during loading)
    pub fn spec(&self) -> &Specification {
        &self.spec
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
