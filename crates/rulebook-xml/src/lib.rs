//! Rulebook XML - ruleset reader and loader
//!
//! Turns XML rulesets into `rulebook_core` documents and feeds them into a
//! `Specification`:
//! - `parse_document` reads one XML string into a `Document`
//! - `Loader` applies files and directories in order, then finalizes
//!
//! Load options can be kept next to the rulesets as a RON file and read
//! with `Loader::load_options_file`.

mod error;
mod loader;
mod reader;

pub use error::{Error, Result};
pub use loader::Loader;
pub use reader::parse_document;
