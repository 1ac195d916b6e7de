//! Subcommands.

pub mod generate;
pub mod validate;

use std::fs;
use std::path::Path;

use tswire_core::model::{SchemaDocument, SchemaFormat};

/// Read and parse a schema document; the format follows the file extension.
pub fn load_schema(path: &Path) -> Result<SchemaDocument, String> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read schema {}: {err}", path.display()))?;
    SchemaDocument::parse(&contents, SchemaFormat::from_path(path))
        .map_err(|err| format!("Failed to parse schema {}: {err}", path.display()))
}
