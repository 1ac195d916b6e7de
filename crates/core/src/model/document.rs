//! Schema documents: models, roots and routes in one JSON or YAML file.

use std::path::Path;

use serde::Deserialize;

use super::types::{ModelGraph, ModelPath, RouteDef};
use crate::error::{CodegenError, Result};

/// Serialization format of a schema document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    /// `.json`
    Json,
    /// `.yaml` / `.yml`
    Yaml,
}

impl SchemaFormat {
    /// Pick the format from a file extension; anything but `.json` is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SchemaFormat::Json,
            _ => SchemaFormat::Yaml,
        }
    }
}

/// A complete generation input.
///
/// ```yaml
/// models:
///   app.Opt:
///     fields:
///       - { name: key, type: str }
///       - { name: val, type: { optional: str } }
/// roots: [app.Opt]
/// routes:
///   - { handler: get_opt, method: GET, path: "/api/opts/{key}", match_info: app.Opt, response: app.Opt }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    /// Every model, keyed by path
    #[serde(default)]
    pub models: ModelGraph,
    /// Roots in registration order; empty means every model
    #[serde(default)]
    pub roots: Vec<ModelPath>,
    /// Routes to emit wrappers for
    #[serde(default)]
    pub routes: Vec<RouteDef>,
}

impl SchemaDocument {
    /// Parse a document in the given format.
    pub fn parse(text: &str, format: SchemaFormat) -> Result<Self> {
        match format {
            SchemaFormat::Json => Self::from_json(text),
            SchemaFormat::Yaml => Self::from_yaml(text),
        }
    }

    /// Parse a JSON document.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|err| CodegenError::Schema(err.to_string()))
    }

    /// Parse a YAML document.
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|err| CodegenError::Schema(err.to_string()))
    }

    /// The model graph.
    pub fn graph(&self) -> &ModelGraph {
        &self.models
    }

    /// Roots to register: the declared ones, or every model in path order.
    pub fn roots(&self) -> Vec<ModelPath> {
        if self.roots.is_empty() {
            self.models.paths().cloned().collect()
        } else {
            self.roots.clone()
        }
    }
}
