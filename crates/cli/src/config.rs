//! `tswire.toml` configuration.
//!
//! ```toml
//! schema = "api/schema.yaml"
//! output = "frontend/src/api.ts"
//!
//! [format]
//! enabled = true
//! command = "prettier"
//! args = ["--trailing-comma", "es5", "--write"]
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Config filename looked up in the working directory
pub const CONFIG_FILENAME: &str = "tswire.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Schema document (JSON or YAML)
    pub schema: Option<PathBuf>,
    /// Generated TypeScript file
    pub output: Option<PathBuf>,
    /// External formatter
    #[serde(default)]
    pub format: FormatConfig,
}

/// External formatter settings. The generated file path is appended to `args`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatConfig {
    /// Run the formatter on every generation
    pub enabled: bool,
    /// Program looked up on PATH
    pub command: String,
    /// Arguments placed before the file path
    pub args: Vec<String>,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: "prettier".to_string(),
            args: vec![
                "--trailing-comma".to_string(),
                "es5".to_string(),
                "--write".to_string(),
            ],
        }
    }
}

impl Config {
    /// Load a config file; relative paths become relative to its directory.
    pub fn load(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .map_err(|err| format!("Failed to parse {}: {err}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.resolved(base))
    }

    /// Load `explicit`, else `./tswire.toml` when present, else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, String> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(CONFIG_FILENAME);
                if default_path.exists() {
                    tracing::debug!("using {CONFIG_FILENAME} from the working directory");
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn resolved(mut self, base: &Path) -> Self {
        let resolve = |p: PathBuf| if p.is_relative() { base.join(p) } else { p };
        self.schema = self.schema.map(resolve);
        self.output = self.output.map(resolve);
        self
    }
}
