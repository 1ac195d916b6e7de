//! `tswire generate`

use clap::Args;
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::load_schema;
use crate::config::Config;
use crate::format::format_typescript;

/// Arguments for `tswire generate`.
#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Config file (defaults to ./tswire.toml when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Schema document (JSON or YAML); overrides `schema` in the config
    #[arg(long, value_name = "PATH")]
    pub schema: Option<PathBuf>,
    /// Output file; overrides `output` in the config. Prints to stdout when unset
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
    /// Run the external formatter on the generated code
    #[arg(long)]
    pub format: bool,
    /// Compare with the existing output instead of writing; exit 1 when stale
    #[arg(long)]
    pub check: bool,
}

/// What a generate run did.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Code printed to stdout
    Printed,
    /// File written
    Written(PathBuf),
    /// `--check` and the file matches
    UpToDate(PathBuf),
    /// `--check` and the file differs; carries the rendered diff
    Stale(PathBuf, String),
}

/// Entry point for `tswire generate`; maps the outcome to an exit code.
pub fn run(args: &GenerateArgs) -> i32 {
    match generate(args) {
        Ok(Outcome::Printed) => 0,
        Ok(Outcome::Written(path)) => {
            println!("wrote {}", path.display());
            0
        }
        Ok(Outcome::UpToDate(path)) => {
            println!("{} is up to date", path.display());
            0
        }
        Ok(Outcome::Stale(path, diff)) => {
            print!("{diff}");
            eprintln!("{} is out of date; run `tswire generate`", path.display());
            1
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

/// Generate the module, optionally format it, then write it or compare it
/// against the file on disk when `--check` is set.
pub fn generate(args: &GenerateArgs) -> Result<Outcome, String> {
    let config = Config::discover(args.config.as_deref())?;

    let schema = args
        .schema
        .clone()
        .or(config.schema)
        .ok_or("No schema given: pass --schema or set `schema` in tswire.toml")?;
    let out = args.out.clone().or(config.output);

    let document = load_schema(&schema)?;
    let output = tswire_core::generate_document(&document)
        .map_err(|err| format!("Generation failed for {}: {err}", schema.display()))?;
    info!(
        schema = %schema.display(),
        models = output.model_count,
        enums = output.enum_count,
        routes = output.route_count,
        "generated"
    );

    let code = if args.format || config.format.enabled {
        format_typescript(&output.code, &config.format)?
    } else {
        output.code
    };

    match (out, args.check) {
        (None, true) => Err("--check needs an output file: pass --out or set `output`".into()),
        (None, false) => {
            print!("{code}");
            Ok(Outcome::Printed)
        }
        (Some(path), true) => check(&path, &code),
        (Some(path), false) => {
            write_output(&path, &code)?;
            Ok(Outcome::Written(path))
        }
    }
}

fn check(path: &Path, code: &str) -> Result<Outcome, String> {
    let existing = match fs::read_to_string(path) {
        Ok(existing) => existing,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(err) => return Err(format!("Failed to read {}: {err}", path.display())),
    };
    if existing == code {
        return Ok(Outcome::UpToDate(path.to_path_buf()));
    }
    let colorize = std::io::stdout().is_terminal();
    let diff = render_diff(&path.display().to_string(), &existing, code, colorize);
    Ok(Outcome::Stale(path.to_path_buf(), diff))
}

fn write_output(path: &Path, code: &str) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|err| format!("Failed to create {}: {err}", parent.display()))?;
    }
    fs::write(path, code).map_err(|err| format!("Failed to write {}: {err}", path.display()))?;
    debug!(path = %path.display(), bytes = code.len(), "wrote output");
    Ok(())
}

/// Unified-style diff of the existing file against freshly generated code.
pub fn render_diff(label: &str, existing: &str, generated: &str, colorize: bool) -> String {
    let diff = TextDiff::from_lines(existing, generated);
    let (bold, red, green, reset) = if colorize {
        ("\x1b[1m", "\x1b[31m", "\x1b[32m", "\x1b[0m")
    } else {
        ("", "", "", "")
    };

    let mut output = String::new();
    output.push_str(&format!("{bold}--- {label} (current){reset}\n"));
    output.push_str(&format!("{bold}+++ {label} (generated){reset}\n"));

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            output.push_str("...\n");
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let (sign, color) = match change.tag() {
                    ChangeTag::Delete => ("-", red),
                    ChangeTag::Insert => ("+", green),
                    ChangeTag::Equal => (" ", ""),
                };
                output.push_str(color);
                output.push_str(sign);
                output.push_str(change.value());
                if change.missing_newline() {
                    output.push('\n');
                }
                if !color.is_empty() {
                    output.push_str(reset);
                }
            }
        }
    }

    output
}
