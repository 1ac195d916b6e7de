//! Command line front end for tswire-core.
//!
//! All I/O lives here: reading the schema document and `tswire.toml`, running
//! the optional formatter and writing (or checking) the generated file.

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub mod cli;
pub mod config;
pub mod format;

#[derive(Parser)]
#[command(
    name = "tswire",
    version,
    about = "Generate TypeScript types and wire codecs from a model schema"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the TypeScript module
    Generate(cli::generate::GenerateArgs),
    /// Check that a schema generates cleanly without writing anything
    Validate(cli::validate::ValidateArgs),
}

/// Parse `args` (including the program name) and run the command.
/// Returns the process exit code.
pub fn run_cli(args: Vec<String>) -> i32 {
    match Cli::try_parse_from(args) {
        Ok(cli) => match cli.command {
            Some(Commands::Generate(args)) => cli::generate::run(&args),
            Some(Commands::Validate(args)) => cli::validate::run(&args),
            None => {
                let mut cmd = Cli::command();
                let _ = cmd.print_help();
                println!();
                0
            }
        },
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

/// Install the stderr fmt subscriber.
///
/// TSWIRE_LOG controls the level: "trace", "debug", "info", "warn", "error"
/// (applied to the tswire crates) or a full filter spec like
/// "tswire_core=trace,tswire_cli=info".
pub fn init_tracing() {
    let filter = filter_spec(std::env::var("TSWIRE_LOG").ok().as_deref());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn filter_spec(env: Option<&str>) -> String {
    let crate_root = module_path!();
    match env {
        Some(level) if is_plain_level(level) => {
            format!("{crate_root}={level},tswire_core={level}")
        }
        Some(spec) if !spec.trim().is_empty() => spec.to_string(),
        _ => format!("{crate_root}=info,tswire_core=info"),
    }
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}
