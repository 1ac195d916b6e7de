use clap::Args;
use std::path::PathBuf;

use super::load_schema;

/// Arguments for `tswire validate`.
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Schema document (JSON or YAML)
    #[arg(long, value_name = "PATH")]
    pub schema: PathBuf,
}

/// Run the full pipeline without writing anything and print a summary.
///
/// Returns the process exit code: 0 on success, 1 when loading or
/// generation fails.
pub fn run(args: &ValidateArgs) -> i32 {
    match validate(args) {
        Ok(summary) => {
            println!("{summary}");
            0
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn validate(args: &ValidateArgs) -> Result<String, String> {
    let document = load_schema(&args.schema)?;
    let output = tswire_core::generate_document(&document)
        .map_err(|err| format!("Generation failed for {}: {err}", args.schema.display()))?;
    Ok(format!(
        "{}: {} models, {} enums, {} routes",
        args.schema.display(),
        output.model_count,
        output.enum_count,
        output.route_count
    ))
}
