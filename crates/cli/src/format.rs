//! External formatter (prettier by default).
//!
//! The generated code is written to a temporary `.ts` file, the formatter
//! rewrites it in place and the result is read back.

use std::fs;
use std::io::Write;
use std::process::Command;

use crate::config::FormatConfig;

/// Run the configured formatter over `code`.
pub fn format_typescript(code: &str, config: &FormatConfig) -> Result<String, String> {
    let program = which::which(&config.command)
        .map_err(|err| format!("Failed to locate formatter `{}`: {err}", config.command))?;

    let mut file = tempfile::Builder::new()
        .prefix("tswire-")
        .suffix(".ts")
        .tempfile()
        .map_err(|err| format!("Failed to create temporary file: {err}"))?;
    file.write_all(code.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|err| format!("Failed to write temporary file: {err}"))?;

    tracing::debug!(program = %program.display(), args = ?config.args, "running formatter");
    let output = Command::new(&program)
        .args(&config.args)
        .arg(file.path())
        .output()
        .map_err(|err| format!("Failed to run `{}`: {err}", config.command))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "Formatter `{}` exited with {}: {}",
            config.command,
            output.status,
            stderr.trim()
        ));
    }

    fs::read_to_string(file.path())
        .map_err(|err| format!("Failed to read formatted output: {err}"))
}
