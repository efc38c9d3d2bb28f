use std::io::ErrorKind;
use std::path::Path;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::CompilerSettings;
use crate::source::SourceError;

const HEADER_EXTENSIONS: &[&str] = &["h", "hh", "hpp", "hxx"];

fn clang_command(
    clang: &str,
    args: &[String],
) -> Command {
    let mut command = Command::new(clang);
    command.kill_on_drop(true).args(args);
    command
}

/// Arguments for a JSON AST dump of `path`.
pub(crate) fn dump_args(
    path: &Path,
    settings: &CompilerSettings,
) -> Vec<String> {
    let mut args = vec![
        "-Xclang".to_string(),
        "-ast-dump=json".to_string(),
        "-fsyntax-only".to_string(),
        "-fno-color-diagnostics".to_string(),
    ];
    let is_header = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| HEADER_EXTENSIONS.iter().any(|h| e.eq_ignore_ascii_case(h)));
    if is_header && settings.std.starts_with("c++") {
        args.push("-x".to_string());
        args.push("c++-header".to_string());
    }
    args.extend(settings.frontend_args());
    args.push(path.display().to_string());
    args
}

/// Run the Clang AST dump for `path` and return the raw JSON string.
///
/// A non-zero exit still yields the JSON when clang printed a (partial) AST.
pub async fn run_ast_dump(
    path: &Path,
    settings: &CompilerSettings,
) -> Result<String, SourceError> {
    let args = dump_args(path, settings);
    debug!("AST dump: {} {}", settings.clang, args.join(" "));

    let output = clang_command(&settings.clang, &args).output().await.map_err(|error| {
        if error.kind() == ErrorKind::NotFound {
            SourceError::CommandNotFound {
                command: settings.clang.clone(),
            }
        } else {
            SourceError::LaunchFailed {
                command: settings.clang.clone(),
                error,
            }
        }
    })?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !output.status.success() {
        for line in stderr.lines().filter(|l| l.contains("error:")) {
            warn!("[ast-dump] {line}");
        }
        debug!("[ast-dump] exited with {} (partial AST may still be usable)", output.status);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim_start().starts_with('{') {
        return Err(SourceError::CompileFailed {
            path: path.to_path_buf(),
            status: output.status.code(),
            stderr: stderr.into_owned(),
        });
    }

    debug!("[ast-dump] produced {} bytes of JSON for {}", stdout.len(), path.display());
    Ok(stdout.into_owned())
}

/// Read a pre-generated JSON AST dump.
pub async fn read_ast_json(path: &Path) -> Result<String, SourceError> {
    tokio::fs::read_to_string(path).await.map_err(|error| SourceError::ReadFailed {
        path: path.to_path_buf(),
        error,
    })
}

#[cfg(test)]
#[path = "../../../tests/src/source/clang/compiler_tests.rs"]
mod tests;
