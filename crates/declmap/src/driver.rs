//! Input discovery and the dump → map → snapshot pipeline used by the CLI.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::Settings;
use crate::export::ModelSnapshot;
use crate::mapper::Mapper;
use crate::source::SourceError;
use crate::source::clang::{ClangSource, read_ast_json};

pub const INPUT_EXTENSIONS: &[&str] = &["h", "hh", "hpp", "hxx", "c", "cc", "cpp", "cxx"];

pub fn is_input_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| INPUT_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Expand directories into the C/C++ files below them, sorted by path.
/// Explicit file arguments are kept whatever their extension.
pub fn collect_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        let before = files.len();
        for entry in WalkDir::new(input).follow_links(true).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_file() && is_input_file(entry.path()) {
                files.push(entry.into_path());
            }
        }
        debug!(dir = %input.display(), found = files.len() - before, "collected inputs");
    }
    files
}

/// Dump `path` with clang and map it.
pub async fn map_file(
    path: &Path,
    settings: &Settings,
) -> Result<ModelSnapshot, SourceError> {
    let mut source = ClangSource::load(path, &settings.compiler).await?;
    Ok(build_snapshot(&mut source, settings))
}

/// Map a pre-generated JSON dump; `input` names the translation unit.
pub async fn map_ast_json(
    dump: &Path,
    input: &Path,
    settings: &Settings,
) -> Result<ModelSnapshot, SourceError> {
    let json = read_ast_json(dump).await?;
    let mut source = ClangSource::from_json(&json, input)?;
    Ok(build_snapshot(&mut source, settings))
}

fn build_snapshot(
    source: &mut ClangSource,
    settings: &Settings,
) -> ModelSnapshot {
    let mapper = Mapper::new(settings.mapper.clone());
    let map = mapper.build_map(source);
    info!(
        input = %source.input().display(),
        structures = map.len_structures(),
        types = map.len_types(),
        "mapped translation unit"
    );
    ModelSnapshot::from_map(source.input().display().to_string(), &map)
}

#[cfg(test)]
#[path = "../tests/src/driver_tests.rs"]
mod tests;
