//! Declarative configuration.
//!
//! Settings are split into one file per category. [`Settings`] aggregates
//! them and loads a `declmap.toml`, found next to the inputs or in any parent
//! directory. Every key is optional; unknown keys are ignored.

pub(crate) mod compiler;
pub(crate) mod logging;
pub(crate) mod mapper;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

pub use compiler::{CompilerSettings, DEFAULT_CLANG, DEFAULT_LANGUAGE_STANDARD};
use compiler::CompilerSettingsPatch;
use logging::LoggingSettingsPatch;
pub use logging::{LogLevel, LoggingSettings};
pub use mapper::{DEFAULT_ALIAS_DEPTH, MAX_ALIAS_DEPTH, MIN_ALIAS_DEPTH, MapperSettings};
use mapper::MapperSettingsPatch;
use serde::Deserialize;
use toml::Value;

pub const CONFIG_FILENAME: &str = "declmap.toml";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Settings {
    pub compiler: CompilerSettings,
    pub mapper: MapperSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Defaults overlaid with the TOML document `text`.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let patch: SettingsPatch = toml::from_str(text)?;
        let mut settings = Self::default();
        settings.apply_patch(patch);
        settings.normalize();
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Read {
            path: path.to_path_buf(),
            error,
        })?;
        Self::from_toml_str(&text).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Load the nearest `declmap.toml` above `start`, or defaults when none exists.
    pub fn discover(start: &Path) -> Result<(Self, Option<PathBuf>), ConfigError> {
        match find_config_file(start) {
            Some(path) => Ok((Self::load(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    fn apply_patch(
        &mut self,
        patch: SettingsPatch,
    ) {
        if let Some(p) = patch.compiler {
            self.compiler.apply_patch(p);
        }
        if let Some(p) = patch.mapper {
            self.mapper.apply_patch(p);
        }
        if let Some(p) = patch.logging {
            self.logging.apply_patch(p);
        }
    }

    /// Clamp and trim every category; run after overriding fields directly.
    pub fn normalize(&mut self) {
        self.compiler.normalize();
        self.mapper.normalize();
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct SettingsPatch {
    compiler: Option<CompilerSettingsPatch>,
    mapper: Option<MapperSettingsPatch>,
    logging: Option<LoggingSettingsPatch>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

/// Walk from `start` (a file or directory) up to the filesystem root looking
/// for a `declmap.toml`.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = if start.is_file() {
        start.parent()?
    } else {
        start
    };
    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, error: std::io::Error },
    Parse { path: PathBuf, error: toml::de::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Read {
                path,
                error,
            } => write!(f, "cannot read {}: {error}", path.display()),
            Self::Parse {
                path,
                error,
            } => write!(f, "invalid {}: {error}", path.display()),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read {
                error,
                ..
            } => Some(error),
            Self::Parse {
                error,
                ..
            } => Some(error),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src/config/config_tests.rs"]
mod tests;
