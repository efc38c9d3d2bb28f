use std::collections::HashMap;

use serde::Deserialize;
use toml::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// `EnvFilter` directive scoping this level to the crate.
    pub fn filter_directive(self) -> String {
        format!("declmap={}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoggingSettings {
    pub level: LogLevel,
}

impl LoggingSettings {
    pub(crate) fn apply_patch(
        &mut self,
        patch: LoggingSettingsPatch,
    ) {
        if let Some(v) = patch.level {
            self.level = v;
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub(crate) struct LoggingSettingsPatch {
    pub(crate) level: Option<LogLevel>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
