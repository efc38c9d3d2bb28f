use std::collections::HashMap;

use serde::Deserialize;
use toml::Value;

pub const DEFAULT_CLANG: &str = "clang";
pub const DEFAULT_LANGUAGE_STANDARD: &str = "c++17";

/// How the Clang frontend is invoked to produce the JSON AST.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerSettings {
    pub clang: String,
    pub include_paths: Vec<String>,
    pub extra_flags: Vec<String>,
    /// Value for `-std=`; empty leaves the frontend default.
    pub std: String,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            clang: DEFAULT_CLANG.to_string(),
            include_paths: Vec::new(),
            extra_flags: Vec::new(),
            std: DEFAULT_LANGUAGE_STANDARD.to_string(),
        }
    }
}

impl CompilerSettings {
    pub(crate) fn apply_patch(
        &mut self,
        patch: CompilerSettingsPatch,
    ) {
        if let Some(v) = patch.clang {
            self.clang = v;
        }
        if let Some(v) = patch.include_paths {
            self.include_paths = v;
        }
        if let Some(v) = patch.extra_flags {
            self.extra_flags = v;
        }
        if let Some(v) = patch.std {
            self.std = v;
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.clang = self.clang.trim().to_string();
        if self.clang.is_empty() {
            self.clang = DEFAULT_CLANG.to_string();
        }
        self.std = self.std.trim().to_string();
        self.include_paths =
            self.include_paths.iter().map(|p| p.trim().to_string()).filter(|p| !p.is_empty()).collect();
        self.extra_flags = self.extra_flags.iter().map(|f| f.trim().to_string()).filter(|f| !f.is_empty()).collect();
    }

    /// Frontend arguments derived from these settings, without the input path.
    pub fn frontend_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.include_paths.len() + self.extra_flags.len() + 1);
        if !self.std.is_empty() {
            args.push(format!("-std={}", self.std));
        }
        args.extend(self.include_paths.iter().map(|p| format!("-I{p}")));
        args.extend(self.extra_flags.iter().cloned());
        args
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub(crate) struct CompilerSettingsPatch {
    pub(crate) clang: Option<String>,
    pub(crate) include_paths: Option<Vec<String>>,
    pub(crate) extra_flags: Option<Vec<String>>,
    pub(crate) std: Option<String>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
