use std::collections::HashMap;

use serde::Deserialize;
use toml::Value;

pub const MIN_ALIAS_DEPTH: usize = 1;
pub const MAX_ALIAS_DEPTH: usize = 64;
pub const DEFAULT_ALIAS_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct MapperSettings {
    /// Upper bound on canonicalization steps while chasing a type alias.
    pub max_alias_depth: usize,
    /// Record methods and their parameters on structures.
    pub model_methods: bool,
}

impl Default for MapperSettings {
    fn default() -> Self {
        Self {
            max_alias_depth: DEFAULT_ALIAS_DEPTH,
            model_methods: false,
        }
    }
}

impl MapperSettings {
    pub(crate) fn apply_patch(
        &mut self,
        patch: MapperSettingsPatch,
    ) {
        if let Some(v) = patch.max_alias_depth {
            self.max_alias_depth = v;
        }
        if let Some(v) = patch.model_methods {
            self.model_methods = v;
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.max_alias_depth = self.max_alias_depth.clamp(MIN_ALIAS_DEPTH, MAX_ALIAS_DEPTH);
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub(crate) struct MapperSettingsPatch {
    pub(crate) max_alias_depth: Option<usize>,
    pub(crate) model_methods: Option<bool>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
