//! Serializable snapshot of a [`SemanticMap`].

use serde::Serialize;

use crate::map::SemanticMap;
use crate::model::{Structure, Type};

/// Structures and types of one build, in creation order. Handles inside
/// serialize as indices into these two lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelSnapshot {
    pub source: String,
    pub structures: Vec<Structure>,
    pub types: Vec<Type>,
}

impl ModelSnapshot {
    pub fn from_map(
        source: impl Into<String>,
        map: &SemanticMap,
    ) -> Self {
        Self {
            source: source.into(),
            structures: map.get_structures(),
            types: map.get_types(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Pretty JSON array of several snapshots.
pub fn snapshots_to_json(snapshots: &[ModelSnapshot]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(snapshots)
}

#[cfg(test)]
#[path = "../tests/src/export_tests.rs"]
mod tests;
