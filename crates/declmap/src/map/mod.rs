//! Deduplicating registry of structures and types keyed by qualified name.

use std::collections::HashMap;

use crate::common::Store;
use crate::model::{Structure, StructureHandle, Type, TypeHandle};

/// Map stores start on the heap; a translation unit registers far more
/// entries than any inline buffer would hold.
pub const MAP_STORE_INLINE_CAP: usize = 0;

/// Owns every [`Structure`] and [`Type`] of a build.
///
/// Each backing store is paired with a name index; an index entry always
/// designates a live element of its store. Handles returned by one map do not
/// resolve against another.
#[derive(Default)]
pub struct SemanticMap {
    structures: Store<Structure, MAP_STORE_INLINE_CAP>,
    types: Store<Type, MAP_STORE_INLINE_CAP>,
    structure_index: HashMap<String, usize>,
    type_index: HashMap<String, usize>,
}

impl SemanticMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lookup only; null handle when `qualified_name` is not registered.
    pub fn find_structure(
        &self,
        qualified_name: &str,
    ) -> StructureHandle {
        self.structure_index
            .get(qualified_name)
            .and_then(|&index| self.structures.handle(index))
            .unwrap_or_default()
    }

    /// Lookup only; null handle when `qualified_name` is not registered.
    pub fn find_type(
        &self,
        qualified_name: &str,
    ) -> TypeHandle {
        self.type_index
            .get(qualified_name)
            .and_then(|&index| self.types.handle(index))
            .unwrap_or_default()
    }

    pub fn get_structure(
        &mut self,
        qualified_name: &str,
    ) -> StructureHandle {
        self.get_or_insert_structure(qualified_name).0
    }

    pub fn get_type(
        &mut self,
        qualified_name: &str,
    ) -> TypeHandle {
        self.get_or_insert_type(qualified_name).0
    }

    /// Find-or-create. A new entry has only its qualified name set. The flag
    /// is `true` when this call created the entry.
    pub fn get_or_insert_structure(
        &mut self,
        qualified_name: &str,
    ) -> (StructureHandle, bool) {
        let found = self.find_structure(qualified_name);
        if !found.is_null() {
            return (found, false);
        }
        let handle = self.structures.push(Structure {
            qualified_name: qualified_name.to_owned(),
            ..Structure::default()
        });
        self.structure_index.insert(qualified_name.to_owned(), handle.index());
        (handle, true)
    }

    /// Find-or-create. A new entry has only its qualified name set and is in
    /// the `Reserved` state. The flag is `true` when this call created it.
    pub fn get_or_insert_type(
        &mut self,
        qualified_name: &str,
    ) -> (TypeHandle, bool) {
        let found = self.find_type(qualified_name);
        if !found.is_null() {
            return (found, false);
        }
        let handle = self.types.push(Type {
            qualified_name: qualified_name.to_owned(),
            ..Type::default()
        });
        self.type_index.insert(qualified_name.to_owned(), handle.index());
        (handle, true)
    }

    pub fn structure(
        &self,
        handle: StructureHandle,
    ) -> Option<&Structure> {
        self.structures.get(handle)
    }

    pub fn structure_mut(
        &mut self,
        handle: StructureHandle,
    ) -> Option<&mut Structure> {
        self.structures.get_mut(handle)
    }

    pub fn ty(
        &self,
        handle: TypeHandle,
    ) -> Option<&Type> {
        self.types.get(handle)
    }

    pub fn ty_mut(
        &mut self,
        handle: TypeHandle,
    ) -> Option<&mut Type> {
        self.types.get_mut(handle)
    }

    /// Registered structures in creation order.
    pub fn structures(&self) -> &[Structure] {
        self.structures.as_slice()
    }

    /// Registered types in creation order.
    pub fn types(&self) -> &[Type] {
        self.types.as_slice()
    }

    pub fn iter_structures(&self) -> impl Iterator<Item = (StructureHandle, &Structure)> {
        self.structures.iter()
    }

    pub fn iter_types(&self) -> impl Iterator<Item = (TypeHandle, &Type)> {
        self.types.iter()
    }

    /// Snapshot of all structures.
    pub fn get_structures(&self) -> Vec<Structure> {
        self.structures().to_vec()
    }

    /// Snapshot of all types.
    pub fn get_types(&self) -> Vec<Type> {
        self.types().to_vec()
    }

    pub fn len_structures(&self) -> usize {
        self.structures.len()
    }

    pub fn len_types(&self) -> usize {
        self.types.len()
    }
}

impl std::fmt::Debug for SemanticMap {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("SemanticMap")
            .field("structures", &self.structures())
            .field("types", &self.types())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/src/map/map_tests.rs"]
mod tests;
