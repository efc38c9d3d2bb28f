//! In-memory [`DeclarationSource`] built programmatically.
//!
//! Used to drive the mapper without a compiler frontend: declarations are
//! recorded in stream order, `open`/`close` maintain the ancestor stack, and
//! type behavior (declaring declaration, alias and element steps) is
//! registered per spelling.

use std::collections::HashMap;

use super::DeclarationSource;
use crate::model::{Declaration, DeclarationKind, DeclaredType, Location, MethodFlags, Visibility};

pub const SCRIPTED_FILE: &str = "scripted.h";

#[derive(Debug, Clone, Default)]
pub struct ScriptedEntry {
    pub declaration: Declaration,
    pub stack: Vec<Declaration>,
    pub declared_type: DeclaredType,
    pub visibility: Visibility,
    pub flags: MethodFlags,
}

/// Behavior of one type spelling.
#[derive(Debug, Clone, Default)]
pub struct TypeInfo {
    pub declaration: Option<Declaration>,
    /// Result of one canonicalization step; absent means fixed point.
    pub canonical: Option<DeclaredType>,
    pub element: Option<DeclaredType>,
    pub is_const: bool,
}

impl TypeInfo {
    pub fn alias_of(canonical: DeclaredType) -> Self {
        Self {
            canonical: Some(canonical),
            ..Self::default()
        }
    }

    pub fn element_of(element: DeclaredType) -> Self {
        Self {
            element: Some(element),
            ..Self::default()
        }
    }

    pub fn declared_by(declaration: Declaration) -> Self {
        Self {
            declaration: Some(declaration),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    entries: Vec<ScriptedEntry>,
    scope: Vec<Declaration>,
    types: HashMap<String, TypeInfo>,
    next: usize,
    current: Option<usize>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn make_declaration(
        &self,
        kind: DeclarationKind,
        qualified_name: &str,
    ) -> Declaration {
        let identifier = qualified_name.rsplit("::").next().unwrap_or(qualified_name);
        let line = u32::try_from(self.entries.len() + 1).unwrap_or(u32::MAX);
        Declaration::new(kind, qualified_name, identifier, Location::new(SCRIPTED_FILE, line, 1))
    }

    /// Record a declaration at the current nesting level.
    pub fn leaf(
        &mut self,
        kind: DeclarationKind,
        qualified_name: &str,
    ) -> &mut Self {
        let declaration = self.make_declaration(kind, qualified_name);
        self.entries.push(ScriptedEntry {
            declaration,
            stack: self.scope.clone(),
            ..ScriptedEntry::default()
        });
        self
    }

    /// Record a declaration and nest the following ones inside it.
    pub fn open(
        &mut self,
        kind: DeclarationKind,
        qualified_name: &str,
    ) -> &mut Self {
        self.leaf(kind, qualified_name);
        if let Some(entry) = self.entries.last() {
            self.scope.push(entry.declaration.clone());
        }
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.scope.pop();
        self
    }

    /// Declared type of the last recorded declaration.
    pub fn with_type(
        &mut self,
        declared_type: DeclaredType,
    ) -> &mut Self {
        if let Some(entry) = self.entries.last_mut() {
            entry.declared_type = declared_type;
        }
        self
    }

    pub fn with_visibility(
        &mut self,
        visibility: Visibility,
    ) -> &mut Self {
        if let Some(entry) = self.entries.last_mut() {
            entry.visibility = visibility;
        }
        self
    }

    pub fn with_flags(
        &mut self,
        flags: MethodFlags,
    ) -> &mut Self {
        if let Some(entry) = self.entries.last_mut() {
            entry.flags = flags;
        }
        self
    }

    pub fn define_type(
        &mut self,
        spelling: &str,
        info: TypeInfo,
    ) -> &mut Self {
        self.types.insert(spelling.to_owned(), info);
        self
    }

    /// First recorded declaration named `qualified_name`.
    pub fn declaration(
        &self,
        qualified_name: &str,
    ) -> Option<&Declaration> {
        self.entries.iter().map(|e| &e.declaration).find(|d| d.qualified_name == qualified_name)
    }

    pub fn entries(&self) -> &[ScriptedEntry] {
        &self.entries
    }

    /// Restart the stream from the first declaration.
    pub fn rewind(&mut self) {
        self.next = 0;
        self.current = None;
    }

    fn entry_for(
        &self,
        declaration: &Declaration,
    ) -> Option<&ScriptedEntry> {
        self.entries.iter().find(|e| e.declaration == *declaration)
    }
}

impl DeclarationSource for ScriptedSource {
    fn next(&mut self) -> Declaration {
        match self.entries.get(self.next) {
            Some(entry) => {
                self.current = Some(self.next);
                self.next += 1;
                entry.declaration.clone()
            },
            None => {
                self.current = None;
                Declaration::default()
            },
        }
    }

    fn current_cursor_stack(&self) -> &[Declaration] {
        self.current.and_then(|i| self.entries.get(i)).map(|e| e.stack.as_slice()).unwrap_or(&[])
    }

    fn type_declaration(
        &self,
        ty: &DeclaredType,
    ) -> Declaration {
        if let Some(declaration) = self.types.get(&ty.identifier).and_then(|t| t.declaration.as_ref()) {
            return declaration.clone();
        }
        self.entries
            .iter()
            .map(|e| &e.declaration)
            .find(|d| d.kind.is_structure() && d.qualified_name == ty.identifier)
            .cloned()
            .unwrap_or_default()
    }

    fn canonical_type(
        &self,
        ty: &DeclaredType,
    ) -> DeclaredType {
        self.types.get(&ty.identifier).and_then(|t| t.canonical.clone()).unwrap_or_else(|| ty.clone())
    }

    fn element_type(
        &self,
        ty: &DeclaredType,
    ) -> DeclaredType {
        self.types.get(&ty.identifier).and_then(|t| t.element.clone()).unwrap_or_default()
    }

    fn is_const_qualified(
        &self,
        ty: &DeclaredType,
    ) -> bool {
        ty.is_const || self.types.get(&ty.identifier).is_some_and(|t| t.is_const)
    }

    fn visibility(
        &self,
        declaration: &Declaration,
    ) -> Visibility {
        self.entry_for(declaration).map(|e| e.visibility).unwrap_or_default()
    }

    fn declared_type(
        &self,
        declaration: &Declaration,
    ) -> DeclaredType {
        self.entry_for(declaration).map(|e| e.declared_type.clone()).unwrap_or_default()
    }

    fn method_flags(
        &self,
        declaration: &Declaration,
    ) -> MethodFlags {
        self.entry_for(declaration).map(|e| e.flags).unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "../../tests/src/source/scripted_tests.rs"]
mod tests;
