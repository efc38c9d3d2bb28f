//! [`DeclarationSource`] backed by Clang's JSON AST dump.
//!
//! The dump is flattened once into a declaration stream plus name tables;
//! type queries then work on `qualType` spellings, qualified against the
//! scope chain of the declaration that wrote them.

pub mod clang_nodes;
pub mod compiler;
pub(crate) mod flatten;
pub mod type_spelling;

use std::path::{Path, PathBuf};

use tracing::debug;

pub use compiler::{read_ast_json, run_ast_dump};
use flatten::{FlatEntry, Flattener, NameEntry, TypeTables};
pub use type_spelling::Shape;
use type_spelling::builtin_kind;

use super::{DeclarationSource, SourceError};
use crate::config::CompilerSettings;
use crate::model::{Declaration, DeclarationKind, DeclaredType, MethodFlags, TypeKind, Visibility};

pub struct ClangSource {
    input: PathBuf,
    entries: Vec<FlatEntry>,
    tables: TypeTables,
    next: usize,
    current: Option<usize>,
}

impl ClangSource {
    pub fn from_root(
        root: &clang_nodes::Node,
        input: &Path,
    ) -> Self {
        let input_name = input.display().to_string();
        let (mut entries, tables) = Flattener::run(root, &input_name);

        for entry in entries.iter_mut().filter(|e| e.declaration.kind == DeclarationKind::BaseSpecifier) {
            let written = entry.spelling.clone().unwrap_or_default();
            let shape = Shape::parse(&written);
            let name = shape.named().unwrap_or(written.as_str());
            let qualified = tables.resolve(name, &entry.scope).unwrap_or(name).to_owned();
            let identifier = qualified.rsplit("::").next().unwrap_or(&qualified).to_owned();
            entry.declaration.qualified_name = qualified;
            entry.declaration.identifier = identifier;
        }

        Self {
            input: input.to_path_buf(),
            entries,
            tables,
            next: 0,
            current: None,
        }
    }

    pub fn from_json(
        json: &str,
        input: &Path,
    ) -> Result<Self, SourceError> {
        let root: clang_nodes::Node = serde_json::from_str(json).map_err(|error| SourceError::InvalidJson {
            path: input.to_path_buf(),
            error,
        })?;
        Ok(Self::from_root(&root, input))
    }

    /// Dump `input` with clang and flatten the result.
    pub async fn load(
        input: &Path,
        settings: &CompilerSettings,
    ) -> Result<Self, SourceError> {
        let json = run_ast_dump(input, settings).await?;
        let source = Self::from_json(&json, input)?;
        debug!(input = %input.display(), declarations = source.len(), "clang source ready");
        Ok(source)
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Declarations in the stream.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All stream declarations in order.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.entries.iter().map(|e| &e.declaration)
    }

    pub fn rewind(&mut self) {
        self.next = 0;
        self.current = None;
    }

    fn entry_for(
        &self,
        declaration: &Declaration,
    ) -> Option<&FlatEntry> {
        if let Some(entry) = self.current.and_then(|i| self.entries.get(i))
            && entry.declaration == *declaration
        {
            return Some(entry);
        }
        self.entries.iter().find(|e| e.declaration == *declaration)
    }

    fn qualify(
        &self,
        shape: Shape,
        scope: &[String],
    ) -> Shape {
        shape.map_named(&mut |name, is_const| {
            let name = if builtin_kind(&name).is_some() {
                name
            } else {
                self.tables.resolve(&name, scope).map_or(name, str::to_owned)
            };
            Shape::Named {
                name,
                is_const,
            }
        })
    }

    fn named_kind(
        &self,
        name: &str,
    ) -> TypeKind {
        if let Some(kind) = builtin_kind(name) {
            return kind;
        }
        match self.tables.get(name) {
            Some(NameEntry::Record(_)) => TypeKind::Struct,
            Some(NameEntry::Enum(_)) => TypeKind::Enum,
            Some(NameEntry::Alias {
                ..
            }) => TypeKind::Typedef,
            None => TypeKind::Unhandled,
        }
    }

    fn to_declared(
        &self,
        shape: &Shape,
    ) -> DeclaredType {
        let kind = match shape {
            Shape::Named {
                name,
                ..
            } => self.named_kind(name),
            other => other.kind(),
        };
        DeclaredType {
            identifier: shape.render(),
            is_const: shape.is_const(),
            kind,
            dimensions: shape.dimensions(),
        }
    }

    fn is_alias(
        &self,
        name: &str,
    ) -> bool {
        matches!(
            self.tables.get(name),
            Some(NameEntry::Alias {
                ..
            })
        )
    }

    /// Aliased shape of a typedef, qualified in the typedef's own scope.
    fn alias_target(
        &self,
        name: &str,
    ) -> Option<Shape> {
        match self.tables.get(name)? {
            NameEntry::Alias {
                target,
                scope,
                ..
            } => Some(self.qualify(Shape::parse(target), scope)),
            _ => None,
        }
    }
}

impl DeclarationSource for ClangSource {
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
        let Shape::Named {
            name,
            ..
        } = Shape::parse(&ty.identifier)
        else {
            return Declaration::default();
        };
        match self.tables.get(&name) {
            Some(NameEntry::Record(declaration) | NameEntry::Enum(declaration)) => declaration.clone(),
            Some(NameEntry::Alias {
                declaration,
                ..
            }) => declaration.clone(),
            None => Declaration::default(),
        }
    }

    fn canonical_type(
        &self,
        ty: &DeclaredType,
    ) -> DeclaredType {
        let shape = Shape::parse(&ty.identifier);
        if !shape.named().is_some_and(|name| self.is_alias(name)) {
            return ty.clone();
        }
        let stripped = shape.map_named(&mut |name, is_const| match self.alias_target(&name) {
            Some(target) => target.with_const(is_const),
            None => Shape::Named {
                name,
                is_const,
            },
        });
        self.to_declared(&stripped)
    }

    fn element_type(
        &self,
        ty: &DeclaredType,
    ) -> DeclaredType {
        match Shape::parse(&ty.identifier).inner() {
            Some(inner) => self.to_declared(inner),
            None => DeclaredType::default(),
        }
    }

    fn is_const_qualified(
        &self,
        ty: &DeclaredType,
    ) -> bool {
        ty.is_const || Shape::parse(&ty.identifier).is_const()
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
        let Some(entry) = self.entry_for(declaration) else {
            return DeclaredType::default();
        };
        match entry.spelling.as_deref() {
            Some(spelling) if !spelling.is_empty() => {
                let shape = self.qualify(Shape::parse(spelling), &entry.scope);
                self.to_declared(&shape)
            },
            _ => DeclaredType::default(),
        }
    }

    fn method_flags(
        &self,
        declaration: &Declaration,
    ) -> MethodFlags {
        self.entry_for(declaration).map(|e| e.flags).unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "../../../tests/src/source/clang/clang_source_tests.rs"]
mod tests;
