//! Single-pass resolution engine.
//!
//! [`Mapper::build_map`] pulls declarations from a [`DeclarationSource`] and
//! dispatches each one by kind to a declaration handler. Handlers mutate the
//! [`SemanticMap`] through a [`MapperContext`] and resolve use-site types
//! through the type dispatch table, which may recurse for pointer, array and
//! alias element types.

pub mod declaration_handlers;
pub mod type_handlers;

use tracing::{debug, info, warn};

use crate::common::Dispatcher;
use crate::config::MapperSettings;
use crate::map::SemanticMap;
use crate::model::{
    Declaration, DeclarationKind, DeclaredType, StructPath, StructPathNode, StructPathNodeKind, StructureHandle,
    TypeHandle, TypeKind,
};
use crate::source::DeclarationSource;

pub type DeclarationHandler = fn(&mut MapperContext<'_>, &Declaration);
pub type TypeHandler = fn(&mut MapperContext<'_>, &DeclaredType) -> TypeHandle;

pub struct Mapper {
    settings: MapperSettings,
    declaration_handlers: Dispatcher<DeclarationKind, DeclarationHandler>,
    type_handlers: Dispatcher<TypeKind, TypeHandler>,
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new(MapperSettings::default())
    }
}

impl Mapper {
    pub fn new(mut settings: MapperSettings) -> Self {
        settings.normalize();
        Self {
            settings,
            declaration_handlers: declaration_handlers::default_table(),
            type_handlers: type_handlers::default_table(),
        }
    }

    pub fn settings(&self) -> &MapperSettings {
        &self.settings
    }

    /// Replace the handler for one declaration kind.
    pub fn register_declaration_handler(
        &mut self,
        kind: DeclarationKind,
        handler: DeclarationHandler,
    ) -> &mut Self {
        self.declaration_handlers.register(kind, handler);
        self
    }

    /// Replace the handler for one type kind.
    pub fn register_type_handler(
        &mut self,
        kind: TypeKind,
        handler: TypeHandler,
    ) -> &mut Self {
        self.type_handlers.register(kind, handler);
        self
    }

    /// Drain `source` into a fresh map.
    pub fn build_map(
        &self,
        source: &mut dyn DeclarationSource,
    ) -> SemanticMap {
        let mut map = SemanticMap::new();
        let mut cx = MapperContext {
            mapper: self,
            source,
            map: &mut map,
        };

        let mut visited = 0usize;
        loop {
            let declaration = cx.source.next();
            if declaration.is_empty() {
                break;
            }
            visited += 1;
            cx.dispatch_declaration(&declaration);
        }

        info!(
            declarations = visited,
            structures = map.len_structures(),
            types = map.len_types(),
            "semantic map built"
        );
        map
    }
}

/// Shared state handed to every handler during one build.
pub struct MapperContext<'m> {
    pub mapper: &'m Mapper,
    pub source: &'m mut dyn DeclarationSource,
    pub map: &'m mut SemanticMap,
}

impl MapperContext<'_> {
    pub fn settings(&self) -> &MapperSettings {
        &self.mapper.settings
    }

    pub fn dispatch_declaration(
        &mut self,
        declaration: &Declaration,
    ) {
        debug!(kind = ?declaration.kind, name = %declaration.qualified_name, "dispatch declaration");
        let mapper = self.mapper;
        mapper.declaration_handlers.execute(&declaration.kind, |handler| handler(self, declaration));
    }

    /// Resolve a use-site type through the type dispatch table.
    pub fn resolve_type(
        &mut self,
        ty: &DeclaredType,
    ) -> TypeHandle {
        let mapper = self.mapper;
        mapper.type_handlers.execute(&ty.kind, |handler| handler(self, ty))
    }

    /// Chase aliases until a typedef-kind form is reached.
    ///
    /// Stops early when a step returns its input unchanged, and after
    /// `max_alias_depth` steps.
    pub fn canonicalize(
        &self,
        ty: &DeclaredType,
    ) -> DeclaredType {
        let mut canonical = ty.clone();
        let mut steps = 0;
        while canonical.kind != TypeKind::Typedef {
            if steps == self.settings().max_alias_depth {
                warn!(
                    spelling = %ty.identifier,
                    depth = steps,
                    "alias canonicalization hit the depth bound; using last form"
                );
                break;
            }
            let next = self.source.canonical_type(&canonical);
            steps += 1;
            if next == canonical {
                break;
            }
            canonical = next;
        }
        canonical
    }

    /// Innermost enclosing declaration of the current one.
    pub fn enclosing_declaration(&self) -> Option<&Declaration> {
        self.source.current_cursor_stack().last()
    }

    /// Find-or-create the structure enclosing the current declaration.
    ///
    /// `None` when the innermost enclosing declaration is not a struct or
    /// class, so a namespace never becomes a structure.
    pub fn enclosing_structure(&mut self) -> Option<StructureHandle> {
        let enclosing = self.enclosing_declaration().filter(|d| d.kind.is_structure())?;
        let name = enclosing.qualified_name.clone();
        Some(self.map.get_structure(&name))
    }

    /// Nesting of the current declaration, outermost scope first.
    ///
    /// Enclosing structures are looked up, never created; an enclosing
    /// structure that is not registered yet yields a null handle.
    pub fn make_struct_path(&self) -> StructPath {
        self.source
            .current_cursor_stack()
            .iter()
            .map(|ancestor| {
                let kind = match ancestor.kind {
                    DeclarationKind::Namespace => StructPathNodeKind::Namespace,
                    DeclarationKind::Struct | DeclarationKind::Class => StructPathNodeKind::Structure,
                    _ => StructPathNodeKind::Unsupported,
                };
                let structure = match kind {
                    StructPathNodeKind::Structure => self.map.find_structure(&ancestor.qualified_name),
                    _ => StructureHandle::null(),
                };
                StructPathNode {
                    identifier: ancestor.identifier.clone(),
                    structure,
                    kind,
                }
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/src/mapper/mapper_tests.rs"]
mod tests;
