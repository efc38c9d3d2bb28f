//! Per-kind type handlers.
//!
//! Every handler goes through [`resolve_with`]: canonicalize, get-or-create
//! the entry by canonical spelling, and fill it in only when this call
//! created it. The entry is registered before its specialization runs, so a
//! self-referential type finds its own reserved slot instead of recursing.

use tracing::debug;

use super::{MapperContext, TypeHandler};
use crate::common::Dispatcher;
use crate::model::{DeclaredType, TypeHandle, TypeKind, TypeState};

/// Kind-specific fill-in, run once right after an entry is created.
pub type Specialization = fn(&mut MapperContext<'_>, TypeHandle, &DeclaredType);

pub(crate) fn default_table() -> Dispatcher<TypeKind, TypeHandler> {
    let mut table: Dispatcher<TypeKind, TypeHandler> = Dispatcher::new();
    table
        .register_all(TypeKind::PRIMITIVES, default_type_handler)
        .register_all([TypeKind::Pointer, TypeKind::LValueRef, TypeKind::RValueRef], reference_type_handler)
        .register_all([TypeKind::ConstantArray, TypeKind::IncompleteArray], array_type_handler)
        .register(TypeKind::Struct, struct_type_handler)
        .register(TypeKind::Enum, enum_type_handler)
        .register(TypeKind::Typedef, typedef_type_handler)
        .register(TypeKind::Unhandled, unhandled_type_handler)
        .set_fallback(unhandled_type_handler);
    table
}

pub fn resolve_with(
    cx: &mut MapperContext<'_>,
    ty: &DeclaredType,
    specialization: Option<Specialization>,
) -> TypeHandle {
    let canonical = cx.canonicalize(ty);
    let (handle, created) = cx.map.get_or_insert_type(&canonical.identifier);
    if !created {
        if cx.map.ty(handle).is_some_and(|entry| !entry.is_resolved()) {
            debug!(spelling = %canonical.identifier, "type referenced while still resolving");
        }
        return handle;
    }

    let is_const = cx.source.is_const_qualified(&canonical);
    if let Some(entry) = cx.map.ty_mut(handle) {
        entry.identifier.clone_from(&canonical.identifier);
        entry.qualified_name.clone_from(&canonical.identifier);
        entry.dimensions = canonical.dimensions;
        entry.is_const = is_const;
        entry.kind = ty.kind;
        entry.state = TypeState::Resolving;
    }

    if let Some(specialize) = specialization {
        specialize(cx, handle, &canonical);
    }

    if let Some(entry) = cx.map.ty_mut(handle) {
        entry.state = TypeState::Resolved;
    }
    handle
}

pub fn default_type_handler(
    cx: &mut MapperContext<'_>,
    ty: &DeclaredType,
) -> TypeHandle {
    resolve_with(cx, ty, None)
}

pub fn reference_type_handler(
    cx: &mut MapperContext<'_>,
    ty: &DeclaredType,
) -> TypeHandle {
    resolve_with(cx, ty, Some(element_base))
}

pub fn array_type_handler(
    cx: &mut MapperContext<'_>,
    ty: &DeclaredType,
) -> TypeHandle {
    resolve_with(cx, ty, Some(element_base))
}

pub fn struct_type_handler(
    cx: &mut MapperContext<'_>,
    ty: &DeclaredType,
) -> TypeHandle {
    resolve_with(cx, ty, Some(inplace_structure))
}

pub fn typedef_type_handler(
    cx: &mut MapperContext<'_>,
    ty: &DeclaredType,
) -> TypeHandle {
    resolve_with(cx, ty, Some(aliased_base))
}

/// Enums are registered but not modeled; the entry is reported as unhandled.
pub fn enum_type_handler(
    cx: &mut MapperContext<'_>,
    ty: &DeclaredType,
) -> TypeHandle {
    let handle = resolve_with(cx, ty, None);
    if let Some(entry) = cx.map.ty_mut(handle) {
        entry.kind = TypeKind::Unhandled;
    }
    handle
}

// TODO: extract template arguments of specialization spellings into `template_arguments`.
pub fn unhandled_type_handler(
    cx: &mut MapperContext<'_>,
    ty: &DeclaredType,
) -> TypeHandle {
    resolve_with(cx, ty, None)
}

/// Pointee, referent or element type as `base`.
fn element_base(
    cx: &mut MapperContext<'_>,
    handle: TypeHandle,
    canonical: &DeclaredType,
) {
    let element = cx.source.element_type(canonical);
    if element == *canonical || element.identifier.is_empty() {
        return;
    }
    set_base(cx, handle, &element);
}

/// One alias layer down as `base`.
fn aliased_base(
    cx: &mut MapperContext<'_>,
    handle: TypeHandle,
    canonical: &DeclaredType,
) {
    let aliased = cx.source.canonical_type(canonical);
    if aliased == *canonical || aliased.identifier.is_empty() {
        return;
    }
    set_base(cx, handle, &aliased);
}

fn set_base(
    cx: &mut MapperContext<'_>,
    handle: TypeHandle,
    target: &DeclaredType,
) {
    let base = cx.resolve_type(target);
    if base == handle {
        return;
    }
    if let Some(entry) = cx.map.ty_mut(handle) {
        entry.base = base;
    }
}

/// Links a struct type to its [`Structure`](crate::model::Structure) entry,
/// creating it when the declaration has not been visited yet.
fn inplace_structure(
    cx: &mut MapperContext<'_>,
    handle: TypeHandle,
    canonical: &DeclaredType,
) {
    let declaration = cx.source.type_declaration(canonical);
    if !declaration.kind.is_structure() {
        debug!(
            spelling = %canonical.identifier,
            kind = ?declaration.kind,
            "struct type without a structure declaration"
        );
        return;
    }

    let structure = cx.map.get_structure(&declaration.qualified_name);
    if let Some(entry) = cx.map.structure_mut(structure) {
        entry.apply_declaration(&declaration);
    }
    if let Some(entry) = cx.map.ty_mut(handle) {
        entry.kind = TypeKind::Struct;
        entry.base_structure = structure;
    }
}

#[cfg(test)]
#[path = "../../tests/src/mapper/type_handlers_tests.rs"]
mod tests;
