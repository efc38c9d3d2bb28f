//! Per-kind declaration handlers.

use tracing::{debug, warn};

use super::{DeclarationHandler, MapperContext};
use crate::common::Dispatcher;
use crate::model::{Declaration, DeclarationKind, Field, Method, MethodParameter, Visibility};

pub(crate) fn default_table() -> Dispatcher<DeclarationKind, DeclarationHandler> {
    let mut table: Dispatcher<DeclarationKind, DeclarationHandler> = Dispatcher::new();
    table
        .register(DeclarationKind::Struct, structure_handler)
        .register(DeclarationKind::Class, structure_handler)
        .register(DeclarationKind::BaseSpecifier, base_specifier_handler)
        .register(DeclarationKind::Field, field_handler)
        .register(DeclarationKind::Method, method_handler)
        .register(DeclarationKind::Parameter, parameter_handler)
        .register_all(
            [DeclarationKind::Function, DeclarationKind::Namespace, DeclarationKind::Unsupported],
            ignore_handler,
        )
        .set_fallback(ignore_handler);
    table
}

pub fn ignore_handler(
    _cx: &mut MapperContext<'_>,
    _declaration: &Declaration,
) {
}

/// Struct and class declarations. Revisiting a name refines the same entry.
pub fn structure_handler(
    cx: &mut MapperContext<'_>,
    declaration: &Declaration,
) {
    let path = cx.make_struct_path();
    let visibility = cx.source.visibility(declaration);
    let handle = cx.map.get_structure(&declaration.qualified_name);
    let Some(structure) = cx.map.structure_mut(handle) else {
        return;
    };
    structure.apply_declaration(declaration);
    structure.path = path;
    if visibility != Visibility::Invalid {
        structure.visibility = visibility;
    }
}

/// Appends the named base to the enclosing structure's parents. Repeated
/// bases are appended again.
pub fn base_specifier_handler(
    cx: &mut MapperContext<'_>,
    declaration: &Declaration,
) {
    let base = cx.map.get_structure(&declaration.qualified_name);
    let Some(derived) = cx.enclosing_structure() else {
        warn!(base = %declaration.qualified_name, "base specifier without an enclosing structure");
        return;
    };
    if let Some(structure) = cx.map.structure_mut(derived) {
        structure.parents.push(base);
    }
}

pub fn field_handler(
    cx: &mut MapperContext<'_>,
    declaration: &Declaration,
) {
    let declared = cx.source.declared_type(declaration);
    let ty = cx.resolve_type(&declared);
    let visibility = cx.source.visibility(declaration);

    let Some(owner) = cx.enclosing_structure() else {
        warn!(field = %declaration.qualified_name, "field without an enclosing structure");
        return;
    };
    if let Some(structure) = cx.map.structure_mut(owner) {
        structure.fields.push(Field {
            location: declaration.location.clone(),
            qualified_name: declaration.qualified_name.clone(),
            identifier: declaration.identifier.clone(),
            ty,
            visibility,
        });
    }
}

/// Records a method on its enclosing structure when method modeling is on.
pub fn method_handler(
    cx: &mut MapperContext<'_>,
    declaration: &Declaration,
) {
    if !cx.settings().model_methods {
        return;
    }
    match cx.enclosing_declaration() {
        Some(parent) if parent.kind.is_structure() => {},
        _ => {
            debug!(method = %declaration.qualified_name, "method outside a structure skipped");
            return;
        },
    }

    let declared = cx.source.declared_type(declaration);
    let return_type = cx.resolve_type(&declared);
    let visibility = cx.source.visibility(declaration);
    let flags = cx.source.method_flags(declaration);

    let Some(owner) = cx.enclosing_structure() else {
        return;
    };
    if let Some(structure) = cx.map.structure_mut(owner) {
        structure.methods.push(Method {
            location: declaration.location.clone(),
            identifier: declaration.identifier.clone(),
            qualified_name: declaration.qualified_name.clone(),
            return_type,
            visibility,
            flags,
            ..Method::default()
        });
    }
}

/// Appends a parameter to the most recent method of the same name on the
/// structure enclosing that method. Free function parameters are ignored.
pub fn parameter_handler(
    cx: &mut MapperContext<'_>,
    declaration: &Declaration,
) {
    if !cx.settings().model_methods {
        return;
    }
    let stack = cx.source.current_cursor_stack();
    let [.., owner, method] = stack else {
        return;
    };
    if method.kind != DeclarationKind::Method || !owner.kind.is_structure() {
        return;
    }
    let method_name = method.qualified_name.clone();
    let owner_handle = cx.map.find_structure(&owner.qualified_name);
    if owner_handle.is_null() {
        debug!(method = %method_name, "parameter of an unregistered structure skipped");
        return;
    }

    let declared = cx.source.declared_type(declaration);
    let ty = cx.resolve_type(&declared);

    let Some(structure) = cx.map.structure_mut(owner_handle) else {
        return;
    };
    match structure.methods.iter_mut().rev().find(|m| m.qualified_name == method_name) {
        Some(method) => method.parameters.push(MethodParameter {
            ty,
            identifier: declaration.identifier.clone(),
        }),
        None => debug!(method = %method_name, "parameter before its method skipped"),
    }
}

#[cfg(test)]
#[path = "../../tests/src/mapper/declaration_handlers_tests.rs"]
mod tests;
