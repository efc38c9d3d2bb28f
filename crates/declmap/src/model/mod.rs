//! Semantic model: transient declarations produced by a source and the
//! persistent entities owned by the [`SemanticMap`](crate::map::SemanticMap).

mod declaration;
mod entities;

pub use declaration::{
    Declaration, DeclarationKind, DeclaredType, Location, MethodFlags, TypeKind, Visibility,
};
pub use entities::{
    Field, LOW_FREQ_CAP, MED_FREQ_CAP, Method, MethodParameter, StructPath, StructPathNode,
    StructPathNodeKind, Structure, StructureHandle, StructureKind, TemplateArgument,
    TemplateParameter, TemplateParameterKind, Type, TypeHandle, TypeState,
};

#[cfg(test)]
#[path = "../../tests/src/model/model_tests.rs"]
mod tests;
