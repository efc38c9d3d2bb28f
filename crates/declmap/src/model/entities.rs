use serde::Serialize;

use crate::common::{Handle, SmallVec};

use super::declaration::{Declaration, DeclarationKind, Location, MethodFlags, TypeKind, Visibility};

/// Inline capacity for lists that are usually empty or tiny (parents,
/// template parameters, method parameters).
pub const LOW_FREQ_CAP: usize = 4;
/// Inline capacity for lists that usually hold a handful of entries
/// (fields, methods, struct path nodes).
pub const MED_FREQ_CAP: usize = 8;

pub type TypeHandle = Handle<Type>;
pub type StructureHandle = Handle<Structure>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateParameterKind {
    #[default]
    Unsupported,
    Type,
    NonType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateParameter {
    #[serde(rename = "type")]
    pub ty: TypeHandle,
    pub identifier: String,
    pub kind: TemplateParameterKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateArgument {
    pub parameter: TemplateParameter,
    /// Literal value for non-type arguments.
    pub value: String,
}

/// Fill-in progress of a [`Type`] entry.
///
/// An entry is `Reserved` as soon as the map allocates it, `Resolving` while
/// its kind specialization runs (recursive resolution may observe it in this
/// state), and `Resolved` afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeState {
    #[default]
    Reserved,
    Resolving,
    Resolved,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Type {
    pub qualified_name: String,
    pub identifier: String,
    pub is_const: bool,
    pub kind: TypeKind,
    pub dimensions: u32,
    /// Element type for pointers, references and arrays; aliased type for typedefs.
    pub base: TypeHandle,
    /// Set only when `kind` is [`TypeKind::Struct`].
    pub base_structure: StructureHandle,
    pub template_arguments: SmallVec<TemplateArgument, LOW_FREQ_CAP>,
    pub state: TypeState,
}

impl Type {
    pub fn is_resolved(&self) -> bool {
        self.state == TypeState::Resolved
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Field {
    pub location: Location,
    pub qualified_name: String,
    pub identifier: String,
    #[serde(rename = "type")]
    pub ty: TypeHandle,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MethodParameter {
    #[serde(rename = "type")]
    pub ty: TypeHandle,
    pub identifier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Method {
    pub parameters: SmallVec<MethodParameter, LOW_FREQ_CAP>,
    pub location: Location,
    pub identifier: String,
    pub qualified_name: String,
    pub return_type: TypeHandle,
    pub visibility: Visibility,
    #[serde(flatten)]
    pub flags: MethodFlags,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    #[default]
    Unsupported,
    Struct,
    Class,
}

impl From<DeclarationKind> for StructureKind {
    fn from(kind: DeclarationKind) -> Self {
        match kind {
            DeclarationKind::Struct => Self::Struct,
            DeclarationKind::Class => Self::Class,
            _ => Self::Unsupported,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StructPathNodeKind {
    #[default]
    Unsupported,
    Namespace,
    Structure,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructPathNode {
    pub identifier: String,
    /// Present only for [`StructPathNodeKind::Structure`] nodes whose
    /// structure was already registered when the path was built.
    pub structure: StructureHandle,
    pub kind: StructPathNodeKind,
}

/// Enclosing scopes of a structure, outermost first.
pub type StructPath = SmallVec<StructPathNode, MED_FREQ_CAP>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Structure {
    pub qualified_name: String,
    pub identifier: String,
    pub kind: StructureKind,
    pub visibility: Visibility,
    pub template_parameters: SmallVec<TemplateParameter, LOW_FREQ_CAP>,
    pub fields: SmallVec<Field, MED_FREQ_CAP>,
    pub methods: SmallVec<Method, MED_FREQ_CAP>,
    /// Base structures in declaration order; duplicates are kept.
    pub parents: SmallVec<StructureHandle, LOW_FREQ_CAP>,
    pub path: StructPath,
}

impl Structure {
    /// Merge the identifying parts of `declaration` into this entry.
    ///
    /// Repeated visits (forward declaration, then definition) refine the
    /// same entry; fields, methods and parents are left untouched.
    pub fn apply_declaration(
        &mut self,
        declaration: &Declaration,
    ) {
        self.qualified_name.clone_from(&declaration.qualified_name);
        self.identifier.clone_from(&declaration.identifier);
        self.kind = StructureKind::from(declaration.kind);
    }
}
