use serde::Serialize;

/// Source position. An empty `file` means "absent": a [`Declaration`] with
/// an empty location is the end-of-stream sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(
        file: impl Into<String>,
        line: u32,
        column: u32,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.file.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    #[default]
    Unsupported,
    Struct,
    Class,
    BaseSpecifier,
    Field,
    Method,
    Function,
    Parameter,
    Namespace,
}

impl DeclarationKind {
    pub fn is_structure(self) -> bool {
        matches!(self, Self::Struct | Self::Class)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Invalid,
    Unhandled,
    Void,
    Bool,
    Char,
    UChar,
    Char16,
    Char32,
    UShort,
    UInt,
    ULong,
    ULongLong,
    UInt128,
    CharS,
    SChar,
    WChar,
    Short,
    Int,
    Long,
    LongLong,
    Int128,
    Float,
    Double,
    LongDouble,
    NullPtr,
    Pointer,
    LValueRef,
    RValueRef,
    Struct,
    Enum,
    Typedef,
    ConstantArray,
    IncompleteArray,
}

impl TypeKind {
    /// Builtin scalar kinds, `void` and `nullptr_t`.
    pub const PRIMITIVES: [TypeKind; 23] = [
        Self::Void,
        Self::Bool,
        Self::Char,
        Self::UChar,
        Self::Char16,
        Self::Char32,
        Self::UShort,
        Self::UInt,
        Self::ULong,
        Self::ULongLong,
        Self::UInt128,
        Self::CharS,
        Self::SChar,
        Self::WChar,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::LongLong,
        Self::Int128,
        Self::Float,
        Self::Double,
        Self::LongDouble,
        Self::NullPtr,
    ];

    pub fn is_primitive(self) -> bool {
        Self::PRIMITIVES.contains(&self)
    }

    pub fn is_reference_like(self) -> bool {
        matches!(self, Self::Pointer | Self::LValueRef | Self::RValueRef)
    }

    pub fn is_array(self) -> bool {
        matches!(self, Self::ConstantArray | Self::IncompleteArray)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Invalid,
    Private,
    Protected,
    Public,
}

impl Visibility {
    /// Parse a Clang access spelling (`public`, `protected`, `private`).
    pub fn from_access(access: &str) -> Self {
        match access {
            "public" => Self::Public,
            "protected" => Self::Protected,
            "private" => Self::Private,
            _ => Self::Invalid,
        }
    }
}

/// One unit of source information yielded by a declaration source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declaration {
    pub location: Location,
    pub qualified_name: String,
    pub identifier: String,
    pub kind: DeclarationKind,
}

impl Declaration {
    pub fn new(
        kind: DeclarationKind,
        qualified_name: impl Into<String>,
        identifier: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            location,
            qualified_name: qualified_name.into(),
            identifier: identifier.into(),
            kind,
        }
    }

    /// End-of-stream sentinel / "no declaration".
    pub fn is_empty(&self) -> bool {
        self.location.is_empty()
    }
}

/// Use-site type before resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DeclaredType {
    pub identifier: String,
    pub is_const: bool,
    pub kind: TypeKind,
    pub dimensions: u32,
}

impl DeclaredType {
    pub fn new(
        identifier: impl Into<String>,
        kind: TypeKind,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            is_const: false,
            kind,
            dimensions: 0,
        }
    }

    pub fn with_dimensions(
        mut self,
        dimensions: u32,
    ) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn with_const(
        mut self,
        is_const: bool,
    ) -> Self {
        self.is_const = is_const;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct MethodFlags {
    pub is_virtual: bool,
    pub is_pure: bool,
    pub is_static: bool,
    pub is_const: bool,
    pub is_ctor: bool,
}
