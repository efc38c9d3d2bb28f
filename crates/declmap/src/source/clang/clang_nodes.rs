use clang_ast::{BareSourceLocation, SourceLocation};
use serde::Deserialize;

pub type Node = clang_ast::Node<Clang>;

/// Clang AST node kinds the declaration stream is built from.
///
/// Each variant corresponds to a Clang AST node `"kind"` value; everything
/// else lands in `Other`, whose children are still walked.
#[derive(Deserialize)]
pub enum Clang {
    NamespaceDecl(NamedData),
    CXXRecordDecl(RecordData),
    RecordDecl(RecordData),
    ClassTemplateSpecializationDecl(RecordData),
    ClassTemplatePartialSpecializationDecl(RecordData),
    TemplateArgument(TemplateArgumentData),
    FieldDecl(ValueData),
    CXXMethodDecl(FunctionData),
    CXXConstructorDecl(FunctionData),
    CXXDestructorDecl(FunctionData),
    CXXConversionDecl(FunctionData),
    FunctionDecl(FunctionData),
    ParmVarDecl(ValueData),
    TypedefDecl(ValueData),
    TypeAliasDecl(ValueData),
    EnumDecl(NamedData),
    AccessSpecDecl(AccessData),

    // The `loc` and `range` fields MUST be deserialized even for unrecognized
    // node kinds. `clang-ast` carries the "current file" across the stream via
    // `SourceLocation`; skipping them makes later nodes lose their file.
    #[allow(dead_code)]
    Other {
        #[serde(default)]
        loc: Option<SourceLocation>,
        #[serde(default)]
        range: Option<clang_ast::SourceRange>,
    },
}

#[derive(Deserialize, Debug)]
pub struct NamedData {
    pub name: Option<String>,
    pub loc: Option<SourceLocation>,
    #[serde(rename = "isImplicit")]
    pub is_implicit: Option<bool>,
    pub access: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct RecordData {
    pub name: Option<String>,
    pub loc: Option<SourceLocation>,
    #[serde(rename = "isImplicit")]
    pub is_implicit: Option<bool>,
    pub access: Option<String>,
    /// `struct`, `class` or `union`.
    #[serde(rename = "tagUsed")]
    pub tag_used: Option<String>,
    /// Absent on forward declarations.
    #[serde(rename = "completeDefinition")]
    pub complete_definition: Option<bool>,
    #[serde(default)]
    pub bases: Vec<BaseData>,
}

#[derive(Deserialize, Debug)]
pub struct BaseData {
    pub access: Option<String>,
    #[serde(rename = "type")]
    pub ty: QualType,
}

/// One argument of a class template specialization.
#[derive(Deserialize, Debug)]
pub struct TemplateArgumentData {
    #[serde(rename = "type")]
    pub ty: Option<QualType>,
    /// Integral arguments; clang writes a number here.
    pub value: Option<serde_json::Value>,
    // Kept for the same reason as `Other::range`.
    #[serde(default)]
    pub range: Option<clang_ast::SourceRange>,
}

impl TemplateArgumentData {
    /// Spelling as it appears inside `<...>`, if the argument is a type or
    /// an integral value.
    pub fn spelling(&self) -> Option<String> {
        if let Some(spelling) = self.ty.as_ref().and_then(QualType::spelling) {
            return Some(spelling.to_owned());
        }
        match self.value.as_ref()? {
            serde_json::Value::String(text) => Some(text.clone()),
            serde_json::Value::Number(number) => Some(number.to_string()),
            serde_json::Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }
}

/// Fields, parameters and typedefs: a name plus a `qualType`.
#[derive(Deserialize, Debug)]
pub struct ValueData {
    pub name: Option<String>,
    pub loc: Option<SourceLocation>,
    #[serde(rename = "isImplicit")]
    pub is_implicit: Option<bool>,
    pub access: Option<String>,
    #[serde(rename = "type")]
    pub ty: Option<QualType>,
}

#[derive(Deserialize, Debug)]
pub struct FunctionData {
    pub name: Option<String>,
    pub loc: Option<SourceLocation>,
    #[serde(rename = "isImplicit")]
    pub is_implicit: Option<bool>,
    pub access: Option<String>,
    #[serde(rename = "type")]
    pub ty: Option<QualType>,
    #[serde(rename = "storageClass")]
    pub storage_class: Option<String>,
    #[serde(rename = "virtual")]
    pub is_virtual: Option<bool>,
    #[serde(rename = "pure")]
    pub is_pure: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub struct AccessData {
    pub access: Option<String>,
    pub loc: Option<SourceLocation>,
}

/// Clang's qualified type representation.
#[derive(Deserialize, Debug)]
pub struct QualType {
    #[serde(rename = "qualType")]
    pub qual_type: Option<String>,
}

impl QualType {
    pub fn spelling(&self) -> Option<&str> {
        self.qual_type.as_deref()
    }
}

/// Name, location and implicit flag shared by the declaration payloads.
pub trait DeclData {
    fn name(&self) -> Option<&str>;
    fn loc(&self) -> Option<&SourceLocation>;
    fn is_implicit(&self) -> bool;
    fn access(&self) -> Option<&str>;
}

macro_rules! impl_decl_data {
    ($($ty:ty),* $(,)?) => {
        $(
            impl DeclData for $ty {
                fn name(&self) -> Option<&str> {
                    self.name.as_deref().filter(|n| !n.is_empty())
                }
                fn loc(&self) -> Option<&SourceLocation> {
                    self.loc.as_ref()
                }
                fn is_implicit(&self) -> bool {
                    self.is_implicit.unwrap_or(false)
                }
                fn access(&self) -> Option<&str> {
                    self.access.as_deref()
                }
            }
        )*
    };
}

impl_decl_data!(NamedData, RecordData, ValueData, FunctionData);

impl RecordData {
    pub fn is_definition(&self) -> bool {
        self.complete_definition.unwrap_or(false)
    }
}

impl ValueData {
    pub fn qual_type(&self) -> Option<&str> {
        self.ty.as_ref().and_then(QualType::spelling)
    }
}

impl FunctionData {
    pub fn qual_type(&self) -> Option<&str> {
        self.ty.as_ref().and_then(QualType::spelling)
    }
}

/// Prefer the expansion location (what the user sees) over the spelling one.
pub fn resolve_loc(loc: &SourceLocation) -> Option<&BareSourceLocation> {
    loc.expansion_loc.as_ref().or(loc.spelling_loc.as_ref())
}
