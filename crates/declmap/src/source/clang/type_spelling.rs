//! Parser for Clang `qualType` spellings.
//!
//! Spellings are parsed right to left into a [`Shape`]: a trailing bracket
//! run is an array (first group outermost), then `&&`, `&` and `*` (with an
//! optional `const` after the star) peel reference and pointer layers until
//! a named type remains. Function types and anything else with parentheses
//! is kept opaque.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::TypeKind;

pub const ANONYMOUS_NAMESPACE: &str = "(anonymous namespace)";

static ELABORATED_KEYWORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:struct|class|union|enum)\s+").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static TRAILING_EXTENTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:\[[^\[\]]*\])+$").unwrap());
static EXTENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\[\]]*)\]").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Named { name: String, is_const: bool },
    Pointer { inner: Box<Shape>, is_const: bool },
    LValueRef(Box<Shape>),
    RValueRef(Box<Shape>),
    Array { inner: Box<Shape>, extent: Option<String> },
    Opaque(String),
}

impl Shape {
    pub fn parse(spelling: &str) -> Self {
        let cleaned = ELABORATED_KEYWORD.replace_all(spelling, "");
        let cleaned = WHITESPACE.replace_all(cleaned.trim(), " ");
        if cleaned.replace(ANONYMOUS_NAMESPACE, "").contains('(') {
            return Self::Opaque(cleaned.into_owned());
        }
        parse_declarator(&cleaned)
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Named {
                ..
            } => TypeKind::Unhandled,
            Self::Pointer {
                ..
            } => TypeKind::Pointer,
            Self::LValueRef(_) => TypeKind::LValueRef,
            Self::RValueRef(_) => TypeKind::RValueRef,
            Self::Array {
                extent: Some(_),
                ..
            } => TypeKind::ConstantArray,
            Self::Array {
                extent: None,
                ..
            } => TypeKind::IncompleteArray,
            Self::Opaque(_) => TypeKind::Unhandled,
        }
    }

    /// Pointer, reference and array layers above the named type.
    pub fn dimensions(&self) -> u32 {
        match self.inner() {
            Some(inner) => inner.dimensions() + 1,
            None => 0,
        }
    }

    pub fn inner(&self) -> Option<&Shape> {
        match self {
            Self::Pointer {
                inner,
                ..
            }
            | Self::Array {
                inner,
                ..
            } => Some(inner),
            Self::LValueRef(inner) | Self::RValueRef(inner) => Some(inner),
            Self::Named {
                ..
            }
            | Self::Opaque(_) => None,
        }
    }

    /// Const qualification of the outermost layer; arrays report their element.
    pub fn is_const(&self) -> bool {
        match self {
            Self::Named {
                is_const,
                ..
            }
            | Self::Pointer {
                is_const,
                ..
            } => *is_const,
            Self::Array {
                inner,
                ..
            } => inner.is_const(),
            _ => false,
        }
    }

    pub fn with_const(
        mut self,
        value: bool,
    ) -> Self {
        match &mut self {
            Self::Named {
                is_const,
                ..
            }
            | Self::Pointer {
                is_const,
                ..
            } => *is_const = *is_const || value,
            Self::Array {
                inner,
                ..
            } => {
                let element = std::mem::replace(inner.as_mut(), Self::Opaque(String::new()));
                **inner = element.with_const(value);
            },
            _ => {},
        }
        self
    }

    /// Innermost named type, if the shape bottoms out in one.
    pub fn named(&self) -> Option<&str> {
        match self {
            Self::Named {
                name,
                ..
            } => Some(name),
            Self::Opaque(_) => None,
            _ => self.inner().and_then(Shape::named),
        }
    }

    /// Rebuild with every named layer passed through `f`.
    pub fn map_named(
        self,
        f: &mut impl FnMut(String, bool) -> Shape,
    ) -> Shape {
        match self {
            Self::Named {
                name,
                is_const,
            } => f(name, is_const),
            Self::Pointer {
                inner,
                is_const,
            } => Self::Pointer {
                inner: Box::new(inner.map_named(f)),
                is_const,
            },
            Self::LValueRef(inner) => Self::LValueRef(Box::new(inner.map_named(f))),
            Self::RValueRef(inner) => Self::RValueRef(Box::new(inner.map_named(f))),
            Self::Array {
                inner,
                extent,
            } => Self::Array {
                inner: Box::new(inner.map_named(f)),
                extent,
            },
            Self::Opaque(text) => Self::Opaque(text),
        }
    }

    /// Spelling in Clang's style (`const char *`, `int **const`, `float[4][2]`).
    pub fn render(&self) -> String {
        match self {
            Self::Named {
                name,
                is_const,
            } => {
                if *is_const {
                    format!("const {name}")
                } else {
                    name.clone()
                }
            },
            Self::Pointer {
                inner,
                is_const,
            } => {
                let suffix = if *is_const { "*const" } else { "*" };
                join_declarator(&inner.render(), suffix)
            },
            Self::LValueRef(inner) => join_declarator(&inner.render(), "&"),
            Self::RValueRef(inner) => join_declarator(&inner.render(), "&&"),
            Self::Array {
                ..
            } => {
                let mut extents = String::new();
                let mut element = self;
                while let Self::Array {
                    inner,
                    extent,
                } = element
                {
                    extents.push('[');
                    extents.push_str(extent.as_deref().unwrap_or(""));
                    extents.push(']');
                    element = inner;
                }
                format!("{}{extents}", element.render())
            },
            Self::Opaque(text) => text.clone(),
        }
    }
}

fn join_declarator(
    inner: &str,
    suffix: &str,
) -> String {
    if inner.ends_with('*') || inner.ends_with('&') {
        format!("{inner}{suffix}")
    } else {
        format!("{inner} {suffix}")
    }
}

fn parse_declarator(text: &str) -> Shape {
    let text = text.trim();

    if let Some(run) = TRAILING_EXTENTS.find(text) {
        let element = parse_declarator(&text[..run.start()]);
        let extents: Vec<Option<String>> = EXTENT
            .captures_iter(run.as_str())
            .map(|c| {
                let extent = c[1].trim();
                (!extent.is_empty()).then(|| extent.to_string())
            })
            .collect();
        return extents.into_iter().rev().fold(element, |inner, extent| Shape::Array {
            inner: Box::new(inner),
            extent,
        });
    }
    if let Some(rest) = text.strip_suffix("&&") {
        return Shape::RValueRef(Box::new(parse_declarator(rest)));
    }
    if let Some(rest) = text.strip_suffix('&') {
        return Shape::LValueRef(Box::new(parse_declarator(rest)));
    }
    if let Some(rest) = text.strip_suffix('*') {
        return Shape::Pointer {
            inner: Box::new(parse_declarator(rest)),
            is_const: false,
        };
    }
    if let Some(rest) = text.strip_suffix("const")
        && let Some(rest) = rest.trim_end().strip_suffix('*')
    {
        return Shape::Pointer {
            inner: Box::new(parse_declarator(rest)),
            is_const: true,
        };
    }
    parse_named(text)
}

fn parse_named(text: &str) -> Shape {
    let mut is_const = false;
    let mut words = Vec::new();
    for word in text.split(' ').filter(|w| !w.is_empty()) {
        match word {
            "const" => is_const = true,
            "volatile" | "restrict" | "__restrict" => {},
            _ => words.push(word),
        }
    }
    Shape::Named {
        name: words.join(" "),
        is_const,
    }
}

/// Builtin spelling to primitive kind.
pub fn builtin_kind(name: &str) -> Option<TypeKind> {
    let kind = match name {
        "void" => TypeKind::Void,
        "bool" | "_Bool" => TypeKind::Bool,
        "char" => TypeKind::CharS,
        "signed char" => TypeKind::SChar,
        "unsigned char" | "char8_t" => TypeKind::UChar,
        "wchar_t" => TypeKind::WChar,
        "char16_t" => TypeKind::Char16,
        "char32_t" => TypeKind::Char32,
        "short" | "short int" | "signed short" | "signed short int" => TypeKind::Short,
        "unsigned short" | "unsigned short int" => TypeKind::UShort,
        "int" | "signed" | "signed int" => TypeKind::Int,
        "unsigned" | "unsigned int" => TypeKind::UInt,
        "long" | "long int" | "signed long" | "signed long int" => TypeKind::Long,
        "unsigned long" | "unsigned long int" => TypeKind::ULong,
        "long long" | "long long int" | "signed long long" | "signed long long int" => TypeKind::LongLong,
        "unsigned long long" | "unsigned long long int" => TypeKind::ULongLong,
        "__int128" | "__int128_t" => TypeKind::Int128,
        "unsigned __int128" | "__uint128_t" => TypeKind::UInt128,
        "float" => TypeKind::Float,
        "double" => TypeKind::Double,
        "long double" => TypeKind::LongDouble,
        "std::nullptr_t" | "nullptr_t" | "decltype(nullptr)" => TypeKind::NullPtr,
        _ => return None,
    };
    Some(kind)
}

/// Split a function `qualType` into its return type and trailing qualifiers.
///
/// `"double (int, float) const"` yields `("double", "const")`.
pub fn split_function_type(spelling: &str) -> Option<(&str, &str)> {
    let close = spelling.rfind(')')?;
    let mut depth = 0usize;
    for (index, ch) in spelling[..=close].char_indices().rev() {
        match ch {
            ')' => depth += 1,
            '(' => {
                depth -= 1;
                if depth == 0 {
                    return Some((spelling[..index].trim(), spelling[close + 1..].trim()));
                }
            },
            _ => {},
        }
    }
    None
}

#[cfg(test)]
#[path = "../../../tests/src/source/clang/type_spelling_tests.rs"]
mod tests;
