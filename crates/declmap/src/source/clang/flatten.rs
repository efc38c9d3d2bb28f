//! Depth-first flattening of a Clang AST into a declaration stream.
//!
//! Alongside the stream, every named record, enum and typedef (including
//! those from system headers, which are left out of the stream) is entered
//! into [`TypeTables`] so type spellings can be resolved later.

use std::collections::HashMap;

use clang_ast::SourceLocation;
use tracing::debug;

use super::clang_nodes::{Clang, DeclData, FunctionData, Node, RecordData, ValueData, resolve_loc};
use super::type_spelling::{ANONYMOUS_NAMESPACE, split_function_type};
use crate::common::SmallVec;
use crate::model::{Declaration, DeclarationKind, Location, MED_FREQ_CAP, MethodFlags, Visibility};

const SYSTEM_HEADER_PREFIXES: &[&str] = &[
    "/usr/include",
    "/usr/lib",
    "/usr/local/include",
    "/Library/Developer",
    "/Applications/Xcode",
];

pub(crate) type AncestorStack = SmallVec<Declaration, MED_FREQ_CAP>;

#[derive(Debug, Clone)]
pub(crate) struct FlatEntry {
    pub declaration: Declaration,
    pub stack: AncestorStack,
    /// Qualified names of the enclosing namespaces and records, outermost first.
    pub scope: Vec<String>,
    /// Raw `qualType` of a field or parameter, return type of a function, or
    /// the written base of a base specifier.
    pub spelling: Option<String>,
    pub visibility: Visibility,
    pub flags: MethodFlags,
}

#[derive(Debug, Clone)]
pub(crate) enum NameEntry {
    Record(Declaration),
    Enum(Declaration),
    Alias { declaration: Declaration, target: String, scope: Vec<String> },
}

/// Qualified names of every record, enum and typedef in a translation unit.
#[derive(Debug, Default)]
pub(crate) struct TypeTables {
    names: HashMap<String, NameEntry>,
}

impl TypeTables {
    /// First registration wins; later redeclarations are ignored.
    pub fn insert(
        &mut self,
        qualified_name: String,
        entry: NameEntry,
    ) {
        self.names.entry(qualified_name).or_insert(entry);
    }

    /// Record definition. Replaces an earlier forward declaration of the same
    /// record but never an enum or alias.
    pub fn define(
        &mut self,
        qualified_name: String,
        declaration: Declaration,
    ) {
        match self.names.get_mut(&qualified_name) {
            Some(NameEntry::Record(existing)) => *existing = declaration,
            Some(_) => {},
            None => {
                self.names.insert(qualified_name, NameEntry::Record(declaration));
            },
        }
    }

    pub fn get(
        &self,
        qualified_name: &str,
    ) -> Option<&NameEntry> {
        self.names.get(qualified_name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Resolve a written name: innermost enclosing scope first, then the name
    /// as written, then a unique `::name` suffix match.
    pub fn resolve(
        &self,
        name: &str,
        scope: &[String],
    ) -> Option<&str> {
        if let Some(global) = name.strip_prefix("::") {
            return self.names.get_key_value(global).map(|(k, _)| k.as_str());
        }
        for prefix in scope.iter().rev() {
            let candidate = format!("{prefix}::{name}");
            if let Some((key, _)) = self.names.get_key_value(&candidate) {
                return Some(key);
            }
        }
        if let Some((key, _)) = self.names.get_key_value(name) {
            return Some(key);
        }
        let suffix = format!("::{name}");
        let mut matches = self.names.keys().filter(|k| k.ends_with(&suffix));
        match (matches.next(), matches.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }
}

struct Frame {
    declaration: Declaration,
    /// Current default access inside a record.
    access: Visibility,
}

pub(crate) struct Flattener<'a> {
    input: &'a str,
    frames: Vec<Frame>,
    entries: Vec<FlatEntry>,
    tables: TypeTables,
    skipped: usize,
}

impl<'a> Flattener<'a> {
    pub fn run(
        root: &Node,
        input: &'a str,
    ) -> (Vec<FlatEntry>, TypeTables) {
        let mut flattener = Self {
            input,
            frames: Vec::new(),
            entries: Vec::new(),
            tables: TypeTables::default(),
            skipped: 0,
        };
        flattener.walk(root);
        debug!(
            declarations = flattener.entries.len(),
            skipped = flattener.skipped,
            names = flattener.tables.len(),
            "flattened clang AST"
        );
        (flattener.entries, flattener.tables)
    }

    fn walk(
        &mut self,
        node: &Node,
    ) {
        match &node.kind {
            Clang::NamespaceDecl(data) => {
                let name = data.name().unwrap_or(ANONYMOUS_NAMESPACE);
                let (location, system) = self.location(data.loc());
                let declaration = Declaration::new(DeclarationKind::Namespace, self.qualify(name), name, location);
                self.push_entry(declaration.clone(), None, Visibility::Invalid, MethodFlags::default(), system);
                self.with_frame(declaration, Visibility::Invalid, |this| this.walk_children(node));
            },
            Clang::CXXRecordDecl(data) | Clang::RecordDecl(data) => {
                if data.is_implicit() {
                    return;
                }
                match data.name() {
                    Some(name) => self.record(node, data, name),
                    None => debug!("anonymous record skipped"),
                }
            },
            // Implicit instantiations are dumped like explicit ones; both are
            // named by their arguments so they never merge with the template.
            Clang::ClassTemplateSpecializationDecl(data) | Clang::ClassTemplatePartialSpecializationDecl(data) => {
                match data.name().and_then(|name| specialization_name(name, node)) {
                    Some(name) => self.record(node, data, &name),
                    None => debug!(name = data.name(), "specialization without spellable arguments skipped"),
                }
            },
            Clang::FieldDecl(data) => self.value(DeclarationKind::Field, data),
            Clang::CXXMethodDecl(data) | Clang::CXXDestructorDecl(data) | Clang::CXXConversionDecl(data) => {
                self.function(node, data, false);
            },
            Clang::CXXConstructorDecl(data) => self.function(node, data, true),
            Clang::FunctionDecl(data) => self.function(node, data, false),
            Clang::TypedefDecl(data) | Clang::TypeAliasDecl(data) => self.alias(data),
            Clang::EnumDecl(data) => {
                if let Some(name) = data.name()
                    && !data.is_implicit()
                {
                    let (location, _) = self.location(data.loc());
                    let qualified = self.qualify(name);
                    let declaration = Declaration::new(DeclarationKind::Unsupported, qualified.clone(), name, location);
                    self.tables.insert(qualified, NameEntry::Enum(declaration));
                }
            },
            Clang::AccessSpecDecl(data) => {
                let access = data.access.as_deref().map(Visibility::from_access).unwrap_or_default();
                if let Some(frame) = self.frames.last_mut()
                    && frame.declaration.kind.is_structure()
                {
                    frame.access = access;
                }
            },
            // Parameters are collected by their function, template arguments
            // by their specialization.
            Clang::ParmVarDecl(_) | Clang::TemplateArgument(_) => {},
            Clang::Other {
                ..
            } => self.walk_children(node),
        }
    }

    fn walk_children(
        &mut self,
        node: &Node,
    ) {
        for child in &node.inner {
            self.walk(child);
        }
    }

    fn with_frame(
        &mut self,
        declaration: Declaration,
        access: Visibility,
        body: impl FnOnce(&mut Self),
    ) {
        self.frames.push(Frame {
            declaration,
            access,
        });
        body(self);
        self.frames.pop();
    }

    fn record(
        &mut self,
        node: &Node,
        data: &RecordData,
        name: &str,
    ) {
        let kind = match data.tag_used.as_deref() {
            Some("class") => DeclarationKind::Class,
            Some("struct") | None => DeclarationKind::Struct,
            Some(other) => {
                debug!(name, tag = other, "record kind not modeled");
                return;
            },
        };

        let (location, system) = self.location(data.loc());
        let qualified = self.qualify(name);
        let declaration = Declaration::new(kind, qualified.clone(), name, location.clone());
        if data.is_definition() {
            self.tables.define(qualified, declaration.clone());
        } else {
            self.tables.insert(qualified, NameEntry::Record(declaration.clone()));
        }

        let visibility = self.member_visibility(data.access());
        self.push_entry(declaration.clone(), None, visibility, MethodFlags::default(), system);

        let default_access = match kind {
            DeclarationKind::Class => Visibility::Private,
            _ => Visibility::Public,
        };
        self.with_frame(declaration, default_access, |this| {
            for base in &data.bases {
                let Some(spelling) = base.ty.spelling() else {
                    continue;
                };
                // Named after resolution, once every record is known.
                let declaration = Declaration::new(DeclarationKind::BaseSpecifier, spelling, spelling, location.clone());
                let visibility = base.access.as_deref().map(Visibility::from_access).unwrap_or(default_access);
                this.push_entry(declaration, Some(spelling.to_owned()), visibility, MethodFlags::default(), system);
            }
            this.walk_children(node);
        });
    }

    fn value(
        &mut self,
        kind: DeclarationKind,
        data: &ValueData,
    ) {
        if data.is_implicit() {
            return;
        }
        let name = data.name().unwrap_or_default();
        let (location, system) = self.location(data.loc());
        let declaration = Declaration::new(kind, self.qualify(name), name, location);
        let visibility = self.member_visibility(data.access());
        let spelling = data.qual_type().map(str::to_owned);
        self.push_entry(declaration, spelling, visibility, MethodFlags::default(), system);
    }

    fn function(
        &mut self,
        node: &Node,
        data: &FunctionData,
        is_ctor: bool,
    ) {
        if data.is_implicit() {
            return;
        }
        let Some(name) = data.name() else {
            return;
        };
        let in_record = self.frames.last().is_some_and(|f| f.declaration.kind.is_structure());
        let kind = match (&node.kind, in_record) {
            (Clang::FunctionDecl(_), _) | (_, false) => DeclarationKind::Function,
            _ => DeclarationKind::Method,
        };

        let spelling = data.qual_type().unwrap_or_default();
        let (return_type, qualifiers) = split_function_type(spelling).unwrap_or((spelling, ""));
        let flags = MethodFlags {
            is_virtual: data.is_virtual.unwrap_or(false),
            is_pure: data.is_pure.unwrap_or(false),
            is_static: data.storage_class.as_deref() == Some("static"),
            is_const: qualifiers.split_whitespace().any(|q| q == "const"),
            is_ctor,
        };

        let (location, system) = self.location(data.loc());
        let declaration = Declaration::new(kind, self.qualify(name), name, location);
        let visibility = self.member_visibility(data.access());
        self.push_entry(declaration.clone(), Some(return_type.to_owned()), visibility, flags, system);

        self.with_frame(declaration, Visibility::Invalid, |this| {
            for child in &node.inner {
                if let Clang::ParmVarDecl(param) = &child.kind {
                    this.value(DeclarationKind::Parameter, param);
                }
            }
        });
    }

    fn alias(
        &mut self,
        data: &ValueData,
    ) {
        let (Some(name), Some(target)) = (data.name(), data.qual_type()) else {
            return;
        };
        if data.is_implicit() {
            return;
        }
        let (location, _) = self.location(data.loc());
        let qualified = self.qualify(name);
        let declaration = Declaration::new(DeclarationKind::Unsupported, qualified.clone(), name, location);
        let entry = NameEntry::Alias {
            declaration,
            target: target.to_owned(),
            scope: self.scope(),
        };
        self.tables.insert(qualified, entry);
    }

    fn qualify(
        &self,
        name: &str,
    ) -> String {
        match self.frames.last() {
            Some(frame) => format!("{}::{name}", frame.declaration.qualified_name),
            None => name.to_owned(),
        }
    }

    fn scope(&self) -> Vec<String> {
        self.frames
            .iter()
            .filter(|f| f.declaration.kind == DeclarationKind::Namespace || f.declaration.kind.is_structure())
            .map(|f| f.declaration.qualified_name.clone())
            .collect()
    }

    fn member_visibility(
        &self,
        access: Option<&str>,
    ) -> Visibility {
        if let Some(access) = access {
            return Visibility::from_access(access);
        }
        match self.frames.last() {
            Some(frame) if frame.declaration.kind.is_structure() => frame.access,
            _ => Visibility::Invalid,
        }
    }

    fn location(
        &self,
        loc: Option<&SourceLocation>,
    ) -> (Location, bool) {
        match loc.and_then(resolve_loc) {
            Some(bare) => {
                let file = if bare.file.is_empty() { self.input } else { &*bare.file };
                let system = is_system_header(file);
                let line = u32::try_from(bare.line).unwrap_or(u32::MAX);
                let column = u32::try_from(bare.col).unwrap_or(u32::MAX);
                (Location::new(file, line, column), system)
            },
            None => (Location::new(self.input, 0, 0), false),
        }
    }

    fn push_entry(
        &mut self,
        declaration: Declaration,
        spelling: Option<String>,
        visibility: Visibility,
        flags: MethodFlags,
        system: bool,
    ) {
        if system {
            self.skipped += 1;
            return;
        }
        let stack: AncestorStack = self.frames.iter().map(|f| f.declaration.clone()).collect();
        self.entries.push(FlatEntry {
            declaration,
            stack,
            scope: self.scope(),
            spelling,
            visibility,
            flags,
        });
    }
}

/// `Box<int, 3>` from the specialization's `TemplateArgument` children.
fn specialization_name(
    name: &str,
    node: &Node,
) -> Option<String> {
    let mut arguments = Vec::new();
    for child in &node.inner {
        if let Clang::TemplateArgument(argument) = &child.kind {
            arguments.push(argument.spelling()?);
        }
    }
    if arguments.is_empty() {
        return None;
    }
    Some(format!("{name}<{}>", arguments.join(", ")))
}

fn is_system_header(file: &str) -> bool {
    SYSTEM_HEADER_PREFIXES.iter().any(|prefix| file.starts_with(prefix))
}

#[cfg(test)]
#[path = "../../../tests/src/source/clang/flatten_tests.rs"]
mod tests;
