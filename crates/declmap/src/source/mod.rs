//! Declaration sources feeding the mapper.

pub mod clang;
pub mod scripted;

use std::fmt;
use std::path::PathBuf;

pub use scripted::{ScriptedEntry, ScriptedSource, TypeInfo};

use crate::model::{Declaration, DeclaredType, MethodFlags, Visibility};

/// Cursor-stream contract between a frontend and the mapper.
///
/// The stream is pulled one declaration at a time; the cursor stack and the
/// type queries answer for the declaration returned by the last [`next`].
///
/// [`next`]: DeclarationSource::next
pub trait DeclarationSource {
    /// Next declaration in source order, or an empty declaration at the end.
    fn next(&mut self) -> Declaration;

    /// Enclosing declarations of the current one, outermost first.
    fn current_cursor_stack(&self) -> &[Declaration];

    /// Declaration that defines `ty`, or an empty declaration.
    fn type_declaration(
        &self,
        ty: &DeclaredType,
    ) -> Declaration;

    /// One alias-stripping step of `ty`.
    fn canonical_type(
        &self,
        ty: &DeclaredType,
    ) -> DeclaredType;

    /// Pointee, referent or array element of `ty`.
    fn element_type(
        &self,
        ty: &DeclaredType,
    ) -> DeclaredType;

    fn is_const_qualified(
        &self,
        ty: &DeclaredType,
    ) -> bool;

    fn visibility(
        &self,
        declaration: &Declaration,
    ) -> Visibility;

    /// Type of a field or parameter, or return type of a method.
    fn declared_type(
        &self,
        declaration: &Declaration,
    ) -> DeclaredType;

    fn method_flags(
        &self,
        _declaration: &Declaration,
    ) -> MethodFlags {
        MethodFlags::default()
    }
}

#[derive(Debug)]
pub enum SourceError {
    /// The configured clang executable does not exist.
    CommandNotFound { command: String },
    LaunchFailed { command: String, error: std::io::Error },
    /// Clang exited unsuccessfully without producing a usable AST.
    CompileFailed { path: PathBuf, status: Option<i32>, stderr: String },
    InvalidJson { path: PathBuf, error: serde_json::Error },
    /// A pre-generated AST dump could not be read.
    ReadFailed { path: PathBuf, error: std::io::Error },
}

impl fmt::Display for SourceError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::CommandNotFound {
                command,
            } => write!(f, "clang executable not found: {command}"),
            Self::LaunchFailed {
                command,
                error,
            } => write!(f, "failed to launch {command}: {error}"),
            Self::CompileFailed {
                path,
                status,
                stderr,
            } => {
                let status = status.map_or_else(|| "signal".to_owned(), |code| code.to_string());
                write!(f, "clang failed on {} (exit {status}): {}", path.display(), stderr.trim())
            },
            Self::InvalidJson {
                path,
                error,
            } => write!(f, "invalid AST JSON for {}: {error}", path.display()),
            Self::ReadFailed {
                path,
                error,
            } => write!(f, "failed to read {}: {error}", path.display()),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::LaunchFailed {
                error,
                ..
            }
            | Self::ReadFailed {
                error,
                ..
            } => Some(error),
            Self::InvalidJson {
                error,
                ..
            } => Some(error),
            _ => None,
        }
    }
}
