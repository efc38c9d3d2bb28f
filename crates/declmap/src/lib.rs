pub mod common;
pub mod config;
pub mod driver;
pub mod export;
pub mod map;
pub mod mapper;
pub mod model;
pub mod source;

pub use config::{CompilerSettings, ConfigError, MapperSettings, Settings};
pub use export::ModelSnapshot;
pub use map::SemanticMap;
pub use mapper::{Mapper, MapperContext};
pub use source::clang::ClangSource;
pub use source::{DeclarationSource, ScriptedSource, SourceError};
