// IDL binding generator
pub mod definition;
pub mod parser;
pub mod markup;
pub mod source;
pub mod extraction;
pub mod rename;
pub mod registry;
pub mod merge;
pub mod type_mapping;
pub mod literal;
pub mod backend;
pub mod engine;
pub mod config;
pub mod reporter;
pub mod error;

// Re-export core types for convenience
pub use definition::{Argument, DefaultValue, Definition, DefinitionKind, Member, MemberKind, TypeDescriptor};
pub use backend::{Backend, GeneratedFile, RenderOptions};
pub use config::{ConfigFile, GeneratorConfig};
pub use engine::{BindingGenerator, GenerationResult, GenerationWarning};
pub use error::{GeneratorError, MappingError};
pub use literal::LiteralResolver;
pub use merge::merge_definitions;
pub use registry::{DefinitionIndex, DefinitionsByName};
pub use reporter::{GenerationReport, GenerationReporter, ReportFormat};
pub use source::SourceLocator;
pub use type_mapping::TypeMapping;
