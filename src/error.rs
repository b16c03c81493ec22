use std::path::PathBuf;
use thiserror::Error;

use crate::{config::ConfigError, parser::ParseError, source::SourceError};

/// Structural failures raised while mapping canonical definitions to a backend.
/// None of these have a rendering strategy, so they abort the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("No support for unions of {arity} types; only unions of exactly two types can be mapped")]
    UnsupportedUnionArity { arity: usize },

    #[error("Value \"{value}\" is not a valid {enum_name}")]
    InvalidEnumValue { enum_name: String, value: String },

    #[error("Unknown type \"{type_name}\" and value \"{value}\"")]
    UnknownTypeOrValue { type_name: String, value: String },

    #[error("More than one definition would be written to {path}")]
    OutputCollision { path: String },
}

/// Errors that terminate a generation run
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Unable to parse IDL in {document}: {source}")]
    ParseFailure {
        document: String,
        #[source]
        source: ParseError,
    },

    #[error("Unable to extract IDL from markup in {document}: {message}")]
    MarkupParseFailure { document: String, message: String },

    #[error("Unable to source {document}: {source}")]
    FetchFailure {
        document: String,
        #[source]
        source: SourceError,
    },

    #[error("Found {fragments} definitions named {name}, but merging is disabled")]
    UnmergeableDuplicate { name: String, fragments: usize },

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No input documents were given")]
    NoInputs,
}

impl GeneratorError {
    /// Document-level failures can be skipped unless the run is configured to bail
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GeneratorError::ParseFailure { .. }
                | GeneratorError::MarkupParseFailure { .. }
                | GeneratorError::FetchFailure { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_error_messages() {
        let error = MappingError::InvalidEnumValue {
            enum_name: "Color".to_string(),
            value: "blue".to_string(),
        };
        assert_eq!(error.to_string(), "Value \"blue\" is not a valid Color");

        let error = MappingError::UnsupportedUnionArity { arity: 3 };
        assert!(error.to_string().contains("unions of 3 types"));
    }

    #[test]
    fn test_recoverable_errors() {
        let markup = GeneratorError::MarkupParseFailure {
            document: "spec.html".to_string(),
            message: "unsupported <div> tag".to_string(),
        };
        assert!(markup.is_recoverable());

        let duplicate = GeneratorError::UnmergeableDuplicate {
            name: "Widget".to_string(),
            fragments: 2,
        };
        assert!(!duplicate.is_recoverable());

        let mapping: GeneratorError = MappingError::UnsupportedUnionArity { arity: 3 }.into();
        assert!(!mapping.is_recoverable());
    }
}
