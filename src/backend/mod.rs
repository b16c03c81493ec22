//! Backend renderers.
//!
//! Each backend implements [`Renderer`] and receives a [`RenderContext`]
//! holding the canonical definitions, an immutable lookup index over them and
//! the backend's type and literal syntax tables. Rendering never touches the
//! filesystem; the engine writes the returned files once every backend pass
//! has succeeded.

pub mod cpp;
pub mod flow;
pub mod idl;
pub mod javascript;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::PathBuf;

use crate::config::GeneratorConfig;
use crate::definition::{Argument, Definition, Member, TypeDescriptor};
use crate::error::MappingError;
use crate::literal::{LiteralResolver, LiteralSyntax, CPP_LITERALS, IDL_LITERALS, SCRIPT_LITERALS};
use crate::registry::DefinitionIndex;
use crate::type_mapping::{TypeMapping, TypeSyntax, CPP_TYPES, FLOW_TYPES, IDL_TYPES, JAVASCRIPT_TYPES};

/// Target of one generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Cpp,
    Flow,
    JavaScript,
    Idl,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Cpp => "cpp",
            Backend::Flow => "flow",
            Backend::JavaScript => "js",
            Backend::Idl => "extract",
        }
    }

    pub fn type_syntax(&self) -> &'static TypeSyntax {
        match self {
            Backend::Cpp => &CPP_TYPES,
            Backend::Flow => &FLOW_TYPES,
            Backend::JavaScript => &JAVASCRIPT_TYPES,
            Backend::Idl => &IDL_TYPES,
        }
    }

    pub fn literal_syntax(&self) -> &'static LiteralSyntax {
        match self {
            Backend::Cpp => &CPP_LITERALS,
            Backend::Flow | Backend::JavaScript => &SCRIPT_LITERALS,
            Backend::Idl => &IDL_LITERALS,
        }
    }

    /// Render every canonical definition. The lookup index is rebuilt for
    /// each call so no state leaks between backend passes.
    ///
    /// File names are lower-cased, so `Widget` and `widget` collide; that
    /// fails the pass instead of one file silently replacing the other.
    pub fn render(
        &self,
        definitions: &[Definition],
        options: &RenderOptions,
    ) -> Result<Vec<GeneratedFile>, MappingError> {
        let index = DefinitionIndex::new(definitions);
        let context = RenderContext::new(definitions, &index, *self, options);
        let files = match self {
            Backend::Cpp => cpp::CppRenderer.render(&context),
            Backend::Flow => flow::FlowRenderer.render(&context),
            Backend::JavaScript => javascript::JavaScriptRenderer.render(&context),
            Backend::Idl => idl::IdlRenderer.render(&context),
        }?;

        let collision = {
            let mut paths = HashSet::new();
            let duplicate = files
                .iter()
                .find(|file| !paths.insert(&file.path))
                .map(|file| file.path.display().to_string());
            duplicate
        };
        match collision {
            Some(path) => Err(MappingError::OutputCollision { path }),
            None => Ok(files),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Backend options that do not affect parsing or merging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub namespace: String,
    pub suffix: String,
    pub bundle: String,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::from(&GeneratorConfig::new())
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&GeneratorConfig> for RenderOptions {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            namespace: config.namespace.clone(),
            suffix: config.suffix.clone(),
            bundle: config.bundle.clone(),
        }
    }
}

/// A rendered file, relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// Implemented once per target language
pub trait Renderer {
    fn render(&self, context: &RenderContext<'_>) -> Result<Vec<GeneratedFile>, MappingError>;
}

/// Everything a renderer needs for one backend pass
pub struct RenderContext<'a> {
    pub definitions: &'a [Definition],
    pub index: &'a DefinitionIndex,
    pub options: &'a RenderOptions,
    types: &'static TypeSyntax,
    literals: LiteralResolver<'a>,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        definitions: &'a [Definition],
        index: &'a DefinitionIndex,
        backend: Backend,
        options: &'a RenderOptions,
    ) -> Self {
        let mut literals = LiteralResolver::new(backend.literal_syntax(), index);
        if backend == Backend::Cpp {
            literals = literals.with_namespace(&options.namespace);
        }
        Self {
            definitions,
            index,
            options,
            types: backend.type_syntax(),
            literals,
        }
    }

    pub fn map_type(&self, idl_type: &TypeDescriptor) -> Result<String, MappingError> {
        self.types.map_type(idl_type)
    }

    pub fn map_member_type(&self, member: &Member) -> Result<String, MappingError> {
        self.types.map_member_type(member)
    }

    pub fn map_argument_type(&self, argument: &Argument) -> Result<String, MappingError> {
        self.types.map_argument_type(argument)
    }

    /// Argument type as a parameter; a variadic argument collects into a sequence
    pub fn map_parameter_type(&self, argument: &Argument) -> Result<String, MappingError> {
        if argument.variadic {
            return self.types.map_type(&TypeDescriptor::sequence(argument.idl_type.clone()));
        }
        self.map_argument_type(argument)
    }

    /// Map every argument and validate its default, if any
    pub fn map_parameters(&self, arguments: &[Argument]) -> Result<Vec<(String, String)>, MappingError> {
        arguments
            .iter()
            .map(|argument| {
                self.resolve_argument_default(argument)?;
                Ok((self.map_parameter_type(argument)?, argument.name.clone()))
            })
            .collect()
    }

    pub fn is_primitive(&self, name: &str) -> bool {
        self.types.primitive(name).is_some()
    }

    /// Other canonical definitions referenced by `definition`, sorted by name
    pub fn user_types(&self, definition: &Definition) -> Vec<String> {
        let mut names = BTreeSet::new();
        for parent in definition.inheritance.iter().chain(definition.implements.iter()) {
            names.insert(parent.as_str());
        }

        let members = definition.members.iter();
        let types = definition
            .idl_type
            .iter()
            .chain(definition.arguments.iter().map(|argument| &argument.idl_type))
            .chain(members.clone().map(|member| &member.idl_type))
            .chain(members.clone().filter_map(|member| member.key_type.as_ref()))
            .chain(members.flat_map(|member| member.arguments.iter().map(|argument| &argument.idl_type)));
        for idl_type in types {
            names.extend(idl_type.referenced_names());
        }

        names
            .into_iter()
            .filter(|name| *name != definition.name)
            .filter(|name| !self.is_primitive(name) && self.index.contains(name))
            .map(str::to_string)
            .collect()
    }

    pub fn literals(&self) -> &LiteralResolver<'a> {
        &self.literals
    }

    pub fn resolve_default(&self, member: &Member) -> Result<Option<String>, MappingError> {
        self.literals.resolve_default(member)
    }

    pub fn resolve_argument_default(&self, argument: &Argument) -> Result<Option<String>, MappingError> {
        self.literals.resolve_argument_default(argument)
    }
}
