use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::{
    backend::{Backend, GeneratedFile, RenderOptions},
    config::GeneratorConfig,
    definition::Definition,
    error::GeneratorError,
    extraction::{parse_document, ExtractionOutcome, SkipReason},
    merge::merge_definitions,
    registry::DefinitionsByName,
    source::{self, Document, SourceError, SourceLocator},
};

const HLINE: &str = "--------------------------------------------------------------------------------";

/// Main generation engine that orchestrates sourcing, extraction, merging
/// and rendering
pub struct BindingGenerator {
    config: GeneratorConfig,
}

/// Result of a generation run
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub backend: Backend,
    pub sources: Vec<String>,
    pub definitions: Vec<Definition>,
    /// Fragments folded into each canonical definition, in first-seen order
    pub fragment_counts: Vec<(String, usize)>,
    pub skipped: Vec<SkippedDefinition>,
    pub warnings: Vec<GenerationWarning>,
    pub files: Vec<PathBuf>,
}

/// Fragments collected from every document, before merging
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub definitions_by_name: DefinitionsByName,
    pub skipped: Vec<SkippedDefinition>,
    pub warnings: Vec<GenerationWarning>,
}

/// A fragment dropped by the `only`/`skip` patterns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDefinition {
    pub name: String,
    pub reason: SkipReason,
}

/// Warning generated during a run that did not stop it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationWarning {
    pub message: String,
    pub document: Option<String>,
    /// IDL text the parser rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unparsed: Option<String>,
    pub warning_type: GenerationWarningType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationWarningType {
    UnparsableDocument,
    UnparsableMarkup,
    UnreachableDocument,
}

impl GenerationWarning {
    pub fn new(message: String, warning_type: GenerationWarningType) -> Self {
        Self {
            message,
            document: None,
            unparsed: None,
            warning_type,
        }
    }

    pub fn with_document(mut self, document: String) -> Self {
        self.document = Some(document);
        self
    }

    pub fn with_unparsed(mut self, unparsed: Option<String>) -> Self {
        self.unparsed = unparsed;
        self
    }
}

impl BindingGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate bindings for `backend` from every input document. Either all
    /// output files are written or none are.
    pub async fn run(
        &self,
        backend: Backend,
        locators: &[SourceLocator],
    ) -> Result<GenerationResult, GeneratorError> {
        if locators.is_empty() {
            return Err(GeneratorError::NoInputs);
        }

        // All fetches join before extraction starts
        let fetched = source::fetch_all(locators).await;
        let collection = self.collect_definitions(fetched)?;
        let fragment_counts = collection.definitions_by_name.fragment_counts();

        let definitions = self.canonicalize(collection.definitions_by_name)?;
        info!("Merged {} definitions", definitions.len());

        let rendered = self.render(backend, &definitions)?;
        let files = self.write_files(&rendered)?;

        Ok(GenerationResult {
            backend,
            sources: locators.iter().map(ToString::to_string).collect(),
            definitions,
            fragment_counts,
            skipped: collection.skipped,
            warnings: collection.warnings,
            files,
        })
    }

    /// Parse, filter and rename every fetched document, grouping the
    /// surviving fragments by their final name.
    pub fn collect_definitions(
        &self,
        fetched: Vec<(SourceLocator, Result<Document, SourceError>)>,
    ) -> Result<Collection, GeneratorError> {
        let mut collection = Collection::default();

        for (locator, result) in fetched {
            let document = match result {
                Ok(document) => document,
                Err(source) => {
                    let error = GeneratorError::FetchFailure {
                        document: locator.to_string(),
                        source,
                    };
                    self.recover(error, None, &mut collection.warnings)?;
                    continue;
                }
            };

            for parsed in parse_document(&document) {
                let fragments = match parsed {
                    Ok(fragments) => fragments,
                    Err(failure) => {
                        self.recover(failure.error, failure.unparsed, &mut collection.warnings)?;
                        continue;
                    }
                };

                for fragment in fragments {
                    match self.config.rules.extract(fragment) {
                        ExtractionOutcome::Kept(definition) => {
                            collection.definitions_by_name.insert(definition)
                        }
                        ExtractionOutcome::Dropped { name, reason } => {
                            collection.skipped.push(SkippedDefinition { name, reason })
                        }
                    }
                }
            }
        }

        debug!(
            "Collected {} definition names, skipped {}",
            collection.definitions_by_name.len(),
            collection.skipped.len()
        );
        Ok(collection)
    }

    /// Fold fragments into one canonical definition per name
    pub fn canonicalize(
        &self,
        definitions_by_name: DefinitionsByName,
    ) -> Result<Vec<Definition>, GeneratorError> {
        merge_definitions(definitions_by_name, self.config.merge)
    }

    /// Render in memory; nothing touches the filesystem here
    pub fn render(
        &self,
        backend: Backend,
        definitions: &[Definition],
    ) -> Result<Vec<GeneratedFile>, GeneratorError> {
        info!("Rendering {} definitions with the {} backend", definitions.len(), backend);
        Ok(backend.render(definitions, &RenderOptions::from(&self.config))?)
    }

    /// Write every rendered file. When one write fails, the files already
    /// written by this call are removed again before the error is returned.
    pub fn write_files(&self, files: &[GeneratedFile]) -> Result<Vec<PathBuf>, GeneratorError> {
        let mut written = Vec::with_capacity(files.len());
        for file in files {
            let path = self.config.out_dir.join(&file.path);
            if let Err(error) = write_file(&path, &file.contents) {
                remove_written(&written);
                return Err(error);
            }
            written.push(path);
        }
        Ok(written)
    }

    /// Turn a document-level failure into a warning, or abort under `bail`
    fn recover(
        &self,
        error: GeneratorError,
        unparsed: Option<String>,
        warnings: &mut Vec<GenerationWarning>,
    ) -> Result<(), GeneratorError> {
        if self.config.bail || !error.is_recoverable() {
            return Err(error);
        }

        let classified = match &error {
            GeneratorError::ParseFailure { document, .. } => {
                Some((GenerationWarningType::UnparsableDocument, document.clone()))
            }
            GeneratorError::MarkupParseFailure { document, .. } => {
                Some((GenerationWarningType::UnparsableMarkup, document.clone()))
            }
            GeneratorError::FetchFailure { document, .. } => {
                Some((GenerationWarningType::UnreachableDocument, document.clone()))
            }
            _ => None,
        };
        let Some((warning_type, document)) = classified else {
            return Err(error);
        };

        match &unparsed {
            Some(text) => warn!("{}\n{}\n{}\n{}", error, HLINE, text.trim_end(), HLINE),
            None => warn!("{}", error),
        }
        warnings.push(
            GenerationWarning::new(error.to_string(), warning_type)
                .with_document(document)
                .with_unparsed(unparsed),
        );
        Ok(())
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), GeneratorError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| GeneratorError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    debug!("Writing {}", path.display());
    fs::write(path, contents).map_err(|source| GeneratorError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn remove_written(paths: &[PathBuf]) {
    for path in paths {
        info!("Removing {}", path.display());
        if let Err(e) = fs::remove_file(path) {
            warn!("Unable to remove {}: {}", path.display(), e);
        }
    }
}
