//! Canonical IDL: every merged definition written back out as schema text.

use tracing::debug;

use super::{GeneratedFile, RenderContext, Renderer};
use crate::error::MappingError;

pub struct IdlRenderer;

impl Renderer for IdlRenderer {
    fn render(&self, context: &RenderContext<'_>) -> Result<Vec<GeneratedFile>, MappingError> {
        let mut files: Vec<GeneratedFile> = context
            .definitions
            .iter()
            .map(|definition| {
                let path = format!("{}.idl", definition.file_stem());
                debug!("Extracting {}", path);
                GeneratedFile::new(path, format!("{}\n", definition))
            })
            .collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }
}
