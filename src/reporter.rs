use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{
    backend::Backend,
    definition::DefinitionKind,
    engine::{GenerationResult, GenerationWarning, SkippedDefinition},
};

/// Reporter for generation runs in various formats
pub struct GenerationReporter {
    output_format: ReportFormat,
}

/// Available output formats for generation reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Console,
    Json,
    Yaml,
}

/// Everything a run sourced, merged, skipped and wrote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub backend: Backend,
    pub sources: Vec<String>,
    pub definitions: Vec<DefinitionSummary>,
    pub skipped: Vec<SkippedDefinition>,
    pub warnings: Vec<GenerationWarning>,
    pub files: Vec<PathBuf>,
    pub summary: GenerationSummary,
}

/// One canonical definition and how many fragments it was merged from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionSummary {
    pub name: String,
    pub kind: DefinitionKind,
    pub fragments: usize,
    pub members: usize,
    pub values: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub total_sources: usize,
    pub total_definitions: usize,
    pub merged_definitions: usize,
    pub skipped_definitions: usize,
    pub total_warnings: usize,
    pub files_written: usize,
}

impl GenerationReporter {
    pub fn new() -> Self {
        Self {
            output_format: ReportFormat::Console,
        }
    }

    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Summarise a successful run
    pub fn generate_report(&self, result: &GenerationResult) -> GenerationReport {
        let definitions: Vec<DefinitionSummary> = result
            .definitions
            .iter()
            .map(|definition| DefinitionSummary {
                name: definition.name.clone(),
                kind: definition.kind,
                fragments: result
                    .fragment_counts
                    .iter()
                    .find(|(name, _)| *name == definition.name)
                    .map_or(1, |(_, count)| *count),
                members: definition.members.len(),
                values: definition.values.len(),
            })
            .collect();

        let summary = GenerationSummary {
            total_sources: result.sources.len(),
            total_definitions: definitions.len(),
            merged_definitions: definitions.iter().filter(|summary| summary.fragments > 1).count(),
            skipped_definitions: result.skipped.len(),
            total_warnings: result.warnings.len(),
            files_written: result.files.len(),
        };

        GenerationReport {
            backend: result.backend,
            sources: result.sources.clone(),
            definitions,
            skipped: result.skipped.clone(),
            warnings: result.warnings.clone(),
            files: result.files.clone(),
            summary,
        }
    }

    /// Format the report according to the configured output format
    pub fn format_report(&self, report: &GenerationReport) -> Result<String, ReportError> {
        match self.output_format {
            ReportFormat::Console => self.format_console_report(report),
            ReportFormat::Json => self.format_json_report(report),
            ReportFormat::Yaml => self.format_yaml_report(report),
        }
    }

    /// Format report for console output
    fn format_console_report(&self, report: &GenerationReport) -> Result<String, ReportError> {
        let mut output = String::new();

        output.push_str(&format!("\n=== Generation Complete ({}) ===\n", report.backend));
        output.push_str(&format!("  Sources: {}\n", report.summary.total_sources));
        output.push_str(&format!(
            "  Definitions: {} ({} merged from partials)\n",
            report.summary.total_definitions, report.summary.merged_definitions
        ));

        if !report.skipped.is_empty() {
            output.push_str(&format!("  Skipped: {}\n", report.summary.skipped_definitions));
            for skipped in &report.skipped {
                output.push_str(&format!("    - {}\n", skipped.name));
            }
        }

        for warning in &report.warnings {
            output.push_str(&format!("  ⚠ WARNING: {}\n", warning.message));
        }

        for file in &report.files {
            output.push_str(&format!("  ✓ Output file: {}\n", file.display()));
        }

        Ok(output)
    }

    /// Format report as JSON
    fn format_json_report(&self, report: &GenerationReport) -> Result<String, ReportError> {
        serde_json::to_string_pretty(report).map_err(|e| ReportError::SerializationError(e.to_string()))
    }

    /// Format report as YAML
    fn format_yaml_report(&self, report: &GenerationReport) -> Result<String, ReportError> {
        serde_yaml::to_string(report).map_err(|e| ReportError::SerializationError(e.to_string()))
    }
}

impl Default for GenerationReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{Definition, Member, TypeDescriptor};
    use crate::engine::GenerationWarningType;
    use crate::extraction::SkipReason;

    fn result() -> GenerationResult {
        GenerationResult {
            backend: Backend::Cpp,
            sources: vec!["widget.idl".to_string(), "missing.idl".to_string()],
            definitions: vec![Definition::new(DefinitionKind::Dictionary, "Widget").with_members(vec![
                Member::field("count", TypeDescriptor::named("long")),
                Member::field("label", TypeDescriptor::named("DOMString")),
            ])],
            fragment_counts: vec![("Widget".to_string(), 2)],
            skipped: vec![SkippedDefinition {
                name: "LegacyWidget".to_string(),
                reason: SkipReason::MatchedSkip("^Legacy".to_string()),
            }],
            warnings: vec![GenerationWarning::new(
                "Unable to source missing.idl".to_string(),
                GenerationWarningType::UnreachableDocument,
            )],
            files: vec![PathBuf::from("out/widget.h"), PathBuf::from("out/widget.cc")],
        }
    }

    #[test]
    fn test_generation_reporter_creation() {
        let reporter = GenerationReporter::new();
        assert!(matches!(reporter.output_format, ReportFormat::Console));
    }

    #[test]
    fn test_reporter_with_format() {
        let reporter = GenerationReporter::new().with_format(ReportFormat::Json);
        assert!(matches!(reporter.output_format, ReportFormat::Json));
    }

    #[test]
    fn test_generate_report() {
        let report = GenerationReporter::new().generate_report(&result());

        assert_eq!(report.definitions[0].fragments, 2);
        assert_eq!(report.definitions[0].members, 2);
        assert_eq!(report.summary.merged_definitions, 1);
        assert_eq!(report.summary.total_warnings, 1);
        assert_eq!(report.summary.files_written, 2);
    }

    #[test]
    fn test_format_console_report() {
        let reporter = GenerationReporter::new();
        let report = reporter.generate_report(&result());
        let formatted = reporter.format_report(&report).unwrap();

        assert!(formatted.contains("=== Generation Complete (cpp) ==="));
        assert!(formatted.contains("Definitions: 1 (1 merged from partials)"));
        assert!(formatted.contains("- LegacyWidget"));
        assert!(formatted.contains("⚠ WARNING: Unable to source missing.idl"));
        assert!(formatted.contains("✓ Output file: out/widget.h"));
    }

    #[test]
    fn test_format_json_and_yaml_reports() {
        let report = GenerationReporter::new().generate_report(&result());

        let json = GenerationReporter::new().with_format(ReportFormat::Json).format_report(&report).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["backend"], "cpp");
        assert_eq!(parsed["definitions"][0]["kind"], "dictionary");

        let yaml = GenerationReporter::new().with_format(ReportFormat::Yaml).format_report(&report).unwrap();
        assert!(yaml.contains("merged_definitions: 1"));
    }
}
