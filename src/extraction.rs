use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::definition::Definition;
use crate::error::GeneratorError;
use crate::markup;
use crate::parser;
use crate::rename::{Rename, RenameRule};
use crate::source::Document;

/// Per-fragment filtering and renaming.
///
/// The pipeline is `raw -> filtered_or_dropped -> renamed`: `only` patterns
/// must all match, any `skip` pattern drops the fragment before any rename
/// runs, and rename rules apply in order, each to the output of the last.
#[derive(Debug, Clone, Default)]
pub struct ExtractionRules {
    pub only: Vec<Regex>,
    pub skip: Vec<Regex>,
    pub rename: Vec<RenameRule>,
}

/// Why a fragment was dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    NotMatchingOnly(String),
    MatchedSkip(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    Kept(Definition),
    Dropped { name: String, reason: SkipReason },
}

impl ExtractionRules {
    /// Decide whether a definition name survives the `only` and `skip` patterns
    pub fn check(&self, name: &str) -> Result<(), SkipReason> {
        if let Some(pattern) = self.only.iter().find(|pattern| !pattern.is_match(name)) {
            return Err(SkipReason::NotMatchingOnly(pattern.as_str().to_string()));
        }
        if let Some(pattern) = self.skip.iter().find(|pattern| pattern.is_match(name)) {
            return Err(SkipReason::MatchedSkip(pattern.as_str().to_string()));
        }
        Ok(())
    }

    pub fn rename(&self, definition: Definition) -> Definition {
        self.rename
            .iter()
            .fold(definition, |renamed, rule| renamed.rename(rule))
    }

    pub fn extract(&self, definition: Definition) -> ExtractionOutcome {
        if let Err(reason) = self.check(&definition.name) {
            debug!("Skipping {} ({:?})", definition.name, reason);
            return ExtractionOutcome::Dropped {
                name: definition.name,
                reason,
            };
        }
        ExtractionOutcome::Kept(self.rename(definition))
    }
}

/// A fragment that could not be turned into definitions, with the text the
/// parser was given when there was any
#[derive(Debug)]
pub struct FragmentFailure {
    pub error: GeneratorError,
    pub unparsed: Option<String>,
}

/// Parse a document into definition fragments.
///
/// Raw IDL yields one entry for the whole document; markup yields one entry
/// per embedded fragment, so a single bad fragment only loses itself.
pub fn parse_document(document: &Document) -> Vec<Result<Vec<Definition>, FragmentFailure>> {
    let name = document.locator.to_string();
    debug!("Extracting definitions from {}", name);

    if !document.is_markup() {
        return vec![parse_fragment(&name, &document.contents)];
    }

    let markup_failure = |e: markup::MarkupError| FragmentFailure {
        error: GeneratorError::MarkupParseFailure {
            document: name.clone(),
            message: e.to_string(),
        },
        unparsed: None,
    };
    match markup::extract_fragments(&document.contents) {
        Ok(fragments) => fragments
            .into_iter()
            .map(|fragment| match fragment {
                Ok(unparsed) => parse_fragment(&name, &unparsed),
                Err(e) => Err(markup_failure(e)),
            })
            .collect(),
        Err(e) => vec![Err(markup_failure(e))],
    }
}

fn parse_fragment(document: &str, unparsed: &str) -> Result<Vec<Definition>, FragmentFailure> {
    parser::parse(unparsed).map_err(|source| FragmentFailure {
        error: GeneratorError::ParseFailure {
            document: document.to_string(),
            source,
        },
        unparsed: Some(unparsed.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::definition::DefinitionKind;
    use crate::source::SourceLocator;

    fn interface(name: &str) -> Definition {
        Definition::new(DefinitionKind::Interface, name)
    }

    #[test]
    fn test_only_requires_every_pattern() {
        let rules = GeneratorConfig::new()
            .with_only("^Widget")
            .unwrap()
            .with_only("Init$")
            .unwrap()
            .rules;

        assert!(rules.check("WidgetInit").is_ok());
        assert_eq!(
            rules.check("Widget"),
            Err(SkipReason::NotMatchingOnly("Init$".to_string()))
        );
        assert!(rules.check("GadgetInit").is_err());
    }

    #[test]
    fn test_skip_precedes_rename() {
        let rules = GeneratorConfig::new()
            .with_skip("^Legacy")
            .unwrap()
            .with_rename("^Legacy", "")
            .unwrap()
            .rules;

        match rules.extract(interface("LegacyWidget")) {
            ExtractionOutcome::Dropped { name, reason } => {
                assert_eq!(name, "LegacyWidget");
                assert_eq!(reason, SkipReason::MatchedSkip("^Legacy".to_string()));
            }
            other => panic!("expected the fragment to be dropped, got {:?}", other),
        }
    }

    #[test]
    fn test_renames_apply_in_order() {
        let rules = GeneratorConfig::new()
            .with_rename("Widget", "Gadget")
            .unwrap()
            .with_rename("Gadget", "Gizmo")
            .unwrap()
            .rules;

        match rules.extract(interface("Widget")) {
            ExtractionOutcome::Kept(definition) => assert_eq!(definition.name, "Gizmo"),
            other => panic!("expected the fragment to be kept, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_rules_keep_everything_unchanged() {
        let rules = ExtractionRules::default();
        assert_eq!(rules.extract(interface("Widget")), ExtractionOutcome::Kept(interface("Widget")));
    }

    #[test]
    fn test_parse_raw_document() {
        let document = Document::new(
            SourceLocator::parse("widget.idl"),
            "interface Widget {}; enum Color { \"red\" };",
        );
        let results = parse_document(&document);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_parse_markup_localizes_failures() {
        let document = Document::new(
            SourceLocator::parse("spec.html"),
            r#"<pre class="idl">interface Broken {</pre>
               <pre class="idl">enum Color { "red" };</pre>
               <span class="idl">typedef long Id;</span>"#,
        );
        let results = parse_document(&document);

        assert_eq!(results.len(), 3);
        match &results[0] {
            Err(failure) => {
                assert!(matches!(failure.error, GeneratorError::ParseFailure { .. }));
                assert_eq!(failure.unparsed.as_deref(), Some("interface Broken {"));
            }
            Ok(_) => panic!("expected the first fragment to fail"),
        }
        assert_eq!(results[1].as_ref().unwrap()[0].name, "Color");
        match &results[2] {
            Err(failure) => {
                assert!(matches!(failure.error, GeneratorError::MarkupParseFailure { .. }));
                assert!(failure.unparsed.is_none());
            }
            Ok(_) => panic!("expected the span to be rejected"),
        }
    }
}
