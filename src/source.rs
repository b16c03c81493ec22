use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

use crate::markup;

/// Where an input document lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceLocator {
    Local(PathBuf),
    Remote(String),
}

impl SourceLocator {
    pub fn parse(locator: &str) -> Self {
        if locator.starts_with("http://") || locator.starts_with("https://") {
            SourceLocator::Remote(locator.to_string())
        } else {
            SourceLocator::Local(PathBuf::from(locator))
        }
    }
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocator::Local(path) => write!(f, "{}", path.display()),
            SourceLocator::Remote(url) => f.write_str(url),
        }
    }
}

/// A fetched input document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub locator: SourceLocator,
    pub contents: String,
}

impl Document {
    pub fn new(locator: SourceLocator, contents: impl Into<String>) -> Self {
        Self {
            locator,
            contents: contents.into(),
        }
    }

    pub fn is_markup(&self) -> bool {
        markup::is_markup(&self.locator.to_string(), &self.contents)
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("server responded with status {0}")]
    Status(u16),

    #[error("fetch task failed: {0}")]
    Join(String),
}

/// Fetch every document concurrently. Results come back in request order and
/// each failure is reported against its own locator only.
pub async fn fetch_all(locators: &[SourceLocator]) -> Vec<(SourceLocator, Result<Document, SourceError>)> {
    let client = reqwest::Client::new();
    let handles: Vec<_> = locators
        .iter()
        .cloned()
        .map(|locator| {
            let client = client.clone();
            tokio::spawn(async move { fetch(&client, locator).await })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (locator, handle) in locators.iter().zip(handles) {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(SourceError::Join(e.to_string())),
        };
        results.push((locator.clone(), result));
    }
    results
}

async fn fetch(client: &reqwest::Client, locator: SourceLocator) -> Result<Document, SourceError> {
    info!("Sourcing {}", locator);
    let contents = match &locator {
        SourceLocator::Local(path) => tokio::fs::read_to_string(path).await?,
        SourceLocator::Remote(url) => {
            let response = client.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(SourceError::Status(status.as_u16()));
            }
            response.text().await?
        }
    };
    debug!("Sourced {} ({} bytes)", locator, contents.len());
    Ok(Document::new(locator, contents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_locator_parse() {
        assert_eq!(
            SourceLocator::parse("https://w3c.github.io/spec/"),
            SourceLocator::Remote("https://w3c.github.io/spec/".to_string())
        );
        assert_eq!(
            SourceLocator::parse("idl/widget.idl"),
            SourceLocator::Local(PathBuf::from("idl/widget.idl"))
        );
    }

    #[test]
    fn test_document_markup_detection() {
        let html = Document::new(SourceLocator::parse("spec.html"), "enum A { \"a\" };");
        assert!(html.is_markup());
        let idl = Document::new(SourceLocator::parse("a.idl"), "enum A { \"a\" };");
        assert!(!idl.is_markup());
    }

    #[tokio::test]
    async fn test_fetch_all_preserves_order_and_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.idl");
        let second = dir.path().join("second.idl");
        writeln!(std::fs::File::create(&first).unwrap(), "enum First {{ \"a\" }};").unwrap();
        writeln!(std::fs::File::create(&second).unwrap(), "enum Second {{ \"b\" }};").unwrap();

        let locators = vec![
            SourceLocator::Local(second.clone()),
            SourceLocator::Local(dir.path().join("missing.idl")),
            SourceLocator::Local(first.clone()),
        ];
        let results = fetch_all(&locators).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, SourceLocator::Local(second));
        assert!(results[0].1.as_ref().unwrap().contents.contains("Second"));
        assert!(matches!(results[1].1, Err(SourceError::Io(_))));
        assert!(results[2].1.as_ref().unwrap().contents.contains("First"));
    }
}
