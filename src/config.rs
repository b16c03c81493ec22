use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::extraction::ExtractionRules;
use crate::rename::RenameRule;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid rename: {0}")]
    InvalidRename(String),

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Options for one generation run
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub rules: ExtractionRules,
    /// Abort the whole run on the first unparsable or unreachable document
    pub bail: bool,
    /// Fold same-named fragments into one definition
    pub merge: bool,
    pub out_dir: PathBuf,
    /// C++ namespace
    pub namespace: String,
    /// C++ source file extension
    pub suffix: String,
    /// JavaScript aggregate file name
    pub bundle: String,
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self {
            rules: ExtractionRules::default(),
            bail: false,
            merge: true,
            out_dir: PathBuf::from("."),
            namespace: "idl".to_string(),
            suffix: "cc".to_string(),
            bundle: "bindings.js".to_string(),
        }
    }

    pub fn with_only(mut self, pattern: &str) -> Result<Self, ConfigError> {
        self.rules.only.push(compile(pattern)?);
        Ok(self)
    }

    pub fn with_skip(mut self, pattern: &str) -> Result<Self, ConfigError> {
        self.rules.skip.push(compile(pattern)?);
        Ok(self)
    }

    pub fn with_rename(mut self, pattern: &str, replacement: &str) -> Result<Self, ConfigError> {
        self.rules.rename.push(RenameRule::new(pattern, replacement)?);
        Ok(self)
    }

    pub fn with_bail(mut self, bail: bool) -> Self {
        self.bail = bail;
        self
    }

    pub fn with_merge(mut self, merge: bool) -> Self {
        self.merge = merge;
        self
    }

    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = out_dir.into();
        self
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Compile a definition-name pattern
pub fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Split the flat `PATTERN REPLACEMENT PATTERN REPLACEMENT ...` list collected
/// from the command line into pairs.
pub fn rename_pairs(values: &[String]) -> Result<Vec<(String, String)>, ConfigError> {
    if values.len() % 2 != 0 {
        return Err(ConfigError::InvalidRename(format!(
            "`{}` has no replacement",
            values[values.len() - 1]
        )));
    }
    Ok(values
        .chunks(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect())
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenameEntry {
    pub pattern: String,
    pub replacement: String,
}

/// On-disk YAML configuration, e.g.
///
/// ```yaml
/// rename:
///   - pattern: "^RTC"
///     replacement: ""
/// skip: ["^Legacy"]
/// merge: true
/// namespace: webrtc
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub rename: Vec<RenameEntry>,
    pub only: Vec<String>,
    pub skip: Vec<String>,
    pub bail: Option<bool>,
    pub merge: Option<bool>,
    pub out: Option<PathBuf>,
    pub namespace: Option<String>,
    pub suffix: Option<String>,
    pub bundle: Option<String>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn into_config(self) -> Result<GeneratorConfig, ConfigError> {
        let mut config = GeneratorConfig::new();
        for pattern in &self.only {
            config = config.with_only(pattern)?;
        }
        for pattern in &self.skip {
            config = config.with_skip(pattern)?;
        }
        for entry in &self.rename {
            config = config.with_rename(&entry.pattern, &entry.replacement)?;
        }
        if let Some(bail) = self.bail {
            config.bail = bail;
        }
        if let Some(merge) = self.merge {
            config.merge = merge;
        }
        if let Some(out) = self.out {
            config.out_dir = out;
        }
        if let Some(namespace) = self.namespace {
            config.namespace = namespace;
        }
        if let Some(suffix) = self.suffix {
            config.suffix = suffix;
        }
        if let Some(bundle) = self.bundle {
            config.bundle = bundle;
        }
        Ok(config)
    }
}
