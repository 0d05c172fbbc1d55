//! YAML configuration for the word source, the candidate filter and the
//! generation engine.
//!
//! Every key is optional. Unknown keys and wrong value types are rejected
//! when the file is loaded; semantic checks live in each type's
//! `validate()`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default shard size and flush batch size.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Default word source read buffer, in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Read and deserialize a YAML configuration file.
///
/// An empty file yields `T::default()`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::Yaml`] if it does not describe a `T`.
pub fn load_yaml<T>(path: &Path) -> Result<T, ConfigError>
where
    T: DeserializeOwned + Default,
{
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if text.trim().is_empty() {
        return Ok(T::default());
    }
    serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Word source
// ---------------------------------------------------------------------------

/// Text encoding of seed corpus files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Encoding {
    /// Strict UTF-8.
    #[default]
    #[serde(rename = "utf-8", alias = "utf8", alias = "UTF-8")]
    Utf8,
    /// ISO-8859-1: every byte maps to the scalar of the same value.
    #[serde(rename = "latin-1", alias = "latin1", alias = "iso-8859-1")]
    Latin1,
}

/// How base words are read from seed files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Encoding of the seed files.
    pub encoding: Encoding,
    /// Read buffer size in bytes.
    pub chunk_size: usize,
    /// Decode lossily instead of failing on invalid input.
    pub binary_mode: bool,
    /// Drop lines that are empty after trimming.
    pub skip_blank_lines: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            encoding: Encoding::Utf8,
            chunk_size: DEFAULT_CHUNK_SIZE,
            binary_mode: false,
            skip_blank_lines: true,
        }
    }
}

impl SourceConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroChunkSize`] when `chunk_size` is zero.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Candidate filter
// ---------------------------------------------------------------------------

/// Acceptance criteria applied to every generated candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Inclusive lower bound on candidate length, in characters.
    pub min_length: Option<usize>,
    /// Inclusive upper bound on candidate length, in characters.
    pub max_length: Option<usize>,
    /// Regular expression the whole candidate must match.
    pub pattern: Option<String>,
    /// Reject candidates without an ASCII digit.
    pub include_numbers: bool,
    /// Compare against `exclude_words` without case folding.
    pub preserve_case: bool,
    /// Candidates to drop.
    pub exclude_words: Vec<String>,
}

impl FilterConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvertedBounds`] when `min_length` exceeds
    /// `max_length`.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if let (Some(min), Some(max)) = (self.min_length, self.max_length) {
            if min > max {
                return Err(ConfigError::InvertedBounds { min, max });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Rule loading and generation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Rule file, or directory of `*.rule` files.
    pub rules_path: Option<PathBuf>,
    /// Words per shard, and the largest number of candidates per flush.
    pub batch_size: usize,
    /// Log per-shard progress at info level.
    pub verbose_logging: bool,
    /// Inline rules, applied after file rules.
    pub rules: Vec<String>,
    /// Worker threads. Defaults to the available parallelism.
    pub workers: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rules_path: None,
            batch_size: DEFAULT_BATCH_SIZE,
            verbose_logging: false,
            rules: Vec::new(),
            workers: None,
        }
    }
}

impl EngineConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroBatchSize`] or [`ConfigError::ZeroWorkers`].
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if matches!(self.workers, Some(0)) {
            return Err(ConfigError::ZeroWorkers);
        }
        Ok(())
    }

    /// Whether any rule source is configured.
    #[must_use]
    pub fn has_rules(&self) -> bool {
        self.rules_path.is_some() || !self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn yaml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults() {
        let source = SourceConfig::default();
        assert_eq!(source.encoding, Encoding::Utf8);
        assert_eq!(source.chunk_size, 4096);
        assert!(!source.binary_mode);
        assert!(source.skip_blank_lines);

        let engine = EngineConfig::default();
        assert_eq!(engine.batch_size, 10_000);
        assert!(engine.rules.is_empty());
        assert!(!engine.has_rules());

        assert_eq!(FilterConfig::default().min_length, None);
    }

    #[test]
    fn loads_partial_engine_config() {
        let file = yaml_file("rules_path: rules/best64.rule\nbatch_size: 500\nrules: [':', 'c$1']\n");
        let engine: EngineConfig = load_yaml(file.path()).unwrap();
        assert_eq!(engine.rules_path, Some(PathBuf::from("rules/best64.rule")));
        assert_eq!(engine.batch_size, 500);
        assert_eq!(engine.rules, vec![":".to_string(), "c$1".to_string()]);
        assert!(!engine.verbose_logging);
        assert!(engine.has_rules());
    }

    #[test]
    fn loads_source_encoding_names() {
        let file = yaml_file("encoding: latin-1\nbinary_mode: true\n");
        let source: SourceConfig = load_yaml(file.path()).unwrap();
        assert_eq!(source.encoding, Encoding::Latin1);
        assert!(source.binary_mode);
        assert_eq!(source.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn empty_file_is_default() {
        let file = yaml_file("\n");
        let filter: FilterConfig = load_yaml(file.path()).unwrap();
        assert_eq!(filter, FilterConfig::default());
    }

    #[test]
    fn unknown_key_rejected() {
        let file = yaml_file("min_length: 3\nmin_lenght: 4\n");
        let err = load_yaml::<FilterConfig>(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }), "{err}");
    }

    #[test]
    fn wrong_type_rejected() {
        let file = yaml_file("batch_size: lots\n");
        let err = load_yaml::<EngineConfig>(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }), "{err}");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_yaml::<SourceConfig>(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn validation() {
        let filter = FilterConfig {
            min_length: Some(9),
            max_length: Some(3),
            ..FilterConfig::default()
        };
        assert!(matches!(
            filter.validate(),
            Err(ConfigError::InvertedBounds { min: 9, max: 3 })
        ));

        let engine = EngineConfig {
            batch_size: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(engine.validate(), Err(ConfigError::ZeroBatchSize)));

        let engine = EngineConfig {
            workers: Some(0),
            ..EngineConfig::default()
        };
        assert!(matches!(engine.validate(), Err(ConfigError::ZeroWorkers)));

        let source = SourceConfig {
            chunk_size: 0,
            ..SourceConfig::default()
        };
        assert!(matches!(source.validate(), Err(ConfigError::ZeroChunkSize)));
    }
}
