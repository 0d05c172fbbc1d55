//! Error types for `cbwg-generator`.

use std::io;
use std::path::PathBuf;

use cbwg_rules::RuleSyntaxError;
use thiserror::Error;

/// Invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `min_length` is greater than `max_length`.
    #[error("min_length ({min}) is greater than max_length ({max})")]
    InvertedBounds {
        /// Configured minimum length.
        min: usize,
        /// Configured maximum length.
        max: usize,
    },

    /// The filter pattern is not a valid regular expression.
    #[error("invalid filter pattern")]
    InvalidPattern(#[from] regex::Error),

    /// `batch_size` is zero.
    #[error("batch_size must be at least 1")]
    ZeroBatchSize,

    /// `chunk_size` is zero.
    #[error("chunk_size must be at least 1")]
    ZeroChunkSize,

    /// `workers` is zero.
    #[error("workers must be at least 1")]
    ZeroWorkers,

    /// A configuration file could not be read.
    #[error("cannot read config {}", .path.display())]
    Io {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A configuration file is not valid YAML for its type.
    #[error("malformed config {}", .path.display())]
    Yaml {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying deserialization error.
        #[source]
        source: serde_yaml::Error,
    },

    /// A seed file is missing or not a regular file.
    #[error("cannot read seed file {}", .path.display())]
    Seed {
        /// Path given as a seed file.
        path: PathBuf,
        /// Why the path is unusable.
        #[source]
        source: io::Error,
    },

    /// Neither a rules path nor inline rules were given.
    #[error("no rules configured: set rules_path or rules")]
    NoRules,
}

/// A base word could not be read from the word source.
#[derive(Debug, Error)]
#[error(
    "{}{}",
    .origin.display(),
    .line.map_or_else(String::new, |line| format!(":{line}"))
)]
pub struct SourceError {
    /// File the word was read from.
    pub origin: PathBuf,
    /// 1-based line number of the failed read, `None` if the file could
    /// not be opened.
    pub line: Option<u64>,
    /// Underlying I/O or decoding error.
    #[source]
    pub source: io::Error,
}

/// Errors that abort a generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// A rule line failed to parse.
    #[error("{origin}:{line}:{column}", column = .source.column())]
    RuleSyntax {
        /// Rule file path, or `<config>` for inline rules.
        origin: String,
        /// 1-based line number within the origin.
        line: u64,
        /// The parse error.
        #[source]
        source: RuleSyntaxError,
    },

    /// A rule file or directory could not be read.
    #[error("cannot read rules {}", .path.display())]
    RuleSource {
        /// Path of the rule file or directory.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The word source failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Writing candidates to the sink failed.
    #[error("cannot write candidates")]
    Sink(#[source] io::Error),

    /// The worker pool could not be started.
    #[error("cannot start worker pool")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Render `err` followed by its causes, `: `-separated.
#[cfg(test)]
pub(crate) fn render_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut cause = err.source();
    while let Some(err) = cause {
        text.push_str(": ");
        text.push_str(&err.to_string());
        cause = err.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_syntax_names_origin_line_and_column() {
        let err = GenerateError::RuleSyntax {
            origin: "rules/b.rule".to_string(),
            line: 3,
            source: cbwg_rules::parse_rule("$1w").unwrap_err(),
        };
        insta::assert_snapshot!(
            render_chain(&err),
            @"rules/b.rule:3:3: unknown rule function 'w' at column 3"
        );
    }

    #[test]
    fn source_error_names_origin_and_line() {
        let err = SourceError {
            origin: PathBuf::from("words.txt"),
            line: Some(7),
            source: io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8"),
        };
        insta::assert_snapshot!(
            render_chain(&err),
            @"words.txt:7: stream did not contain valid UTF-8"
        );
    }

    #[test]
    fn open_failure_has_no_line() {
        let err = SourceError {
            origin: PathBuf::from("missing.txt"),
            line: None,
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        insta::assert_snapshot!(render_chain(&err), @"missing.txt: no such file");
    }

    #[test]
    fn causes_are_rendered_once() {
        let err = GenerateError::Sink(io::Error::new(io::ErrorKind::BrokenPipe, "disk full"));
        insta::assert_snapshot!(render_chain(&err), @"cannot write candidates: disk full");

        let err = GenerateError::Source(SourceError {
            origin: PathBuf::from("seeds.txt"),
            line: Some(2),
            source: io::Error::new(io::ErrorKind::InvalidData, "bad bytes"),
        });
        insta::assert_snapshot!(render_chain(&err), @"seeds.txt:2: bad bytes");
    }

    #[test]
    fn config_error_messages() {
        insta::assert_snapshot!(
            ConfigError::InvertedBounds { min: 8, max: 4 }.to_string(),
            @"min_length (8) is greater than max_length (4)"
        );
    }
}
