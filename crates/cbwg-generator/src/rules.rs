//! Rule loading: rule files, rule directories and inline rules.
//!
//! All rules are parsed before any word is processed, so a malformed line
//! fails the run with its origin and line number and nothing is written.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use cbwg_rules::{is_skippable, parse_rule, parse_rule_bytes, Program};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{ConfigError, GenerateError};

/// Origin label for rules given inline in configuration.
pub const INLINE_ORIGIN: &str = "<config>";

/// Extension of rule files picked up from a rules directory.
pub const RULE_FILE_EXTENSION: &str = "rule";

/// An ordered set of parsed rule programs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    programs: Vec<Program>,
}

impl RuleSet {
    /// Load every rule named by `config`: the rules path first, then
    /// inline rules.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoRules`] when neither source is set,
    /// [`GenerateError::RuleSource`] when a rule file cannot be read and
    /// [`GenerateError::RuleSyntax`] for the first malformed line.
    pub fn load(config: &EngineConfig) -> Result<Self, GenerateError> {
        if !config.has_rules() {
            return Err(ConfigError::NoRules.into());
        }
        let mut set = Self::default();
        if let Some(path) = &config.rules_path {
            set.extend_from_path(path)?;
        }
        set.extend_from_lines(INLINE_ORIGIN, &config.rules)?;
        Ok(set)
    }

    /// Parse rules from a file, or from every `*.rule` file of a directory
    /// in lexicographic order.
    ///
    /// # Errors
    ///
    /// See [`RuleSet::load`].
    pub fn from_path(path: &Path) -> Result<Self, GenerateError> {
        let mut set = Self::default();
        set.extend_from_path(path)?;
        Ok(set)
    }

    /// Parse rule lines from an in-memory list.
    ///
    /// # Errors
    ///
    /// [`GenerateError::RuleSyntax`] for the first malformed line.
    pub fn from_lines<S: AsRef<str>>(origin: &str, lines: &[S]) -> Result<Self, GenerateError> {
        let mut set = Self::default();
        set.extend_from_lines(origin, lines)?;
        Ok(set)
    }

    /// The parsed programs, in load order.
    #[must_use]
    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    fn extend_from_path(&mut self, path: &Path) -> Result<(), GenerateError> {
        let source_error = |source| GenerateError::RuleSource {
            path: path.to_path_buf(),
            source,
        };
        if fs::metadata(path).map_err(source_error)?.is_dir() {
            for file in rule_files(path).map_err(source_error)? {
                self.extend_from_file(&file)?;
            }
        } else {
            self.extend_from_file(path)?;
        }
        Ok(())
    }

    fn extend_from_file(&mut self, path: &Path) -> Result<(), GenerateError> {
        let source_error = |source| GenerateError::RuleSource {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = BufReader::new(File::open(path).map_err(source_error)?);
        let origin = path.display().to_string();
        let before = self.programs.len();
        let mut buf = Vec::new();
        let mut line: u64 = 0;
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).map_err(source_error)? == 0 {
                break;
            }
            line = line.saturating_add(1);
            strip_line_ending(&mut buf);
            // Invalid UTF-8 surfaces as a syntax error on the line.
            if std::str::from_utf8(&buf).is_ok_and(is_skippable) {
                continue;
            }
            let program = parse_rule_bytes(&buf).map_err(|source| GenerateError::RuleSyntax {
                origin: origin.clone(),
                line,
                source,
            })?;
            self.programs.push(program);
        }
        debug!(
            path = %origin,
            rules = self.programs.len().saturating_sub(before),
            "loaded rule file"
        );
        Ok(())
    }

    fn extend_from_lines<S: AsRef<str>>(
        &mut self,
        origin: &str,
        lines: &[S],
    ) -> Result<(), GenerateError> {
        let mut line: u64 = 0;
        for text in lines {
            line = line.saturating_add(1);
            let text = text.as_ref();
            if is_skippable(text) {
                continue;
            }
            let program = parse_rule(text).map_err(|source| GenerateError::RuleSyntax {
                origin: origin.to_owned(),
                line,
                source,
            })?;
            self.programs.push(program);
        }
        Ok(())
    }
}

impl From<Vec<Program>> for RuleSet {
    fn from(programs: Vec<Program>) -> Self {
        Self { programs }
    }
}

/// `*.rule` files directly inside `dir`, sorted by path.
fn rule_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == RULE_FILE_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Drop a trailing `\n` and then a trailing `\r`. Other whitespace can be
/// a rule parameter and is kept.
fn strip_line_ending(buf: &mut Vec<u8>) {
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
}
