//! Candidate filter: a pure acceptance predicate over generated candidates.

use std::collections::HashSet;

use regex::Regex;

use crate::config::FilterConfig;
use crate::error::ConfigError;

/// Compiled form of a [`FilterConfig`].
///
/// Every check is independent and all must pass. The filter is read-only
/// after construction and shared by reference across workers.
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<Regex>,
    include_numbers: bool,
    preserve_case: bool,
    exclude_words: HashSet<String>,
}

impl CandidateFilter {
    /// Compile `config`. The pattern is anchored at both ends.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvertedBounds`] or [`ConfigError::InvalidPattern`].
    pub fn new(config: &FilterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let pattern = config
            .pattern
            .as_deref()
            .map(|pattern| Regex::new(&format!("^(?:{pattern})$")))
            .transpose()?;
        let exclude_words = config
            .exclude_words
            .iter()
            .map(|word| fold(word, config.preserve_case))
            .collect();
        Ok(Self {
            min_length: config.min_length,
            max_length: config.max_length,
            pattern,
            include_numbers: config.include_numbers,
            preserve_case: config.preserve_case,
            exclude_words,
        })
    }

    /// A filter that accepts everything.
    #[must_use]
    pub fn accept_all() -> Self {
        Self {
            min_length: None,
            max_length: None,
            pattern: None,
            include_numbers: false,
            preserve_case: false,
            exclude_words: HashSet::new(),
        }
    }

    /// Whether `candidate` passes every configured check.
    #[must_use]
    pub fn accept(&self, candidate: &str) -> bool {
        if self.min_length.is_some() || self.max_length.is_some() {
            let len = candidate.chars().count();
            if self.min_length.is_some_and(|min| len < min)
                || self.max_length.is_some_and(|max| len > max)
            {
                return false;
            }
        }
        if self.include_numbers && !candidate.bytes().any(|b| b.is_ascii_digit()) {
            return false;
        }
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(candidate) {
                return false;
            }
        }
        if !self.exclude_words.is_empty()
            && self
                .exclude_words
                .contains(fold(candidate, self.preserve_case).as_str())
        {
            return false;
        }
        true
    }
}

impl Default for CandidateFilter {
    fn default() -> Self {
        Self::accept_all()
    }
}

fn fold(word: &str, preserve_case: bool) -> String {
    if preserve_case {
        word.to_owned()
    } else {
        word.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(config: FilterConfig) -> CandidateFilter {
        CandidateFilter::new(&config).unwrap()
    }

    #[test]
    fn default_accepts_everything() {
        let f = CandidateFilter::default();
        for candidate in ["", "a", "Password1", "ünïcödé"] {
            assert!(f.accept(candidate));
        }
    }

    #[test]
    fn length_bounds_are_inclusive() {
        let f = filter(FilterConfig {
            min_length: Some(3),
            max_length: Some(5),
            ..FilterConfig::default()
        });
        assert!(!f.accept("ab"));
        assert!(f.accept("abc"));
        assert!(f.accept("abcde"));
        assert!(!f.accept("abcdef"));
    }

    #[test]
    fn length_counts_characters() {
        let f = filter(FilterConfig {
            max_length: Some(4),
            ..FilterConfig::default()
        });
        assert!(f.accept("éèêë"));
    }

    #[test]
    fn pattern_must_match_whole_candidate() {
        let f = filter(FilterConfig {
            pattern: Some("[a-z]+".to_string()),
            ..FilterConfig::default()
        });
        assert!(f.accept("password"));
        assert!(!f.accept("password1"));
        assert!(!f.accept("1password"));
    }

    #[test]
    fn pattern_alternation_is_anchored_as_a_group() {
        let f = filter(FilterConfig {
            pattern: Some("ab|cd".to_string()),
            ..FilterConfig::default()
        });
        assert!(f.accept("ab"));
        assert!(f.accept("cd"));
        assert!(!f.accept("abx"));
        assert!(!f.accept("xcd"));
    }

    #[test]
    fn include_numbers_requires_a_digit() {
        let f = filter(FilterConfig {
            include_numbers: true,
            ..FilterConfig::default()
        });
        assert!(!f.accept("password"));
        assert!(f.accept("passw0rd"));
        assert!(!f.accept("pass٣"));
    }

    #[test]
    fn exclusion_folds_case_by_default() {
        let f = filter(FilterConfig {
            exclude_words: vec!["Password1".to_string()],
            ..FilterConfig::default()
        });
        assert!(!f.accept("password1"));
        assert!(!f.accept("PASSWORD1"));
        assert!(f.accept("password2"));
    }

    #[test]
    fn exclusion_with_preserved_case_is_exact() {
        let f = filter(FilterConfig {
            exclude_words: vec!["Password1".to_string()],
            preserve_case: true,
            ..FilterConfig::default()
        });
        assert!(!f.accept("Password1"));
        assert!(f.accept("password1"));
    }

    #[test]
    fn checks_are_conjunctive() {
        let f = filter(FilterConfig {
            min_length: Some(6),
            exclude_words: vec!["password1".to_string()],
            ..FilterConfig::default()
        });
        assert!(!f.accept("Password1"));
        assert!(f.accept("PASSWORD"));
        assert!(f.accept("Password"));
        assert!(!f.accept("Pass"));
    }

    #[test]
    fn invalid_configuration_rejected() {
        let err = CandidateFilter::new(&FilterConfig {
            pattern: Some("(".to_string()),
            ..FilterConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern(_)));

        let err = CandidateFilter::new(&FilterConfig {
            min_length: Some(5),
            max_length: Some(4),
            ..FilterConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvertedBounds { .. }));
    }
}
