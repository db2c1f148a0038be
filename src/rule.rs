//! Models replacement rules and their validation.

use crate::error::{PatchError, Result};

/// A single length-preserving replacement.
///
/// A rule pairs the pattern to search for inside a window with the bytes
/// that overwrite it. Both sides of a constructed rule always have the same
/// length, so applying a rule never moves any other byte in the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// The byte sequence to search for.
    pattern: Vec<u8>,
    /// The byte sequence that overwrites a found pattern.
    replacement: Vec<u8>,
}

impl Rule {
    /// Creates a new rule, validating that it preserves the buffer length.
    pub fn new(pattern: impl Into<Vec<u8>>, replacement: impl Into<Vec<u8>>) -> Result<Rule> {
        let pattern = pattern.into();
        let replacement = replacement.into();

        if pattern.is_empty() {
            return Err(PatchError::EmptyRulePattern);
        }

        if pattern.len() != replacement.len() {
            return Err(PatchError::RuleLengthMismatch {
                pattern,
                replacement,
            });
        }

        Ok(Rule {
            pattern,
            replacement,
        })
    }

    /// Parses a rule from the command line `PATTERN=REPLACEMENT` syntax.
    ///
    /// The specification splits at the first `=`; both sides are taken as
    /// literal bytes.
    pub fn from_spec(spec: &str) -> Result<Rule> {
        let Some((pattern, replacement)) = spec.split_once('=') else {
            return Err(PatchError::InvalidRuleSpec {
                spec: spec.to_owned(),
            });
        };

        Rule::new(pattern.as_bytes(), replacement.as_bytes())
    }

    /// The byte sequence to search for.
    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    /// The byte sequence that overwrites a found pattern.
    pub fn replacement(&self) -> &[u8] {
        &self.replacement
    }
}
