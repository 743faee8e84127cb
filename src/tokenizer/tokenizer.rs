use crate::config::TokenizerConfig;
use crate::models::TermFrequencies;

/// Splits raw file contents into index terms.
///
/// Text is broken on every run of characters outside `[A-Za-z0-9_]`.
/// A candidate survives only if it is made of ASCII letters and digits
/// exclusively (so tokens containing underscores are discarded) and
/// meets the configured minimum length. Surviving tokens are lowercased
/// when `lowercase` is set.
#[derive(Clone, Debug)]
pub struct Tokenizer {
    lowercase: bool,
    min_token_length: usize,
}

impl Tokenizer {
    pub fn new(config: &TokenizerConfig) -> Self {
        Self {
            lowercase: config.lowercase,
            min_token_length: config.min_token_length,
        }
    }

    /// Tokenize `text` into the terms that would be indexed, in order
    /// of appearance.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .filter(|token| self.accepts(token))
            .map(|token| {
                if self.lowercase {
                    token.to_ascii_lowercase()
                } else {
                    token.to_string()
                }
            })
            .collect()
    }

    /// Tokenize `text` and count occurrences per term.
    pub fn compute_term_frequencies(&self, text: &str) -> TermFrequencies {
        let mut frequencies = TermFrequencies::new();
        for term in self.tokenize(text) {
            *frequencies.entry(term).or_insert(0) += 1;
        }
        frequencies
    }

    fn accepts(&self, token: &str) -> bool {
        // Consecutive separators yield empty splits; drop them even when
        // the configured minimum length is zero
        !token.is_empty()
            && token.len() >= self.min_token_length
            && token.chars().all(|c| c.is_ascii_alphanumeric())
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(&TokenizerConfig::default())
    }
}
