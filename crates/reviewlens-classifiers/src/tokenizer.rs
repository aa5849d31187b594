//! Word tokenizer used by the TF-IDF vectorizer

use regex::Regex;
use std::sync::OnceLock;

/// Two or more Unicode word characters between word boundaries
const TOKEN_PATTERN: &str = r"\b\w\w+\b";

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TOKEN_PATTERN).expect("token pattern is a valid regex"))
}

/// Split text into word tokens.
///
/// Single-character words and punctuation are discarded.
#[derive(Debug, Clone, Copy)]
pub struct WordTokenizer {
    lowercase: bool,
}

impl Default for WordTokenizer {
    fn default() -> Self {
        Self { lowercase: true }
    }
}

impl WordTokenizer {
    pub fn new(lowercase: bool) -> Self {
        Self { lowercase }
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        if self.lowercase {
            let lowered = text.to_lowercase();
            Self::matches(&lowered)
        } else {
            Self::matches(text)
        }
    }

    fn matches(text: &str) -> Vec<String> {
        token_regex()
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_drops_short_tokens_and_punctuation() {
        let tokens = WordTokenizer::default().tokenize("A great, GREAT stay! 10/10 x");
        assert_eq!(tokens, vec!["great", "great", "stay", "10", "10"]);
    }

    #[test]
    fn test_tokenize_unicode() {
        let tokens = WordTokenizer::default().tokenize("Très propre. Schön!");
        assert_eq!(tokens, vec!["très", "propre", "schön"]);
    }

    #[test]
    fn test_tokenize_preserves_case_when_asked() {
        let tokens = WordTokenizer::new(false).tokenize("Nice Room");
        assert_eq!(tokens, vec!["Nice", "Room"]);
    }
}
