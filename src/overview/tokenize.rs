//! Language-aware query tokenization.
//!
//! Queries containing CJK ideographs are segmented with the jieba
//! dictionary segmenter; everything else is split on non-alphanumeric
//! characters. The trigger classifier trains and classifies with this
//! same tokenizer so token spaces line up.

use jieba_rs::Jieba;

/// Detected query language, which selects the tokenizer and the
/// question-word set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    /// Contains CJK ideographs.
    Zh,
    /// Everything else.
    En,
}

/// Detect the query language: any CJK ideograph makes it Chinese.
pub fn detect_language(text: &str) -> Language {
    if text.chars().any(is_cjk) {
        Language::Zh
    } else {
        Language::En
    }
}

fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Tokenizer holding the loaded segmentation dictionary.
///
/// Construction loads the jieba dictionary, so build once at startup and
/// reuse.
pub struct QueryTokenizer {
    jieba: Jieba,
}

impl QueryTokenizer {
    /// Build a tokenizer with the default dictionary.
    pub fn new() -> Self {
        Self {
            jieba: Jieba::new(),
        }
    }

    /// Tokenize `text` according to its detected language.
    ///
    /// Whitespace-only tokens are discarded; an empty or all-whitespace
    /// input yields an empty sequence.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        match detect_language(text) {
            Language::Zh => self
                .jieba
                .cut(text, false)
                .into_iter()
                .map(str::to_string)
                .filter(|token| !token.trim().is_empty())
                .collect(),
            Language::En => text
                .split(|c: char| !c.is_alphanumeric())
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

impl Default for QueryTokenizer {
    fn default() -> Self {
        Self::new()
    }
}
