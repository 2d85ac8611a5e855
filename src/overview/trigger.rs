//! AI-overview trigger decision.
//!
//! Combines the statistical intent classifier with structural heuristics
//! computed from the token sequence. The heuristics act as a precision
//! guard: the classifier is trained on a small corpus and over-triggers
//! on short or borderline queries if trusted alone.

use super::classifier::{Intent, IntentClassifier, TRAINING_CORPUS};
use super::tokenize::{detect_language, Language, QueryTokenizer};
use crate::error::Result;

/// Common question words, per language.
const QUESTION_WORDS_EN: &[&str] = &[
    "what", "how", "why", "when", "where", "which", "who", "whom", "whose", "can", "should", "is",
    "are", "do", "does", "will", "would",
];
const QUESTION_WORDS_ZH: &[&str] = &[
    "什么", "如何", "为什么", "何时", "哪里", "哪个", "谁", "谁的", "能否", "可以", "是",
    "有没有", "将", "会", "是否",
];

/// Navigation terms (both languages, one set).
const NAVIGATION_KEYWORDS: &[&str] = &[
    "官网", "登录", "下载", "安装", "注册", "地址", "网址", "官方", "访问", "前往", "official",
    "site", "login", "download", "register", "url", "access", "go to", "open", "app",
];

/// Realtime terms (both languages, one set); year tokens are matched
/// separately.
const REALTIME_KEYWORDS: &[&str] = &[
    "最新", "今天", "现在", "实时", "数据", "更新", "新闻", "行情", "价格", "current", "today",
    "latest", "real-time", "news", "price", "update", "year", "month", "day",
];

/// Structural features of a tokenized query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryStructure {
    /// Token count after segmentation.
    pub word_count: usize,
    /// Whether any token is a question word for the detected language.
    pub has_question_word: bool,
    /// Token count of at least 5.
    pub is_long_sentence: bool,
    /// Whether any token is a navigation term. Computed but not consulted
    /// by the decision table.
    pub has_nav_keyword: bool,
    /// Whether any token is a realtime term or a year. Computed but not
    /// consulted by the decision table.
    pub has_realtime_keyword: bool,
}

/// Outcome of the trigger decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerDecision {
    /// Whether to launch an AI overview for this query.
    pub trigger: bool,
    /// Human-readable explanation of the decision.
    pub reason: String,
}

/// The combined statistical + heuristic trigger.
///
/// Construction tokenizes the built-in corpus and trains the classifier,
/// so build once at startup and reuse.
pub struct OverviewTrigger {
    tokenizer: QueryTokenizer,
    classifier: IntentClassifier,
}

impl OverviewTrigger {
    /// Build the trigger, training the classifier on the built-in corpus.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::SearchError::Classifier`] if the classifier
    /// cannot be trained.
    pub fn new() -> Result<Self> {
        let tokenizer = QueryTokenizer::new();
        let classifier = IntentClassifier::train(
            TRAINING_CORPUS
                .iter()
                .map(|(text, intent)| (tokenizer.tokenize(text), *intent)),
        )?;
        tracing::debug!(
            samples = TRAINING_CORPUS.len(),
            "trigger classifier trained"
        );
        Ok(Self {
            tokenizer,
            classifier,
        })
    }

    /// Decide whether the query should launch an AI overview.
    ///
    /// Deterministic and infallible; an empty query never triggers.
    pub fn decide(&self, query: &str) -> TriggerDecision {
        let tokens = self.tokenizer.tokenize(query);
        let intent = self.classifier.classify(&tokens);
        let structure = self.analyze_structure(query);
        let complex = is_complex_information_query(&tokens);

        match intent {
            Intent::Navigation | Intent::Realtime | Intent::Commercial => TriggerDecision {
                trigger: false,
                reason: format!(
                    "query classified as {} intent, not an information query",
                    intent.label()
                ),
            },
            Intent::Information => {
                if structure.is_long_sentence && structure.has_question_word && complex {
                    TriggerDecision {
                        trigger: true,
                        reason: "information intent: long question with complex structure".into(),
                    }
                } else if structure.has_question_word || complex {
                    TriggerDecision {
                        trigger: true,
                        reason: "information intent with a question word or base complexity"
                            .into(),
                    }
                } else {
                    TriggerDecision {
                        trigger: false,
                        reason: format!(
                            "information intent but too simple ({} tokens)",
                            structure.word_count
                        ),
                    }
                }
            }
        }
    }

    /// Compute the structural features of a query.
    pub fn analyze_structure(&self, query: &str) -> QueryStructure {
        let tokens = self.tokenizer.tokenize(query);
        let question_words = match detect_language(query) {
            Language::Zh => QUESTION_WORDS_ZH,
            Language::En => QUESTION_WORDS_EN,
        };

        QueryStructure {
            word_count: tokens.len(),
            has_question_word: tokens
                .iter()
                .any(|t| question_words.contains(&t.to_lowercase().as_str())),
            is_long_sentence: tokens.len() >= 5,
            has_nav_keyword: tokens
                .iter()
                .any(|t| NAVIGATION_KEYWORDS.contains(&t.to_lowercase().as_str())),
            has_realtime_keyword: tokens.iter().any(|t| {
                REALTIME_KEYWORDS.contains(&t.to_lowercase().as_str()) || is_year_token(t)
            }),
        }
    }
}

/// Whether the token sequence counts as a complex information query.
///
/// Fewer than 3 tokens is never complex. Otherwise the sequence must have
/// at least 4 tokens and yield at least 2 bigrams or 1 trigram — which any
/// 4-token sequence does, so in practice this is a token-count threshold.
/// Preserved as documented.
fn is_complex_information_query(tokens: &[String]) -> bool {
    if tokens.len() < 3 {
        return false;
    }
    let bigrams = tokens.len().saturating_sub(1);
    let trigrams = tokens.len().saturating_sub(2);
    tokens.len() >= 4 && (bigrams >= 2 || trigrams >= 1)
}

/// Matches bare `YYYY` and Chinese `YYYY年` year tokens.
fn is_year_token(token: &str) -> bool {
    let digits = token.strip_suffix('年').unwrap_or(token);
    digits.len() == 4
        && digits.chars().all(|c| c.is_ascii_digit())
        && (token.len() == 4 || token.ends_with('年'))
}
