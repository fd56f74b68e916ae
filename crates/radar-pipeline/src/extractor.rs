//! Demand extraction: phrase patterns, text normalization, keywords,
//! categorization. Pure: no storage, no network.

use std::collections::HashSet;

use regex::Regex;

use crate::types::DemandCandidate;

/// Built-in need-phrase patterns, English plus Chinese equivalents.
///
/// Group 1, when present, captures the demand clause; patterns without a
/// capture group contribute the whole match. Order matters only for which
/// duplicate survives dedup (first wins).
const BUILTIN_PATTERNS: &[&str] = &[
    r"(?i)\bi need a (?:tool|app|service) (?:that|to|for|which) ([^.!?\n]+)",
    r"(?i)\blooking for a (?:tool|app|service) (?:that|to|for|which) ([^.!?\n]+)",
    r"(?i)\bis there a (?:tool|app|service) (?:that|to|for|which) ([^.!?\n]+)",
    r"(?i)\bdoes anyone know (?:of )?a (?:tool|app|service) (?:that|to|for|which) ([^.!?\n]+)",
    r"(?i)\bi wish there (?:was|were) (?:a|an|some) ([^.!?\n]+)",
    r"(?i)\bcan anyone recommend (?:a|an) ([^.!?\n]+)",
    r"(?i)\bsomebody (?:should )?make (?:a|an) ([^.!?\n]+)",
    r"求一个(?:能|可以)?([^。！？!?\n]+?)的工具",
    r"有没有(?:什么)?(?:工具|软件|应用)(?:能|可以)([^。！？!?\n]+)",
    r"谁知道(?:有什么|哪个)(?:工具|软件)(?:能|可以)([^。！？!?\n]+)",
];

/// English and Chinese function words dropped during keyword extraction.
/// Tokens of two characters or fewer are dropped regardless, so only
/// longer words need listing.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "that", "this", "these", "those", "with", "from", "into", "can", "could",
    "will", "would", "should", "may", "might", "must", "have", "has", "had", "does", "did", "not",
    "are", "was", "were", "been", "being", "you", "your", "our", "their", "they", "them", "its",
    "all", "any", "some", "than", "then", "too", "very", "just", "about", "like", "want", "need",
    "tool", "app", "service", "something", "anything", "的", "一个", "什么", "可以", "能够", "工具",
];

/// Keyword → category table. The first category whose term set intersects
/// the keyword list wins.
const CATEGORIES: &[(&str, &[&str])] = &[
    ("email", &["email", "emails", "newsletter", "smtp", "inbox", "mailing"]),
    (
        "finance",
        &[
            "expense", "expenses", "budget", "budgeting", "invoice", "invoices", "payment",
            "payments", "accounting", "money", "记账",
        ],
    ),
    (
        "productivity",
        &[
            "todo", "todos", "task", "tasks", "notes", "calendar", "schedule", "scheduling",
            "reminder", "reminders", "habit", "habits", "日程",
        ],
    ),
    (
        "data",
        &[
            "scrape", "scraper", "scraping", "csv", "excel", "spreadsheet", "data", "export",
            "exports", "数据",
        ],
    ),
    (
        "media",
        &[
            "video", "videos", "image", "images", "photo", "photos", "audio", "podcast",
            "podcasts", "视频", "图片",
        ],
    ),
    (
        "developer",
        &["api", "apis", "code", "deploy", "deployment", "debug", "git", "webhook", "webhooks"],
    ),
    (
        "social",
        &["twitter", "instagram", "social", "followers", "tiktok", "社交"],
    ),
    (
        "ai",
        &[
            "gpt", "llm", "chatbot", "chatbots", "summarize", "summarizes", "transcribe",
            "transcribes",
        ],
    ),
];

const MAX_KEYWORDS: usize = 10;
const MIN_KEYWORD_CHARS: usize = 3;

/// Phrase-pattern demand extractor.
///
/// Holds an immutable list of precompiled patterns; construct once and
/// reuse. `extract` is deterministic and side-effect-free.
pub struct DemandExtractor {
    patterns: Vec<Regex>,
}

impl DemandExtractor {
    /// Build an extractor with the built-in pattern set.
    ///
    /// # Panics
    ///
    /// Panics if a built-in pattern fails to compile; the set is fixed and
    /// covered by tests, so this cannot happen at runtime.
    #[must_use]
    pub fn new() -> Self {
        let patterns = BUILTIN_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("built-in demand pattern must compile"))
            .collect();
        Self { patterns }
    }

    /// Build an extractor from caller-supplied precompiled patterns.
    #[must_use]
    pub fn with_patterns(patterns: Vec<Regex>) -> Self {
        Self { patterns }
    }

    /// Extract candidate demands from `text`.
    ///
    /// Every non-overlapping match of every pattern is considered; the
    /// captured clause (or whole match when a pattern has no group 1)
    /// becomes the candidate. Candidates are deduplicated by normalized
    /// text within this call; the first match for a given form wins.
    #[must_use]
    pub fn extract(&self, text: &str) -> Vec<DemandCandidate> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut candidates = Vec::new();

        for pattern in &self.patterns {
            for caps in pattern.captures_iter(text) {
                let Some(m) = caps.get(1).or_else(|| caps.get(0)) else {
                    continue;
                };
                let matched_text = m.as_str().trim();
                if matched_text.is_empty() {
                    continue;
                }

                let normalized_text = normalize_text(matched_text);
                if normalized_text.is_empty() || !seen.insert(normalized_text.clone()) {
                    continue;
                }

                let keywords = extract_keywords(&normalized_text);
                let category = categorize(&keywords);

                candidates.push(DemandCandidate {
                    matched_text: matched_text.to_string(),
                    normalized_text,
                    keywords,
                    category,
                });
            }
        }

        candidates
    }
}

impl Default for DemandExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize a demand clause: lowercase, keep only alphanumeric and
/// whitespace characters, collapse whitespace runs to single spaces.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut stripped = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        if c.is_alphanumeric() {
            stripped.push(c);
        } else if c.is_whitespace() {
            stripped.push(' ');
        }
    }
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keywords from normalized text: stop-words removed, tokens longer than
/// two characters, at most [`MAX_KEYWORDS`], original order.
#[must_use]
pub fn extract_keywords(normalized_text: &str) -> Vec<String> {
    normalized_text
        .split_whitespace()
        .filter(|token| token.chars().count() >= MIN_KEYWORD_CHARS)
        .filter(|token| !STOP_WORDS.contains(token))
        .take(MAX_KEYWORDS)
        .map(ToString::to_string)
        .collect()
}

/// First category whose term set intersects the keyword list; `None` when
/// nothing matches.
#[must_use]
pub fn categorize(keywords: &[String]) -> Option<String> {
    for (category, terms) in CATEGORIES {
        if keywords.iter().any(|k| terms.contains(&k.as_str())) {
            return Some((*category).to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_patterns_compile() {
        let extractor = DemandExtractor::new();
        assert_eq!(extractor.patterns.len(), BUILTIN_PATTERNS.len());
    }

    #[test]
    fn extracts_simple_need_phrase() {
        let extractor = DemandExtractor::new();
        let candidates = extractor.extract("I need a tool that tracks expenses.");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].matched_text, "tracks expenses");
        assert_eq!(candidates[0].normalized_text, "tracks expenses");
        assert_eq!(candidates[0].keywords, vec!["tracks", "expenses"]);
        assert_eq!(candidates[0].category.as_deref(), Some("finance"));
    }

    #[test]
    fn duplicate_phrases_yield_one_candidate() {
        let extractor = DemandExtractor::new();
        let candidates = extractor
            .extract("I need a tool that tracks expenses. I need a tool that tracks expenses.");
        assert_eq!(candidates.len(), 1, "dedup by normalized text failed");
        assert_eq!(candidates[0].normalized_text, "tracks expenses");
    }

    #[test]
    fn dedup_spans_different_patterns() {
        let extractor = DemandExtractor::new();
        let text = "I need a tool that tracks expenses. Looking for a tool that tracks EXPENSES!";
        let candidates = extractor.extract(text);
        assert_eq!(candidates.len(), 1);
        // First match wins.
        assert_eq!(candidates[0].matched_text, "tracks expenses");
    }

    #[test]
    fn distinct_phrases_yield_distinct_candidates() {
        let extractor = DemandExtractor::new();
        let text =
            "I need a tool that tracks expenses. Is there a tool that summarizes long PDFs?";
        let candidates = extractor.extract(text);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].normalized_text, "tracks expenses");
        assert_eq!(candidates[1].normalized_text, "summarizes long pdfs");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let extractor = DemandExtractor::new();
        let candidates = extractor.extract("LOOKING FOR A TOOL TO merge calendars");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].normalized_text, "merge calendars");
    }

    #[test]
    fn chinese_pattern_matches() {
        let extractor = DemandExtractor::new();
        let candidates = extractor.extract("求一个能自动记账的工具，最好免费。");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].normalized_text, "自动记账");
    }

    #[test]
    fn no_match_returns_empty() {
        let extractor = DemandExtractor::new();
        assert!(extractor.extract("just chatting about the weather").is_empty());
        assert!(extractor.extract("").is_empty());
    }

    #[test]
    fn extraction_is_deterministic() {
        let extractor = DemandExtractor::new();
        let text = "I need a tool that tracks expenses. I wish there was a better inbox.";
        let first = extractor.extract(text);
        let second = extractor.extract(text);
        assert_eq!(first, second);
    }

    #[test]
    fn normalize_strips_punctuation_and_collapses_whitespace() {
        assert_eq!(
            normalize_text("  Tracks,   EXPENSES!!  (monthly)  "),
            "tracks expenses monthly"
        );
    }

    #[test]
    fn normalize_keeps_unicode_alphanumerics() {
        assert_eq!(normalize_text("自动记账！"), "自动记账");
    }

    #[test]
    fn normalize_empty_input() {
        assert_eq!(normalize_text("?!,."), "");
    }

    #[test]
    fn keywords_drop_stop_words_and_short_tokens() {
        let keywords = extract_keywords("syncs my notes to the cloud");
        assert_eq!(keywords, vec!["syncs", "notes", "cloud"]);
    }

    #[test]
    fn keywords_cap_at_ten() {
        let text = "alpha beta gamma delta epsilon zeta theta iota kappa lambda omicron sigma";
        assert_eq!(extract_keywords(text).len(), 10);
    }

    #[test]
    fn keywords_preserve_original_order() {
        let keywords = extract_keywords("converts audio files offline");
        assert_eq!(keywords, vec!["converts", "audio", "files", "offline"]);
    }

    #[test]
    fn categorize_first_match_wins() {
        // "newsletter" (email) appears before "expenses" (finance) in the table.
        let keywords = vec!["expenses".to_string(), "newsletter".to_string()];
        assert_eq!(categorize(&keywords).as_deref(), Some("email"));
    }

    #[test]
    fn categorize_no_match_is_none() {
        let keywords = vec!["gardening".to_string()];
        assert_eq!(categorize(&keywords), None);
    }
}
