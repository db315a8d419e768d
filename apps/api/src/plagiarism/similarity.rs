//! Similarity Engine — compares one submission against every other stored submission.
//!
//! Algorithm:
//! 1. Lowercase the text and split it into sentences at `.`, `!` or `?` followed by whitespace.
//! 2. Collapse the sentences into a set (duplicates count once).
//! 3. score = ⌊ |A ∩ B| / |A ∪ B| × 100 ⌋, or 0 when both sets are empty.
//! 4. Keep candidates with score ≥ threshold; report the best one (or all, ranked).
//!
//! Stateless: callers pass the store snapshot, nothing is cached between calls.

use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::submission::Submission;

/// Texts shorter than this many characters are not comparable.
pub const MIN_COMPARABLE_CHARS: usize = 50;

/// Terminal punctuation followed by the whitespace run that ends a sentence.
/// `\s` is Unicode White_Space, which leaves out the U+001C–U+001F separators,
/// so they are listed explicitly.
static SENTENCE_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[.!?][\s\x1C-\x1F]+").expect("sentence boundary pattern is valid")
});

/// Whitespace for trimming: White_Space plus the U+001C–U+001F separators.
fn is_space(c: char) -> bool {
    c.is_whitespace() || ('\u{1C}'..='\u{1F}').contains(&c)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimilarityError {
    #[error("no submission found for roll number '{roll_no}'")]
    NotFound { roll_no: String },

    #[error(
        "submission '{roll_no}' has {length} characters of text, at least {minimum} are needed to compare"
    )]
    InsufficientText {
        roll_no: String,
        length: usize,
        minimum: usize,
    },

    #[error("threshold {0} is outside 0–100")]
    InvalidThreshold(u32),
}

/// How many qualifying matches a comparison reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Only the highest-scoring match; the first one in store order wins ties.
    #[default]
    Best,
    /// Every match at or above the threshold, highest score first.
    Ranked,
}

impl std::str::FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best" => Ok(MatchMode::Best),
            "ranked" => Ok(MatchMode::Ranked),
            other => Err(format!("unknown match mode '{other}' (expected 'best' or 'ranked')")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarityMatch {
    pub roll_no: String,
    pub name: String,
    pub score: u32, // 0 – 100
}

/// Result of a completed comparison. `NoMatch` is a successful empty result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Comparison {
    BestMatch {
        #[serde(rename = "match")]
        best: SimilarityMatch,
    },
    Ranked {
        matches: Vec<SimilarityMatch>,
    },
    NoMatch,
}

/// Splits text into trimmed, non-empty sentence fragments.
/// Terminal punctuation stays attached to its sentence.
pub fn split_into_sentences(text: &str) -> Vec<&str> {
    let text = text.trim_matches(is_space);
    let mut sentences = Vec::new();
    let mut start = 0;

    for boundary in SENTENCE_BOUNDARY.find_iter(text) {
        // The punctuation mark is a single ASCII byte.
        sentences.push(&text[start..boundary.start() + 1]);
        start = boundary.end();
    }
    sentences.push(&text[start..]);

    sentences
        .into_iter()
        .map(|s| s.trim_matches(is_space))
        .filter(|s| !s.is_empty())
        .collect()
}

/// The set of unique lowercase sentences in `text`.
pub fn sentence_set(text: &str) -> HashSet<String> {
    split_into_sentences(&text.to_lowercase())
        .into_iter()
        .map(String::from)
        .collect()
}

/// Jaccard index of two sentence sets as a truncated integer percentage.
pub fn similarity_percent(a: &HashSet<String>, b: &HashSet<String>) -> u32 {
    let union = a.union(b).count();
    if union == 0 {
        return 0;
    }
    let intersection = a.intersection(b).count();
    let jaccard = intersection as f64 / union as f64;
    (jaccard * 100.0) as u32
}

/// Compares the submission for `target_roll_no` against every submission with a
/// different roll number.
///
/// Roll numbers are compared with surrounding whitespace trimmed on both sides.
/// The target is the first submission in store order with that roll number.
/// Candidates below [`MIN_COMPARABLE_CHARS`] are skipped, not scored.
pub fn compare(
    submissions: &[Submission],
    target_roll_no: &str,
    threshold: u32,
    mode: MatchMode,
) -> Result<Comparison, SimilarityError> {
    if threshold > 100 {
        return Err(SimilarityError::InvalidThreshold(threshold));
    }

    let target_roll_no = target_roll_no.trim();
    let target = submissions
        .iter()
        .find(|s| s.roll_no.trim() == target_roll_no)
        .ok_or_else(|| SimilarityError::NotFound {
            roll_no: target_roll_no.to_string(),
        })?;

    let length = target.text_len();
    if length < MIN_COMPARABLE_CHARS {
        return Err(SimilarityError::InsufficientText {
            roll_no: target_roll_no.to_string(),
            length,
            minimum: MIN_COMPARABLE_CHARS,
        });
    }

    let target_set = sentence_set(&target.extracted_text);

    let mut matches: Vec<SimilarityMatch> = submissions
        .iter()
        .filter(|s| s.roll_no.trim() != target_roll_no)
        .filter(|s| s.text_len() >= MIN_COMPARABLE_CHARS)
        .map(|s| SimilarityMatch {
            roll_no: s.roll_no.clone(),
            name: s.name.clone(),
            score: similarity_percent(&target_set, &sentence_set(&s.extracted_text)),
        })
        .filter(|m| m.score >= threshold)
        .collect();

    Ok(match mode {
        MatchMode::Best => matches
            .into_iter()
            .reduce(|best, candidate| {
                if candidate.score > best.score {
                    candidate
                } else {
                    best
                }
            })
            .map_or(Comparison::NoMatch, |best| Comparison::BestMatch { best }),
        MatchMode::Ranked if matches.is_empty() => Comparison::NoMatch,
        MatchMode::Ranked => {
            // Stable: equal scores keep store order.
            matches.sort_by(|a, b| b.score.cmp(&a.score));
            Comparison::Ranked { matches }
        }
    })
}

/// Sorted, de-duplicated roll numbers present in the store.
pub fn roster(submissions: &[Submission]) -> Vec<String> {
    submissions
        .iter()
        .map(|s| s.roll_no.trim().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
