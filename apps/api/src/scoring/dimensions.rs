//! Dimension Scorers: structure, technical vocabulary, quantitative content, prose quality.
//!
//! Each scorer is a pure function of the normalized text (and the section detection for
//! the ones that need it) and returns a value in [0, 100]. Degenerate input, like empty
//! text or a guide without required sections, maps to a fixed neutral value instead of
//! an error.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::{Regex, RegexBuilder, RegexSet, RegexSetBuilder};

use crate::scoring::detector::SectionDetection;
use crate::scoring::vocabulary::{TECHNICAL_TERMS, TRANSITION_WORDS};

/// Structure score when the guide requires no sections.
pub const NEUTRAL_STRUCTURE_SCORE: f64 = 50.0;
/// Technical score when fewer than `MIN_TECHNICAL_TERMS` terms are found.
pub const TECHNICAL_FLOOR: f64 = 30.0;
pub const MIN_TECHNICAL_TERMS: usize = 3;
/// Mathematical score when no element is found.
pub const MATHEMATICAL_FLOOR: f64 = 10.0;
/// Readability when the text has no sentence or no word.
pub const NEUTRAL_READABILITY: f64 = 50.0;
/// Section count at which the coherence breadth component saturates.
const COHERENCE_SECTION_TARGET: f64 = 5.0;

static TECHNICAL_RE: OnceLock<(Regex, Vec<&'static str>)> = OnceLock::new();
static TRANSITION_SET: OnceLock<RegexSet> = OnceLock::new();
static INLINE_MATH_RE: OnceLock<Regex> = OnceLock::new();
static ASSIGNMENT_RE: OnceLock<Regex> = OnceLock::new();
static SENTENCE_END_RE: OnceLock<Regex> = OnceLock::new();

// ────────────────────────────────────────────────────────────────────────────
// Structure
// ────────────────────────────────────────────────────────────────────────────

/// detected required / required × 100, capped at 100.
pub fn structure_score(detection: &SectionDetection) -> f64 {
    if detection.required_total == 0 {
        return NEUTRAL_STRUCTURE_SCORE;
    }
    bounded(detection.compliance_pct(), NEUTRAL_STRUCTURE_SCORE)
}

// ────────────────────────────────────────────────────────────────────────────
// Technical vocabulary
// ────────────────────────────────────────────────────────────────────────────

/// Distinct curated terms present in `text` as whole words, case-insensitive.
///
/// Overlapping entries resolve to the longest phrase: "React Native" yields
/// `react native` only, while a separate "React" elsewhere still yields `react`.
pub fn technical_terms(text: &str) -> BTreeSet<String> {
    let (re, ordered) = TECHNICAL_RE.get_or_init(|| longest_first_alternation(TECHNICAL_TERMS));
    re.captures_iter(text)
        .filter_map(|caps| {
            caps.iter()
                .skip(1)
                .position(|group| group.is_some())
                .map(|i| ordered[i].to_string())
        })
        .collect()
}

/// min(100, terms × 10), with a floor of 30 below three terms.
pub fn technical_score(term_count: usize) -> f64 {
    if term_count < MIN_TECHNICAL_TERMS {
        return TECHNICAL_FLOOR;
    }
    bounded(term_count as f64 * 10.0, TECHNICAL_FLOOR)
}

// ────────────────────────────────────────────────────────────────────────────
// Quantitative content
// ────────────────────────────────────────────────────────────────────────────

/// `$...$` spans plus lines shaped like `identifier = expression`.
pub fn count_math_elements(text: &str) -> usize {
    let inline = INLINE_MATH_RE.get_or_init(|| Regex::new(r"\$[^$]+\$").unwrap());
    let assignment = ASSIGNMENT_RE.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*[A-Za-z_][A-Za-z0-9_]*[ \t]*=[ \t]*[^=\s]").unwrap()
    });

    inline.find_iter(text).count() + assignment.find_iter(text).count()
}

/// min(100, log2(count + 1) × 10); 10 when there is nothing to count.
pub fn mathematical_score(element_count: usize) -> f64 {
    if element_count == 0 {
        return MATHEMATICAL_FLOOR;
    }
    bounded(
        ((element_count as f64) + 1.0).log2() * 10.0,
        MATHEMATICAL_FLOOR,
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Prose quality
// ────────────────────────────────────────────────────────────────────────────

/// Simplified Flesch reading ease:
/// 206.835 − 1.015 × words/sentence − 0.846 × chars/word, clamped to [0, 100].
pub fn readability(text: &str) -> f64 {
    let sentence_end = SENTENCE_END_RE.get_or_init(|| Regex::new(r"[.!?]+").unwrap());

    let sentences = sentence_end
        .split(text)
        .filter(|s| !s.trim().is_empty())
        .count();
    let words: Vec<&str> = text.split_whitespace().collect();

    if sentences == 0 || words.is_empty() {
        return NEUTRAL_READABILITY;
    }

    let words_per_sentence = words.len() as f64 / sentences as f64;
    let chars: usize = words.iter().map(|w| w.chars().count()).sum();
    let chars_per_word = chars as f64 / words.len() as f64;

    bounded(
        206.835 - 1.015 * words_per_sentence - 0.846 * chars_per_word,
        NEUTRAL_READABILITY,
    )
}

/// Distinct curated transition phrases present in `text`.
pub fn transition_hits(text: &str) -> usize {
    let set = TRANSITION_SET.get_or_init(|| word_set(TRANSITION_WORDS));
    set.matches(text).iter().count()
}

/// 50 × (min(1, sections/5) + min(0.5, transitions × 0.1)).
pub fn coherence(text: &str, detected_sections: usize) -> f64 {
    let breadth = (detected_sections as f64 / COHERENCE_SECTION_TARGET).min(1.0);
    let markers = (transition_hits(text) as f64 * 0.1).min(0.5);
    bounded(50.0 * (breadth + markers), 0.0)
}

pub fn quality_score(readability: f64, coherence: f64) -> f64 {
    bounded((readability + coherence) / 2.0, NEUTRAL_READABILITY)
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Clamps to [0, 100]; non-finite values degrade to `fallback`.
pub fn bounded(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        fallback
    }
}

/// Escaped phrase where each space matches any whitespace run, so phrases split across
/// lines still count.
fn phrase_pattern(word: &str) -> String {
    regex::escape(word).replace(' ', r"\s+")
}

/// One whole-word, case-insensitive pattern per entry.
fn word_set(words: &[&str]) -> RegexSet {
    let patterns = words
        .iter()
        .map(|w| format!(r"\b{}\b", phrase_pattern(w)));
    RegexSetBuilder::new(patterns)
        .case_insensitive(true)
        .build()
        .unwrap()
}

/// A single whole-word alternation with one capture group per entry, longest entries
/// first. Returns the entries in group order.
fn longest_first_alternation(words: &[&'static str]) -> (Regex, Vec<&'static str>) {
    let mut ordered = words.to_vec();
    ordered.sort_by_key(|w| std::cmp::Reverse(w.len()));

    let alternation = ordered
        .iter()
        .map(|w| format!("({})", phrase_pattern(w)))
        .collect::<Vec<_>>()
        .join("|");
    let re = RegexBuilder::new(&format!(r"\b(?:{alternation})\b"))
        .case_insensitive(true)
        .build()
        .unwrap();
    (re, ordered)
}
