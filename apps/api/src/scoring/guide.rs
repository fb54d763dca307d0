//! Guide Model: parses and validates declarative report guides.
//!
//! A guide is stored as a JSON mapping:
//!
//! ```json
//! {
//!   "title": "Guide Structure Web Development",
//!   "required_sections": ["introduction", "methodologie"],
//!   "optional_sections": ["abstract"],
//!   "section_patterns": { "introduction": "\\b(introduction|contexte)\\b" },
//!   "weights": { "structure": 0.4, "technical": 0.3, "content": 0.3 }
//! }
//! ```
//!
//! Guides saved by the portal carry `evaluation_criteria` with `structure_weight`,
//! `technical_weight` and `content_weight` instead of `weights`; both forms are read.
//!
//! Every field is optional. Parsing compiles the patterns once; the resulting `Guide`
//! is immutable and cheap to share behind an `Arc`.

use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::scoring::normalizer::fold_accents;

/// Sections expected when no guide is supplied.
pub const DEFAULT_SECTIONS: &[&str] = &[
    "introduction",
    "methodologie",
    "resultats",
    "conclusion",
    "bibliographie",
];

/// Keyword patterns of the default guide, one per `DEFAULT_SECTIONS` entry. Matched as
/// substrings, so "tests" and "perspectives" count.
const DEFAULT_PATTERNS: &[&str] = &[
    "introduction|contexte|problématique|objectif",
    "méthodologie|méthode|approche|implémentation",
    "résultat|expérimentation|test|performance",
    "conclusion|perspective|recommandation|bilan",
    "bibliographie|référence|source",
];

/// Compiled pattern size limit; guides are user-supplied.
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

static DEFAULT_GUIDE: OnceLock<Guide> = OnceLock::new();

/// Malformed guide configuration. The only error the scoring core surfaces.
#[derive(Debug, Error)]
pub enum InvalidGuideError {
    #[error("guide is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("guide definition must be a JSON object")]
    NotAnObject,

    #[error("'{field}' must be a list of section names")]
    NotASequence { field: &'static str },

    #[error("'{field}' contains an invalid section name: {value}")]
    InvalidSectionName { field: &'static str, value: String },

    #[error("'section_patterns' must be a mapping of section name to pattern")]
    PatternsNotAMapping,

    #[error("pattern for section '{section}' must be a string")]
    PatternNotAString { section: String },

    #[error("pattern for section '{section}' does not compile: {source}")]
    InvalidPattern {
        section: String,
        #[source]
        source: regex::Error,
    },

    #[error("'weights' and 'evaluation_criteria' must be mappings of category to number")]
    WeightsNotAMapping,

    #[error("weight '{name}' must be a number")]
    WeightNotANumber { name: &'static str },

    #[error("weight '{name}' is negative ({value})")]
    NegativeWeight { name: &'static str, value: f64 },
}

/// One section the guide expects, with its compiled detection pattern.
#[derive(Debug, Clone)]
pub struct SectionRule {
    pub name: String,
    pub required: bool,
    pattern: Regex,
}

impl SectionRule {
    /// True when the pattern matches anywhere in `lowered_text`.
    pub fn matches(&self, lowered_text: &str) -> bool {
        self.pattern.is_match(lowered_text)
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Per-category emphasis supplied by a guide. Replaces the aggregator's fixed weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GuideWeights {
    pub structure: f64,
    pub technical: f64,
    /// Split evenly between the mathematical and quality dimensions.
    pub content: f64,
}

/// An immutable, validated guide.
#[derive(Debug, Clone)]
pub struct Guide {
    pub title: String,
    /// Required sections first, then optional, each in declaration order.
    sections: Vec<SectionRule>,
    pub weights: Option<GuideWeights>,
}

impl Guide {
    /// Parses a guide definition from its stored JSON representation.
    pub fn from_value(value: &Value) -> Result<Self, InvalidGuideError> {
        let obj = value.as_object().ok_or(InvalidGuideError::NotAnObject)?;

        let title = obj
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or("Guide personnalisé")
            .to_string();

        let required = section_list(obj, "required_sections")?;
        let optional = section_list(obj, "optional_sections")?;
        let patterns = pattern_map(obj)?;
        let weights = parse_weights(obj)?;

        let mut sections: Vec<SectionRule> = Vec::with_capacity(required.len() + optional.len());
        for (names, is_required) in [(required, true), (optional, false)] {
            for name in names {
                if sections.iter().any(|s| s.name == name) {
                    continue;
                }
                let pattern = match patterns.get(&name).and_then(|p| p.as_str()) {
                    Some(source) => compile_pattern(&name, source)?,
                    None => literal_word_pattern(&name)?,
                };
                sections.push(SectionRule {
                    name,
                    required: is_required,
                    pattern,
                });
            }
        }

        for key in patterns.keys() {
            if !sections.iter().any(|s| &s.name == key) {
                debug!(section = %key, "Ignoring pattern for a section the guide does not list");
            }
        }

        Ok(Guide {
            title,
            sections,
            weights,
        })
    }

    /// Parses a guide definition from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, InvalidGuideError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Builds a guide from an uploaded file. JSON files are parsed; any other format
    /// (txt, pdf) gets the generic four-section fallback guide.
    pub fn from_upload(file_name: &str, bytes: &[u8]) -> Result<Self, InvalidGuideError> {
        let is_json = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            let value: Value = serde_json::from_slice(bytes)?;
            let mut guide = Self::from_value(&value)?;
            if value.get("title").is_none() {
                guide.title = file_name.to_string();
            }
            return Ok(guide);
        }

        debug!(file_name, "Non-JSON guide upload, using fallback guide");
        let mut guide = Self::from_value(&fallback_upload_definition())?;
        guide.title = file_name.to_string();
        Ok(guide)
    }

    /// The built-in guide used when callers supply none.
    pub fn default_guide() -> &'static Guide {
        DEFAULT_GUIDE.get_or_init(|| Guide {
            title: "Guide par défaut".to_string(),
            sections: DEFAULT_SECTIONS
                .iter()
                .zip(DEFAULT_PATTERNS)
                .map(|(name, source)| SectionRule {
                    name: name.to_string(),
                    required: true,
                    pattern: compile_pattern(name, source)
                        .expect("built-in default pattern is valid"),
                })
                .collect(),
            weights: None,
        })
    }

    /// All sections, required first, in declaration order.
    pub fn sections(&self) -> &[SectionRule] {
        &self.sections
    }

    pub fn required_sections(&self) -> impl Iterator<Item = &SectionRule> {
        self.sections.iter().filter(|s| s.required)
    }

    pub fn optional_sections(&self) -> impl Iterator<Item = &SectionRule> {
        self.sections.iter().filter(|s| !s.required)
    }

    pub fn required_count(&self) -> usize {
        self.required_sections().count()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Field parsers
// ────────────────────────────────────────────────────────────────────────────

fn section_list(
    obj: &Map<String, Value>,
    field: &'static str,
) -> Result<Vec<String>, InvalidGuideError> {
    let items = match obj.get(field) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(InvalidGuideError::NotASequence { field }),
    };

    items
        .iter()
        .map(|item| match item.as_str().map(str::trim) {
            Some(name) if !name.is_empty() => Ok(name.to_string()),
            _ => Err(InvalidGuideError::InvalidSectionName {
                field,
                value: item.to_string(),
            }),
        })
        .collect()
}

fn pattern_map(obj: &Map<String, Value>) -> Result<Map<String, Value>, InvalidGuideError> {
    let patterns = match obj.get("section_patterns") {
        None | Some(Value::Null) => return Ok(Map::new()),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => return Err(InvalidGuideError::PatternsNotAMapping),
    };

    if let Some((section, _)) = patterns.iter().find(|(_, v)| !v.is_string()) {
        return Err(InvalidGuideError::PatternNotAString {
            section: section.clone(),
        });
    }
    Ok(patterns)
}

/// Reads `weights: {structure, technical, content}`, or the portal's stored form
/// `evaluation_criteria: {structure_weight, technical_weight, content_weight}` when
/// `weights` is absent.
fn parse_weights(obj: &Map<String, Value>) -> Result<Option<GuideWeights>, InvalidGuideError> {
    let (map, keys) = match non_null(obj, "weights") {
        Some(Value::Object(map)) => (map, ["structure", "technical", "content"]),
        Some(_) => return Err(InvalidGuideError::WeightsNotAMapping),
        None => match non_null(obj, "evaluation_criteria") {
            None => return Ok(None),
            Some(Value::Object(map)) => (
                map,
                ["structure_weight", "technical_weight", "content_weight"],
            ),
            Some(_) => return Err(InvalidGuideError::WeightsNotAMapping),
        },
    };

    let read = |name: &'static str| -> Result<f64, InvalidGuideError> {
        match map.get(name) {
            None | Some(Value::Null) => Ok(1.0 / 3.0),
            Some(v) => {
                let value = v
                    .as_f64()
                    .filter(|w| w.is_finite())
                    .ok_or(InvalidGuideError::WeightNotANumber { name })?;
                if value < 0.0 {
                    return Err(InvalidGuideError::NegativeWeight { name, value });
                }
                Ok(value)
            }
        }
    };

    let [structure, technical, content] = keys;
    Ok(Some(GuideWeights {
        structure: read(structure)?,
        technical: read(technical)?,
        content: read(content)?,
    }))
}

fn non_null<'a>(obj: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    obj.get(field).filter(|v| !v.is_null())
}

fn compile_pattern(section: &str, source: &str) -> Result<Regex, InvalidGuideError> {
    RegexBuilder::new(&fold_accents(source))
        .case_insensitive(true)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
        .map_err(|source| InvalidGuideError::InvalidPattern {
            section: section.to_string(),
            source,
        })
}

/// `\b<name>\b`, matching the literal section name as a whole word. Fails only when
/// the name is too long to compile under the pattern size limit.
fn literal_word_pattern(name: &str) -> Result<Regex, InvalidGuideError> {
    let source = format!(r"\b{}\b", regex::escape(&fold_accents(name)));
    RegexBuilder::new(&source)
        .case_insensitive(true)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
        .map_err(|source| InvalidGuideError::InvalidPattern {
            section: truncated_name(name),
            source,
        })
}

/// Section name as reported in errors, cut to a readable length.
fn truncated_name(name: &str) -> String {
    const MAX_REPORTED: usize = 64;
    match name.char_indices().nth(MAX_REPORTED) {
        Some((cut, _)) => format!("{}...", &name[..cut]),
        None => name.to_string(),
    }
}

/// Generic guide applied to uploaded guides that are not JSON.
fn fallback_upload_definition() -> Value {
    serde_json::json!({
        "required_sections": ["introduction", "methodologie", "resultats", "conclusion"],
        "section_patterns": {
            "introduction": "introduction|contexte|problématique",
            "methodologie": "méthodologie|méthode|approche",
            "resultats": "résultat|expérimentation|test",
            "conclusion": "conclusion|perspective|bilan"
        }
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
