//! Score report wire types.
//!
//! Field names and nesting are the persisted contract: callers store the serialized
//! report and redisplay it later, so renames here are breaking changes.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Label derived from the mathematical score. Bucket bounds are inclusive at the low end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplexityLevel {
    #[serde(rename = "Débutant")]
    Debutant,
    #[serde(rename = "Basique")]
    Basique,
    #[serde(rename = "Intermédiaire")]
    Intermediaire,
    #[serde(rename = "Avancé")]
    Avance,
}

impl ComplexityLevel {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 80.0 => ComplexityLevel::Avance,
            s if s >= 60.0 => ComplexityLevel::Intermediaire,
            s if s >= 40.0 => ComplexityLevel::Basique,
            _ => ComplexityLevel::Debutant,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ComplexityLevel::Debutant => "Débutant",
            ComplexityLevel::Basique => "Basique",
            ComplexityLevel::Intermediaire => "Intermédiaire",
            ComplexityLevel::Avance => "Avancé",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureScore {
    pub score: f64,
    pub sections_detected: Vec<String>,
    pub sections_missing: Vec<String>,
    pub compliance_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalScore {
    pub score: f64,
    pub terms_found: BTreeSet<String>,
    pub terms_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MathematicalScore {
    pub score: f64,
    pub elements_count: usize,
    pub complexity_level: ComplexityLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityScore {
    pub score: f64,
    pub readability: f64,
    pub coherence: f64,
}

/// Result of one scoring run. Every score lies in [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub overall_score: f64,
    pub structure: StructureScore,
    pub technical: TechnicalScore,
    pub mathematical: MathematicalScore,
    pub quality: QualityScore,
    pub recommendations: Vec<String>,
}
