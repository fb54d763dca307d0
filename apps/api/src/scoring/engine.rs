//! Scoring engine: normalize → detect → score × 4 → aggregate → recommend.
//!
//! `ScoringEngine` is the deterministic heuristic path. `ReportScorer` is the seam a
//! model-backed scorer would implement; `AppState` holds an `Arc<dyn ReportScorer>`
//! chosen at startup.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::errors::AppError;
use crate::scoring::aggregator::{aggregate, DimensionScores, ScoreWeights};
use crate::scoring::detector::detect;
use crate::scoring::dimensions::{
    coherence, count_math_elements, mathematical_score, quality_score, readability,
    structure_score, technical_score, technical_terms,
};
use crate::scoring::guide::{Guide, InvalidGuideError};
use crate::scoring::normalizer::{normalize_text, DEFAULT_MAX_CHARS};
use crate::scoring::recommendations;
use crate::scoring::report::{
    ComplexityLevel, MathematicalScore, QualityScore, ScoreReport, StructureScore, TechnicalScore,
};

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Normalized text is truncated to this many characters before scoring.
    pub max_text_chars: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_text_chars: DEFAULT_MAX_CHARS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine {
    config: EngineConfig,
}

impl ScoringEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Scores `document_text` against `guide`, or the default guide when `None`.
    ///
    /// `domain` is only recorded in logs; guide selection by domain is the caller's job.
    /// Always returns a complete report.
    pub fn score_report(
        &self,
        document_text: &str,
        domain: &str,
        guide: Option<&Guide>,
    ) -> ScoreReport {
        let guide = guide.unwrap_or_else(|| Guide::default_guide());
        let text = normalize_text(document_text, self.config.max_text_chars);

        let detection = detect(&text, guide);
        let terms = technical_terms(&text);
        let math_elements = count_math_elements(&text);
        let readability = round2(readability(&text));
        let coherence = round2(coherence(&text, detection.detected.len()));

        let scores = DimensionScores {
            structure: round2(structure_score(&detection)),
            technical: round2(technical_score(terms.len())),
            mathematical: round2(mathematical_score(math_elements)),
            quality: round2(quality_score(readability, coherence)),
        };

        let weights = ScoreWeights::resolve(guide.weights.as_ref());
        let overall_score = round2(aggregate(&scores, &weights));
        let recommendations = recommendations::generate(&scores, &detection.missing);

        debug!(
            domain,
            guide = %guide.title,
            text_chars = text.len(),
            overall_score,
            structure = scores.structure,
            technical = scores.technical,
            mathematical = scores.mathematical,
            quality = scores.quality,
            "Scored report"
        );

        ScoreReport {
            overall_score,
            structure: StructureScore {
                score: scores.structure,
                compliance_pct: round1(detection.compliance_pct()),
                sections_detected: detection.detected,
                sections_missing: detection.missing,
            },
            technical: TechnicalScore {
                score: scores.technical,
                terms_count: terms.len(),
                terms_found: terms,
            },
            mathematical: MathematicalScore {
                score: scores.mathematical,
                elements_count: math_elements,
                complexity_level: ComplexityLevel::from_score(scores.mathematical),
            },
            quality: QualityScore {
                score: scores.quality,
                readability,
                coherence,
            },
            recommendations,
        }
    }

    /// Parses `definition` as a guide, then scores. A malformed guide aborts the run
    /// before any scoring happens.
    pub fn score_definition(
        &self,
        document_text: &str,
        domain: &str,
        definition: Option<&Value>,
    ) -> Result<ScoreReport, InvalidGuideError> {
        let guide = definition.map(Guide::from_value).transpose()?;
        Ok(self.score_report(document_text, domain, guide.as_ref()))
    }
}

/// Scores with the default engine configuration.
pub fn score_report(document_text: &str, domain: &str, guide: Option<&Guide>) -> ScoreReport {
    ScoringEngine::default().score_report(document_text, domain, guide)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ────────────────────────────────────────────────────────────────────────────
// Pluggable scorer backends
// ────────────────────────────────────────────────────────────────────────────

/// One scoring request, owned so it can move onto a blocking thread.
#[derive(Debug, Clone)]
pub struct ScoreRequest {
    pub document_text: String,
    pub domain: String,
    pub guide: Option<Arc<Guide>>,
}

/// Implement this to swap scoring backends without touching handlers.
#[async_trait]
pub trait ReportScorer: Send + Sync {
    async fn score(&self, request: ScoreRequest) -> Result<ScoreReport, AppError>;

    /// Backend label reported to callers.
    fn backend(&self) -> &'static str;
}

/// Deterministic pattern-matching backend. Runs the engine on a blocking thread.
pub struct HeuristicScorer {
    engine: ScoringEngine,
}

impl HeuristicScorer {
    pub fn new(engine: ScoringEngine) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl ReportScorer for HeuristicScorer {
    async fn score(&self, request: ScoreRequest) -> Result<ScoreReport, AppError> {
        let engine = self.engine;
        tokio::task::spawn_blocking(move || {
            engine.score_report(
                &request.document_text,
                &request.domain,
                request.guide.as_deref(),
            )
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in scoring: {e}")))
    }

    fn backend(&self) -> &'static str {
        "heuristic"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
