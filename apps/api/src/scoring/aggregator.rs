//! Aggregator: weighted combination of the four dimension scores.
//!
//! Fixed weights apply unless the guide carries its own; guide weights let an
//! administrator shift emphasis per domain without touching the engine.

use tracing::warn;

use crate::scoring::dimensions::bounded;
use crate::scoring::guide::GuideWeights;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub structure: f64,
    pub technical: f64,
    pub mathematical: f64,
    pub quality: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            structure: 0.3,
            technical: 0.3,
            mathematical: 0.2,
            quality: 0.2,
        }
    }
}

impl ScoreWeights {
    /// Converts guide weights, normalized to sum to 1. `content` is split evenly between
    /// the mathematical and quality dimensions. Returns `None` when the weights sum to 0.
    pub fn from_guide(weights: &GuideWeights) -> Option<Self> {
        let total = weights.structure + weights.technical + weights.content;
        if !total.is_finite() || total <= 0.0 {
            return None;
        }
        let content_half = weights.content / total / 2.0;
        Some(Self {
            structure: weights.structure / total,
            technical: weights.technical / total,
            mathematical: content_half,
            quality: content_half,
        })
    }

    /// Guide weights when usable, the fixed defaults otherwise.
    pub fn resolve(guide_weights: Option<&GuideWeights>) -> Self {
        match guide_weights {
            None => Self::default(),
            Some(w) => Self::from_guide(w).unwrap_or_else(|| {
                warn!("Guide weights sum to zero, using default weights");
                Self::default()
            }),
        }
    }
}

/// The four dimension scores, each in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionScores {
    pub structure: f64,
    pub technical: f64,
    pub mathematical: f64,
    pub quality: f64,
}

/// Weighted sum of the dimension scores, clamped to [0, 100].
pub fn aggregate(scores: &DimensionScores, weights: &ScoreWeights) -> f64 {
    let overall = weights.structure * scores.structure
        + weights.technical * scores.technical
        + weights.mathematical * scores.mathematical
        + weights.quality * scores.quality;
    bounded(overall, 0.0)
}
