//! Recommendation Generator: a fixed, ordered rule list over the dimension scores.
//!
//! Each rule adds at most one message. The positive acknowledgement is emitted only
//! when no other rule fired.

use crate::scoring::aggregator::DimensionScores;

pub const STRUCTURE_THRESHOLD: f64 = 70.0;
pub const TECHNICAL_THRESHOLD: f64 = 60.0;
pub const MATHEMATICAL_THRESHOLD: f64 = 50.0;
pub const QUALITY_THRESHOLD: f64 = 65.0;

pub const TECHNICAL_ADVICE: &str =
    "Approfondir les aspects techniques : technologies utilisées, architecture et choix d'implémentation";
pub const MATHEMATICAL_ADVICE: &str =
    "Enrichir le contenu quantitatif : formules, métriques et résultats chiffrés";
pub const QUALITY_ADVICE: &str =
    "Améliorer la clarté et la lisibilité : phrases plus courtes et transitions explicites entre les parties";
pub const POSITIVE_ACKNOWLEDGEMENT: &str =
    "Excellent travail ! Le rapport satisfait l'ensemble des critères d'évaluation";

/// Builds the recommendation list. `missing_sections` must be in guide order.
pub fn generate(scores: &DimensionScores, missing_sections: &[String]) -> Vec<String> {
    let mut recommendations = Vec::new();

    if scores.structure < STRUCTURE_THRESHOLD && !missing_sections.is_empty() {
        recommendations.push(format!(
            "Ajouter les sections manquantes : {}",
            missing_sections.join(", ")
        ));
    }

    if scores.technical < TECHNICAL_THRESHOLD {
        recommendations.push(TECHNICAL_ADVICE.to_string());
    }

    if scores.mathematical < MATHEMATICAL_THRESHOLD {
        recommendations.push(MATHEMATICAL_ADVICE.to_string());
    }

    if scores.quality < QUALITY_THRESHOLD {
        recommendations.push(QUALITY_ADVICE.to_string());
    }

    if recommendations.is_empty() {
        recommendations.push(POSITIVE_ACKNOWLEDGEMENT.to_string());
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(s: f64, t: f64, m: f64, q: f64) -> DimensionScores {
        DimensionScores {
            structure: s,
            technical: t,
            mathematical: m,
            quality: q,
        }
    }

    fn missing(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_all_rules_fire_in_order() {
        let recs = generate(
            &scores(20.0, 30.0, 10.0, 40.0),
            &missing(&["methodologie", "conclusion"]),
        );
        assert_eq!(
            recs,
            vec![
                "Ajouter les sections manquantes : methodologie, conclusion".to_string(),
                TECHNICAL_ADVICE.to_string(),
                MATHEMATICAL_ADVICE.to_string(),
                QUALITY_ADVICE.to_string(),
            ]
        );
    }

    #[test]
    fn test_positive_fallback_only_when_nothing_fires() {
        let recs = generate(&scores(100.0, 80.0, 60.0, 70.0), &[]);
        assert_eq!(recs, vec![POSITIVE_ACKNOWLEDGEMENT.to_string()]);
    }

    #[test]
    fn test_fallback_is_exclusive_with_other_rules() {
        let recs = generate(&scores(100.0, 59.9, 60.0, 70.0), &[]);
        assert_eq!(recs, vec![TECHNICAL_ADVICE.to_string()]);
        assert!(!recs.contains(&POSITIVE_ACKNOWLEDGEMENT.to_string()));
    }

    #[test]
    fn test_thresholds_are_strict() {
        let recs = generate(&scores(70.0, 60.0, 50.0, 65.0), &missing(&["conclusion"]));
        assert_eq!(recs, vec![POSITIVE_ACKNOWLEDGEMENT.to_string()]);
    }

    #[test]
    fn test_low_structure_without_missing_sections_adds_nothing() {
        // a guide without required sections scores structure at 50 and has nothing missing
        let recs = generate(&scores(50.0, 90.0, 90.0, 90.0), &[]);
        assert_eq!(recs, vec![POSITIVE_ACKNOWLEDGEMENT.to_string()]);
    }

    #[test]
    fn test_one_message_per_rule() {
        let recs = generate(
            &scores(0.0, 0.0, 0.0, 0.0),
            &missing(&["introduction", "methodologie", "resultats"]),
        );
        assert_eq!(recs.len(), 4);
        assert_eq!(
            recs.iter()
                .filter(|r| r.starts_with("Ajouter les sections manquantes"))
                .count(),
            1
        );
    }
}
