//! Section Detector: tests each guide section pattern against the text.
//!
//! Output order always follows the guide's declaration order (required sections, then
//! optional ones), never match position, so reports are reproducible.

use serde::Serialize;

use crate::scoring::guide::Guide;

/// Which guide sections were found in a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SectionDetection {
    /// Every detected section, required and optional.
    pub detected: Vec<String>,
    /// Required sections with no match, in guide order.
    pub missing: Vec<String>,
    /// How many of `detected` are required sections.
    pub required_detected: usize,
    pub required_total: usize,
}

impl SectionDetection {
    /// detected required / required × 100; 0 when the guide requires nothing.
    pub fn compliance_pct(&self) -> f64 {
        if self.required_total == 0 {
            return 0.0;
        }
        self.required_detected as f64 / self.required_total as f64 * 100.0
    }
}

/// Matches every section of `guide` against `text`.
pub fn detect(text: &str, guide: &Guide) -> SectionDetection {
    let lowered = text.to_lowercase();
    let mut detection = SectionDetection::default();

    for section in guide.sections() {
        let found = section.matches(&lowered);
        if section.required {
            detection.required_total += 1;
        }
        match (found, section.required) {
            (true, true) => {
                detection.required_detected += 1;
                detection.detected.push(section.name.clone());
            }
            (true, false) => detection.detected.push(section.name.clone()),
            (false, true) => detection.missing.push(section.name.clone()),
            (false, false) => {}
        }
    }

    detection
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn guide(required: &[&str], optional: &[&str]) -> Guide {
        Guide::from_value(&json!({
            "required_sections": required,
            "optional_sections": optional,
        }))
        .unwrap()
    }

    #[test]
    fn test_detects_required_sections() {
        let g = guide(&["introduction", "conclusion"], &[]);
        let d = detect(
            "This introduction sets up the problem. In conclusion we summarize.",
            &g,
        );
        assert_eq!(d.detected, vec!["introduction", "conclusion"]);
        assert!(d.missing.is_empty());
        assert_eq!(d.compliance_pct(), 100.0);
    }

    #[test]
    fn test_order_follows_guide_not_text() {
        let g = guide(&["introduction", "methodologie", "conclusion"], &[]);
        let d = detect("conclusion first, then methodologie, introduction last", &g);
        assert_eq!(d.detected, vec!["introduction", "methodologie", "conclusion"]);
    }

    #[test]
    fn test_missing_keeps_guide_order() {
        let g = guide(&["introduction", "methodologie", "resultats", "conclusion"], &[]);
        let d = detect("resultats only", &g);
        assert_eq!(d.missing, vec!["introduction", "methodologie", "conclusion"]);
        assert_eq!(d.compliance_pct(), 25.0);
    }

    #[test]
    fn test_optional_sections_are_detected_but_never_missing() {
        let g = guide(&["introduction"], &["annexes", "abstract"]);
        let d = detect("Abstract. Introduction.", &g);
        assert_eq!(d.detected, vec!["introduction", "abstract"]);
        assert!(d.missing.is_empty());
        assert_eq!(d.required_detected, 1);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let g = guide(&["bibliographie"], &[]);
        let d = detect("BIBLIOGRAPHIE", &g);
        assert_eq!(d.detected, vec!["bibliographie"]);
    }

    #[test]
    fn test_no_required_sections_gives_zero_compliance() {
        let g = guide(&[], &["annexes"]);
        let d = detect("annexes", &g);
        assert_eq!(d.compliance_pct(), 0.0);
    }

    #[test]
    fn test_empty_text_detects_nothing() {
        let d = detect("", Guide::default_guide());
        assert!(d.detected.is_empty());
        assert_eq!(d.missing.len(), 5);
    }
}
