//! Guide Catalog: per-domain guides the service selects from when a request names a
//! domain but carries no guide of its own.
//!
//! Built-in entries cover the portal's `web`, `ai` and `mobile` tracks. A directory of
//! `<domain>.json` definitions can override or extend them at startup.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::scoring::guide::{Guide, GuideWeights, InvalidGuideError};

/// Read-only view of a guide for listing and validation endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct GuideSummary {
    pub domain: Option<String>,
    pub title: String,
    pub required_sections: Vec<String>,
    pub optional_sections: Vec<String>,
    pub section_patterns: BTreeMap<String, String>,
    pub weights: Option<GuideWeights>,
}

impl GuideSummary {
    pub fn new(domain: Option<&str>, guide: &Guide) -> Self {
        Self {
            domain: domain.map(str::to_string),
            title: guide.title.clone(),
            required_sections: guide.required_sections().map(|s| s.name.clone()).collect(),
            optional_sections: guide.optional_sections().map(|s| s.name.clone()).collect(),
            section_patterns: guide
                .sections()
                .iter()
                .map(|s| (s.name.clone(), s.pattern().to_string()))
                .collect(),
            weights: guide.weights,
        }
    }
}

/// Immutable domain → guide map, shared across requests behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct GuideCatalog {
    guides: BTreeMap<String, Arc<Guide>>,
}

impl GuideCatalog {
    /// The guides seeded by the portal for each project domain.
    pub fn builtin() -> Result<Self, InvalidGuideError> {
        let mut catalog = Self::default();
        for (domain, definition) in builtin_definitions() {
            catalog.insert(domain, Guide::from_value(&definition)?);
        }
        Ok(catalog)
    }

    /// Overlays every `<domain>.json` file in `dir`. An invalid file fails the load: a
    /// broken guide is a deployment error, not something to skip silently.
    pub fn load_dir(mut self, dir: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Cannot read guides directory {}", dir.display()))?;

        for entry in entries {
            let path = entry?.path();
            let is_json = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("json"))
                .unwrap_or(false);
            if !is_json {
                continue;
            }
            let Some(domain) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let body = std::fs::read_to_string(&path)
                .with_context(|| format!("Cannot read guide {}", path.display()))?;
            let guide = Guide::from_json_str(&body)
                .with_context(|| format!("Invalid guide {}", path.display()))?;

            info!(domain, title = %guide.title, "Loaded guide from {}", path.display());
            self.insert(domain, guide);
        }

        Ok(self)
    }

    pub fn insert(&mut self, domain: &str, guide: Guide) {
        self.guides
            .insert(domain.trim().to_lowercase(), Arc::new(guide));
    }

    /// Case-insensitive lookup. Unknown domains return `None`; the engine then falls
    /// back to its default guide.
    pub fn for_domain(&self, domain: &str) -> Option<Arc<Guide>> {
        self.guides.get(&domain.trim().to_lowercase()).cloned()
    }

    pub fn summaries(&self) -> Vec<GuideSummary> {
        self.guides
            .iter()
            .map(|(domain, guide)| GuideSummary::new(Some(domain), guide))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.guides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guides.is_empty()
    }
}

fn builtin_definitions() -> Vec<(&'static str, Value)> {
    vec![
        (
            "web",
            json!({
                "title": "Guide Structure Web Development",
                "required_sections": ["introduction", "methodologie", "resultats", "conclusion", "bibliographie"],
                "optional_sections": ["abstract", "annexes", "remerciements"],
                "section_patterns": {
                    "introduction": r"\b(introduction|context|problématique|objectif)\b",
                    "methodologie": r"\b(méthodologie|méthode|approche|architecture|technologies)\b",
                    "resultats": r"\b(résultat|expérimentation|test|performance|métrique)\b",
                    "conclusion": r"\b(conclusion|perspective|recommandation|bilan)\b",
                    "bibliographie": r"\b(référence|bibliographie|source|citation)\b"
                }
            }),
        ),
        (
            "ai",
            json!({
                "title": "Guide Structure AI/Data Science",
                "required_sections": ["introduction", "methodologie", "algorithmes", "resultats", "discussion", "conclusion"],
                "optional_sections": ["abstract", "bibliographie", "annexes"],
                "section_patterns": {
                    "introduction": r"\b(introduction|context|problématique)\b",
                    "methodologie": r"\b(méthodologie|méthode|dataset|features)\b",
                    "algorithmes": r"\b(algorithme|modèle|machine learning|deep learning)\b",
                    "resultats": r"\b(résultat|performance|précision|recall|f1-score)\b",
                    "discussion": r"\b(discussion|analyse|limitation|interprétation)\b",
                    "conclusion": r"\b(conclusion|perspective|recommandation)\b"
                }
            }),
        ),
        (
            "mobile",
            json!({
                "title": "Guide Structure Mobile Development",
                "required_sections": ["introduction", "methodologie", "interface", "resultats", "conclusion"],
                "optional_sections": ["abstract", "bibliographie", "annexes"],
                "section_patterns": {
                    "introduction": r"\b(introduction|context|problématique)\b",
                    "methodologie": r"\b(méthodologie|méthode|technologie|framework)\b",
                    "interface": r"\b(interface|design|ux|ui|expérience utilisateur)\b",
                    "resultats": r"\b(résultat|test|performance|utilisabilité)\b",
                    "conclusion": r"\b(conclusion|perspective|recommandation)\b"
                }
            }),
        ),
    ]
}
