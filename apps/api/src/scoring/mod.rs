// Report scoring: text normalization, guide-driven section detection, four heuristic
// dimension scores, weighted aggregation and French recommendations.
#![allow(dead_code)]

pub mod aggregator;
pub mod catalog;
pub mod detector;
pub mod dimensions;
pub mod engine;
pub mod guide;
pub mod handlers;
pub mod normalizer;
pub mod recommendations;
pub mod report;
pub mod vocabulary;

pub use catalog::GuideCatalog;
pub use engine::{EngineConfig, HeuristicScorer, ScoringEngine};
