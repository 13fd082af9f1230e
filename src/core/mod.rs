// Core algorithm exports
pub mod engine;
pub mod evidence;
pub mod matcher;
pub mod query;
pub mod scoring;

pub use engine::MatchEngine;
pub use evidence::extract_relevant_services;
pub use matcher::{MatchResult, Matcher, DEFAULT_SCORE_THRESHOLD};
pub use query::normalize;
pub use scoring::{calculate_relevance, keyword_score, location_score};
