// Model exports
pub mod domain;

pub use domain::{BusinessProfile, CustomerQuery, ProcessedQuery, ScoredMatch, ScoringWeights};
