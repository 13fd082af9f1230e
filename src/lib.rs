//! Bizmatch - customer-to-business matching engine
//!
//! Given a free-form customer request, this library finds and ranks the
//! business profiles most likely to satisfy it, blending keyword overlap,
//! location matching and an optional semantic-similarity assessment from an
//! external text-understanding oracle. Oracle and candidate retrieval are
//! trait seams; the engine degrades to purely lexical scoring whenever the
//! oracle is missing or misbehaves.

pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use crate::core::{normalize, MatchEngine, MatchResult, Matcher};
pub use models::{BusinessProfile, CustomerQuery, ProcessedQuery, ScoredMatch, ScoringWeights};
pub use services::{CandidateProvider, InMemoryProvider, OpenAiOracle, TextOracle};
