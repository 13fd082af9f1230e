// Service exports
pub mod oracle;
pub mod provider;

pub use oracle::{OpenAiOracle, OracleError, QueryUnderstanding, SemanticAssessment, TextOracle};
pub use provider::{CandidateProvider, InMemoryProvider, ProviderError, DEFAULT_CANDIDATE_LIMIT};
