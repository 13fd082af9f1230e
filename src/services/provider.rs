use crate::models::BusinessProfile;
use async_trait::async_trait;
use std::collections::BTreeSet;
use thiserror::Error;

/// Default cap on the candidate set handed to the ranker
pub const DEFAULT_CANDIDATE_LIMIT: usize = 100;

/// Errors that can occur during candidate retrieval
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Invalid profile data: {0}")]
    InvalidProfile(String),
}

/// Source of candidate business profiles for a normalized query
///
/// Implementations return a bounded set with no ordering guarantee; the
/// retrieval strategy is theirs. The engine treats a provider failure as
/// "no candidates".
#[async_trait]
pub trait CandidateProvider: Send + Sync {
    async fn fetch_candidates(
        &self,
        keywords: &BTreeSet<String>,
        location: Option<&str>,
    ) -> Result<Vec<BusinessProfile>, ProviderError>;
}

/// In-memory candidate provider
///
/// Keeps the retrieval semantics of the production store: a profile is a
/// candidate when any keyword appears (case-insensitively) in its name,
/// description, industry or one of its tags, and, if the query carries a
/// location, that location equals the profile's lowercased location.
pub struct InMemoryProvider {
    profiles: Vec<BusinessProfile>,
    limit: usize,
}

impl InMemoryProvider {
    pub fn new(profiles: Vec<BusinessProfile>) -> Self {
        Self {
            profiles,
            limit: DEFAULT_CANDIDATE_LIMIT,
        }
    }

    pub fn with_limit(profiles: Vec<BusinessProfile>, limit: usize) -> Self {
        Self { profiles, limit }
    }

    fn matches_any_keyword(profile: &BusinessProfile, keywords: &BTreeSet<String>) -> bool {
        keywords.iter().any(|keyword| {
            profile.business_name.to_lowercase().contains(keyword)
                || profile
                    .products_services_description
                    .to_lowercase()
                    .contains(keyword)
                || profile.industry.to_lowercase().contains(keyword)
                || profile
                    .service_tags
                    .iter()
                    .any(|tag| tag.to_lowercase().contains(keyword))
        })
    }
}

#[async_trait]
impl CandidateProvider for InMemoryProvider {
    async fn fetch_candidates(
        &self,
        keywords: &BTreeSet<String>,
        location: Option<&str>,
    ) -> Result<Vec<BusinessProfile>, ProviderError> {
        let candidates: Vec<BusinessProfile> = self
            .profiles
            .iter()
            .filter(|profile| {
                keywords.is_empty() || Self::matches_any_keyword(profile, keywords)
            })
            .filter(|profile| match location {
                Some(query_location) => profile
                    .location
                    .as_deref()
                    .map(|loc| loc.to_lowercase() == query_location)
                    .unwrap_or(false),
                None => true,
            })
            .cloned()
            .take(self.limit)
            .collect();

        tracing::debug!(
            "Retrieved {} candidate profiles (limit {})",
            candidates.len(),
            self.limit
        );

        Ok(candidates)
    }
}
