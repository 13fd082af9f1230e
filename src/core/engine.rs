use crate::core::{matcher::MatchResult, query::normalize, Matcher};
use crate::models::CustomerQuery;
use crate::services::{CandidateProvider, TextOracle};
use std::sync::Arc;

/// End-to-end matching facade: normalize, retrieve, rank
///
/// Stateless across queries; everything it derives is request-scoped.
pub struct MatchEngine {
    matcher: Matcher,
    provider: Arc<dyn CandidateProvider>,
    oracle: Option<Arc<dyn TextOracle>>,
}

impl MatchEngine {
    pub fn new(
        matcher: Matcher,
        provider: Arc<dyn CandidateProvider>,
        oracle: Option<Arc<dyn TextOracle>>,
    ) -> Self {
        Self {
            matcher,
            provider,
            oracle,
        }
    }

    /// Find and rank businesses matching a customer query
    ///
    /// A provider failure degrades to an empty candidate set rather than an
    /// error; callers cannot distinguish "no matches" from "provider
    /// failure" here, which is a documented limitation of this interface.
    pub async fn find_matches(&self, query: &CustomerQuery) -> MatchResult {
        let processed = normalize(query, self.oracle.as_deref()).await;

        let candidates = match self
            .provider
            .fetch_candidates(&processed.keywords, processed.location.as_deref())
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::error!("Candidate retrieval failed, returning no matches: {}", e);
                Vec::new()
            }
        };

        self.matcher
            .rank(&processed, candidates, self.oracle.as_deref())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BusinessProfile;
    use crate::services::{InMemoryProvider, ProviderError};
    use async_trait::async_trait;
    use std::collections::{BTreeMap, BTreeSet};

    struct FailingProvider;

    #[async_trait]
    impl CandidateProvider for FailingProvider {
        async fn fetch_candidates(
            &self,
            _keywords: &BTreeSet<String>,
            _location: Option<&str>,
        ) -> Result<Vec<BusinessProfile>, ProviderError> {
            Err(ProviderError::StorageError("connection refused".to_string()))
        }
    }

    fn profile(id: &str, description: &str, location: &str, tags: &[&str]) -> BusinessProfile {
        BusinessProfile {
            business_id: id.to_string(),
            business_name: format!("Business {}", id),
            industry: "Home Services".to_string(),
            products_services_description: description.to_string(),
            location: Some(location.to_string()),
            service_tags: tags.iter().map(|t| t.to_string()).collect(),
            tagline: None,
            contact_info: None,
            created_at: None,
            extra: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn test_end_to_end_without_oracle() {
        let provider = InMemoryProvider::new(vec![
            profile("1", "24/7 emergency plumbing", "TestCity", &["plumbing", "emergency"]),
            profile("2", "custom garden design", "TestCity", &["landscaping"]),
        ]);
        let engine = MatchEngine::new(Matcher::with_defaults(), Arc::new(provider), None);

        let query = CustomerQuery {
            keywords: vec!["plumbing".to_string(), "emergency".to_string()],
            location: Some("TestCity".to_string()),
            ..Default::default()
        };

        let result = engine.find_matches(&query).await;

        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].business_id, "1");
    }

    #[tokio::test]
    async fn test_provider_failure_yields_empty_result() {
        let engine = MatchEngine::new(Matcher::with_defaults(), Arc::new(FailingProvider), None);

        let query = CustomerQuery {
            keywords: vec!["plumbing".to_string()],
            ..Default::default()
        };

        let result = engine.find_matches(&query).await;

        assert!(result.matches.is_empty());
        assert_eq!(result.total_candidates, 0);
    }
}
