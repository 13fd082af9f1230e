use crate::core::{evidence::extract_relevant_services, scoring::calculate_relevance};
use crate::models::{BusinessProfile, ProcessedQuery, ScoredMatch, ScoringWeights};
use crate::services::TextOracle;

/// Acceptance threshold below which candidates are dropped
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.15;

/// Result of a ranking pass
#[derive(Debug)]
pub struct MatchResult {
    pub matches: Vec<ScoredMatch>,
    pub total_candidates: usize,
}

/// Scores, filters and orders candidate profiles for a normalized query
///
/// Weights and threshold are fixed at construction so one invocation
/// applies them identically to every candidate.
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
    threshold: f64,
}

impl Matcher {
    pub fn new(weights: ScoringWeights, threshold: f64) -> Self {
        Self { weights, threshold }
    }

    pub fn with_defaults() -> Self {
        Self {
            weights: ScoringWeights::default(),
            threshold: DEFAULT_SCORE_THRESHOLD,
        }
    }

    /// Build a matcher from loaded configuration
    pub fn from_settings(settings: &crate::config::Settings) -> Self {
        Self::new(
            ScoringWeights::from(&settings.scoring.weights),
            settings.matching.score_threshold,
        )
    }

    /// Rank candidates by relevance to the query
    ///
    /// Candidates are scored concurrently; each scoring future is
    /// independent, so a slow or failing oracle call for one candidate
    /// never affects another. Retains scores above the threshold, sorted
    /// descending; the stable sort keeps candidate order for ties.
    pub async fn rank(
        &self,
        query: &ProcessedQuery,
        candidates: Vec<BusinessProfile>,
        oracle: Option<&dyn TextOracle>,
    ) -> MatchResult {
        let total_candidates = candidates.len();

        let scores = futures::future::join_all(
            candidates
                .iter()
                .map(|profile| calculate_relevance(query, profile, &self.weights, oracle)),
        )
        .await;

        let mut matches: Vec<ScoredMatch> = candidates
            .into_iter()
            .zip(scores)
            .filter_map(|(profile, (score, reasons))| {
                if score > self.threshold {
                    let tagline = profile.display_tagline();
                    let relevant_services = extract_relevant_services(&profile, query);
                    let contact_info = profile.contact_info.clone().or_else(|| {
                        Some(format!("Contact details for {}", profile.business_name))
                    });

                    Some(ScoredMatch {
                        business_id: profile.business_id,
                        business_name: profile.business_name,
                        tagline,
                        relevant_services,
                        location: profile.location,
                        contact_info,
                        match_reason: reasons.join("; "),
                        relevance_score: score,
                    })
                } else {
                    None
                }
            })
            .collect();

        matches.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        tracing::debug!(
            "Ranked {} of {} candidates above threshold {}",
            matches.len(),
            total_candidates,
            self.threshold
        );

        MatchResult {
            matches,
            total_candidates,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_defaults()
    }
}
