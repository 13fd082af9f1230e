use crate::models::{BusinessProfile, ProcessedQuery, ScoringWeights};
use crate::services::TextOracle;
use std::collections::BTreeSet;

/// Calculate a relevance score in [0, 1] for a (query, profile) pair
///
/// Three weighted components:
/// - keyword overlap with description, tags and industry (weight 0.4)
/// - location match (weight 0.3)
/// - oracle semantic similarity (weight 0.3, optional)
///
/// When the semantic component is absent the remaining weights are
/// renormalized so the missing signal redistributes its weight instead of
/// depressing every score. Returns the score and the accumulated
/// justification strings.
pub async fn calculate_relevance(
    query: &ProcessedQuery,
    profile: &BusinessProfile,
    weights: &ScoringWeights,
    oracle: Option<&dyn TextOracle>,
) -> (f64, Vec<String>) {
    let (keyword, mut reasons) = keyword_score(query, profile);
    let (location, location_reason) = location_score(query, profile);
    if let Some(reason) = location_reason {
        reasons.push(reason.to_string());
    }

    let mut semantic = None;
    if let Some((score, reason)) = semantic_component(query, profile, oracle).await {
        reasons.push(reason);
        semantic = Some(score);
    }

    let final_score = match semantic {
        Some(sem) if sem > 0.0 => {
            keyword * weights.keyword + location * weights.location + sem * weights.semantic
        }
        _ => {
            let lexical_weight = weights.keyword + weights.location;
            if lexical_weight > 0.0 {
                (keyword * weights.keyword + location * weights.location) / lexical_weight
            } else {
                0.0
            }
        }
    };

    (final_score.clamp(0.0, 1.0), reasons)
}

/// Keyword component (0-1): description overlap, tag overlap, industry hit
///
/// Tag matches weigh more than description matches because tags are
/// curated.
pub fn keyword_score(query: &ProcessedQuery, profile: &BusinessProfile) -> (f64, Vec<String>) {
    let mut component = 0.0;
    let mut reasons = Vec::new();

    let description_lower = profile.products_services_description.to_lowercase();
    let description_words = tokenize_words(&description_lower);
    let description_matches: Vec<&str> = query
        .keywords
        .iter()
        .filter(|keyword| description_words.contains(keyword.as_str()))
        .map(String::as_str)
        .collect();
    if !description_matches.is_empty() {
        component += (description_matches.len() as f64 * 0.1).min(0.4);
        reasons.push(format!(
            "{} keyword(s) in description: {}.",
            description_matches.len(),
            summarize_terms(&description_matches)
        ));
    }

    let tags: BTreeSet<String> = profile
        .service_tags
        .iter()
        .map(|tag| tag.to_lowercase())
        .collect();
    let tag_matches: Vec<&str> = query
        .keywords
        .iter()
        .filter(|keyword| tags.contains(keyword.as_str()))
        .map(String::as_str)
        .collect();
    if !tag_matches.is_empty() {
        component += (tag_matches.len() as f64 * 0.2).min(0.5);
        reasons.push(format!(
            "{} keyword(s) in service tags: {}.",
            tag_matches.len(),
            summarize_terms(&tag_matches)
        ));
    }

    if !profile.industry.is_empty() && query.keywords.contains(&profile.industry.to_lowercase()) {
        component += 0.1;
        reasons.push(format!("Industry '{}' matched.", profile.industry));
    }

    (component.min(1.0), reasons)
}

/// Location component (0-1)
///
/// A query without a location scores a neutral 0.2 so located profiles are
/// not penalized for specifying one.
pub fn location_score(
    query: &ProcessedQuery,
    profile: &BusinessProfile,
) -> (f64, Option<&'static str>) {
    let profile_location = profile
        .location
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_lowercase();

    match query.location.as_deref() {
        Some(query_location) if !profile_location.is_empty() => {
            if profile_location == query_location {
                (1.0, Some("Exact location match."))
            } else if profile_location.contains(query_location)
                || query_location.contains(profile_location.as_str())
            {
                (0.5, Some("Partial location match."))
            } else {
                (0.0, None)
            }
        }
        Some(_) => (0.0, None),
        None => (0.2, None),
    }
}

/// Semantic component, present only with a valid in-range oracle score
///
/// Every failure mode (oracle absent, error, out-of-range score) collapses
/// to `None` so the caller renormalizes the lexical weights.
async fn semantic_component(
    query: &ProcessedQuery,
    profile: &BusinessProfile,
    oracle: Option<&dyn TextOracle>,
) -> Option<(f64, String)> {
    if query.original_text.is_empty() {
        return None;
    }
    let oracle = oracle.filter(|o| o.is_available())?;

    match oracle.assess_similarity(&query.original_text, profile).await {
        Ok(assessment) => {
            if (0.0..=1.0).contains(&assessment.semantic_score) {
                let reason = if assessment.semantic_justification.trim().is_empty() {
                    format!("Semantic score: {:.2}", assessment.semantic_score)
                } else {
                    format!(
                        "Semantic match: {} (Score: {:.2})",
                        assessment.semantic_justification, assessment.semantic_score
                    )
                };
                Some((assessment.semantic_score, reason))
            } else {
                tracing::warn!(
                    "Oracle returned out-of-range semantic score {} for {}",
                    assessment.semantic_score,
                    profile.business_name
                );
                None
            }
        }
        Err(e) => {
            tracing::warn!(
                "Semantic assessment failed for {}: {}",
                profile.business_name,
                e
            );
            None
        }
    }
}

/// Split text into a word set on non-alphanumeric boundaries
fn tokenize_words(text: &str) -> BTreeSet<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect()
}

/// Show at most 3 matched terms, with an ellipsis marker beyond that
fn summarize_terms(terms: &[&str]) -> String {
    let shown = terms
        .iter()
        .take(3)
        .copied()
        .collect::<Vec<_>>()
        .join(", ");
    if terms.len() > 3 {
        format!("{}...", shown)
    } else {
        shown
    }
}
