use crate::models::{CustomerQuery, ProcessedQuery};
use crate::services::TextOracle;

/// Turn a raw customer query into a normalized, deduplicated representation
///
/// Lexical normalization always succeeds. The oracle, when present and
/// available, enriches the result with intent, extra keywords and an
/// extracted location; any oracle failure leaves the lexical result intact.
pub async fn normalize(
    query: &CustomerQuery,
    oracle: Option<&dyn TextOracle>,
) -> ProcessedQuery {
    let mut processed = ProcessedQuery::default();

    for keyword in &query.keywords {
        processed.add_keyword(keyword);
    }

    if let Some(category) = &query.service_category {
        processed.add_keyword(category);
    }

    if let Some(location) = &query.location {
        let cleaned = location.trim().to_lowercase();
        if !cleaned.is_empty() {
            processed.location = Some(cleaned);
        }
    }

    processed.original_text = query
        .query_text
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_lowercase();

    // Fall back to crude token extraction only when no structured keywords
    // were supplied at all.
    if processed.keywords.is_empty() && !processed.original_text.is_empty() {
        for token in extract_fallback_keywords(&processed.original_text) {
            processed.keywords.insert(token);
        }
    }

    if !processed.original_text.is_empty() {
        if let Some(oracle) = oracle.filter(|o| o.is_available()) {
            match oracle.understand_query(&processed.original_text).await {
                Ok(understanding) => {
                    if let Some(intent) = understanding.intent {
                        if !intent.trim().is_empty() {
                            processed.intent = intent.trim().to_string();
                        }
                    }

                    for keyword in &understanding.service_keywords {
                        processed.add_keyword(keyword);
                    }

                    if processed.location.is_none() {
                        if let Some(extracted) = &understanding.location_extracted {
                            let cleaned = extracted.trim().to_lowercase();
                            if !cleaned.is_empty() {
                                processed.location = Some(cleaned);
                            }
                        }
                    }

                    processed.entities.insert(
                        "llm_details".to_string(),
                        understanding.other_details.unwrap_or_default(),
                    );
                }
                Err(e) => {
                    tracing::warn!("Query understanding failed, keeping lexical result: {}", e);
                }
            }
        }
    }

    tracing::debug!(
        "Normalized query: {} keyword(s), location {:?}, intent '{}'",
        processed.keywords.len(),
        processed.location,
        processed.intent
    );

    processed
}

/// Extract candidate keywords from free text: alphabetic runs of length >= 3
fn extract_fallback_keywords(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .filter(|token| token.len() >= 3)
        .map(|token| token.to_string())
        .collect()
}
