use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A customer's free-form request for a product or service
///
/// Immutable once received; every field is optional so the engine can work
/// with whatever the intake layer managed to collect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerQuery {
    #[serde(default)]
    pub query_text: Option<String>,
    #[serde(default)]
    pub service_category: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Normalized, deduplicated form of a [`CustomerQuery`]
///
/// Keywords are lowercased and held in an ordered set so justification
/// strings come out deterministic for identical inputs. `intent` stays
/// "unknown" whenever the oracle was skipped or failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedQuery {
    pub keywords: BTreeSet<String>,
    /// Lowercased original query text; empty when none was supplied
    pub original_text: String,
    pub location: Option<String>,
    pub intent: String,
    /// Auxiliary annotations, e.g. oracle "other details" under `llm_details`
    pub entities: BTreeMap<String, String>,
}

impl Default for ProcessedQuery {
    fn default() -> Self {
        Self {
            keywords: BTreeSet::new(),
            original_text: String::new(),
            location: None,
            intent: "unknown".to_string(),
            entities: BTreeMap::new(),
        }
    }
}

impl ProcessedQuery {
    /// Insert a keyword after lowercasing/trimming; whitespace-only
    /// candidates never enter the set.
    pub fn add_keyword(&mut self, raw: &str) {
        let cleaned = raw.trim().to_lowercase();
        if !cleaned.is_empty() {
            self.keywords.insert(cleaned);
        }
    }
}

/// A candidate business profile, owned by the candidate provider
///
/// The engine only reads these. Missing description or tags deserialize to
/// empty values so scoring degrades instead of failing on sparse intake
/// data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub business_id: String,
    pub business_name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub products_services_description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub service_tags: Vec<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub contact_info: Option<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Arbitrary auxiliary attributes carried through from intake
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl BusinessProfile {
    /// Display tagline, falling back to a generic industry line
    pub fn display_tagline(&self) -> String {
        self.tagline
            .clone()
            .unwrap_or_else(|| format!("Your trusted {} provider", self.industry))
    }
}

/// A business matched to a customer query, ready for display
///
/// Created fresh per query and never mutated afterwards; ordering within a
/// result set is the rank order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredMatch {
    pub business_id: String,
    pub business_name: String,
    pub tagline: String,
    pub relevant_services: Vec<String>,
    pub location: Option<String>,
    pub contact_info: Option<String>,
    pub match_reason: String,
    pub relevance_score: f64,
}

/// Scoring component weights
///
/// Passed into the matcher at construction rather than read from globals so
/// tests can vary them.
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub keyword: f64,
    pub location: f64,
    pub semantic: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            keyword: 0.4,
            location: 0.3,
            semantic: 0.3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_keyword_normalizes() {
        let mut query = ProcessedQuery::default();
        query.add_keyword("  Plumbing ");
        query.add_keyword("plumbing");
        query.add_keyword("   ");

        assert_eq!(query.keywords.len(), 1);
        assert!(query.keywords.contains("plumbing"));
    }

    #[test]
    fn test_display_tagline_fallback() {
        let profile = BusinessProfile {
            business_id: "b1".to_string(),
            business_name: "Acme".to_string(),
            industry: "Home Services".to_string(),
            products_services_description: String::new(),
            location: None,
            service_tags: vec![],
            tagline: None,
            contact_info: None,
            created_at: None,
            extra: BTreeMap::new(),
        };

        assert_eq!(profile.display_tagline(), "Your trusted Home Services provider");
    }

    #[test]
    fn test_profile_deserializes_with_missing_fields() {
        let json = r#"{"business_id": "b1", "business_name": "Acme"}"#;
        let profile: BusinessProfile = serde_json::from_str(json).unwrap();

        assert!(profile.products_services_description.is_empty());
        assert!(profile.service_tags.is_empty());
        assert!(profile.location.is_none());
    }
}
