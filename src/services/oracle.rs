use crate::models::BusinessProfile;
use async_trait::async_trait;
use moka::future::Cache;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling the text-understanding oracle
///
/// These never escape the matching core: every caller treats a failed
/// oracle call the same as "oracle unavailable" and falls back to the
/// lexical path.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Oracle unavailable: no API key configured")]
    Unavailable,
}

/// Structured interpretation of a raw customer query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryUnderstanding {
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub service_keywords: Vec<String>,
    #[serde(default)]
    pub location_extracted: Option<String>,
    #[serde(default)]
    pub other_details: Option<String>,
}

/// Semantic similarity judgment for a (query, profile) pair
///
/// The score is passed through as-is; range validation happens in the
/// scorer, which discards out-of-range values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticAssessment {
    pub semantic_score: f64,
    #[serde(default)]
    pub semantic_justification: String,
}

/// External text-understanding service
///
/// Optional and fallible by contract: callers must gate every use on
/// [`TextOracle::is_available`] and recover locally from any error.
#[async_trait]
pub trait TextOracle: Send + Sync {
    /// Availability check; external configuration, not part of scoring
    fn is_available(&self) -> bool;

    /// Extract intent, keywords and location from raw query text
    async fn understand_query(&self, text: &str) -> Result<QueryUnderstanding, OracleError>;

    /// Judge how well a business offering answers the query text
    async fn assess_similarity(
        &self,
        query_text: &str,
        profile: &BusinessProfile,
    ) -> Result<SemanticAssessment, OracleError>;
}

/// Oracle backed by an OpenAI-compatible chat completions API
///
/// Each call carries the configured timeout. Similarity assessments are
/// memoized per (business, query text) in an in-memory TTL cache since the
/// ranker issues one call per candidate and queries repeat.
pub struct OpenAiOracle {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
    similarity_cache: Cache<String, SemanticAssessment>,
}

impl OpenAiOracle {
    /// Create a new oracle client
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        timeout_secs: u64,
        cache_size: u64,
        cache_ttl_secs: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        let similarity_cache = Cache::builder()
            .max_capacity(cache_size)
            .time_to_live(Duration::from_secs(cache_ttl_secs))
            .build();

        Self {
            base_url,
            api_key,
            model,
            client,
            similarity_cache,
        }
    }

    /// Build an oracle client from loaded configuration
    pub fn from_settings(settings: &crate::config::OracleSettings) -> Self {
        Self::new(
            settings.endpoint.clone(),
            settings.api_key.clone(),
            settings.model.clone(),
            settings.timeout_secs,
            settings.cache_size,
            settings.cache_ttl_secs,
        )
    }

    /// Issue one chat completion and parse the reply body as JSON
    async fn generate_json(
        &self,
        system_prompt: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<Value, OracleError> {
        if !self.is_available() {
            return Err(OracleError::Unavailable);
        }

        let url = format!(
            "{}/chat/completions",
            self.base_url.trim_end_matches('/')
        );

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": prompt },
            ],
            "temperature": 0.2,
            "max_tokens": max_tokens,
        });

        tracing::debug!("Oracle call to {} ({} prompt chars)", url, prompt.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OracleError::ApiError(format!(
                "Chat completion failed: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let content = json
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| OracleError::InvalidResponse("Missing message content".into()))?;

        parse_json_payload(content)
    }
}

/// Parse a model reply as JSON, tolerating markdown code fences
fn parse_json_payload(content: &str) -> Result<Value, OracleError> {
    let trimmed = content.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed).trim();

    serde_json::from_str(trimmed)
        .map_err(|e| OracleError::InvalidResponse(format!("Reply is not valid JSON: {}", e)))
}

#[async_trait]
impl TextOracle for OpenAiOracle {
    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn understand_query(&self, text: &str) -> Result<QueryUnderstanding, OracleError> {
        let prompt = format!(
            "Analyze the following customer query to understand their intent and extract key entities.\n\
             Customer Query: {text}\n\n\
             Identify the primary service or product the customer is looking for, any specified \
             location, and other important details or constraints (e.g., urgency, specific features).\n\
             Return the response as a JSON object with keys: \"intent\" (e.g., \"find_service\", \
             \"request_quote\", \"information_seek\"), \"service_keywords\" (list of relevant service \
             keywords), \"location_extracted\" (string, if any), and \"other_details\" (string \
             summarizing other needs).\n\
             Example: for \"I need an emergency plumber in London for a burst pipe\" the output might be:\n\
             {{\"intent\": \"find_service\", \"service_keywords\": [\"emergency plumber\", \"plumber\", \
             \"burst pipe\"], \"location_extracted\": \"London\", \"other_details\": \"Urgent need due to burst pipe.\"}}"
        );

        let payload = self
            .generate_json("You are a helpful AI assistant.", &prompt, 150)
            .await?;

        serde_json::from_value(payload)
            .map_err(|e| OracleError::InvalidResponse(format!("Unexpected understanding shape: {}", e)))
    }

    async fn assess_similarity(
        &self,
        query_text: &str,
        profile: &BusinessProfile,
    ) -> Result<SemanticAssessment, OracleError> {
        let cache_key = format!("{}\u{1}{}", profile.business_id, query_text);
        if let Some(cached) = self.similarity_cache.get(&cache_key).await {
            tracing::trace!("Similarity cache hit for {}", profile.business_id);
            return Ok(cached);
        }

        let prompt = format!(
            "Assess the semantic similarity between the customer query and the business offering.\n\
             Customer Query: {query_text}\n\n\
             Business Name: {name}\n\
             Business Description: {description}\n\
             Business Industry: {industry}\n\
             Service Tags: {tags}\n\n\
             Provide a semantic similarity score as a float between 0.0 (not similar) and 1.0 \
             (highly similar), and a brief justification for the score.\n\
             Return the response as a JSON object with keys: \"semantic_score\" (float) and \
             \"semantic_justification\" (string).\n\
             Example JSON response: {{\"semantic_score\": 0.75, \"semantic_justification\": \"The \
             business offers services that closely match the customer's stated needs.\"}}",
            name = profile.business_name,
            description = profile.products_services_description,
            industry = profile.industry,
            tags = profile.service_tags.join(", "),
        );

        let payload = self
            .generate_json("You are a helpful AI assistant.", &prompt, 200)
            .await?;

        let assessment: SemanticAssessment = serde_json::from_value(payload)
            .map_err(|e| OracleError::InvalidResponse(format!("Unexpected assessment shape: {}", e)))?;

        self.similarity_cache
            .insert(cache_key, assessment.clone())
            .await;

        Ok(assessment)
    }
}
