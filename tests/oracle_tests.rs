// HTTP-level tests for the OpenAI-compatible oracle client

use bizmatch::models::BusinessProfile;
use bizmatch::services::{OpenAiOracle, OracleError, TextOracle};
use std::collections::BTreeMap;

fn completion_body(content: &str) -> String {
    serde_json::json!({
        "choices": [
            { "message": { "role": "assistant", "content": content } }
        ]
    })
    .to_string()
}

fn oracle_for(server: &mockito::ServerGuard) -> OpenAiOracle {
    OpenAiOracle::new(
        server.url(),
        "test-key".to_string(),
        "test-model".to_string(),
        5,
        100,
        60,
    )
}

fn test_profile() -> BusinessProfile {
    BusinessProfile {
        business_id: "biz_1".to_string(),
        business_name: "Test Plumbing Experts".to_string(),
        industry: "Home Services".to_string(),
        products_services_description: "emergency plumbing".to_string(),
        location: Some("TestCity".to_string()),
        service_tags: vec!["plumbing".to_string()],
        tagline: None,
        contact_info: None,
        created_at: None,
        extra: BTreeMap::new(),
    }
}

#[tokio::test]
async fn test_understand_query_parses_reply() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body(
            r#"{"intent": "find_service", "service_keywords": ["emergency plumber", "plumber"], "location_extracted": "London", "other_details": "Urgent need."}"#,
        ))
        .create_async()
        .await;

    let oracle = oracle_for(&server);
    let understanding = oracle
        .understand_query("i need an emergency plumber in london")
        .await
        .unwrap();

    assert_eq!(understanding.intent.as_deref(), Some("find_service"));
    assert_eq!(understanding.service_keywords.len(), 2);
    assert_eq!(understanding.location_extracted.as_deref(), Some("London"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_assess_similarity_parses_fenced_reply() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body(
            "```json\n{\"semantic_score\": 0.75, \"semantic_justification\": \"Close match.\"}\n```",
        ))
        .create_async()
        .await;

    let oracle = oracle_for(&server);
    let assessment = oracle
        .assess_similarity("emergency plumber", &test_profile())
        .await
        .unwrap();

    assert_eq!(assessment.semantic_score, 0.75);
    assert_eq!(assessment.semantic_justification, "Close match.");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_assess_similarity_caches_per_pair() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body(
            r#"{"semantic_score": 0.6, "semantic_justification": "Cached."}"#,
        ))
        .expect(1)
        .create_async()
        .await;

    let oracle = oracle_for(&server);
    let first = oracle
        .assess_similarity("emergency plumber", &test_profile())
        .await
        .unwrap();
    let second = oracle
        .assess_similarity("emergency plumber", &test_profile())
        .await
        .unwrap();

    assert_eq!(first.semantic_score, second.semantic_score);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_http_error_surfaces_as_api_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(500)
        .create_async()
        .await;

    let oracle = oracle_for(&server);
    let result = oracle.understand_query("plumber").await;

    assert!(matches!(result, Err(OracleError::ApiError(_))));
}

#[tokio::test]
async fn test_non_json_reply_is_invalid_response() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body("I would rate this a strong match overall."))
        .create_async()
        .await;

    let oracle = oracle_for(&server);
    let result = oracle.assess_similarity("plumber", &test_profile()).await;

    assert!(matches!(result, Err(OracleError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_wrong_typed_score_is_invalid_response() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body(
            r#"{"semantic_score": "very high", "semantic_justification": "Close."}"#,
        ))
        .create_async()
        .await;

    let oracle = oracle_for(&server);
    let result = oracle.assess_similarity("plumber", &test_profile()).await;

    assert!(matches!(result, Err(OracleError::InvalidResponse(_))));
}
