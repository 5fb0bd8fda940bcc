use lawyer_ai_lib::api::{ApiError, ComputeApi, HttpComputeApi, TimelineOutcome};
use lawyer_ai_lib::config::ClientConfig;
use lawyer_ai_lib::identity::LocalIdentity;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpComputeApi {
    let config = ClientConfig::new(format!("{}/", server.uri())).unwrap();
    HttpComputeApi::new(config, Arc::new(LocalIdentity::signed_in("user-1", "token-1")))
}

#[tokio::test]
async fn analyze_posts_text_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .and(header("Authorization", "Bearer token-1"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({ "text": "Marbury sued Madison." })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "summary": "Judicial review.",
            "clauses": [{ "clause_type": "Holding", "clause_text": "Act void." }],
            "entities": [{ "text": "Marbury", "label": "PERSON" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .analyze("Marbury sued Madison.")
        .await
        .unwrap();
    assert_eq!(response.summary.as_deref(), Some("Judicial review."));
    assert_eq!(response.clauses.unwrap()[0].clause_text, "Act void.");
    assert_eq!(response.entities.unwrap()[0].label, "PERSON");
    assert_eq!(response.answer, None);
}

#[tokio::test]
async fn question_is_sent_alongside_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .and(body_json(json!({ "text": "brief", "question": "Who sued?" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": "Marbury" })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .analyze_with_question("brief", "Who sued?")
        .await
        .unwrap();
    assert_eq!(response.answer.as_deref(), Some("Marbury"));
}

#[tokio::test]
async fn chat_posts_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({ "prompt": "What is mandamus?" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "A writ." })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server).chat("What is mandamus?").await.unwrap();
    assert_eq!(reply.response, "A writ.");
}

#[tokio::test]
async fn timeline_posts_text_and_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/timeline"))
        .and(body_json(json!({ "text": "brief", "user_id": "user-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "timeline_events": [
                { "date": "1801-03-03", "title": "Appointment", "description": "Adams signs." }
            ],
            "timeline_summary": "One event."
        })))
        .expect(1)
        .mount(&server)
        .await;

    match client_for(&server).timeline("brief", "user-1").await.unwrap() {
        TimelineOutcome::Generated { events, summary } => {
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].title, "Appointment");
            assert_eq!(summary.as_deref(), Some("One event."));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn timeline_error_field_is_a_failed_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/timeline"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "Model did not return the expected JSON structure for timeline.",
            "timeline_events": []
        })))
        .mount(&server)
        .await;

    let outcome = client_for(&server).timeline("brief", "user-1").await.unwrap();
    assert_eq!(
        outcome,
        TimelineOutcome::Failed(
            "Model did not return the expected JSON structure for timeline.".into()
        )
    );
}

#[tokio::test]
async fn error_detail_becomes_the_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "detail": "X" })))
        .mount(&server)
        .await;

    let err = client_for(&server).analyze("brief").await.unwrap_err();
    match err {
        ApiError::Api { status, ref message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "X");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.to_string(), "X");
}

#[tokio::test]
async fn nested_error_detail_is_unwrapped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/timeline"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "detail": { "message": "Failed to parse timeline JSON", "raw_response": "..." }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .timeline("brief", "user-1")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Failed to parse timeline JSON");
}

#[tokio::test]
async fn non_json_error_uses_status_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = client_for(&server).chat("hi").await.unwrap_err();
    assert_eq!(err.to_string(), "Service Unavailable");
}

#[tokio::test]
async fn malformed_success_body_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server).chat("hi").await.unwrap_err();
    assert!(matches!(err, ApiError::Parse(_)), "{:?}", err);
}

#[tokio::test]
async fn signed_out_client_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "hi" })))
        .expect(0)
        .mount(&server)
        .await;

    let config = ClientConfig::new(server.uri()).unwrap();
    let api = HttpComputeApi::new(config, Arc::new(LocalIdentity::signed_out()));

    let err = api.chat("hello").await.unwrap_err();
    assert!(matches!(err, ApiError::NotAuthenticated));
    assert_eq!(err.to_string(), "User not authenticated.");
}
