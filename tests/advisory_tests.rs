#![cfg(feature = "advisory")]

use std::collections::BTreeMap;
use std::time::Duration;

use chore_wheel::advisory::{
    AdvisoryError, AdvisoryOutcome, FairnessAdvisor, LeastLoadedAdvisor, OpenAiAdvisor,
    SuggestionRequest, UNAVAILABLE_MESSAGE, request_suggestion,
};
use chore_wheel::{BoardConfig, ChoreBoard};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

fn team_request() -> SuggestionRequest {
    SuggestionRequest {
        task: "Clean Bathroom".into(),
        team_members: vec!["Ana".into(), "Bo".into(), "Cy".into()],
        past_assignments: BTreeMap::from([
            ("Ana".to_string(), 3),
            ("Bo".to_string(), 1),
            ("Cy".to_string(), 1),
        ]),
    }
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

// ── OpenAI-compatible advisor ───────────────────────────────────────────────

#[tokio::test]
async fn remote_advisor_returns_parsed_suggestion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "response_format": {"type": "json_object"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"suggestedAssignee": "Bo", "reasoning": "Bo has done the least."}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let advisor = OpenAiAdvisor::new(server.uri(), "test-key", "test-model");
    let outcome = request_suggestion(&advisor, &team_request(), TIMEOUT).await;

    match outcome {
        AdvisoryOutcome::Suggested {
            response,
            on_roster,
        } => {
            assert_eq!(response.suggested_assignee, "Bo");
            assert_eq!(response.reasoning, "Bo has done the least.");
            assert!(on_roster);
        }
        other => panic!("expected a suggestion, got {other:?}"),
    }
}

#[tokio::test]
async fn remote_advisor_sends_team_and_counts_in_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"suggestedAssignee": "Cy", "reasoning": "tie broken"}"#,
        )))
        .mount(&server)
        .await;

    let advisor = OpenAiAdvisor::new(server.uri(), "", "test-model");
    advisor.suggest(&team_request()).await.unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].headers.get("authorization").is_none());
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    let prompt = body["messages"][1]["content"].as_str().unwrap();
    assert!(prompt.contains("Task: Clean Bathroom"));
    assert!(prompt.contains("Team members: Ana, Bo, Cy"));
    assert!(prompt.contains("Ana: 3, Bo: 1, Cy: 1"));
}

#[tokio::test]
async fn server_error_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"message": "upstream exploded", "type": "server_error"}
        })))
        .mount(&server)
        .await;

    let advisor = OpenAiAdvisor::new(server.uri(), "k", "m");
    match advisor.suggest(&team_request()).await {
        Err(AdvisoryError::Status { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "upstream exploded");
        }
        other => panic!("expected a status error, got {other:?}"),
    }

    let outcome = request_suggestion(&advisor, &team_request(), TIMEOUT).await;
    assert_eq!(
        outcome,
        AdvisoryOutcome::Unavailable {
            message: UNAVAILABLE_MESSAGE.to_string()
        }
    );
}

#[tokio::test]
async fn malformed_answer_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion("Bo, probably.")),
        )
        .mount(&server)
        .await;

    let advisor = OpenAiAdvisor::new(server.uri(), "k", "m");
    assert!(matches!(
        advisor.suggest(&team_request()).await,
        Err(AdvisoryError::MalformedAnswer(_))
    ));
    let outcome = request_suggestion(&advisor, &team_request(), TIMEOUT).await;
    assert!(outcome.suggestion().is_none());
}

#[tokio::test]
async fn slow_answer_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion(
                    r#"{"suggestedAssignee": "Bo", "reasoning": "late"}"#,
                ))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let advisor = OpenAiAdvisor::new(server.uri(), "k", "m");
    let outcome =
        request_suggestion(&advisor, &team_request(), Duration::from_millis(100)).await;
    assert_eq!(outcome, AdvisoryOutcome::unavailable());
}

#[tokio::test]
async fn off_roster_suggestion_is_flagged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"suggestedAssignee": "Zed", "reasoning": "made up"}"#,
        )))
        .mount(&server)
        .await;

    let advisor = OpenAiAdvisor::new(server.uri(), "k", "m");
    let outcome = request_suggestion(&advisor, &team_request(), TIMEOUT).await;
    match outcome {
        AdvisoryOutcome::Suggested {
            response,
            on_roster,
        } => {
            assert_eq!(response.suggested_assignee, "Zed");
            assert!(!on_roster);
        }
        other => panic!("expected a suggestion, got {other:?}"),
    }
}

// ── Offline advisor ─────────────────────────────────────────────────────────

#[tokio::test]
async fn least_loaded_breaks_ties_by_roster_order() {
    let response = LeastLoadedAdvisor.suggest(&team_request()).await.unwrap();
    assert_eq!(response.suggested_assignee, "Bo");
    assert!(response.reasoning.contains("1 task(s)"));
    assert!(response.reasoning.contains("Clean Bathroom"));
}

#[tokio::test]
async fn members_without_counts_start_at_zero() {
    let mut request = team_request();
    request.team_members.push("Dee".into());
    let response = LeastLoadedAdvisor.suggest(&request).await.unwrap();
    assert_eq!(response.suggested_assignee, "Dee");
}

#[tokio::test]
async fn empty_team_is_unavailable() {
    let request = SuggestionRequest {
        task: "Anything".into(),
        team_members: Vec::new(),
        past_assignments: BTreeMap::new(),
    };
    assert!(matches!(
        LeastLoadedAdvisor.suggest(&request).await,
        Err(AdvisoryError::EmptyTeam)
    ));
    let outcome = request_suggestion(&LeastLoadedAdvisor, &request, TIMEOUT).await;
    assert_eq!(outcome, AdvisoryOutcome::unavailable());
}

// ── Requests built from a board ─────────────────────────────────────────────

#[test]
fn request_from_board_uses_title_roster_and_completions() {
    let mut board = ChoreBoard::new(BoardConfig::default());
    board.add_member(Some("Newbie")).unwrap();

    let request = SuggestionRequest::from_board(&board, "take-out-trash").unwrap();

    assert_eq!(request.task, "Take out Trash");
    assert_eq!(
        request.team_members,
        ["Person 1", "Person 2", "Person 3", "Person 4", "Newbie"]
    );
    assert_eq!(request.past_assignments["Person 3"], 6);
    assert_eq!(request.past_assignments["Newbie"], 0);

    assert!(matches!(
        SuggestionRequest::from_board(&board, "missing"),
        Err(AdvisoryError::UnknownChore(_))
    ));
}

#[test]
fn outcome_serializes_with_status_tag() {
    let outcome = AdvisoryOutcome::unavailable();
    let value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(value["status"], json!("unavailable"));
    assert_eq!(value["message"], json!(UNAVAILABLE_MESSAGE));
}
