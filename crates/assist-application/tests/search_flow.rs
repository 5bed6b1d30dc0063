//! Controller driven by the real HTTP client against a mock backend.

use assist_application::{ControllerSnapshot, SearchLifecycleController};
use assist_core::reference::{EntityType, Reference};
use assist_core::session::{LifecycleState, TurnRole};
use assist_interaction::{ClientConfig, StreamingRequestClient};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sse(frames: &[(&str, serde_json::Value)]) -> String {
    frames
        .iter()
        .map(|(kind, data)| format!("event: {kind}\ndata: {data}\n\n"))
        .collect()
}

fn sse_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/event-stream")
}

fn controller_for(server: &MockServer) -> SearchLifecycleController {
    let config =
        ClientConfig::default().with_endpoint(format!("{}/api/assistant/search/stream", server.uri()));
    let client = StreamingRequestClient::new(&config).expect("valid config");
    SearchLifecycleController::new(Arc::new(client))
}

/// Waits until the controller leaves `Loading`/`Streaming`.
async fn settle(controller: &SearchLifecycleController) -> ControllerSnapshot {
    let mut revisions = controller.subscribe();
    timeout(Duration::from_secs(5), async {
        loop {
            let snapshot = controller.snapshot();
            if !snapshot.state.is_busy() {
                return snapshot;
            }
            revisions.changed().await.expect("controller dropped");
        }
    })
    .await
    .expect("stream did not settle")
}

#[tokio::test(flavor = "multi_thread")]
async fn follow_up_reuses_the_conversation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "query": "还有别的吗", "conversationId": "c1" })))
        .respond_with(sse_response(sse(&[
            ("meta", json!({ "conversationId": "c1" })),
            ("content", json!("还有一场展会。")),
            ("done", json!({})),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "query": "最近有什么活动" })))
        .respond_with(sse_response(sse(&[
            ("meta", json!({ "conversationId": "c1" })),
            (
                "references",
                json!([{ "entityType": "activity", "entityId": 3, "title": "年度论坛", "typeName": "活动" }]),
            ),
            ("content", json!("近期有")),
            ("content", json!("一场活动。")),
            ("done", json!({})),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let controller = controller_for(&server);

    controller.submit_query("最近有什么活动").unwrap();
    let snapshot = settle(&controller).await;
    assert_eq!(snapshot.state, LifecycleState::Done);
    assert_eq!(snapshot.conversation_id.as_deref(), Some("c1"));
    let answer = snapshot.last_answer().unwrap();
    assert_eq!(answer.content, "近期有一场活动。");
    assert_eq!(
        answer.references,
        vec![Reference::new(EntityType::Activity, 3, "年度论坛", "活动")]
    );

    controller.submit_query("还有别的吗").unwrap();
    let snapshot = settle(&controller).await;
    assert_eq!(snapshot.state, LifecycleState::Done);
    let roles: Vec<TurnRole> = snapshot.turns.iter().map(|t| t.role).collect();
    assert_eq!(
        roles,
        vec![
            TurnRole::User,
            TurnRole::Assistant,
            TurnRole::User,
            TurnRole::Assistant
        ]
    );
    assert_eq!(snapshot.turns[3].content, "还有一场展会。");
}

#[tokio::test(flavor = "multi_thread")]
async fn backend_error_leaves_only_the_question() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(sse_response(sse(&[
            ("meta", json!({ "conversationId": "c1" })),
            ("content", json!("近期有")),
            ("error", json!({ "message": "检索服务不可用" })),
        ])))
        .mount(&server)
        .await;

    let controller = controller_for(&server);
    controller.submit_query("最近有什么活动").unwrap();

    let snapshot = settle(&controller).await;
    assert_eq!(snapshot.state, LifecycleState::Error);
    assert_eq!(snapshot.error.as_deref(), Some("检索服务不可用"));
    assert_eq!(snapshot.turns.len(), 1);
    assert!(snapshot.pending_content.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn newer_query_supersedes_a_slow_stream() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "query": "慢查询" })))
        .respond_with(
            sse_response(sse(&[
                ("meta", json!({ "conversationId": "slow" })),
                ("content", json!("过期的回答")),
                ("done", json!({})),
            ]))
            .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "query": "快查询" })))
        .respond_with(sse_response(sse(&[
            ("meta", json!({ "conversationId": "fast" })),
            ("content", json!("最新的回答")),
            ("done", json!({})),
        ])))
        .mount(&server)
        .await;

    let controller = controller_for(&server);
    controller.submit_query("慢查询").unwrap();
    controller.submit_query("快查询").unwrap();

    let snapshot = settle(&controller).await;
    assert_eq!(snapshot.state, LifecycleState::Done);

    tokio::time::sleep(Duration::from_millis(500)).await;
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.conversation_id.as_deref(), Some("fast"));
    let answers: Vec<&str> = snapshot
        .turns
        .iter()
        .filter(|t| t.is_assistant())
        .map(|t| t.content.as_str())
        .collect();
    assert_eq!(answers, vec!["最新的回答"]);
}
