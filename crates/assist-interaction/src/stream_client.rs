//! StreamingRequestClient - HTTP client for the assistant search stream.
//!
//! Each `open` call posts one query and consumes the `text/event-stream`
//! response on its own tokio task, dispatching typed events to a handler.

use crate::config::ClientConfig;
use crate::dispatch::{FrameDispatcher, dispatch_frames};
use crate::handler::{CancellationHandle, StreamHandler, StreamOpener};
use assist_core::{AssistError, Result};
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Opens cancellable assistant streams.
#[derive(Clone)]
pub struct StreamingRequestClient {
    client: Client,
    endpoint: String,
}

impl StreamingRequestClient {
    /// Builds a client for the configured endpoint.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|err| AssistError::config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Posts `query` and streams the answer into `handler`.
    ///
    /// Returns immediately. Must be called from within a tokio runtime.
    pub fn open(
        &self,
        query: &str,
        conversation_id: Option<&str>,
        handler: Arc<dyn StreamHandler>,
    ) -> CancellationHandle {
        let handle = CancellationHandle::new();
        let request = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
            .json(&SearchRequest {
                query,
                conversation_id,
            });

        info!(
            endpoint = %self.endpoint,
            conversation_id = conversation_id.unwrap_or("<new>"),
            "opening assistant stream"
        );

        let mut dispatcher = FrameDispatcher::new(handler, handle.clone());
        let cancel = handle.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => debug!("assistant stream cancelled"),
                _ = run_stream(request, &mut dispatcher) => debug!("assistant stream finished"),
            }
        });

        handle
    }
}

impl StreamOpener for StreamingRequestClient {
    fn open(
        &self,
        query: &str,
        conversation_id: Option<&str>,
        handler: Arc<dyn StreamHandler>,
    ) -> CancellationHandle {
        StreamingRequestClient::open(self, query, conversation_id, handler)
    }
}

async fn run_stream(request: RequestBuilder, dispatcher: &mut FrameDispatcher) {
    let response = match request.send().await {
        Ok(response) => response,
        Err(err) => {
            dispatcher.fail(AssistError::transport(
                err.status().map(|s| s.as_u16()),
                format!("assistant request failed: {err}"),
            ));
            return;
        }
    };

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());
        dispatcher.fail(map_http_error(status, body));
        return;
    }

    dispatch_frames(response.bytes_stream(), dispatcher).await;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

fn map_http_error(status: StatusCode, body: String) -> AssistError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.message)
        .unwrap_or(body);

    let message = if message.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string()
    } else {
        message
    };

    AssistError::transport(Some(status.as_u16()), message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_omits_missing_conversation() {
        let body = serde_json::to_value(SearchRequest {
            query: "最近有什么活动",
            conversation_id: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "query": "最近有什么活动" }));

        let body = serde_json::to_value(SearchRequest {
            query: "还有别的吗",
            conversation_id: Some("c1"),
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "query": "还有别的吗", "conversationId": "c1" })
        );
    }

    #[test]
    fn test_map_http_error() {
        let err = map_http_error(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"message":"assistant is warming up"}"#.to_string(),
        );
        assert_eq!(
            err,
            AssistError::transport(Some(503), "assistant is warming up")
        );

        let err = map_http_error(StatusCode::BAD_GATEWAY, String::new());
        assert_eq!(err, AssistError::transport(Some(502), "Bad Gateway"));

        let err = map_http_error(StatusCode::NOT_FOUND, "no route".to_string());
        assert_eq!(err.to_string(), "Transport error (HTTP 404): no route");
    }

    #[test]
    fn test_new_rejects_invalid_endpoint() {
        let config = ClientConfig::default().with_endpoint("localhost:8080/stream");
        assert!(StreamingRequestClient::new(&config).is_err());
    }
}
