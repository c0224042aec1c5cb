//! Per-invocation lifecycle.

use std::collections::BTreeMap;

use axum::body::{to_bytes, Body};
use axum::http::{HeaderName, HeaderValue, Method, Request, Uri};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tokio::time::Duration;
use tower::ServiceExt;

use crate::state::AppState;

use super::{normalize, InvocationEvent, InvocationResponse};

/// Upper bound on a buffered response body (10 MiB).
const MAX_RESPONSE_BYTES: usize = 10 * 1024 * 1024;

/// Malformed invocation event.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("invalid HTTP method: {0}")]
    Method(String),
    #[error("invalid request URI: {0}")]
    Uri(String),
    #[error("invalid header: {0}")]
    Header(String),
    #[error("body is not valid base64")]
    Base64,
    #[error("failed to assemble request: {0}")]
    Request(String),
}

/// Run one invocation end to end.
///
/// Order matters: the idempotent schema check runs first (a cold start
/// initializes here, a warm start returns immediately), the event is
/// dispatched, and only after the unit of work completes is idle
/// reclamation consulted. Reclaiming mid-dispatch could close the pool
/// under an in-flight statement.
///
/// The platform is assumed to run one invocation at a time per execution
/// context. Overlapping invocations sharing this process would make the
/// post-completion reclamation unsafe; that is an open risk of the target
/// platform model, not something handled here.
pub async fn handle_invocation(
    state: AppState,
    event: InvocationEvent,
    stage_prefix: &str,
    idle_threshold: Duration,
) -> InvocationResponse {
    // A failed check is not fatal: handlers re-check and answer 503 while
    // the store is down, which beats dropping the invocation outright.
    if let Err(err) = state.db().ensure_schema().await {
        tracing::warn!(error = %err, "schema check failed at invocation start");
    }

    let event = normalize(event, stage_prefix);

    let response = match dispatch(state.clone(), &event).await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(error = %err, "rejecting malformed invocation event");
            error_response(400, "bad_request", &err.to_string())
        }
    };

    state.db().reclaim_if_idle(idle_threshold).await;

    response
}

async fn dispatch(
    state: AppState,
    event: &InvocationEvent,
) -> Result<InvocationResponse, EventError> {
    let router = crate::build_router(state);
    let request = to_http_request(event)?;

    let response = router
        .oneshot(request)
        .await
        .unwrap_or_else(|err| match err {});

    Ok(from_http_response(response).await)
}

fn to_http_request(event: &InvocationEvent) -> Result<Request<Body>, EventError> {
    let method_str = event.http_method.as_deref().unwrap_or("GET");
    let method = Method::from_bytes(method_str.as_bytes())
        .map_err(|_| EventError::Method(method_str.to_owned()))?;

    let path = event
        .path
        .as_deref()
        .or(event.raw_path.as_deref())
        .unwrap_or("/");

    let uri_string = if event.query_string_parameters.is_empty() {
        path.to_owned()
    } else {
        let query = event
            .query_string_parameters
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{path}?{query}")
    };
    let uri: Uri = uri_string
        .parse()
        .map_err(|_| EventError::Uri(uri_string.clone()))?;

    let body = match &event.body {
        None => Body::empty(),
        Some(content) if event.is_base64_encoded => {
            let bytes = BASE64.decode(content).map_err(|_| EventError::Base64)?;
            Body::from(bytes)
        }
        Some(content) => Body::from(content.clone()),
    };

    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in &event.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| EventError::Header(name.clone()))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| EventError::Header(name.clone()))?;
        builder = builder.header(header_name, header_value);
    }

    builder
        .body(body)
        .map_err(|err| EventError::Request(err.to_string()))
}

async fn from_http_response(response: axum::response::Response) -> InvocationResponse {
    let status_code = response.status().as_u16();

    let mut headers = BTreeMap::new();
    for (name, value) in response.headers() {
        if let Ok(value) = value.to_str() {
            headers.insert(name.to_string(), value.to_owned());
        }
    }

    let bytes = match to_bytes(response.into_body(), MAX_RESPONSE_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(error = %err, "failed to read response body");
            return error_response(500, "internal_error", "failed to read response body");
        }
    };

    match String::from_utf8(bytes.to_vec()) {
        Ok(body) => InvocationResponse {
            status_code,
            headers,
            body,
            is_base64_encoded: false,
        },
        Err(_) => InvocationResponse {
            status_code,
            headers,
            body: BASE64.encode(&bytes),
            is_base64_encoded: true,
        },
    }
}

fn error_response(status_code: u16, error: &str, message: &str) -> InvocationResponse {
    let body = serde_json::json!({ "error": error, "message": message }).to_string();
    let mut headers = BTreeMap::new();
    headers.insert("content-type".to_owned(), "application/json".to_owned());
    InvocationResponse {
        status_code,
        headers,
        body,
        is_base64_encoded: false,
    }
}
