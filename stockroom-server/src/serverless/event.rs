//! Invocation event model.
//!
//! Only the fields the adapter consumes are modeled; unknown event fields
//! are ignored on deserialization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Inbound invocation event, as delivered by the hosting platform.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvocationEvent {
    pub http_method: Option<String>,
    /// Stage-qualified request path (e.g. "/dev/api/v1/items").
    pub path: Option<String>,
    /// Raw path as sent on the wire; present on newer event formats.
    pub raw_path: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub query_string_parameters: BTreeMap<String, String>,
    pub body: Option<String>,
    pub is_base64_encoded: bool,
    pub request_context: RequestContext,
}

/// Per-invocation platform context.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestContext {
    pub path: Option<String>,
    pub stage: Option<String>,
}

/// Response shape handed back to the platform.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_a_platform_event() {
        let event: InvocationEvent = serde_json::from_str(
            r#"{
                "httpMethod": "POST",
                "path": "/dev/api/v1/items",
                "headers": {"content-type": "application/json"},
                "body": "{\"name\": \"lamp\"}",
                "isBase64Encoded": false,
                "requestContext": {"path": "/dev/api/v1/items", "stage": "dev"},
                "somethingWeDoNotModel": {"ignored": true}
            }"#,
        )
        .unwrap();

        assert_eq!(event.http_method.as_deref(), Some("POST"));
        assert_eq!(event.path.as_deref(), Some("/dev/api/v1/items"));
        assert_eq!(event.request_context.stage.as_deref(), Some("dev"));
        assert!(!event.is_base64_encoded);
    }

    #[test]
    fn missing_fields_default() {
        let event: InvocationEvent = serde_json::from_str("{}").unwrap();
        assert!(event.http_method.is_none());
        assert!(event.headers.is_empty());
        assert!(event.request_context.path.is_none());
    }
}
