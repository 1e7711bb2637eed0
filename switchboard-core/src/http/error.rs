//! HTTP error mapping utilities

use crate::providers::error::ProviderError;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde_json::Value;

/// Map HTTP status code and response body to a ProviderError
pub fn map_http_error(
    status: StatusCode,
    headers: Option<&HeaderMap>,
    body: Option<String>,
    request_id: &str,
) -> ProviderError {
    let error_details = body
        .as_ref()
        .and_then(|b| serde_json::from_str::<Value>(b).ok())
        .and_then(|v| extract_error_details(&v));

    let error_message = error_details
        .as_ref()
        .map(|d| d.message.clone())
        .or_else(|| body.clone().filter(|b| !b.trim().is_empty()))
        .unwrap_or_else(|| format!("HTTP error {}", status.as_u16()));

    let message_with_id = format!("{} [request_id: {}]", error_message, request_id);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Authentication {
            status: status.as_u16(),
            message: message_with_id,
        },

        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after_secs = headers
                .and_then(|h| h.get(RETRY_AFTER))
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after)
                .or_else(|| error_details.and_then(|d| d.retry_after_seconds));

            ProviderError::RateLimit {
                message: message_with_id,
                retry_after_secs,
            }
        }

        StatusCode::NOT_FOUND => ProviderError::NotFound(message_with_id),

        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ProviderError::Timeout {
            status: Some(status.as_u16()),
        },

        StatusCode::SERVICE_UNAVAILABLE => ProviderError::ServiceUnavailable(message_with_id),

        status if status.is_server_error() => ProviderError::Server {
            status: status.as_u16(),
            message: message_with_id,
        },

        status => ProviderError::InvalidRequest {
            status: status.as_u16(),
            message: message_with_id,
        },
    }
}

/// Error details extracted from response body
struct ErrorDetails {
    message: String,
    retry_after_seconds: Option<u64>,
}

/// Extract error details from JSON response
fn extract_error_details(json: &Value) -> Option<ErrorDetails> {
    // OpenAI/Groq: { "error": { "message": "...", "type": "...", "code": "..." } }
    // Anthropic:   { "type": "error", "error": { "type": "...", "message": "..." } }
    if let Some(error) = json.get("error") {
        if let Some(message) = error.get("message").and_then(|v| v.as_str()) {
            return Some(ErrorDetails {
                message: message.to_string(),
                retry_after_seconds: error.get("retry_after").and_then(|v| v.as_u64()),
            });
        }
        if let Some(message) = error.as_str() {
            return Some(ErrorDetails {
                message: message.to_string(),
                retry_after_seconds: None,
            });
        }
    }

    if let Some(message) = json.get("message").and_then(|v| v.as_str()) {
        return Some(ErrorDetails {
            message: message.to_string(),
            retry_after_seconds: json.get("retry_after").and_then(|v| v.as_u64()),
        });
    }

    None
}

/// Parse Retry-After header value (seconds form only)
pub fn parse_retry_after(header_value: &str) -> Option<u64> {
    header_value.trim().parse::<u64>().ok()
}

/// Remove every occurrence of `secret` from `text`
pub fn scrub_secret(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        text.to_string()
    } else {
        text.replace(secret, "[REDACTED]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_openai_error_body() {
        let body = r#"{"error":{"message":"Invalid model","type":"invalid_request_error"}}"#;
        let err = map_http_error(StatusCode::BAD_REQUEST, None, Some(body.to_string()), "c-1");
        assert_eq!(
            err,
            ProviderError::InvalidRequest {
                status: 400,
                message: "Invalid model [request_id: c-1]".to_string()
            }
        );
    }

    #[test]
    fn test_anthropic_overloaded_is_server_error() {
        let body = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        let err = map_http_error(
            StatusCode::from_u16(529).unwrap(),
            None,
            Some(body.to_string()),
            "c-2",
        );
        assert_eq!(err.status_code(), Some(529));
    }

    #[test]
    fn test_service_unavailable() {
        let err = map_http_error(StatusCode::SERVICE_UNAVAILABLE, None, None, "c-3");
        assert_eq!(
            err,
            ProviderError::ServiceUnavailable("HTTP error 503 [request_id: c-3]".to_string())
        );
    }

    #[test]
    fn test_timeout_and_auth_keep_their_status() {
        let err = map_http_error(StatusCode::GATEWAY_TIMEOUT, None, None, "c-5");
        assert_eq!(err, ProviderError::Timeout { status: Some(504) });
        assert_eq!(err.status_code(), Some(504));

        let err = map_http_error(StatusCode::FORBIDDEN, None, Some("denied".into()), "c-6");
        assert_eq!(err.status_code(), Some(403));
        assert_eq!(err.to_string(), "Authentication failed: denied [request_id: c-6]");
    }

    #[test]
    fn test_retry_after_header() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));
        let err = map_http_error(StatusCode::TOO_MANY_REQUESTS, Some(&headers), None, "c-4");
        assert!(matches!(
            err,
            ProviderError::RateLimit {
                retry_after_secs: Some(7),
                ..
            }
        ));
    }

    #[test]
    fn test_scrub_secret() {
        assert_eq!(
            scrub_secret("bad key sk-123 given", "sk-123"),
            "bad key [REDACTED] given"
        );
        assert_eq!(scrub_secret("unchanged", ""), "unchanged");
    }
}
