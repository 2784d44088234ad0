//! Error taxonomy for the API client.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use timecard_core::DecodeError;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured auth token is unusable; checked before any request.
    #[error("invalid auth token: {reason}")]
    InvalidToken { reason: &'static str },

    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// The identity-verification call was rejected; no client was
    /// constructed.
    #[error("authentication failed ({status}) {code}: {message}")]
    Auth {
        status: StatusCode,
        code: String,
        message: String,
    },

    /// The service answered a request with a non-success status.
    #[error("API error ({status}) {code}: {message}")]
    Api {
        status: StatusCode,
        code: String,
        message: String,
    },

    /// Connection or protocol level failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A record in an otherwise successful response failed to decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The response body was not the expected envelope.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// Reclassifies a rejected request as an authentication failure.
    pub(crate) fn into_auth(self) -> Self {
        match self {
            Self::Api {
                status,
                code,
                message,
            } => Self::Auth {
                status,
                code,
                message,
            },
            other => other,
        }
    }
}

/// Builds the error for a non-success response, extracting the provider
/// error payload when one is present.
pub(crate) fn api_error(status: StatusCode, body: &str) -> ClientError {
    let (code, message) = parse_error_payload(body).unwrap_or_else(|| {
        (
            status.as_u16().to_string(),
            body.trim().to_string(),
        )
    });
    ClientError::Api {
        status,
        code,
        message,
    }
}

/// Parses the two provider error payload shapes:
/// `{"error": {"code": .., "message": ..}}` from the resource endpoints
/// and `{"error": .., "error_description": ..}` from the token layer.
fn parse_error_payload(body: &str) -> Option<(String, String)> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Payload {
        Token {
            error: String,
            error_description: String,
        },
        Api {
            error: Details,
        },
    }

    #[derive(Deserialize)]
    struct Details {
        code: Code,
        message: String,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Number(i64),
        Text(String),
    }

    match serde_json::from_str(body).ok()? {
        Payload::Token {
            error,
            error_description,
        } => Some((error, error_description)),
        Payload::Api { error } => {
            let code = match error.code {
                Code::Number(n) => n.to_string(),
                Code::Text(s) => s,
            };
            Some((code, error.message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_resource_error_payloads() {
        let err = api_error(
            StatusCode::EXPECTATION_FAILED,
            r#"{"error": {"code": 417, "message": "expectation failed"}}"#,
        );
        match err {
            ClientError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, StatusCode::EXPECTATION_FAILED);
                assert_eq!(code, "417");
                assert_eq!(message, "expectation failed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parses_token_error_payloads() {
        let err = api_error(
            StatusCode::UNAUTHORIZED,
            r#"{"error": "invalid_grant", "error_description": "token expired"}"#,
        );
        match err {
            ClientError::Api { code, message, .. } => {
                assert_eq!(code, "invalid_grant");
                assert_eq!(message, "token expired");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn falls_back_to_the_status_for_unparseable_bodies() {
        let err = api_error(StatusCode::BAD_GATEWAY, "<html>upstream died</html>");
        match err {
            ClientError::Api { code, message, .. } => {
                assert_eq!(code, "502");
                assert_eq!(message, "<html>upstream died</html>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn into_auth_reclassifies_api_errors_only() {
        let auth = api_error(StatusCode::UNAUTHORIZED, "{}").into_auth();
        assert!(matches!(auth, ClientError::Auth { .. }));

        let token = ClientError::InvalidToken { reason: "empty" }.into_auth();
        assert!(matches!(token, ClientError::InvalidToken { .. }));
    }
}
