//! Rejections produced by the gate and its extractors.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

/// Gate rejections.
#[derive(Debug, thiserror::Error)]
pub enum GateRejection {
    /// Missing or unknown credentials; answered with a Basic-Auth challenge.
    #[error("credentials are required to access this resource")]
    Challenge {
        /// Realm advertised in the challenge
        realm: String,
    },

    /// A handler asked for a peer but the request never passed the gate.
    #[error("authentication required")]
    Unauthenticated,

    /// The peer authenticated but the authorizer refused the request.
    #[error("peer is not permitted to access this resource")]
    Forbidden,
}

impl GateRejection {
    /// Create a challenge for `realm`.
    #[must_use]
    pub fn challenge(realm: impl Into<String>) -> Self {
        Self::Challenge {
            realm: realm.into(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Challenge { .. } | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Challenge { .. } | Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden => "FORBIDDEN",
        }
    }
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.error_code(),
                message: self.to_string(),
            },
        };

        let mut response = (status, Json(body)).into_response();

        if let Self::Challenge { realm } = &self {
            let challenge = format!("Basic realm=\"{}\"", realm.replace('"', "'"));
            match HeaderValue::from_str(&challenge) {
                Ok(value) => {
                    response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
                }
                Err(_) => {
                    tracing::warn!(%realm, "realm is not a valid header value");
                    response
                        .headers_mut()
                        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Basic"));
                }
            }
        }

        response
    }
}
