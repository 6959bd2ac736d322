use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::errors::ErrorResponse;

/// Header carrying the shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// The configured set of accepted API keys. Authentication here is a
/// static shared-secret check; there are no users, roles or tokens.
#[derive(Clone)]
pub struct ApiKeys(Arc<Vec<String>>);

impl ApiKeys {
    pub fn new(keys: Vec<String>) -> Self {
        Self(Arc::new(keys))
    }

    fn accepts(&self, candidate: &str) -> bool {
        self.0.iter().any(|key| key == candidate)
    }
}

/// Middleware guarding the API routes: requests without a known
/// `x-api-key` are rejected with 401 before reaching any handler.
pub async fn require_api_key(
    State(keys): State<ApiKeys>,
    request: Request,
    next: Next,
) -> Response {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(key) if keys.accepts(key) => next.run(request).await,
        _ => {
            let body = ErrorResponse {
                error: "Unauthorized".to_string(),
                message: "Invalid or missing API key".to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
            };
            (StatusCode::UNAUTHORIZED, Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ApiKeys;

    #[test]
    fn key_set_matches_exactly() {
        let keys = ApiKeys::new(vec!["alpha".into(), "beta".into()]);
        assert!(keys.accepts("alpha"));
        assert!(keys.accepts("beta"));
        assert!(!keys.accepts("Alpha"));
        assert!(!keys.accepts(""));
    }
}
