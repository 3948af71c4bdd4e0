//! Request extraction
//!
//! Bodies are read as a JSON object first so the field checks can report
//! every missing key with the platform's wording, then deserialized into the
//! typed input. Path parameters reject with the same JSON error body.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use shared::validation::{require_fields, require_items, require_payload, PAYLOAD_MISSING};

use crate::error::{AppError, AppResult};

/// A non-empty JSON object body
#[derive(Debug, Clone)]
pub struct JsonPayload(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for JsonPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;

        if bytes.is_empty() {
            return Err(AppError::Validation(PAYLOAD_MISSING.to_string()));
        }

        // Unparseable bodies are treated the same as absent ones
        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|_| AppError::Validation(PAYLOAD_MISSING.to_string()))?;

        Ok(JsonPayload(require_payload(value)?))
    }
}

/// Path parameters; a segment that does not parse is a 400 `{"error": ...}`
#[derive(Debug, Clone, Copy)]
pub struct PathParam<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| PathParam(value))
            .map_err(|e| AppError::Validation(e.body_text()))
    }
}

impl JsonPayload {
    /// Fail unless every key in `fields` is present
    pub fn require(&self, fields: &[&str]) -> AppResult<&Self> {
        require_fields(&self.0, fields)?;
        Ok(self)
    }

    /// Fail unless `items` is a non-empty list whose entries carry `fields`
    pub fn require_items(&self, fields: &[&str]) -> AppResult<&Self> {
        require_items(&self.0, fields)?;
        Ok(self)
    }

    /// Deserialize into a typed input; type mismatches become 400s
    pub fn parse<T: DeserializeOwned>(self) -> AppResult<T> {
        serde_json::from_value(Value::Object(self.0))
            .map_err(|e| AppError::Validation(format!("Invalid request payload: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    async fn extract(body: &'static str) -> AppResult<JsonPayload> {
        let request = Request::builder()
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        JsonPayload::from_request(request, &()).await
    }

    #[tokio::test]
    async fn empty_and_malformed_bodies_are_missing_payloads() {
        for body in ["", "{}", "null", "not json", "[1]"] {
            match extract(body).await {
                Err(AppError::Validation(msg)) => assert_eq!(msg, PAYLOAD_MISSING),
                other => panic!("unexpected result for {:?}: {:?}", body, other),
            }
        }
    }

    #[tokio::test]
    async fn parse_reports_type_mismatches() {
        #[derive(Deserialize)]
        struct Input {
            #[allow(dead_code)]
            quantity: i32,
        }

        let payload = extract(r#"{"quantity": "many"}"#).await.unwrap();
        assert!(matches!(payload.parse::<Input>(), Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn unparseable_path_segment_is_a_validation_error() {
        use axum::{body::to_bytes, http::StatusCode, routing::get, Router};
        use tower::ServiceExt;

        async fn show(PathParam(id): PathParam<i64>) -> String {
            id.to_string()
        }

        let app = Router::new().route("/items/:id", get(show));

        let ok = app
            .clone()
            .oneshot(Request::builder().uri("/items/42").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);

        let bad = app
            .oneshot(Request::builder().uri("/items/abc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
        let body: Value =
            serde_json::from_slice(&to_bytes(bad.into_body(), usize::MAX).await.unwrap()).unwrap();
        assert!(body["error"].as_str().unwrap().contains("abc"));
    }

    #[tokio::test]
    async fn require_lists_missing_keys() {
        let payload = extract(r#"{"name": "Crate"}"#).await.unwrap();
        match payload.require(&["name", "price", "weight"]) {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "Missing required fields: price, weight")
            }
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }
}
