use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::store::EntityKind;

/// JSON body of every 4xx/5xx reply.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Canonical reason phrase, e.g. `Bad Request`
    pub error: String,
    pub message: String,
    /// Echo of `x-request-id` (or the generated id)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Unknown id for the given entity type.
    pub fn not_found(kind: EntityKind, id: i32) -> Self {
        ServiceError::NotFound(format!("{} with ID {} not found", kind.name(), id))
    }

    /// Foreign key that does not resolve to a live row.
    pub fn unresolved_reference(column: &str, target: EntityKind, id: i32) -> Self {
        ServiceError::InvalidInput(format!(
            "{} {} does not reference an existing {}",
            column,
            id,
            target.name()
        ))
    }

    /// 404 for unknown ids, 400 for anything the caller sent wrong.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in [`ErrorResponse::message`]; internal details stay in the logs.
    pub fn response_message(&self) -> String {
        match self {
            Self::InternalError(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }

        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            request_id: crate::tracing::current_request_id().map(|rid| rid.0),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn unknown_location_renders_not_found_body() {
        let rid = crate::tracing::RequestId::new("loc-lookup-7");
        let response = crate::tracing::scope_request_id(rid, async {
            ServiceError::not_found(EntityKind::Location, 3).into_response()
        })
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "Not Found");
        assert_eq!(body.message, "Not found: Location with ID 3 not found");
        assert_eq!(body.request_id.as_deref(), Some("loc-lookup-7"));
    }

    #[test]
    fn unresolved_reference_is_bad_request() {
        let err = ServiceError::unresolved_reference("DishId", EntityKind::Dish, 12);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "Invalid input: DishId 12 does not reference an existing Dish"
        );
    }

    #[test]
    fn every_variant_maps_to_one_status() {
        let cases = [
            (ServiceError::NotFound("dish".into()), StatusCode::NOT_FOUND),
            (ServiceError::ValidationError("hours".into()), StatusCode::BAD_REQUEST),
            (ServiceError::InvalidInput("id".into()), StatusCode::BAD_REQUEST),
            (ServiceError::InternalError("lock".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{}", err);
        }
    }

    #[test]
    fn internal_details_are_hidden() {
        assert_eq!(
            ServiceError::InternalError("lock poisoned".into()).response_message(),
            "Internal server error"
        );
        assert_eq!(
            ServiceError::not_found(EntityKind::Dish, 9).response_message(),
            "Not found: Dish with ID 9 not found"
        );
    }
}
