use actix_web::{http::StatusCode, HttpResponse, ResponseError};

use crate::domain::order::{ErrorMap, OrderServiceError};

// ============================================================================
// HTTP error mapping
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] OrderServiceError),

    #[error("Authentication failed")]
    Forbidden,

    #[error("Malformed order id: {0}")]
    MalformedOrderId(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::MalformedOrderId(_) => StatusCode::NOT_FOUND,
            ApiError::Service(e) => match e {
                OrderServiceError::Domain(_) | OrderServiceError::InvalidPayload(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                OrderServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                OrderServiceError::Conflict(_) => StatusCode::CONFLICT,
                OrderServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Forbidden => HttpResponse::Forbidden().finish(),
            ApiError::MalformedOrderId(_) => {
                HttpResponse::NotFound().json(ErrorMap::base("order not found"))
            }
            ApiError::Service(e) => HttpResponse::build(self.status_code()).json(e.to_error_map()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{Action, InvalidPayload, OrderError, OrderState};
    use crate::event_sourcing::StoreError;
    use uuid::Uuid;

    #[test]
    fn test_status_codes() {
        let transition = ApiError::from(OrderServiceError::Domain(OrderError::InvalidTransition {
            action: Action::Cancel,
            state: OrderState::Paid,
        }));
        assert_eq!(transition.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let validation = ApiError::from(OrderServiceError::Domain(OrderError::Validation(
            ErrorMap::base("x"),
        )));
        assert_eq!(validation.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let payload = ApiError::from(OrderServiceError::InvalidPayload(InvalidPayload(
            "payload must be a JSON object".to_string(),
        )));
        assert_eq!(payload.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let missing = ApiError::from(OrderServiceError::NotFound(Uuid::new_v4()));
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let conflict = ApiError::from(OrderServiceError::from(StoreError::Conflict {
            aggregate_id: Uuid::new_v4(),
            expected: 3,
        }));
        assert_eq!(conflict.status_code(), StatusCode::CONFLICT);

        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::MalformedOrderId("abc".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[actix_web::test]
    async fn test_storage_errors_do_not_leak_details() {
        let err = ApiError::from(OrderServiceError::from(StoreError::EmptyAppend));
        assert!(matches!(err, ApiError::Service(OrderServiceError::Storage(_))));

        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"base": ["internal storage error"]}));
    }
}
