use crate::app::AppState;
use crate::core::service::log_failure;
use crate::domain::model::{AssessmentSubmission, SubmissionReceipt};
use crate::utils::error::{AppError, ErrorCategory};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Error body in the `{"detail": ...}` shape the front end expects.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "detail": self.detail })),
        )
            .into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        // 所有結構錯誤一律視為 422，與 schema 驗證一致
        AppError::ValidationError {
            message: rejection.body_text(),
        }
    }
}

impl From<&AppError> for ApiError {
    fn from(error: &AppError) -> Self {
        let detail = match error {
            AppError::ValidationError { message } => message.clone(),
            _ => format!("Failed to send email: {}", error),
        };
        Self {
            status: error.status_code(),
            detail,
        }
    }
}

pub async fn submit_assessment(
    State(state): State<AppState>,
    payload: Result<Json<AssessmentSubmission>, JsonRejection>,
) -> Result<Json<SubmissionReceipt>, ApiError> {
    let result = match payload {
        Ok(Json(submission)) => state.service.submit(submission).await,
        Err(rejection) => Err(AppError::from(rejection)),
    };

    match result {
        Ok(receipt) => {
            tracing::info!("Returning success response: {:?}", receipt);
            Ok(Json(receipt))
        }
        Err(e) if e.category() == ErrorCategory::Validation => {
            tracing::warn!("Rejected assessment payload: {}", e);
            Err(ApiError::from(&e))
        }
        Err(e) => {
            log_failure("Error sending assessment email", &e);
            Err(ApiError::from(&e))
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(state.service.health().await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_failure_keeps_message() {
        let err = AppError::DeliveryError {
            status: 503,
            body: "mailbox unavailable".to_string(),
        };
        let api = ApiError::from(&err);
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            api.detail,
            "Failed to send email: Mail API returned 503: mailbox unavailable"
        );
    }

    #[test]
    fn test_validation_error_keeps_bare_detail() {
        let err = AppError::ValidationError {
            message: "missing field `totalScore`".to_string(),
        };
        let api = ApiError::from(&err);
        assert_eq!(api.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(api.detail, "missing field `totalScore`");
    }
}
