use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StressError {
    #[error("{0}")]
    Validation(String),

    #[error("Stress process {0} not found")]
    NotFound(u32),

    #[error("{0}")]
    Spawn(String),

    #[error("Failed to stop stress process {pid}: {reason}")]
    Terminate { pid: u32, reason: String },
}

impl StressError {
    pub fn kind(&self) -> &'static str {
        match self {
            StressError::Validation(_) => "validation_error",
            StressError::NotFound(_) => "not_found",
            StressError::Spawn(_) => "spawn_error",
            StressError::Terminate { .. } => "terminate_error",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl ResponseError for StressError {
    fn status_code(&self) -> StatusCode {
        match self {
            StressError::Validation(_) => StatusCode::BAD_REQUEST,
            StressError::NotFound(_) => StatusCode::NOT_FOUND,
            StressError::Spawn(_) | StressError::Terminate { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        })
    }
}

pub type Result<T> = std::result::Result<T, StressError>;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            StressError::Validation("cpu".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(StressError::NotFound(7).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            StressError::Spawn("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn error_body_is_structured_json() {
        let resp = StressError::NotFound(42).error_response();
        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"], "not_found");
        assert_eq!(json["message"], "Stress process 42 not found");
    }
}
