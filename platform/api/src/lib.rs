//! Wire contract shared by the directory server and its clients: route paths,
//! response envelopes and the error taxonomy.

use std::sync::Arc;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use products_hr::{Employee, EmployeeId, HrError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Path prefix the employee routes are mounted under by default.
pub const DEFAULT_NAMESPACE: &str = "/api";

pub fn employees_path(namespace: &str) -> String {
    format!("{}/employees", namespace.trim_end_matches('/'))
}

pub fn employee_path(namespace: &str, id: EmployeeId) -> String {
    format!("{}/{}", employees_path(namespace), id)
}

/// `{ "employee": ... }` returned by create and update.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct EmployeeEnvelope {
    pub employee: Employee,
}

/// `{ "success": ... }` returned by delete.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeleteOutcome {
    pub success: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Validation,
    NotFound,
    Transport,
    Internal,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
}

/// Body of every non-success response.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Shared handler result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error, Clone)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("resource not found")]
    NotFound,
    #[error("network failure: {0}")]
    Transport(String),
    #[error("internal server error")]
    Internal(Arc<anyhow::Error>),
}

impl ApiError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::Validation(_) => ErrorCode::Validation,
            ApiError::NotFound => ErrorCode::NotFound,
            ApiError::Transport(_) => ErrorCode::Transport,
            ApiError::Internal(_) => ErrorCode::Internal,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Transport(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self::Internal(Arc::new(err))
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message: self.to_string(),
            },
        }
    }
}

impl From<HrError> for ApiError {
    fn from(value: HrError) -> Self {
        match value {
            HrError::NotFound(_) => ApiError::NotFound,
            HrError::IdSpaceExhausted(_) => ApiError::internal(value.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(err) = &self {
            error!(error = %err, "request failed with internal error");
        }
        (self.status(), Json(self.body())).into_response()
    }
}
