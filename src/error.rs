use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

use crate::toolchain::Action;

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// Malformed or incomplete request, rejected before any work is done
    #[error("{0}")]
    Validation(String),

    /// The toolchain ran and exited non-zero
    #[error("{action} failed:\n{diagnostic}")]
    ToolchainFailed { action: Action, diagnostic: String },

    #[error("toolchain did not finish within {0:?}")]
    Timeout(Duration),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub reason: &'static str,
    pub code: u32,
    pub message: String,
}

impl DeployError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ERR_INVALID_ARGUMENT",
            Self::ToolchainFailed { .. } => "ERR_TOOLCHAIN",
            Self::Timeout(_) => "ERR_TIMEOUT",
            Self::Io(_) => "ERR_INTERNAL",
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1,
            Self::ToolchainFailed { .. } => 4,
            Self::Io(_) => 6,
            Self::Timeout(_) => 7,
        }
    }

    /// Client-facing message; toolchain diagnostics are passed through untouched
    pub fn message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::ToolchainFailed { diagnostic, .. } => diagnostic.clone(),
            Self::Timeout(_) => self.to_string(),
            Self::Io(_) => "Internal error while preparing the build".to_string(),
        }
    }
}

impl ResponseError for DeployError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::ToolchainFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Self::Io(e) = self {
            log::error!("Request failed with I/O error: {e}");
        }
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            status: "error",
            reason: self.reason(),
            code: self.code(),
            message: self.message(),
        })
    }
}
