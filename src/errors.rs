// src/errors.rs
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

/// Why a submit was refused before any remote call was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Busy,
    EmptyPrompt,
    EmptyEditPrompt,
    NoCurrentImage,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Rejection::Busy => "a request is already in progress",
            Rejection::EmptyPrompt => "prompt is empty",
            Rejection::EmptyEditPrompt => "edit instruction is empty",
            Rejection::NoCurrentImage => "there is no current image to edit",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Generate,
    Edit,
}

#[derive(Error, Debug)]
pub enum StudioError {
    #[error("Remote call failed during {operation:?}: {message}")]
    RemoteCall {
        operation: Operation,
        message: String,
    },

    #[error("No image in response to {0:?}")]
    NoImageInResponse(Operation),

    #[error("Invalid submission: {0}")]
    InvalidSubmission(Rejection),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StudioError {
    pub fn remote(operation: Operation, message: impl Into<String>) -> Self {
        StudioError::RemoteCall {
            operation,
            message: message.into(),
        }
    }

    /// Whether this failure came out of the generation service.
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            StudioError::RemoteCall { .. } | StudioError::NoImageInResponse(_)
        )
    }

    fn user_notice(&self) -> String {
        match self {
            StudioError::RemoteCall { operation, .. } | StudioError::NoImageInResponse(operation) => {
                match operation {
                    Operation::Generate => "Error generating image.".to_string(),
                    Operation::Edit => "Error editing image.".to_string(),
                }
            }
            _ => self.to_string(),
        }
    }
}

impl ResponseError for StudioError {
    fn status_code(&self) -> StatusCode {
        match self {
            StudioError::RemoteCall { .. } | StudioError::NoImageInResponse(_) => {
                StatusCode::BAD_GATEWAY
            }
            StudioError::InvalidSubmission(Rejection::Busy) => StatusCode::CONFLICT,
            StudioError::InvalidSubmission(_) => StatusCode::UNPROCESSABLE_ENTITY,
            StudioError::ImageProcessing(_) => StatusCode::BAD_REQUEST,
            StudioError::NotFound(_) => StatusCode::NOT_FOUND,
            StudioError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.user_notice()
        }))
    }
}
