use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

pub const APOLOGY: &str =
    "Sorry, I encountered an error processing your request. Please try again.";

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("no message provided")]
    EmptyMessage,

    #[error("classification failed: {0}")]
    Classification(String),

    #[error("label index {index} outside vocabulary of {size} labels")]
    UnknownLabel { index: usize, size: usize },

    #[error("worker failed: {0}")]
    Worker(String),
}

impl ResponseError for ChatError {
    fn status_code(&self) -> StatusCode {
        match self {
            ChatError::EmptyMessage => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ChatError::EmptyMessage => {
                HttpResponse::BadRequest().json(json!({ "error": "No message provided" }))
            }
            _ => HttpResponse::InternalServerError()
                .json(json!({ "response": APOLOGY, "category": "general" })),
        }
    }
}
