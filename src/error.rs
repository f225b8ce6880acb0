//! Client-facing error type for the operation endpoints.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use crate::calc::OperationError;
use crate::http;

/// Errors that end a request with a non-2xx response.
///
/// Every variant is terminal: the executor writes exactly one response for
/// it and nothing after.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("method not allowed")]
    MethodNotAllowed,

    /// Body unreadable, not JSON, or missing/non-numeric operands.
    #[error("error reading request body")]
    MalformedRequest,

    #[error("division by zero")]
    DivisionByZero,

    #[error("payload too large")]
    PayloadTooLarge,

    #[error("404 page not found")]
    NotFound,
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::MalformedRequest | Self::DivisionByZero => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Plain-text error response (status + message line)
    pub fn into_response(self) -> Response<Full<Bytes>> {
        let mut resp = http::build_text_response(self.status(), &self.to_string());
        if self == Self::MethodNotAllowed {
            resp.headers_mut()
                .insert(hyper::header::ALLOW, hyper::header::HeaderValue::from_static("POST"));
        }
        resp
    }
}

impl From<OperationError> for ApiError {
    fn from(err: OperationError) -> Self {
        match err {
            OperationError::DivisionByZero => Self::DivisionByZero,
        }
    }
}
