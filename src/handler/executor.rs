//! Operation executor
//!
//! The single request pipeline shared by every arithmetic endpoint:
//! method check, bounded body read, JSON decode, compute, JSON encode.
//! Each stage either hands its output to the next one or ends the request
//! with an [`ApiError`]; a request never produces more than one response.

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};

use crate::calc::{Operation, OperationRequest, OperationResult};
use crate::error::ApiError;
use crate::http;
use crate::logger;

/// Run `op` over the request and build its response
pub async fn handle_operation<B>(
    req: Request<B>,
    op: Operation,
    max_body_size: u64,
) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match execute(req, op, max_body_size).await {
        Ok(result) => http::build_json_response(&result),
        Err(err) => err.into_response(),
    }
}

/// Validate, decode and compute; no response is built here
pub async fn execute<B>(
    req: Request<B>,
    op: Operation,
    max_body_size: u64,
) -> Result<OperationResult, ApiError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    // 1. Method check, before touching the body
    if req.method() != Method::POST {
        logger::log_warning(&format!("{op}: method not allowed: {}", req.method()));
        return Err(ApiError::MethodNotAllowed);
    }

    // 2. Decode
    check_content_length(&req, max_body_size)?;
    let body = read_body(req.into_body(), max_body_size).await?;
    let input = OperationRequest::from_json(&body).map_err(|e| {
        logger::log_warning(&format!("{op}: invalid request body: {e}"));
        ApiError::MalformedRequest
    })?;

    // 3. Compute
    let value = op.apply(input.operand1, input.operand2).map_err(|e| {
        logger::log_warning(&format!(
            "{op}: {e} ({} / {})",
            input.operand1, input.operand2
        ));
        ApiError::from(e)
    })?;

    // 4. Encode happens in the caller
    Ok(OperationResult::new(value))
}

/// Reject early when the declared Content-Length is over the limit
fn check_content_length<B>(req: &Request<B>, max_body_size: u64) -> Result<(), ApiError> {
    let Some(content_length) = req.headers().get(hyper::header::CONTENT_LENGTH) else {
        return Ok(());
    };
    match content_length.to_str().ok().and_then(|s| s.parse::<u64>().ok()) {
        Some(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Err(ApiError::PayloadTooLarge)
        }
        // Malformed values are left to hyper, which rejects them before we get here
        _ => Ok(()),
    }
}

/// Collect the whole body, stopping at `max_body_size` bytes
async fn read_body<B>(body: B, max_body_size: u64) -> Result<Bytes, ApiError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_warning(&format!("Request body exceeded {max_body_size} bytes"));
            Err(ApiError::PayloadTooLarge)
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            Err(ApiError::MalformedRequest)
        }
    }
}
