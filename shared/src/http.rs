//! HTTP helpers for Lambda functions.

use lambda_http::{Body, Response};
use serde::Serialize;

/// Content type Clova expects on extension responses.
pub const CLOVA_CONTENT_TYPE: &str = "application/json;charset-UTF-8";

/// Create a JSON response with the given status code, content type and data.
pub fn json_response<T: Serialize>(
    status: u16,
    content_type: &str,
    data: &T,
) -> Result<Response<Body>, lambda_http::Error> {
    Ok(Response::builder()
        .status(status)
        .header("content-type", content_type)
        .body(Body::from(serde_json::to_string(data)?))
        .map_err(Box::new)?)
}

/// Create a plain-text response.
pub fn text_response(status: u16, text: impl Into<String>) -> Result<Response<Body>, lambda_http::Error> {
    Ok(Response::builder()
        .status(status)
        .header("content-type", "text/plain")
        .body(Body::from(text.into()))
        .map_err(Box::new)?)
}

/// Case-insensitive header lookup.
pub fn header<'a>(request: &'a lambda_http::Request, name: &str) -> Option<&'a str> {
    request.headers().get(name).and_then(|v| v.to_str().ok())
}
