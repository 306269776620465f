//! Utilities for request handlers.

use hyper::{Body, Response, StatusCode};
use hyper::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use serde_json::Value as Json;


/// Create a JSON response.
pub fn json_response(json: Json) -> Response<Body> {
    raw_json_response(json.to_string().into_bytes())
}

/// Create a JSON response from an already serialized payload.
pub fn raw_json_response(body: Vec<u8>) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    {
        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
    }
    *response.body_mut() = Body::from(body);
    response
}

/// Create an erroneous JSON response.
pub fn error_response<T: ToString>(status_code: StatusCode, message: T) -> Response<Body> {
    with_status(json_response(json!({"error": message.to_string()})), status_code)
}

/// Create an empty response with given status code.
pub fn empty_response(status_code: StatusCode) -> Response<Body> {
    let mut response = with_status(Response::new(Body::empty()), status_code);
    {
        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        headers.insert(CONTENT_LENGTH, HeaderValue::from(0));
    }
    response
}

#[inline]
pub fn with_status(mut response: Response<Body>, status_code: StatusCode) -> Response<Body> {
    *response.status_mut() = status_code;
    response
}


#[cfg(test)]
pub mod tests {
    use hyper::{Body, Response};
    use serde_json::{self, Value as Json};

    /// Read the body of a JSON response.
    pub async fn json_body(response: Response<Body>) -> Json {
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
