//! Module with the server's request handlers.

mod backend;
pub mod list;
pub mod memes;
pub mod util;


use std::sync::Arc;

use hyper::{Body, Method, Request, Response, StatusCode};
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::http::request::Parts;
use memegen::{ExportError, ExportFormat, ExportOutput, FetchError,
              StyleParameters, StyleUpdate};
use serde::Deserialize;
use serde_json::{self, Value as Json};
use thiserror::Error;

pub use self::backend::{Backend, ImageRef, MemeError, TaskError};
use self::util::{empty_response, error_response};


/// Handle the meme rendering HTTP request.
pub async fn render_meme(backend: Arc<Backend>, request: Request<Body>) -> Response<Body> {
    let (parts, body) = request.into_parts();
    if parts.method != Method::GET && parts.method != Method::POST {
        warn!("Unsupported HTTP method for render request: {}", parts.method);
        return empty_response(StatusCode::METHOD_NOT_ALLOWED);
    }

    let body = match hyper::body::to_bytes(body).await {
        Ok(b) => b,
        Err(e) => {
            error!("Failed to read request body: {}", e);
            return error_response(StatusCode::BAD_REQUEST, "cannot read request body");
        }
    };
    let (source, style, format) = match decode_request(&parts, body) {
        Ok(r) => r,
        Err(e) => {
            error!("Failed to decode render request: {}", e);
            return error_response(
                StatusCode::BAD_REQUEST, format!("cannot decode request: {}", e));
        }
    };
    debug!("Decoded render request for {:?} as {:?}", source, format);

    match backend.run(move |b| b.render(source, style, format)).await {
        Ok(Ok(output)) => image_response(output),
        Ok(Err(e)) => {
            error!("Failed to render meme: {}", e);
            error_response(status_code_for(&e), e)
        }
        Err(e) => error_response(task_status_code(e), e),
    }
}

/// Create the response with an exported meme image.
fn image_response(output: ExportOutput) -> Response<Body> {
    let content_type = HeaderValue::from_str(output.mime_type().as_ref())
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(
        &format!("attachment; filename=\"{}\"", output.file_name()));

    let mut response = Response::new(Body::empty());
    {
        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, content_type);
        headers.insert(CONTENT_LENGTH, HeaderValue::from(output.len()));
        if let Ok(disposition) = disposition {
            headers.insert(CONTENT_DISPOSITION, disposition);
        }
    }
    *response.body_mut() = Body::from(output.into_bytes());
    response
}


// Decoding requests

/// Parameters of the render request other than caption style.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ImageParams {
    template: Option<String>,
    format: Option<String>,
}

/// Error while decoding the render request.
#[derive(Debug, Error)]
enum RequestError {
    #[error("{0}")]
    Query(#[from] serde_qs::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Format(#[from] ExportError),
    #[error("no image or template given")]
    NoImage,
}

/// Decode the render request.
///
/// The request can be a GET with parameters in the query string,
/// a POST with parameters in a JSON body, or a POST of the image itself
/// (with `image/*` content type) with parameters in the query string.
fn decode_request(parts: &Parts, body: Bytes)
    -> Result<(ImageRef, StyleParameters, ExportFormat), RequestError>
{
    let query = match parts.uri.query() {
        Some(q) => { trace!("Render request query string: {}", q); q }
        None => { trace!("No query string found in render request"); "" }
    };
    let is_image_upload = parts.headers.get(CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .map(|ct| ct.trim().to_lowercase().starts_with("image/"))
        .unwrap_or(false);

    let (params, update): (ImageParams, StyleUpdate) =
        if parts.method == Method::POST && !is_image_upload && !body.is_empty() {
            debug!("Decoding render parameters from {} bytes of JSON", body.len());
            let json: Json = serde_json::from_slice(&body)?;
            (ImageParams::deserialize(&json)?, StyleUpdate::deserialize(&json)?)
        } else {
            debug!("Decoding render parameters from {} bytes of query string", query.len());
            (serde_qs::from_str(query)?, serde_qs::from_str(query)?)
        };
    trace!("Decoded {:?}", update);

    let source = if is_image_upload {
        debug!("Using the {} byte(s) of request body as image", body.len());
        ImageRef::Upload(body.to_vec())
    } else {
        ImageRef::Template(params.template.ok_or(RequestError::NoImage)?)
    };

    let mut style = StyleParameters::default();
    style.apply(update);
    let style = style.clamped();

    let format = match params.format {
        Some(f) => f.parse()?,
        None => ExportFormat::default(),
    };
    Ok((source, style, format))
}


/// Determine the HTTP response code that best corresponds to a meme rendering error.
fn status_code_for(e: &MemeError) -> StatusCode {
    match *e {
        MemeError::TemplateNotFound(..) => StatusCode::NOT_FOUND,
        MemeError::Fetch(ref e) => match *e {
            FetchError::UpstreamUnavailable(..) => StatusCode::BAD_GATEWAY,
            FetchError::MalformedResponse(..) => StatusCode::BAD_GATEWAY,
        },
        MemeError::BadImage(..) => StatusCode::BAD_REQUEST,
        MemeError::Render(..) => StatusCode::INTERNAL_SERVER_ERROR,
        MemeError::Export(ref e) => match *e {
            ExportError::UnsupportedFormat(..) => StatusCode::BAD_REQUEST,
            ExportError::NoImageLoaded | ExportError::Encode(..) =>
                StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

/// Determine the HTTP response code for a failed backend task.
fn task_status_code(e: TaskError) -> StatusCode {
    match e {
        TaskError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        TaskError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}
