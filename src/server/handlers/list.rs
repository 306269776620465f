//! Module with the handlers for listing available resources.

use std::sync::Arc;

use hyper::{Body, Response};

use super::backend::Backend;
use super::util::json_response;


/// Handle the font listing request.
pub fn list_fonts(backend: Arc<Backend>) -> Response<Body> {
    debug!("Listing all available fonts...");
    let fonts: Vec<_> = backend.compositor().fonts().available().into_iter()
        .map(|f| f.css_name())
        .collect();
    debug!("{} font(s) found", fonts.len());
    json_response(json!(fonts))
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hyper::StatusCode;
    use spectral::prelude::*;

    use crate::handlers::tests::{backend, FakeUpstream};
    use crate::handlers::util::tests::json_body;
    use super::list_fonts;

    #[tokio::test]
    async fn no_fonts() {
        let response = list_fonts(Arc::new(backend(FakeUpstream::default())));
        assert_that!(response.status()).is_equal_to(StatusCode::OK);
        assert_that!(json_body(response).await).is_equal_to(json!([]));
    }
}
