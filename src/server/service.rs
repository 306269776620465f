//! Module with the service that implements ALL the functionality.

use std::convert::Infallible;
use std::hash::Hash;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::{Body, Method, Request, Response, Server, StatusCode};
use hyper::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::server::conn::AddrStream;
use hyper::service::{make_service_fn, service_fn};
use memegen::ThreadSafeCache;
use serde_json::Value as Json;
use time::precise_time_s;
use tokio::signal;
use tokio::sync::watch;

use crate::handlers::{render_meme, Backend};
use crate::handlers::list::list_fonts;
use crate::handlers::memes::{list_memes, random_meme};
use crate::handlers::util::{empty_response, json_response};


/// Run the HTTP server on given address until it's interrupted with Ctrl+C.
///
/// After the interruption, pending connections have up to `shutdown_timeout`
/// to finish (zero means waiting for as long as it takes).
pub async fn serve(addr: SocketAddr,
                   backend: Arc<Backend>,
                   shutdown_timeout: Duration) -> Result<(), hyper::Error> {
    let make_service = make_service_fn(move |conn: &AddrStream| {
        let remote = conn.remote_addr();
        let backend = backend.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| handle(backend.clone(), remote, req)))
        }
    });

    let (stop_tx, stop_rx) = watch::channel(false);
    let server = Server::try_bind(&addr)?
        .serve(make_service)
        .with_graceful_shutdown(stopped(stop_rx.clone()));
    info!("Starting server to listen on {}...", addr);

    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, shutting down the server...");
                let _ = stop_tx.send(true);
            }
            Err(e) => {
                error!("Cannot listen for the interrupt signal: {}", e);
                // Keep the sender alive so the server doesn't see a shutdown.
                std::future::pending::<()>().await;
                drop(stop_tx);
            }
        }
    });

    tokio::select! {
        result = server => {
            info!("Server stopped");
            result
        }
        _ = shutdown_deadline(stop_rx, shutdown_timeout) => {
            warn!("Pending connections didn't finish in {} secs, terminating",
                shutdown_timeout.as_secs());
            Ok(())
        }
    }
}

/// Resolve once the stop signal has been sent.
async fn stopped(mut rx: watch::Receiver<bool>) {
    while !*rx.borrow() {
        if rx.changed().await.is_err() {
            return;
        }
    }
}

/// Resolve when the stop signal was sent and then `timeout` elapsed.
async fn shutdown_deadline(rx: watch::Receiver<bool>, timeout: Duration) {
    if timeout.as_secs() == 0 {
        debug!("No shutdown timeout, server will wait for all connections to finish");
        return std::future::pending().await;
    }
    stopped(rx).await;
    tokio::time::sleep(timeout).await;
}


/// Serve a single HTTP request.
async fn handle(backend: Arc<Backend>,
                remote: SocketAddr,
                req: Request<Body>) -> Result<Response<Body>, Infallible> {
    log_request(&remote, &req);

    let start = precise_time_s();
    let mut resp = route(backend, req).await;
    fix_headers(&mut resp);

    let finish = precise_time_s();
    debug!("HTTP {status}, produced {len} bytes of {ctype} in {time:.3} secs",
        status = resp.status(),
        len = resp.headers().get(CONTENT_LENGTH)
            .and_then(|l| l.to_str().ok())
            .unwrap_or("unknown number of"),
        ctype = resp.headers().get(CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("unknown type"),
        time = finish - start);
    Ok(resp)
}

async fn route(backend: Arc<Backend>, req: Request<Body>) -> Response<Body> {
    match (req.method(), req.uri().path()) {
        (_, "/render") => render_meme(backend, req).await,
        (&Method::GET, "/api/memes") => list_memes(backend).await,
        (&Method::GET, "/api/memes/random") => random_meme(backend).await,
        (&Method::GET, "/fonts") => list_fonts(backend),
        (&Method::GET, "/stats") => stats(&backend),
        _ => {
            debug!("Path {} doesn't match any endpoint", req.uri().path());
            empty_response(StatusCode::NOT_FOUND)
        }
    }
}

/// Handle the server statistics request.
fn stats(backend: &Backend) -> Response<Body> {
    let stats = json!({
        "cache": {
            "fonts": cache_stats(backend.compositor().fonts().cache()),
        }
    });
    return json_response(stats);

    fn cache_stats<K: Eq + Hash, V>(cache: &ThreadSafeCache<K, V>) -> Json {
        json!({
            "len": cache.len(),
            "misses": cache.misses(),
            "hits": cache.hits(),
        })
    }
}


#[inline]
fn log_request(remote: &SocketAddr, req: &Request<Body>) {
    info!("{} {} {}{} {:?}",
        remote.ip(),
        req.method().as_str().to_uppercase(),
        req.uri().path(),
        req.uri().query().map(|q| format!("?{}", q)).unwrap_or_else(String::new),
        req.version());
}

/// Fix headers in the response, providing default values where necessary.
fn fix_headers(resp: &mut Response<Body>) {
    if !resp.headers().contains_key(CONTENT_TYPE) {
        resp.headers_mut().insert(
            CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"));
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hyper::{Body, Method, Request, StatusCode};
    use hyper::header::CONTENT_TYPE;
    use spectral::prelude::*;

    use crate::handlers::tests::{backend, FakeUpstream};
    use crate::handlers::util::tests::json_body;
    use super::route;

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn unknown_path() {
        let backend = Arc::new(backend(FakeUpstream::default()));
        let response = route(backend, request(Method::GET, "/caption")).await;
        assert_that!(response.status()).is_equal_to(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn listing_needs_get() {
        let backend = Arc::new(backend(FakeUpstream::default()));
        let response = route(backend, request(Method::POST, "/api/memes")).await;
        assert_that!(response.status()).is_equal_to(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn stats() {
        let backend = Arc::new(backend(FakeUpstream::default()));
        let response = route(backend, request(Method::GET, "/stats")).await;
        assert_that!(response.status()).is_equal_to(StatusCode::OK);
        assert_that!(response.headers()[CONTENT_TYPE].to_str().unwrap())
            .is_equal_to("application/json");

        let body = json_body(response).await;
        assert_that!(body["cache"]["fonts"]["len"].as_u64()).is_equal_to(Some(0));
        assert_that!(body["cache"]["fonts"]["hits"].as_u64()).is_equal_to(Some(0));
    }
}
