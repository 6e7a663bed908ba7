//! HTTP response building module
//!
//! Builders for each status the gateway answers with. Failure bodies are
//! constants so that a refusal never says more than its status code.

use super::cache;
use super::range::ByteRange;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

pub const FORBIDDEN_BODY: &str = "403 Forbidden";
pub const NOT_FOUND_BODY: &str = "404 Not Found";
pub const METHOD_NOT_ALLOWED_BODY: &str = "405 Method Not Allowed";
pub const PAYLOAD_TOO_LARGE_BODY: &str = "413 Payload Too Large";
pub const RANGE_NOT_SATISFIABLE_BODY: &str = "416 Range Not Satisfiable";
pub const INTERNAL_ERROR_BODY: &str = "500 Internal Server Error";

pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Headers shared by full and partial asset responses
#[derive(Debug, Clone, Copy)]
pub struct AssetHeaders<'a> {
    pub content_type: &'a str,
    pub etag: &'a str,
    pub cache_max_age: u32,
}

/// Build a plain-text response with a fixed body
pub fn build_text_response(status: u16, body: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Length", body.len())
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap_or_else(|e| fallback(status, &e))
}

/// Build 403 Forbidden response
pub fn build_403_response() -> Response<Full<Bytes>> {
    build_text_response(403, FORBIDDEN_BODY)
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_text_response(404, NOT_FOUND_BODY)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    let mut resp = build_text_response(405, METHOD_NOT_ALLOWED_BODY);
    resp.headers_mut().insert(
        hyper::header::ALLOW,
        hyper::header::HeaderValue::from_static(ALLOWED_METHODS),
    );
    resp
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    build_text_response(413, PAYLOAD_TOO_LARGE_BODY)
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(total_size: usize) -> Response<Full<Bytes>> {
    Response::builder()
        .status(416)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Range", format!("bytes */{total_size}"))
        .body(Full::new(Bytes::from_static(
            RANGE_NOT_SATISFIABLE_BODY.as_bytes(),
        )))
        .unwrap_or_else(|e| fallback(416, &e))
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<Full<Bytes>> {
    build_text_response(500, INTERNAL_ERROR_BODY)
}

/// Build health probe response
pub fn build_health_response(status: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(200)
        .header("Content-Type", "text/plain")
        .header("Cache-Control", "no-cache")
        .body(Full::new(Bytes::from_static(status.as_bytes())))
        .unwrap_or_else(|e| fallback(200, &e))
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(204)
        .header("Allow", ALLOWED_METHODS);

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
            .header("Access-Control-Allow-Headers", "Content-Type, Range, If-None-Match")
            .header("Access-Control-Max-Age", "86400");
    }

    builder
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| fallback(204, &e))
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str, cache_max_age: u32) -> Response<Full<Bytes>> {
    Response::builder()
        .status(304)
        .header("ETag", etag)
        .header("Cache-Control", cache::public_cache_control(cache_max_age))
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| fallback(304, &e))
}

/// Build 200 asset response; HEAD keeps the headers and drops the body
pub fn build_asset_response(
    data: Bytes,
    headers: AssetHeaders<'_>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    Response::builder()
        .status(200)
        .header("Content-Type", headers.content_type)
        .header("Content-Length", content_length)
        .header("Accept-Ranges", "bytes")
        .header("ETag", headers.etag)
        .header("Cache-Control", cache::public_cache_control(headers.cache_max_age))
        .body(Full::new(body))
        .unwrap_or_else(|e| fallback(200, &e))
}

/// Build 206 Partial Content response
pub fn build_partial_response(
    data: &Bytes,
    range: ByteRange,
    headers: AssetHeaders<'_>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let body = if is_head { Bytes::new() } else { range.slice(data) };

    Response::builder()
        .status(206)
        .header("Content-Type", headers.content_type)
        .header("Content-Length", range.len())
        .header("Content-Range", range.content_range(data.len()))
        .header("Accept-Ranges", "bytes")
        .header("ETag", headers.etag)
        .header("Cache-Control", cache::public_cache_control(headers.cache_max_age))
        .body(Full::new(body))
        .unwrap_or_else(|e| fallback(206, &e))
}

/// Log the builder error and answer with a bare response
fn fallback(status: u16, error: &hyper::http::Error) -> Response<Full<Bytes>> {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
    Response::new(Full::new(Bytes::new()))
}
