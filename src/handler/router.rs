//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, body size
//! check, health probes, then asset resolution.

use crate::config::AppState;
use crate::handler::assets::{self, Conditionals};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::resolver::{ForbiddenReason, ResolutionOutcome, RouteRequest};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderValue};
use hyper::{Method, Request, Response};
use percent_encoding::percent_decode_str;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (mut response, outcome) = route_request(&req, &state).await;

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(hyper::header::SERVER, server);
    }

    if state.config.logging.access_log {
        let entry = access_entry(&req, &response, peer_addr, started, outcome);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Produce the response and its resolution label, if resolution ran
async fn route_request<B>(
    req: &Request<B>,
    state: &AppState,
) -> (Response<Full<Bytes>>, Option<&'static str>) {
    let http_config = &state.config.http;

    // 1. Check HTTP method
    if let Some(resp) = check_http_method(req.method(), http_config.enable_cors) {
        return (resp, None);
    }

    // 2. Check body size
    if let Some(resp) = check_body_size(req.headers(), http_config.max_body_size) {
        return (resp, None);
    }

    let raw_path = req.uri().path();

    // 3. Health check endpoints
    let health = &state.config.health;
    if health.enabled && (raw_path == health.liveness_path || raw_path == health.readiness_path) {
        return (http::build_health_response("ok"), None);
    }

    let conditionals = Conditionals {
        is_head: *req.method() == Method::HEAD,
        if_none_match: header_string(req.headers(), "if-none-match"),
        range: header_string(req.headers(), "range"),
    };

    // 4. Decode the path; undecodable bytes are refused like any malformed path
    let Ok(decoded) = percent_decode_str(raw_path).decode_utf8() else {
        logger::log_debug(&format!("Undecodable request path: {raw_path}"));
        let (resp, label) = assets::outcome_response(
            Ok(ResolutionOutcome::Forbidden(ForbiddenReason::MalformedPath)),
            &conditionals,
            http_config.cache_max_age,
        );
        return (resp, Some(label));
    };

    // 5. Resolve
    let request = RouteRequest::new(decoded).with_base_path(http_config.base_path.clone());
    let result = state.resolver.resolve(&request).await;
    let (resp, label) =
        assets::outcome_response(result, &conditionals, http_config.cache_max_age);
    (resp, Some(label))
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_debug(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let size_str = headers.get("content-length")?.to_str().ok()?;
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::build_413_response())
        }
        Ok(_) => None,
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            None
        }
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn access_entry<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
    outcome: Option<&'static str>,
) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    entry.referer = header_string(req.headers(), "referer");
    entry.user_agent = header_string(req.headers(), "user-agent");
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry.outcome = outcome;
    entry
}
