//! Asset response module
//!
//! Turns a resolution result into an HTTP response: 200/206/304/416 for found
//! assets, constant-body 403/404 for refusals and 500 for internal faults.

use crate::error::ResolveError;
use crate::http::{self, cache, AssetHeaders, RangeParseResult};
use crate::logger;
use crate::resolver::{Asset, ResolutionOutcome};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

/// Conditional and range headers of the request
#[derive(Debug, Default, Clone)]
pub struct Conditionals {
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub range: Option<String>,
}

/// Response plus the classification label for the access log
pub fn outcome_response(
    result: Result<ResolutionOutcome, ResolveError>,
    conditionals: &Conditionals,
    cache_max_age: u32,
) -> (Response<Full<Bytes>>, &'static str) {
    match result {
        Ok(ResolutionOutcome::Found(asset)) => (
            asset_response(&asset, conditionals, cache_max_age),
            "found",
        ),
        Ok(ResolutionOutcome::Forbidden(_)) => (http::build_403_response(), "forbidden"),
        Ok(ResolutionOutcome::NotFound(_)) => (http::build_404_response(), "not_found"),
        Err(e) => {
            logger::log_error_chain("Asset resolution failed", &e);
            (http::build_500_response(), "error")
        }
    }
}

/// Build the response for a found asset with `ETag` and Range support
fn asset_response(
    asset: &Asset,
    conditionals: &Conditionals,
    cache_max_age: u32,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(&asset.body);

    if cache::check_etag_match(conditionals.if_none_match.as_deref(), &etag) {
        return http::build_304_response(&etag, cache_max_age);
    }

    let headers = AssetHeaders {
        content_type: asset.content_type,
        etag: &etag,
        cache_max_age,
    };

    match http::parse_range_header(conditionals.range.as_deref(), asset.size) {
        RangeParseResult::Valid(range) => {
            http::build_partial_response(&asset.body, range, headers, conditionals.is_head)
        }
        RangeParseResult::NotSatisfiable => http::build_416_response(asset.size),
        RangeParseResult::None => {
            http::build_asset_response(asset.body.clone(), headers, conditionals.is_head)
        }
    }
}
