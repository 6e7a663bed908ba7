//! Gateway proxy adapter
//!
//! Maps a proxy-integration event (the JSON document a serverless HTTP gateway
//! hands to a function) onto the resolver, and the outcome back onto a proxy
//! response. Binary bodies travel base64-encoded with `isBase64Encoded` set.

use crate::error::ResolveError;
use crate::http::{mime, response as bodies};
use crate::logger;
use crate::resolver::{ResolutionOutcome, RouteRequest, StaticAssetResolver};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inbound proxy event; unknown fields are ignored
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEvent {
    pub path: String,
    #[serde(default = "default_method")]
    pub http_method: String,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
}

fn default_method() -> String {
    "GET".to_string()
}

/// Outbound proxy response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl GatewayResponse {
    fn text(status_code: u16, body: &str) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(
            "Content-Type".to_string(),
            "text/plain; charset=utf-8".to_string(),
        );
        Self {
            status_code,
            headers,
            body: body.to_string(),
            is_base64_encoded: false,
        }
    }

    /// Map a resolution result; refusals carry the same constant bodies as the HTTP host
    pub fn from_result(result: Result<ResolutionOutcome, ResolveError>) -> Self {
        match result {
            Ok(ResolutionOutcome::Found(asset)) => {
                let mut headers = BTreeMap::new();
                headers.insert("Content-Type".to_string(), asset.content_type.to_string());
                headers.insert("Content-Length".to_string(), asset.size.to_string());

                let textual = mime::is_textual(asset.content_type);
                let (body, is_base64_encoded) = match std::str::from_utf8(&asset.body) {
                    Ok(text) if textual => (text.to_string(), false),
                    _ => (STANDARD.encode(&asset.body), true),
                };

                Self {
                    status_code: 200,
                    headers,
                    body,
                    is_base64_encoded,
                }
            }
            Ok(ResolutionOutcome::Forbidden(_)) => Self::text(403, bodies::FORBIDDEN_BODY),
            Ok(ResolutionOutcome::NotFound(_)) => Self::text(404, bodies::NOT_FOUND_BODY),
            Err(e) => {
                logger::log_error_chain("Asset resolution failed", &e);
                Self::text(500, bodies::INTERNAL_ERROR_BODY)
            }
        }
    }
}

/// Handle one proxy event end to end
pub async fn invoke(
    resolver: &StaticAssetResolver,
    base_path: Option<&str>,
    event: &GatewayEvent,
) -> GatewayResponse {
    let method = event.http_method.to_ascii_uppercase();
    if method != "GET" && method != "HEAD" {
        let mut resp = GatewayResponse::text(405, bodies::METHOD_NOT_ALLOWED_BODY);
        resp.headers
            .insert("Allow".to_string(), "GET, HEAD".to_string());
        return resp;
    }

    let request = RouteRequest::new(event.path.as_str()).with_base_path(base_path);
    let mut resp = GatewayResponse::from_result(resolver.resolve(&request).await);
    if method == "HEAD" {
        resp.body.clear();
    }
    resp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AssetsConfig, MountConfig, PolicyConfig};
    use crate::resolver::{AccessPolicy, AssetRoot};
    use std::fs;
    use tempfile::TempDir;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0xff];

    fn resolver(tmp: &TempDir) -> StaticAssetResolver {
        let binary = tmp.path().join("binary");
        fs::create_dir_all(&binary).unwrap();
        fs::write(binary.join("png.png"), PNG).unwrap();
        fs::write(binary.join("style.css"), "body{}").unwrap();

        let assets = AssetsConfig {
            root: tmp.path().to_string_lossy().into_owned(),
            mounts: vec![MountConfig {
                prefix: "/binary".to_string(),
                dir: None,
            }],
            index_files: vec![],
        };
        StaticAssetResolver::new(
            AssetRoot::from_config(&assets).unwrap(),
            AccessPolicy::from_config(&PolicyConfig::default()).unwrap(),
            vec![],
        )
    }

    fn event(json: &str) -> GatewayEvent {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn test_binary_is_base64() {
        let tmp = TempDir::new().unwrap();
        let r = resolver(&tmp);
        let resp = invoke(&r, None, &event(r#"{"path":"/binary/png.png","httpMethod":"GET"}"#)).await;
        assert_eq!(resp.status_code, 200);
        assert!(resp.is_base64_encoded);
        assert_eq!(STANDARD.decode(&resp.body).unwrap(), PNG);
        assert_eq!(resp.headers["Content-Type"], "image/png");
    }

    #[tokio::test]
    async fn test_text_is_plain() {
        let tmp = TempDir::new().unwrap();
        let r = resolver(&tmp);
        let resp = invoke(&r, None, &event(r#"{"path":"/binary/style.css"}"#)).await;
        assert_eq!(resp.status_code, 200);
        assert!(!resp.is_base64_encoded);
        assert_eq!(resp.body, "body{}");
    }

    #[tokio::test]
    async fn test_refusals() {
        let tmp = TempDir::new().unwrap();
        let r = resolver(&tmp);
        let forbidden = invoke(&r, None, &event(r#"{"path":"/ff404.png"}"#)).await;
        assert_eq!(forbidden.status_code, 403);
        assert_eq!(forbidden.body, bodies::FORBIDDEN_BODY);

        let missing = invoke(&r, None, &event(r#"{"path":"/binary/404-png.png"}"#)).await;
        assert_eq!(missing.status_code, 404);

        let post = invoke(&r, None, &event(r#"{"path":"/binary/png.png","httpMethod":"POST"}"#)).await;
        assert_eq!(post.status_code, 405);
    }

    #[tokio::test]
    async fn test_base_path_and_extra_fields() {
        let tmp = TempDir::new().unwrap();
        let r = resolver(&tmp);
        let ev = event(
            r#"{"path":"/dev/binary/png.png","httpMethod":"HEAD","headers":{"Accept":"*/*"},"requestContext":{"stage":"dev"}}"#,
        );
        let resp = invoke(&r, Some("/dev"), &ev).await;
        assert_eq!(resp.status_code, 200);
        assert!(resp.body.is_empty());
    }

    #[test]
    fn test_response_serialization() {
        let resp = GatewayResponse::text(404, bodies::NOT_FOUND_BODY);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["statusCode"], 404);
        assert_eq!(json["isBase64Encoded"], false);
        assert_eq!(json["body"], "404 Not Found");
    }
}
