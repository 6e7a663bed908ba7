//! End-to-end resolution against the published acceptance matrix.
//!
//! Layout: `/binary` is the only mount, holding a few binary assets and a
//! `subdir`. Everything outside a mount is forbidden; missing files under the
//! mount are not found.

use asset_gate::config::{AssetsConfig, MountConfig, PolicyConfig, PolicyRule, RuleAction};
use asset_gate::gateway::{self, GatewayEvent};
use asset_gate::resolver::{
    AccessPolicy, AssetRoot, ForbiddenReason, ResolutionOutcome, RouteRequest,
    StaticAssetResolver,
};
use base64::Engine;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PNG: &[u8] = &[0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d];
const JPG: &[u8] = &[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, 0x4a, 0x46, 0x49, 0x46];
const WOFF2: &[u8] = &[0x77, 0x4f, 0x46, 0x32, 0x00, 0x01, 0x00, 0x00, 0xfe, 0xed];

fn write_site(root: &Path) {
    let binary = root.join("binary");
    fs::create_dir_all(binary.join("subdir")).unwrap();
    fs::write(binary.join("png.png"), PNG).unwrap();
    fs::write(binary.join("jpg.jpg"), JPG).unwrap();
    fs::write(binary.join("glyphicons-halflings-regular.woff2"), WOFF2).unwrap();
    fs::write(binary.join("subdir/png.png"), PNG).unwrap();
    // Same names outside the mount must stay unreachable
    fs::create_dir_all(root.join("subdir")).unwrap();
    fs::write(root.join("ff404.png"), PNG).unwrap();
    fs::write(root.join("subdir/ff404.png"), PNG).unwrap();
}

fn resolver(root: &Path, rules: Vec<PolicyRule>) -> StaticAssetResolver {
    let assets = AssetsConfig {
        root: root.to_string_lossy().into_owned(),
        mounts: vec![MountConfig {
            prefix: "/binary".to_string(),
            dir: None,
        }],
        index_files: vec![],
    };
    StaticAssetResolver::new(
        AssetRoot::from_config(&assets).unwrap(),
        AccessPolicy::from_config(&PolicyConfig {
            deny_hidden: true,
            rules,
        })
        .unwrap(),
        vec![],
    )
}

const MATRIX: &[(&str, u16)] = &[
    ("/binary/png.png", 200),
    ("/binary/jpg.jpg", 200),
    ("/binary/glyphicons-halflings-regular.woff2", 200),
    ("/binary/subdir/png.png", 200),
    ("/ff404.png", 403),
    ("/jpeg404.jpg", 403),
    ("/subdir404/ff.png", 403),
    ("/subdir/ff404.png", 403),
    ("/binary/404-glyphicons-halflings-regular.woff2", 404),
    ("/binary/subdir/404-png.png", 404),
];

#[tokio::test]
async fn test_acceptance_matrix() {
    let tmp = TempDir::new().unwrap();
    write_site(tmp.path());
    let r = resolver(tmp.path(), vec![]);

    for &(path, expected) in MATRIX {
        let outcome = r.resolve_path(path).await.unwrap();
        assert_eq!(outcome.status(), expected, "{path} -> {outcome:?}");
    }
}

#[tokio::test]
async fn test_found_assets_are_byte_identical_with_content_types() {
    let tmp = TempDir::new().unwrap();
    write_site(tmp.path());
    let r = resolver(tmp.path(), vec![]);

    for (path, bytes, content_type) in [
        ("/binary/png.png", PNG, "image/png"),
        ("/binary/jpg.jpg", JPG, "image/jpeg"),
        ("/binary/glyphicons-halflings-regular.woff2", WOFF2, "font/woff2"),
        ("/binary/subdir/png.png", PNG, "image/png"),
    ] {
        match r.resolve_path(path).await.unwrap() {
            ResolutionOutcome::Found(asset) => {
                assert_eq!(asset.body.as_ref(), bytes, "{path}");
                assert_eq!(asset.size, bytes.len());
                assert_eq!(asset.content_type, content_type);
            }
            other => panic!("{path}: expected Found, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_denied_pattern_does_not_disclose_existence() {
    let tmp = TempDir::new().unwrap();
    write_site(tmp.path());
    let r = resolver(
        tmp.path(),
        vec![PolicyRule {
            action: RuleAction::Deny,
            path: None,
            prefix: None,
            glob: Some("binary/subdir/*".to_string()),
        }],
    );

    let existing = r.resolve_path("/binary/subdir/png.png").await.unwrap();
    let missing = r.resolve_path("/binary/subdir/404-png.png").await.unwrap();
    assert_eq!(existing, missing);
    assert!(matches!(
        existing,
        ResolutionOutcome::Forbidden(ForbiddenReason::DeniedByRule(_))
    ));

    // Unrouted paths are forbidden whether or not a file sits at that location
    let present = r.resolve_path("/ff404.png").await.unwrap();
    let absent = r.resolve_path("/jpeg404.jpg").await.unwrap();
    assert_eq!(present, absent);
}

#[tokio::test]
async fn test_traversal_never_found() {
    let tmp = TempDir::new().unwrap();
    write_site(tmp.path());
    let r = resolver(tmp.path(), vec![]);

    for path in [
        "/binary/../ff404.png",
        "/binary/subdir/../../subdir/ff404.png",
        "/../../../../etc/passwd",
        "/binary/./../binary/../../ff404.png",
    ] {
        let outcome = r.resolve_path(path).await.unwrap();
        assert!(!outcome.is_found(), "{path} -> {outcome:?}");
        assert_eq!(outcome.status(), 403, "{path}");
    }
}

#[tokio::test]
async fn test_repeated_resolution_is_stable() {
    let tmp = TempDir::new().unwrap();
    write_site(tmp.path());
    let r = resolver(tmp.path(), vec![]);

    for &(path, _) in MATRIX {
        let a = r.resolve_path(path).await.unwrap();
        let b = r.resolve_path(path).await.unwrap();
        assert_eq!(a, b, "{path}");
    }
}

#[tokio::test]
async fn test_concurrent_resolution_shares_one_resolver() {
    let tmp = TempDir::new().unwrap();
    write_site(tmp.path());
    let r = std::sync::Arc::new(resolver(tmp.path(), vec![]));

    let mut tasks = Vec::new();
    for _ in 0..8 {
        for &(path, expected) in MATRIX {
            let r = std::sync::Arc::clone(&r);
            tasks.push(tokio::spawn(async move {
                let outcome = r.resolve(&RouteRequest::new(path)).await.unwrap();
                assert_eq!(outcome.status(), expected, "{path}");
            }));
        }
    }
    for t in tasks {
        t.await.unwrap();
    }
}

#[tokio::test]
async fn test_gateway_matrix_with_stage_base_path() {
    let tmp = TempDir::new().unwrap();
    write_site(tmp.path());
    let r = resolver(tmp.path(), vec![]);

    for &(path, expected) in MATRIX {
        let event: GatewayEvent =
            serde_json::from_value(serde_json::json!({ "path": format!("/dev{path}") })).unwrap();
        let resp = gateway::invoke(&r, Some("/dev"), &event).await;
        assert_eq!(resp.status_code, expected, "{path}");
        if expected == 200 {
            assert!(resp.is_base64_encoded);
            let decoded = base64::engine::general_purpose::STANDARD
                .decode(&resp.body)
                .unwrap();
            assert!(!decoded.is_empty());
        }
    }
}
