//! Public API tests
//!
//! Drives the actix-web routes end to end against a hub file on disk,
//! with a fixed GeoIP lookup standing in for the real providers.

use std::io::Write;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::http::header::{RETRY_AFTER, USER_AGENT};
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use async_trait::async_trait;
use serde_json::Value;
use tempfile::NamedTempFile;

use linkhub::api::services::{AppStartTime, health_routes, public_routes, tracking_routes};
use linkhub::config::{RateLimitConfig, TrackingConfig, VisitorConfig};
use linkhub::services::{
    DeviceDetector, GeoInfo, GeoIpLookup, GeoIpProvider, HubService, VisitTracker,
    VisitorRateLimiter,
};
use linkhub::storage::{HubStore, MemoryHubStore};

// =============================================================================
// Test Setup
// =============================================================================

const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
const CHROME: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const HUBS: &str = r##"
[[hubs]]
id = "hub-1"
slug = "creator"
title = "Creator Links"
description = "All my stuff"

[hubs.theme]
background = "#111111"
accent = "#FF0000"

[[hubs.links]]
id = "l1"
title = "Website"
url = "https://example.com"
position = 0

[[hubs.links]]
id = "l2"
title = "Shop"
url = "https://shop.example.com"
position = 1

[[hubs.links]]
id = "l3"
title = "App"
url = "https://app.example.com"
position = 2

[[hubs.rules]]
id = "mobile-app"
name = "Promote app on mobile"
rule_type = "device"
condition = { devices = ["mobile"] }
action = { action = "show", priority_boost = 20, highlight = true }
target_link_ids = ["l3"]

[[hubs.rules]]
id = "no-shop-in"
name = "Hide shop in India"
rule_type = "location"
condition = { countries = ["IN"] }
action = { action = "hide" }
target_link_ids = ["l2"]
"##;

/// 所有公网 IP 都解析为 IN
struct IndiaLookup;

#[async_trait]
impl GeoIpLookup for IndiaLookup {
    async fn lookup(&self, _ip: &str) -> Option<GeoInfo> {
        Some(GeoInfo {
            country: Some("IN".to_string()),
            city: Some("Mumbai".to_string()),
        })
    }

    fn name(&self) -> &'static str {
        "India"
    }
}

struct TestContext {
    _file: NamedTempFile,
    store: Arc<dyn HubStore>,
    hub_service: Arc<HubService>,
    tracker: Arc<VisitTracker>,
    rate_limiter: Arc<VisitorRateLimiter>,
}

fn setup(rate_limit: RateLimitConfig) -> TestContext {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(HUBS.as_bytes()).unwrap();

    let store: Arc<dyn HubStore> = Arc::new(MemoryHubStore::load_from_file(file.path()).unwrap());
    let detector = Arc::new(DeviceDetector::new());
    let hub_service = Arc::new(HubService::new(
        store.clone(),
        GeoIpProvider::with_lookup(Arc::new(IndiaLookup)),
        detector.clone(),
        VisitorConfig::default(),
    ));
    let tracker = Arc::new(VisitTracker::new(
        store.clone(),
        detector,
        &TrackingConfig::default(),
    ));

    TestContext {
        _file: file,
        store,
        hub_service,
        tracker,
        rate_limiter: Arc::new(VisitorRateLimiter::new(&rate_limit)),
    }
}

fn unlimited() -> RateLimitConfig {
    RateLimitConfig {
        enabled: false,
        ..RateLimitConfig::default()
    }
}

macro_rules! test_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($ctx.hub_service.clone()))
                .app_data(web::Data::new($ctx.tracker.clone()))
                .app_data(web::Data::new($ctx.rate_limiter.clone()))
                .app_data(web::Data::new(AppStartTime::now()))
                .service(health_routes())
                .service(public_routes())
                .service(tracking_routes()),
        )
        .await
    };
}

fn link_ids(body: &Value) -> Vec<String> {
    body["data"]["links"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["id"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Public hub
// =============================================================================

#[actix_rt::test]
async fn test_public_hub_for_mobile_visitor() {
    let ctx = setup(unlimited());
    let app = test_app!(ctx);

    // 私有地址不查 GeoIP，使用默认国家 US
    let req = TestRequest::get()
        .uri("/public/creator")
        .insert_header((USER_AGENT, IPHONE))
        .peer_addr("192.168.1.10:40000".parse().unwrap())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["title"], "Creator Links");
    assert_eq!(body["data"]["theme"]["accent"], "#FF0000");
    assert_eq!(link_ids(&body), vec!["l3", "l1", "l2"]);
    assert_eq!(body["data"]["links"][0]["is_highlighted"], true);
    // 公共响应不暴露分数
    assert!(body["data"]["links"][0].get("priority_score").is_none());
}

#[actix_rt::test]
async fn test_public_hub_for_indian_desktop_visitor() {
    let ctx = setup(unlimited());
    let app = test_app!(ctx);

    let req = TestRequest::get()
        .uri("/public/CREATOR")
        .insert_header((USER_AGENT, CHROME))
        .peer_addr("49.36.10.20:40000".parse().unwrap())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(link_ids(&body), vec!["l1", "l3"]);
}

#[actix_rt::test]
async fn test_unknown_hub_is_404() {
    let ctx = setup(unlimited());
    let app = test_app!(ctx);

    let req = TestRequest::get()
        .uri("/public/nobody")
        .peer_addr("8.8.8.8:40000".parse().unwrap())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "E005");
}

// =============================================================================
// Preview
// =============================================================================

#[actix_rt::test]
async fn test_preview_with_explicit_context() {
    let ctx = setup(unlimited());
    let app = test_app!(ctx);

    let req = TestRequest::get()
        .uri("/public/creator/preview?device=mobile&country=in")
        .peer_addr("8.8.8.8:40000".parse().unwrap())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["device"], "mobile");
    assert_eq!(body["data"]["country"], "IN");
    assert_eq!(body["data"]["rules_applied"], 2);
    assert_eq!(link_ids(&body), vec!["l3", "l1"]);
    assert_eq!(body["data"]["links"][0]["priority_score"], 1018.0);
}

#[actix_rt::test]
async fn test_preview_rejects_unknown_device() {
    let ctx = setup(unlimited());
    let app = test_app!(ctx);

    let req = TestRequest::get()
        .uri("/public/creator/preview?device=watch")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Tracking
// =============================================================================

#[actix_rt::test]
async fn test_track_visit_dedup_and_bots() {
    let ctx = setup(unlimited());
    let app = test_app!(ctx);

    let visit = |ua: &'static str| {
        TestRequest::post()
            .uri("/track/visit/creator")
            .insert_header((USER_AGENT, ua))
            .peer_addr("49.36.10.20:40000".parse().unwrap())
            .to_request()
    };

    let body: Value = test::call_and_read_body_json(&app, visit(CHROME)).await;
    assert_eq!(body["data"]["recorded"], true);

    let body: Value = test::call_and_read_body_json(&app, visit(CHROME)).await;
    assert_eq!(body["data"]["recorded"], false);
    assert_eq!(body["data"]["message"], "duplicate visit");

    let body: Value = test::call_and_read_body_json(&app, visit("Googlebot/2.1")).await;
    assert_eq!(body["data"]["recorded"], false);

    assert_eq!(ctx.store.total_visits("hub-1").await.unwrap(), 1);
}

#[actix_rt::test]
async fn test_clicks_feed_the_performance_boost() {
    let ctx = setup(unlimited());
    let app = test_app!(ctx);

    let req = TestRequest::post()
        .uri("/track/visit/creator")
        .insert_header((USER_AGENT, CHROME))
        .peer_addr("8.8.4.4:40000".parse().unwrap())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = TestRequest::post()
        .uri("/track/click/l2")
        .insert_header((USER_AGENT, CHROME))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // 1 次访问 1 次点击：l2 获得 +50，排到第一
    let preview = ctx
        .hub_service
        .preview_hub("creator", None, Some("US"))
        .await
        .unwrap();
    assert_eq!(preview.links[0].id, "l2");
    assert_eq!(preview.links[0].priority_score, 999.0 + 50.0);

    let req = TestRequest::post()
        .uri("/track/click/missing")
        .insert_header((USER_AGENT, CHROME))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Rate limiting & health
// =============================================================================

#[actix_rt::test]
async fn test_rate_limit_returns_429() {
    let ctx = setup(RateLimitConfig {
        enabled: true,
        per_minute: 1,
        burst: 2,
        max_tracked_keys: 100,
    });
    let app = test_app!(ctx);

    let request = || {
        TestRequest::get()
            .uri("/public/creator")
            .peer_addr("8.8.8.8:40000".parse().unwrap())
            .to_request()
    };

    for _ in 0..2 {
        let resp = test::call_service(&app, request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = test::call_service(&app, request()).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = resp
        .headers()
        .get(RETRY_AFTER)
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after >= 1);

    // 其他客户端不受影响
    let req = TestRequest::get()
        .uri("/public/creator")
        .peer_addr("1.1.1.1:40000".parse().unwrap())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_health() {
    let ctx = setup(unlimited());
    let app = test_app!(ctx);

    let req = TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "OK");
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["hubs_count"], 1);
    assert_eq!(body["data"]["backend"], "memory");

    let req = TestRequest::get().uri("/health/live").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}
