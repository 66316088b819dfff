use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::get_config;
use crate::services::{DeviceDetector, GeoIpProvider, HubService, VisitTracker, VisitorRateLimiter};
use crate::storage::{HubStore, StorageFactory};

/// 服务器运行所需的共享组件
pub struct StartupContext {
    pub store: Arc<dyn HubStore>,
    pub hub_service: Arc<HubService>,
    pub tracker: Arc<VisitTracker>,
    pub rate_limiter: Arc<VisitorRateLimiter>,
}

impl StartupContext {
    /// 由已加载的 store 组装其余服务
    pub fn build(store: Arc<dyn HubStore>, geoip: GeoIpProvider) -> Self {
        let config = get_config();
        let detector = Arc::new(DeviceDetector::new());

        let hub_service = Arc::new(HubService::new(
            store.clone(),
            geoip,
            detector.clone(),
            config.visitor.clone(),
        ));
        let tracker = Arc::new(VisitTracker::new(
            store.clone(),
            detector,
            &config.tracking,
        ));
        let rate_limiter = Arc::new(VisitorRateLimiter::new(&config.rate_limit));

        Self {
            store,
            hub_service,
            tracker,
            rate_limiter,
        }
    }
}

/// 准备服务器启动的上下文
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let config = get_config();

    if config.visitor.default_timezone.parse::<chrono_tz::Tz>().is_err() {
        warn!(
            "visitor.default_timezone '{}' is not a valid IANA timezone, time rules without their own timezone will not match",
            config.visitor.default_timezone
        );
    }

    let store = StorageFactory::create()
        .with_context(|| format!("Failed to load hub file {}", config.hubs.file))?;
    info!(
        "Using hub store: {} ({} hubs)",
        store.backend_name(),
        store.hub_count().await.context("Failed to count hubs")?
    );

    let geoip = GeoIpProvider::new(&config.geoip);
    let context = StartupContext::build(store, geoip);

    debug!("Pre-startup processing completed in {:?}", start_time.elapsed());
    Ok(context)
}
