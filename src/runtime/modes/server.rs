//! Server mode
//!
//! Configures and starts the HTTP server with the public, tracking and
//! health routes.

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::Result;
use tracing::{info, warn};

use crate::api::services::{AppStartTime, health_routes, public_routes, tracking_routes};
use crate::config::get_config;
use crate::runtime::lifetime;
use crate::utils::ip::ClientIpResolver;

/// Run the HTTP server
///
/// 1. Loads hubs and builds services
/// 2. Binds the configured address
/// 3. Serves until the server stops or Ctrl+C is received
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime::now();

    let startup = lifetime::startup::prepare_server_startup().await?;
    let config = get_config();

    let hub_service = startup.hub_service.clone();
    let tracker = startup.tracker.clone();
    let rate_limiter = startup.rate_limiter.clone();
    let ip_resolver = web::Data::new(ClientIpResolver::new(&config.server.trusted_proxies));

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    info!("Using {} CPU cores for the server", cpu_count);

    if config.rate_limit.enabled {
        info!(
            "Public rate limit: {}/min, burst {}",
            config.rate_limit.per_minute, config.rate_limit.burst
        );
    } else {
        warn!("Public rate limit is disabled");
    }
    if !config.server.trusted_proxies.is_empty() {
        info!(
            "Trusted proxies configured: {:?}",
            config.server.trusted_proxies
        );
    }

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .app_data(web::Data::new(hub_service.clone()))
            .app_data(web::Data::new(tracker.clone()))
            .app_data(web::Data::new(rate_limiter.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .app_data(ip_resolver.clone())
            .app_data(web::PayloadConfig::new(64 * 1024))
            .wrap(
                DefaultHeaders::new()
                    .add(("Connection", "keep-alive"))
                    .add(("Keep-Alive", "timeout=30, max=1000"))
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .service(health_routes())
            .service(public_routes())
            .service(tracking_routes())
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server
        .bind(&bind_address)
        .map_err(|e| crate::errors::LinkhubError::server_startup(format!("{}: {}", bind_address, e)))?
        .run();

    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown() => {
            warn!("Graceful shutdown complete");
        }
    }

    Ok(())
}
