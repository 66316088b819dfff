//! Health endpoints
//!
//! `/health` reports store reachability and uptime inside the usual API
//! envelope; `/health/live` is a bodiless liveness probe.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, trace};

use super::helpers::json_response;
use crate::services::HubService;

const STORE_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: DateTime<Utc>,
}

impl AppStartTime {
    pub fn now() -> Self {
        Self {
            start_datetime: Utc::now(),
        }
    }

    fn uptime_secs(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((now - self.start_datetime).num_seconds()).unwrap_or(0)
    }
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub timestamp: String,
    pub uptime: u64,
    pub backend: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hubs_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub response_time_ms: u64,
}

pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        hubs: web::Data<Arc<HubService>>,
        started: web::Data<AppStartTime>,
    ) -> impl Responder {
        let timer = Instant::now();
        let store = hubs.store();

        let probe = tokio::time::timeout(STORE_CHECK_TIMEOUT, store.hub_count()).await;
        let (hubs_count, failure) = match probe {
            Ok(Ok(count)) => (Some(count), None),
            Ok(Err(e)) => (None, Some(e.to_string())),
            Err(_) => (None, Some("hub store timed out".to_string())),
        };
        if let Some(ref reason) = failure {
            error!("Health check failed: {}", reason);
        }

        let now = Utc::now();
        let report = HealthReport {
            status: if failure.is_none() { "healthy" } else { "unhealthy" },
            timestamp: now.to_rfc3339(),
            uptime: started.uptime_secs(now),
            backend: store.backend_name(),
            hubs_count,
            error: failure,
            response_time_ms: timer.elapsed().as_millis() as u64,
        };
        debug!("Health check: {} in {:?}", report.status, timer.elapsed());

        let (status, code) = match report.error {
            None => (StatusCode::OK, "OK"),
            Some(_) => (StatusCode::SERVICE_UNAVAILABLE, "UNHEALTHY"),
        };
        json_response(status, code, report.status, Some(report))
    }

    pub async fn liveness_check() -> impl Responder {
        trace!("Liveness probe");
        HttpResponse::NoContent().finish()
    }
}

pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/live", web::head().to(HealthService::liveness_check))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uptime_never_negative() {
        let started = AppStartTime::now();
        let earlier = started.start_datetime - chrono::Duration::seconds(10);
        assert_eq!(started.uptime_secs(earlier), 0);
        let later = started.start_datetime + chrono::Duration::seconds(42);
        assert_eq!(started.uptime_secs(later), 42);
    }
}
