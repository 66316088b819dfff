//! Visit / click tracking endpoints

use std::sync::Arc;

use actix_web::{HttpRequest, Responder, web};
use tracing::{error, trace};

use super::helpers::{check_rate_limit, client_ip, error_from_linkhub, success_response, user_agent};
use crate::errors::LinkhubError;
use crate::services::{VisitTracker, VisitorRateLimiter};

pub struct TrackingService;

impl TrackingService {
    pub async fn track_visit(
        req: HttpRequest,
        path: web::Path<String>,
        tracker: web::Data<Arc<VisitTracker>>,
        limiter: web::Data<Arc<VisitorRateLimiter>>,
    ) -> impl Responder {
        let slug = path.into_inner();
        let ip = client_ip(&req);
        if let Some(resp) = check_rate_limit(&limiter, ip.as_deref()) {
            return resp;
        }

        match tracker
            .track_visit(&slug, ip.as_deref(), &user_agent(&req))
            .await
        {
            Ok(outcome) => {
                trace!("Visit {}: {}", slug, outcome.message);
                success_response(outcome)
            }
            Err(e) => {
                if !matches!(e, LinkhubError::NotFound(_)) {
                    error!("Failed to track visit for {}: {}", slug, e);
                }
                error_from_linkhub(&e)
            }
        }
    }

    pub async fn track_click(
        req: HttpRequest,
        path: web::Path<String>,
        tracker: web::Data<Arc<VisitTracker>>,
        limiter: web::Data<Arc<VisitorRateLimiter>>,
    ) -> impl Responder {
        let link_id = path.into_inner();
        if let Some(resp) = check_rate_limit(&limiter, client_ip(&req).as_deref()) {
            return resp;
        }

        match tracker.track_click(&link_id, &user_agent(&req)).await {
            Ok(outcome) => {
                trace!("Click {}: {}", link_id, outcome.message);
                success_response(outcome)
            }
            Err(e) => {
                if !matches!(e, LinkhubError::NotFound(_)) {
                    error!("Failed to track click for {}: {}", link_id, e);
                }
                error_from_linkhub(&e)
            }
        }
    }
}

pub fn tracking_routes() -> actix_web::Scope {
    web::scope("/track")
        .route("/visit/{slug}", web::post().to(TrackingService::track_visit))
        .route("/click/{link_id}", web::post().to(TrackingService::track_click))
}
