//! Public hub endpoints

use std::str::FromStr;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::Deserialize;
use tracing::{debug, error, trace};

use super::helpers::{
    check_rate_limit, client_ip, error_from_linkhub, error_response, success_response, user_agent,
};
use crate::engine::DeviceClass;
use crate::errors::LinkhubError;
use crate::services::{HubService, VisitorInfo, VisitorRateLimiter};

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub device: Option<String>,
    pub country: Option<String>,
}

pub struct PublicService;

impl PublicService {
    pub async fn get_hub(
        req: HttpRequest,
        path: web::Path<String>,
        hubs: web::Data<Arc<HubService>>,
        limiter: web::Data<Arc<VisitorRateLimiter>>,
    ) -> impl Responder {
        let slug = path.into_inner();
        let ip = client_ip(&req);
        if let Some(resp) = check_rate_limit(&limiter, ip.as_deref()) {
            return resp;
        }

        let visitor = VisitorInfo {
            ip,
            user_agent: user_agent(&req),
        };
        trace!("Public hub request: {} from {:?}", slug, visitor.ip);

        match hubs.public_hub(&slug, &visitor).await {
            Ok(hub) => success_response(hub),
            Err(e) => Self::failure(&slug, e),
        }
    }

    pub async fn preview_hub(
        req: HttpRequest,
        path: web::Path<String>,
        query: web::Query<PreviewQuery>,
        hubs: web::Data<Arc<HubService>>,
        limiter: web::Data<Arc<VisitorRateLimiter>>,
    ) -> impl Responder {
        let slug = path.into_inner();
        if let Some(resp) = check_rate_limit(&limiter, client_ip(&req).as_deref()) {
            return resp;
        }

        let device = match query.device.as_deref().map(DeviceClass::from_str) {
            None => None,
            Some(Ok(device)) => Some(device),
            Some(Err(_)) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "E004",
                    "device must be one of: mobile, tablet, desktop",
                );
            }
        };

        match hubs
            .preview_hub(&slug, device, query.country.as_deref())
            .await
        {
            Ok(preview) => success_response(preview),
            Err(e) => Self::failure(&slug, e),
        }
    }

    fn failure(slug: &str, err: LinkhubError) -> HttpResponse {
        match err {
            LinkhubError::NotFound(_) => debug!("Hub not found: {}", slug),
            ref e => error!("Failed to render hub {}: {}", slug, e),
        }
        error_from_linkhub(&err)
    }
}

/// Public 路由配置
pub fn public_routes() -> actix_web::Scope {
    web::scope("/public")
        .route("/{slug}", web::get().to(PublicService::get_hub))
        .route("/{slug}/preview", web::get().to(PublicService::preview_hub))
}
