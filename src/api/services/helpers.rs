//! API 帮助函数

use actix_web::http::StatusCode;
use actix_web::http::header::{RETRY_AFTER, USER_AGENT};
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;
use tracing::debug;

use crate::config::get_config;
use crate::errors::LinkhubError;
use crate::services::{RateLimitDecision, VisitorRateLimiter};
use crate::utils::ip::ClientIpResolver;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code,
            message: message.into(),
            data,
        })
}

pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, "OK", "OK", Some(data))
}

pub fn error_response(status: StatusCode, code: &'static str, message: &str) -> HttpResponse {
    json_response::<()>(status, code, message, None)
}

/// 从 LinkhubError 构建错误响应
pub fn error_from_linkhub(err: &LinkhubError) -> HttpResponse {
    error_response(err.http_status(), err.code(), err.message())
}

pub fn rate_limited_response(retry_after_secs: u64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header((RETRY_AFTER, retry_after_secs.to_string()))
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse::<()> {
            code: "RATE_LIMITED",
            message: "Too many requests".to_string(),
            data: None,
        })
}

/// 客户端 IP；未注册 resolver 时按当前配置临时构建
pub fn client_ip(req: &HttpRequest) -> Option<String> {
    match req.app_data::<web::Data<ClientIpResolver>>() {
        Some(resolver) => resolver.resolve(req),
        None => ClientIpResolver::new(&get_config().server.trusted_proxies).resolve(req),
    }
}

pub fn user_agent(req: &HttpRequest) -> String {
    req.headers()
        .get(USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// 限流检查，被限流时返回 429 响应
pub fn check_rate_limit(
    limiter: &VisitorRateLimiter,
    client_ip: Option<&str>,
) -> Option<HttpResponse> {
    let key = client_ip.unwrap_or("unknown");
    match limiter.check(key) {
        RateLimitDecision::Allowed => None,
        RateLimitDecision::Limited { retry_after_secs } => {
            debug!("Rate limited {} (retry after {}s)", key, retry_after_secs);
            Some(rate_limited_response(retry_after_secs))
        }
    }
}
