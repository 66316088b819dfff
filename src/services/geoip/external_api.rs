//! HTTP GeoIP lookup (ip-api.com compatible)
//!
//! Results, including misses, are kept in a bounded moka cache so a busy
//! hub does not hammer the API; concurrent lookups for one IP share a
//! single request.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde_json::Value;
use tracing::{debug, trace, warn};
use ureq::Agent;

use super::provider::{GeoInfo, GeoIpLookup};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

pub struct ExternalApiProvider {
    /// `{ip}` 为占位符
    url_template: String,
    agent: Agent,
    cache: Cache<String, Option<GeoInfo>>,
}

impl ExternalApiProvider {
    pub fn new(api_url_template: &str, cache_capacity: u64, cache_ttl: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build()
            .into();

        Self {
            url_template: api_url_template.to_string(),
            agent,
            cache: Cache::builder()
                .max_capacity(cache_capacity)
                .time_to_live(cache_ttl)
                .build(),
        }
    }

    fn request_url(&self, ip: &str) -> String {
        self.url_template.replace("{ip}", ip)
    }

    /// `{"status":"fail"}` 视为未命中；国家代码兼容 `countryCode` / `country_code`
    fn parse_response(body: &Value) -> Option<GeoInfo> {
        if body.get("status").and_then(Value::as_str) == Some("fail") {
            return None;
        }

        let country = ["countryCode", "country_code"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
            .filter(|code| code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()))
            .map(str::to_ascii_uppercase);
        let city = body.get("city").and_then(Value::as_str).map(String::from);

        Some(GeoInfo { country, city })
    }

    // ureq 是阻塞 IO
    fn fetch_blocking(agent: &Agent, url: &str) -> Option<GeoInfo> {
        let body: Value = agent
            .get(url)
            .call()
            .and_then(|resp| resp.into_body().read_json())
            .map_err(|e| warn!("GeoIP request {} failed: {}", url, e))
            .ok()?;
        Self::parse_response(&body)
    }

    async fn fetch(&self, ip: &str) -> Option<GeoInfo> {
        let url = self.request_url(ip);
        let agent = self.agent.clone();
        match tokio::task::spawn_blocking(move || Self::fetch_blocking(&agent, &url)).await {
            Ok(info) => info,
            Err(e) => {
                warn!("GeoIP lookup task failed: {}", e);
                None
            }
        }
    }

    /// 缓存条目数（近似值）
    pub fn cached_entries(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait]
impl GeoIpLookup for ExternalApiProvider {
    async fn lookup(&self, ip: &str) -> Option<GeoInfo> {
        self.cache
            .get_with(ip.to_string(), async {
                trace!("GeoIP cache miss for {}", ip);
                let info = self.fetch(ip).await;
                debug!("GeoIP {} -> {:?}", ip, info.as_ref().and_then(|g| g.country.as_deref()));
                info
            })
            .await
    }

    fn name(&self) -> &'static str {
        "ExternalAPI"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_success() {
        let geo = ExternalApiProvider::parse_response(&json!({"status": "success", "countryCode": "in"}))
            .unwrap();
        assert_eq!(geo.country.as_deref(), Some("IN"));
        assert!(geo.city.is_none());
    }

    #[test]
    fn test_parse_fail_and_garbage() {
        assert!(ExternalApiProvider::parse_response(&json!({"status": "fail"})).is_none());
        let geo = ExternalApiProvider::parse_response(&json!({"countryCode": "India"})).unwrap();
        assert!(geo.country.is_none());
    }

    #[test]
    fn test_parse_snake_case_fields() {
        let geo = ExternalApiProvider::parse_response(&json!({"country_code": "de", "city": "Berlin"}))
            .unwrap();
        assert_eq!(geo.country.as_deref(), Some("DE"));
        assert_eq!(geo.city.as_deref(), Some("Berlin"));
    }

    #[test]
    fn test_request_url() {
        let provider = ExternalApiProvider::new(
            "https://geo.example/{ip}/json",
            10,
            Duration::from_secs(1),
        );
        assert_eq!(provider.request_url("1.2.3.4"), "https://geo.example/1.2.3.4/json");
        assert_eq!(provider.cached_entries(), 0);
    }

    /// 需要外网
    #[tokio::test]
    #[ignore]
    async fn test_live_lookup_is_cached() {
        let provider = ExternalApiProvider::new(
            "http://ip-api.com/json/{ip}?fields=status,countryCode",
            100,
            Duration::from_secs(60),
        );
        let first = provider.lookup("8.8.8.8").await;
        assert_eq!(first.as_ref().and_then(|g| g.country.as_deref()), Some("US"));
        assert_eq!(provider.lookup("8.8.8.8").await, first);
    }
}
