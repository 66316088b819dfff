//! GeoIP Provider 抽象层
//!
//! 统一的 GeoIP 查询接口，根据配置自动选择实现：
//! 1. geoip.enabled = false → 不查询，始终使用默认国家
//! 2. maxminddb_path 配置且可读 → MaxMindProvider
//! 3. 否则 → ExternalApiProvider

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, trace, warn};

use super::external_api::ExternalApiProvider;
use super::maxmind::MaxMindProvider;
use crate::config::GeoIpConfig;
use crate::utils::ip::is_private_or_local;

/// 地理位置信息
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoInfo {
    /// ISO 3166-1 alpha-2 国家代码 (e.g., "IN", "US")
    pub country: Option<String>,
    /// 城市名称
    pub city: Option<String>,
}

/// GeoIP 查询 trait
#[async_trait]
pub trait GeoIpLookup: Send + Sync {
    /// 查询 IP 地址的地理位置
    async fn lookup(&self, ip: &str) -> Option<GeoInfo>;

    /// 获取 provider 名称（用于日志）
    fn name(&self) -> &'static str;
}

/// 关闭 GeoIP 时使用，永远查不到
struct DisabledLookup;

#[async_trait]
impl GeoIpLookup for DisabledLookup {
    async fn lookup(&self, _ip: &str) -> Option<GeoInfo> {
        None
    }

    fn name(&self) -> &'static str {
        "Disabled"
    }
}

/// 统一 GeoIP Provider
///
/// 启动时根据配置自动选择实现
#[derive(Clone)]
pub struct GeoIpProvider {
    inner: Arc<dyn GeoIpLookup>,
}

impl GeoIpProvider {
    /// 根据 GeoIpConfig 初始化
    pub fn new(config: &GeoIpConfig) -> Self {
        if !config.enabled {
            info!("GeoIP: lookups disabled, default country will be used");
            return Self::disabled();
        }

        let external = || -> Arc<dyn GeoIpLookup> {
            Arc::new(ExternalApiProvider::new(
                &config.api_url,
                config.cache_capacity,
                Duration::from_secs(config.cache_ttl_secs),
            ))
        };

        let inner: Arc<dyn GeoIpLookup> = match config.maxminddb_path {
            Some(ref path) => match MaxMindProvider::open(path) {
                Ok(provider) => {
                    info!("GeoIP: Using MaxMind database at {}", path);
                    Arc::new(provider)
                }
                Err(e) => {
                    warn!("GeoIP: {}, falling back to external API", e);
                    external()
                }
            },
            None => {
                debug!("GeoIP: No MaxMind database configured, using external API");
                external()
            }
        };

        info!("GeoIP: Initialized with {} provider", inner.name());
        Self { inner }
    }

    /// 使用自定义实现（测试或外部集成）
    pub fn with_lookup(inner: Arc<dyn GeoIpLookup>) -> Self {
        Self { inner }
    }

    pub fn disabled() -> Self {
        Self {
            inner: Arc::new(DisabledLookup),
        }
    }

    /// 查询 IP 地址的地理位置
    ///
    /// 私有 / 回环 / 无法解析的地址不会发起查询
    pub async fn lookup(&self, ip: &str) -> Option<GeoInfo> {
        let addr: IpAddr = ip.parse().ok()?;
        if is_private_or_local(&addr) {
            trace!("GeoIP: skipping private address {}", ip);
            return None;
        }
        self.inner.lookup(ip).await
    }

    /// 查询国家代码，失败时回退到 `default`
    pub async fn country_or_default(&self, ip: Option<&str>, default: &str) -> String {
        let country = match ip {
            Some(ip) => self.lookup(ip).await.and_then(|g| g.country),
            None => None,
        };
        country
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| default.to_ascii_uppercase())
    }

    /// 获取当前使用的 provider 名称
    pub fn provider_name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedLookup {
        country: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GeoIpLookup for FixedLookup {
        async fn lookup(&self, _ip: &str) -> Option<GeoInfo> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Some(GeoInfo {
                country: Some(self.country.to_string()),
                city: None,
            })
        }

        fn name(&self) -> &'static str {
            "Fixed"
        }
    }

    #[tokio::test]
    async fn test_country_from_lookup() {
        let lookup = Arc::new(FixedLookup {
            country: "IN",
            calls: AtomicUsize::new(0),
        });
        let provider = GeoIpProvider::with_lookup(lookup.clone());
        assert_eq!(provider.country_or_default(Some("49.36.0.1"), "US").await, "IN");
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_private_and_invalid_ip_use_default() {
        let lookup = Arc::new(FixedLookup {
            country: "IN",
            calls: AtomicUsize::new(0),
        });
        let provider = GeoIpProvider::with_lookup(lookup.clone());
        assert_eq!(provider.country_or_default(Some("192.168.1.10"), "US").await, "US");
        assert_eq!(provider.country_or_default(Some("127.0.0.1"), "US").await, "US");
        assert_eq!(provider.country_or_default(Some("not-an-ip"), "us").await, "US");
        assert_eq!(provider.country_or_default(None, "US").await, "US");
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_disabled_provider() {
        let provider = GeoIpProvider::new(&GeoIpConfig {
            enabled: false,
            ..GeoIpConfig::default()
        });
        assert_eq!(provider.provider_name(), "Disabled");
        assert_eq!(provider.country_or_default(Some("8.8.8.8"), "US").await, "US");
    }
}
