//! GeoIP 服务模块
//!
//! 提供 IP 地址到国家代码的查询功能，支持：
//! - MaxMind GeoLite2 本地数据库
//! - 外部 API fallback (ip-api.com)，带有界缓存

mod external_api;
mod maxmind;
mod provider;

pub use external_api::ExternalApiProvider;
pub use maxmind::MaxMindProvider;
pub use provider::{GeoInfo, GeoIpLookup, GeoIpProvider};
