use serde::{Deserialize, Serialize};

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 服务器地址、端口、CPU 数量
/// - logging: 日志配置
/// - hubs: hub 数据文件
/// - visitor: 访客上下文默认值
/// - geoip: GeoIP 查询配置
/// - rate_limit: 公共接口限流
/// - tracking: 访问/点击记录
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub hubs: HubsConfig,
    #[serde(default)]
    pub visitor: VisitorConfig,
    #[serde(default)]
    pub geoip: GeoIpConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config file > 默认值
    /// ENV 前缀：LH，分隔符：__
    /// 示例：LH__SERVER__PORT=9999
    pub fn load(path: Option<&str>) -> Self {
        use config::{Config, Environment, File};

        let path = path.unwrap_or("config.toml");

        let builder = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖，前缀 LH，分隔符 __
            .add_source(
                Environment::with_prefix("LH")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> crate::errors::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::errors::LinkhubError::serialization(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// 可信反向代理（IP 或 CIDR）；为空时私有地址的连接自动视为代理
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// Hub 数据源
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubsConfig {
    /// TOML 或 JSON 格式的 hub 文件
    #[serde(default = "default_hubs_file")]
    pub file: String,
}

/// 访客上下文默认值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitorConfig {
    /// GeoIP 查询失败时使用的国家代码
    #[serde(default = "default_country")]
    pub default_country: String,
    /// 未指定时区的时间规则所用时区
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
}

/// GeoIP 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoIpConfig {
    #[serde(default = "default_geoip_enabled")]
    pub enabled: bool,
    /// MaxMindDB 文件路径 (GeoLite2-Country.mmdb / GeoLite2-City.mmdb)
    /// 如果配置且文件可读，使用本地解析；否则 fallback 到外部 API
    #[serde(default)]
    pub maxminddb_path: Option<String>,
    /// 外部 GeoIP API URL，使用 {ip} 作为占位符
    #[serde(default = "default_geoip_api_url")]
    pub api_url: String,
    #[serde(default = "default_geoip_cache_capacity")]
    pub cache_capacity: u64,
    #[serde(default = "default_geoip_cache_ttl")]
    pub cache_ttl_secs: u64,
}

/// 公共接口限流配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,
    #[serde(default = "default_rate_limit_per_minute")]
    pub per_minute: u32,
    #[serde(default = "default_rate_limit_burst")]
    pub burst: u32,
    /// 超过此数量时清理已回满的 key
    #[serde(default = "default_max_tracked_keys")]
    pub max_tracked_keys: usize,
}

/// 访问记录配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// 同一访客对同一 hub 的去重窗口
    #[serde(default = "default_visit_dedup_secs")]
    pub visit_dedup_secs: u64,
    #[serde(default = "default_dedup_capacity")]
    pub dedup_capacity: u64,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_hubs_file() -> String {
    "hubs.toml".to_string()
}

fn default_country() -> String {
    "US".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_geoip_enabled() -> bool {
    true
}

fn default_geoip_api_url() -> String {
    "http://ip-api.com/json/{ip}?fields=status,countryCode".to_string()
}

fn default_geoip_cache_capacity() -> u64 {
    10_000
}

fn default_geoip_cache_ttl() -> u64 {
    15 * 60
}

fn default_rate_limit_enabled() -> bool {
    true
}

fn default_rate_limit_per_minute() -> u32 {
    300
}

fn default_rate_limit_burst() -> u32 {
    30
}

fn default_max_tracked_keys() -> usize {
    10_000
}

fn default_visit_dedup_secs() -> u64 {
    60
}

fn default_dedup_capacity() -> u64 {
    10_000
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            trusted_proxies: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for HubsConfig {
    fn default() -> Self {
        Self {
            file: default_hubs_file(),
        }
    }
}

impl Default for VisitorConfig {
    fn default() -> Self {
        Self {
            default_country: default_country(),
            default_timezone: default_timezone(),
        }
    }
}

impl Default for GeoIpConfig {
    fn default() -> Self {
        Self {
            enabled: default_geoip_enabled(),
            maxminddb_path: None,
            api_url: default_geoip_api_url(),
            cache_capacity: default_geoip_cache_capacity(),
            cache_ttl_secs: default_geoip_cache_ttl(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            per_minute: default_rate_limit_per_minute(),
            burst: default_rate_limit_burst(),
            max_tracked_keys: default_max_tracked_keys(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            visit_dedup_secs: default_visit_dedup_secs(),
            dedup_capacity: default_dedup_capacity(),
        }
    }
}
