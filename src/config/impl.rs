use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks. Falls back to loading `config.toml` when
/// `init_config` was never called.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get_or_init(|| ArcSwap::from_pointee(StaticConfig::load(None)))
        .load_full()
}

/// Initialize the global configuration
///
/// Loads configuration from `path` (or "config.toml" in the current
/// directory). If the file doesn't exist, uses in-memory defaults.
///
/// # Examples
/// ```no_run
/// use linkhub::config::init_config;
/// init_config(None);
/// ```
pub fn init_config(path: Option<&str>) {
    CONFIG.get_or_init(|| ArcSwap::from_pointee(StaticConfig::load(path)));
}

/// Replace the global configuration (tests and reload)
pub fn set_config(config: StaticConfig) {
    let config = Arc::new(config);
    CONFIG
        .get_or_init(|| ArcSwap::new(config.clone()))
        .store(config);
}
