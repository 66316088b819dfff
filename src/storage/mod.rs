use std::sync::Arc;

use async_trait::async_trait;

use crate::engine::Link;
use crate::errors::Result;

pub mod memory;
pub mod models;

pub use memory::MemoryHubStore;
pub use models::{Hub, HubFile, HubRecord, HubTheme};

/// Hub 数据源
///
/// 规则引擎本身不做 I/O，hub、链接和计数都通过这个 trait 获取。
#[async_trait]
pub trait HubStore: Send + Sync {
    /// 按 slug 查找处于激活状态的 hub（slug 不区分大小写）
    async fn find_hub_by_slug(&self, slug: &str) -> Result<Option<Hub>>;

    /// 查找链接及其所属 hub 的 id
    async fn find_link(&self, link_id: &str) -> Result<Option<(String, Link)>>;

    async fn record_visit(&self, hub_id: &str) -> Result<()>;

    async fn record_click(&self, link_id: &str) -> Result<()>;

    async fn total_visits(&self, hub_id: &str) -> Result<u64>;

    async fn hub_count(&self) -> Result<usize>;

    fn backend_name(&self) -> &'static str;
}

pub struct StorageFactory;

impl StorageFactory {
    /// 根据全局配置创建 hub store
    pub fn create() -> Result<Arc<dyn HubStore>> {
        let config = crate::config::get_config();
        Self::from_file(&config.hubs.file)
    }

    pub fn from_file(path: &str) -> Result<Arc<dyn HubStore>> {
        let store = MemoryHubStore::load_from_file(path)?;
        Ok(Arc::new(store))
    }
}
