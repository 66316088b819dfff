//! In-memory hub store
//!
//! Hub definitions are loaded once from a TOML or JSON file. Visit and
//! click counters live in `DashMap`s on top of the file's baseline counts,
//! so reads never block writers.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, info, trace};

use super::HubStore;
use super::models::{Hub, HubFile, HubRecord};
use crate::engine::{Link, Rule};
use crate::errors::{LinkhubError, Result};
use crate::utils::validation::{normalize_slug, validate_link_url, validate_slug};

pub struct MemoryHubStore {
    /// slug → hub（计数为文件中的基线值）
    hubs: HashMap<String, Arc<Hub>>,
    /// link id → hub id
    link_owner: HashMap<String, String>,
    /// hub id → slug
    hub_slugs: HashMap<String, String>,
    visits: DashMap<String, u64>,
    clicks: DashMap<String, u64>,
}

impl MemoryHubStore {
    /// Build a store from already-parsed records, validating each one.
    pub fn from_records(records: Vec<HubRecord>) -> Result<Self> {
        let mut hubs = HashMap::with_capacity(records.len());
        let mut link_owner = HashMap::new();
        let mut hub_slugs = HashMap::with_capacity(records.len());

        for record in records {
            let hub = Self::build_hub(record)?;

            if hub_slugs.contains_key(&hub.id) {
                return Err(LinkhubError::validation(format!(
                    "duplicate hub id '{}'",
                    hub.id
                )));
            }
            if hubs.contains_key(&hub.slug) {
                return Err(LinkhubError::validation(format!(
                    "duplicate hub slug '{}'",
                    hub.slug
                )));
            }
            for link in &hub.links {
                if link_owner.insert(link.id.clone(), hub.id.clone()).is_some() {
                    return Err(LinkhubError::validation(format!(
                        "duplicate link id '{}'",
                        link.id
                    )));
                }
            }

            debug!(
                "Loaded hub '{}' ({} links, {} rules)",
                hub.slug,
                hub.links.len(),
                hub.rules.len()
            );
            hub_slugs.insert(hub.id.clone(), hub.slug.clone());
            hubs.insert(hub.slug.clone(), Arc::new(hub));
        }

        Ok(Self {
            hubs,
            link_owner,
            hub_slugs,
            visits: DashMap::new(),
            clicks: DashMap::new(),
        })
    }

    /// Load a hub file; `.json` is parsed as JSON, anything else as TOML.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            LinkhubError::hub_file_load(format!("cannot read {}: {}", path.display(), e))
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let file: HubFile = if is_json {
            serde_json::from_str(&content).map_err(|e| {
                LinkhubError::hub_file_load(format!("{}: {}", path.display(), e))
            })?
        } else {
            toml::from_str(&content).map_err(|e| {
                LinkhubError::hub_file_load(format!("{}: {}", path.display(), e))
            })?
        };

        let store = Self::from_records(file.hubs)?;
        info!("Loaded {} hubs from {}", store.hubs.len(), path.display());
        Ok(store)
    }

    fn build_hub(record: HubRecord) -> Result<Hub> {
        let slug = normalize_slug(&record.slug);
        validate_slug(&slug).map_err(|e| LinkhubError::validation(e.to_string()))?;

        for link in &record.links {
            validate_link_url(&link.url).map_err(|e| {
                LinkhubError::validation(format!("link '{}' in hub '{}': {}", link.id, slug, e))
            })?;
        }

        // 规则在入库时一次性转换为强类型
        let rules: Vec<Rule> = record.rules.into_iter().map(Rule::from).collect();

        Ok(Hub {
            id: record.id,
            slug,
            title: record.title,
            description: record.description,
            theme: record.theme,
            is_active: record.is_active,
            links: record.links,
            rules,
            total_visits: record.total_visits,
        })
    }

    fn counter(map: &DashMap<String, u64>, key: &str) -> u64 {
        map.get(key).map(|v| *v).unwrap_or(0)
    }

    fn increment(map: &DashMap<String, u64>, key: &str) {
        if let Some(mut entry) = map.get_mut(key) {
            *entry += 1;
        } else {
            *map.entry(key.to_string()).or_insert(0) += 1;
        }
    }

    /// 合并基线计数与运行期计数
    fn snapshot(&self, hub: &Hub) -> Hub {
        let mut snapshot = hub.clone();
        snapshot.total_visits += Self::counter(&self.visits, &hub.id);
        for link in &mut snapshot.links {
            link.click_count += Self::counter(&self.clicks, &link.id);
        }
        snapshot
    }

    fn hub_by_id(&self, hub_id: &str) -> Option<&Arc<Hub>> {
        self.hub_slugs
            .get(hub_id)
            .and_then(|slug| self.hubs.get(slug))
    }
}

#[async_trait]
impl HubStore for MemoryHubStore {
    async fn find_hub_by_slug(&self, slug: &str) -> Result<Option<Hub>> {
        let slug = normalize_slug(slug);
        Ok(self
            .hubs
            .get(&slug)
            .filter(|hub| hub.is_active)
            .map(|hub| self.snapshot(hub)))
    }

    async fn find_link(&self, link_id: &str) -> Result<Option<(String, Link)>> {
        let Some(hub_id) = self.link_owner.get(link_id) else {
            return Ok(None);
        };
        let link = self.hub_by_id(hub_id).and_then(|hub| {
            hub.links.iter().find(|l| l.id == link_id).map(|l| {
                let mut link = l.clone();
                link.click_count += Self::counter(&self.clicks, link_id);
                link
            })
        });
        Ok(link.map(|l| (hub_id.clone(), l)))
    }

    async fn record_visit(&self, hub_id: &str) -> Result<()> {
        if !self.hub_slugs.contains_key(hub_id) {
            return Err(LinkhubError::not_found(format!("hub '{}' not found", hub_id)));
        }
        Self::increment(&self.visits, hub_id);
        trace!("Recorded visit for hub {}", hub_id);
        Ok(())
    }

    async fn record_click(&self, link_id: &str) -> Result<()> {
        if !self.link_owner.contains_key(link_id) {
            return Err(LinkhubError::not_found(format!(
                "link '{}' not found",
                link_id
            )));
        }
        Self::increment(&self.clicks, link_id);
        trace!("Recorded click for link {}", link_id);
        Ok(())
    }

    async fn total_visits(&self, hub_id: &str) -> Result<u64> {
        let hub = self
            .hub_by_id(hub_id)
            .ok_or_else(|| LinkhubError::not_found(format!("hub '{}' not found", hub_id)))?;
        Ok(hub.total_visits + Self::counter(&self.visits, hub_id))
    }

    async fn hub_count(&self) -> Result<usize> {
        Ok(self.hubs.len())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
