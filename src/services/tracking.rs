//! Visit and click tracking
//!
//! Bots are ignored, and repeated visits from the same client to the same
//! hub within the dedup window count once.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use serde::Serialize;
use tracing::{debug, trace};

use super::device::DeviceDetector;
use crate::config::TrackingConfig;
use crate::errors::{LinkhubError, Result};
use crate::storage::HubStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackOutcome {
    pub recorded: bool,
    pub message: &'static str,
}

impl TrackOutcome {
    fn recorded() -> Self {
        Self {
            recorded: true,
            message: "recorded",
        }
    }

    fn skipped(message: &'static str) -> Self {
        Self {
            recorded: false,
            message,
        }
    }
}

pub struct VisitTracker {
    store: Arc<dyn HubStore>,
    detector: Arc<DeviceDetector>,
    /// (hub_id, client) → ()
    recent_visits: Cache<(String, String), ()>,
}

impl VisitTracker {
    pub fn new(
        store: Arc<dyn HubStore>,
        detector: Arc<DeviceDetector>,
        config: &TrackingConfig,
    ) -> Self {
        let recent_visits = Cache::builder()
            .max_capacity(config.dedup_capacity)
            .time_to_live(Duration::from_secs(config.visit_dedup_secs.max(1)))
            .build();

        Self {
            store,
            detector,
            recent_visits,
        }
    }

    /// 记录一次 hub 访问；`client` 通常是客户端 IP
    pub async fn track_visit(
        &self,
        slug: &str,
        client: Option<&str>,
        user_agent: &str,
    ) -> Result<TrackOutcome> {
        let hub = self
            .store
            .find_hub_by_slug(slug)
            .await?
            .ok_or_else(|| LinkhubError::not_found(format!("hub '{}' not found", slug)))?;

        if self.detector.is_bot(user_agent) {
            trace!("Ignoring bot visit to {}", hub.slug);
            return Ok(TrackOutcome::skipped("bot traffic ignored"));
        }

        if let Some(client) = client {
            let key = (hub.id.clone(), client.to_string());
            if self.recent_visits.contains_key(&key) {
                trace!("Duplicate visit to {} from {}", hub.slug, client);
                return Ok(TrackOutcome::skipped("duplicate visit"));
            }
            self.recent_visits.insert(key, ());
        }

        self.store.record_visit(&hub.id).await?;
        debug!("Visit recorded for hub {}", hub.slug);
        Ok(TrackOutcome::recorded())
    }

    pub async fn track_click(&self, link_id: &str, user_agent: &str) -> Result<TrackOutcome> {
        if self.store.find_link(link_id).await?.is_none() {
            return Err(LinkhubError::not_found(format!(
                "link '{}' not found",
                link_id
            )));
        }

        if self.detector.is_bot(user_agent) {
            trace!("Ignoring bot click on {}", link_id);
            return Ok(TrackOutcome::skipped("bot traffic ignored"));
        }

        self.store.record_click(link_id).await?;
        debug!("Click recorded for link {}", link_id);
        Ok(TrackOutcome::recorded())
    }
}
