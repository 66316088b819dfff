//! Hub service
//!
//! Resolves the visitor (device + country), loads the hub and runs the
//! rule engine over it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::device::DeviceDetector;
use super::geoip::GeoIpProvider;
use crate::config::VisitorConfig;
use crate::engine::{DeviceClass, ProcessedLink, RuleEngine, VisitorContext};
use crate::errors::{LinkhubError, Result};
use crate::storage::{Hub, HubStore, HubTheme};

/// 来自 HTTP 请求的原始访客信息
#[derive(Debug, Clone, Default)]
pub struct VisitorInfo {
    pub ip: Option<String>,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicLink {
    pub id: String,
    pub title: String,
    pub url: String,
    pub icon: Option<String>,
    pub is_highlighted: bool,
}

impl From<ProcessedLink> for PublicLink {
    fn from(link: ProcessedLink) -> Self {
        Self {
            id: link.id,
            title: link.title,
            url: link.url,
            icon: link.icon,
            is_highlighted: link.is_highlighted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicHub {
    pub title: String,
    pub description: Option<String>,
    pub theme: HubTheme,
    pub links: Vec<PublicLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HubPreview {
    pub slug: String,
    pub device: DeviceClass,
    pub country: String,
    pub links: Vec<ProcessedLink>,
    pub rules_applied: usize,
}

pub struct HubService {
    store: Arc<dyn HubStore>,
    geoip: GeoIpProvider,
    detector: Arc<DeviceDetector>,
    engine: RuleEngine,
    visitor: VisitorConfig,
}

impl HubService {
    pub fn new(
        store: Arc<dyn HubStore>,
        geoip: GeoIpProvider,
        detector: Arc<DeviceDetector>,
        visitor: VisitorConfig,
    ) -> Self {
        Self {
            store,
            geoip,
            detector,
            engine: RuleEngine::new(),
            visitor,
        }
    }

    pub fn store(&self) -> &Arc<dyn HubStore> {
        &self.store
    }

    async fn load_hub(&self, slug: &str) -> Result<Hub> {
        self.store
            .find_hub_by_slug(slug)
            .await?
            .ok_or_else(|| LinkhubError::not_found(format!("hub '{}' not found", slug)))
    }

    fn context(&self, device: DeviceClass, country: &str, now: DateTime<Utc>) -> VisitorContext {
        VisitorContext::new(device, country.to_ascii_uppercase(), now)
            .with_timezone(self.visitor.default_timezone.clone())
    }

    /// 对任意访客上下文求值（CLI 和预览使用）
    pub async fn evaluate(&self, slug: &str, context: &VisitorContext) -> Result<(Hub, Vec<ProcessedLink>)> {
        let hub = self.load_hub(slug).await?;
        let links = self
            .engine
            .evaluate(&hub.links, &hub.rules, context, hub.total_visits);
        Ok((hub, links))
    }

    pub async fn public_hub(&self, slug: &str, visitor: &VisitorInfo) -> Result<PublicHub> {
        let device = self.detector.detect(&visitor.user_agent);
        let country = self
            .geoip
            .country_or_default(visitor.ip.as_deref(), &self.visitor.default_country)
            .await;
        debug!("Visitor for {}: device={}, country={}", slug, device, country);

        let context = self.context(device, &country, Utc::now());
        let (hub, links) = self.evaluate(slug, &context).await?;

        Ok(PublicHub {
            title: hub.title,
            description: hub.description,
            theme: hub.theme,
            links: links.into_iter().map(PublicLink::from).collect(),
        })
    }

    pub async fn preview_hub(
        &self,
        slug: &str,
        device: Option<DeviceClass>,
        country: Option<&str>,
    ) -> Result<HubPreview> {
        let device = device.unwrap_or_default();
        let country = country
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(&self.visitor.default_country)
            .trim()
            .to_ascii_uppercase();

        let context = self.context(device, &country, Utc::now());
        let (hub, links) = self.evaluate(slug, &context).await?;

        Ok(HubPreview {
            slug: hub.slug.clone(),
            device,
            country,
            links,
            rules_applied: hub.active_rule_count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Link, RuleRecord};
    use crate::services::geoip::{GeoInfo, GeoIpLookup};
    use crate::storage::{HubRecord, MemoryHubStore};
    use async_trait::async_trait;
    use serde_json::json;

    const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

    struct IndiaLookup;

    #[async_trait]
    impl GeoIpLookup for IndiaLookup {
        async fn lookup(&self, _ip: &str) -> Option<GeoInfo> {
            Some(GeoInfo {
                country: Some("IN".into()),
                city: None,
            })
        }

        fn name(&self) -> &'static str {
            "India"
        }
    }

    fn link(id: &str, position: i32) -> Link {
        Link {
            id: id.into(),
            title: id.to_uppercase(),
            url: format!("https://example.com/{}", id),
            icon: None,
            position,
            is_enabled: true,
            click_count: 0,
        }
    }

    fn rule(rule_type: &str, condition: serde_json::Value, action: serde_json::Value, targets: &[&str]) -> RuleRecord {
        RuleRecord {
            id: format!("{}-rule", rule_type),
            name: rule_type.into(),
            rule_type: rule_type.into(),
            condition,
            action,
            priority: 0,
            is_active: true,
            target_link_ids: Some(targets.iter().map(|s| s.to_string()).collect()),
        }
    }

    fn service(lookup: Option<Arc<dyn GeoIpLookup>>) -> HubService {
        let record = HubRecord {
            id: "hub-1".into(),
            slug: "demo".into(),
            title: "Demo".into(),
            description: Some("desc".into()),
            theme: HubTheme::default(),
            is_active: true,
            total_visits: 0,
            links: vec![link("a", 0), link("b", 1), link("c", 2)],
            rules: vec![
                rule(
                    "device",
                    json!({"devices": ["mobile"]}),
                    json!({"action": "show", "priority_boost": 20, "highlight": true}),
                    &["c"],
                ),
                rule(
                    "location",
                    json!({"countries": ["IN"]}),
                    json!({"action": "hide"}),
                    &["a"],
                ),
            ],
        };
        let store = Arc::new(MemoryHubStore::from_records(vec![record]).unwrap());
        let geoip = match lookup {
            Some(lookup) => GeoIpProvider::with_lookup(lookup),
            None => GeoIpProvider::disabled(),
        };
        HubService::new(
            store,
            geoip,
            Arc::new(DeviceDetector::new()),
            VisitorConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_public_hub_mobile_visitor() {
        let service = service(None);
        let visitor = VisitorInfo {
            ip: None,
            user_agent: IPHONE.into(),
        };
        let hub = service.public_hub("demo", &visitor).await.unwrap();
        let ids: Vec<&str> = hub.links.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert!(hub.links[0].is_highlighted);
        assert_eq!(hub.description.as_deref(), Some("desc"));
    }

    #[tokio::test]
    async fn test_public_hub_uses_geoip_country() {
        let service = service(Some(Arc::new(IndiaLookup)));
        let visitor = VisitorInfo {
            ip: Some("49.36.10.20".into()),
            user_agent: String::new(),
        };
        let hub = service.public_hub("demo", &visitor).await.unwrap();
        let ids: Vec<&str> = hub.links.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_preview_hub() {
        let service = service(None);
        let preview = service
            .preview_hub("demo", Some(DeviceClass::Desktop), Some("in"))
            .await
            .unwrap();
        assert_eq!(preview.country, "IN");
        assert_eq!(preview.rules_applied, 2);
        assert_eq!(preview.links.len(), 2);
        assert_eq!(preview.links[0].priority_score, 999.0);

        let preview = service.preview_hub("demo", None, None).await.unwrap();
        assert_eq!(preview.country, "US");
        assert_eq!(preview.device, DeviceClass::Desktop);
        assert_eq!(preview.links.len(), 3);
    }

    #[tokio::test]
    async fn test_missing_hub() {
        let service = service(None);
        let err = service
            .public_hub("nope", &VisitorInfo::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E005");
    }
}
