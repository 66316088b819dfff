//! Rule engine data contracts
//!
//! Inputs (`Link`, `Rule`, `VisitorContext`) are plain snapshots supplied by
//! the collaborator layer; `ProcessedLink` is the per-request output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// 链接基础分（position 越小分数越高）
pub const BASE_SCORE: f64 = 1000.0;

/// 隐藏标记分数，保证被过滤
pub const HIDDEN_SCORE: f64 = -1.0;

/// 自动性能加成上限
pub const PERFORMANCE_BOOST_CAP: f64 = 50.0;

/// A single clickable entry on a hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
    #[serde(default)]
    pub click_count: u64,
}

fn default_enabled() -> bool {
    true
}

/// Visitor device class
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DeviceClass {
    Mobile,
    Tablet,
    #[default]
    Desktop,
}

/// Rule type, derived from the condition variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RuleKind {
    Time,
    Device,
    Location,
    Performance,
}

/// Local-hour window. Hours are 0–23; `timezone` falls back to the
/// visitor context default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeCondition {
    #[serde(default)]
    pub start_hour: Option<u32>,
    #[serde(default)]
    pub end_hour: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceCondition {
    #[serde(default)]
    pub devices: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationCondition {
    #[serde(default)]
    pub countries: Vec<String>,
}

/// Thresholds carried by `performance` rules. The hub-level predicate for
/// this rule type always matches; the thresholds are kept for clients.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_ctr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_clicks: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuleCondition {
    Time(TimeCondition),
    Device(DeviceCondition),
    Location(LocationCondition),
    Performance(PerformanceCondition),
    /// 未知规则类型，永不匹配
    Unsupported { rule_type: String },
    /// 已知类型但条件无法解析，永不匹配
    Malformed { rule_type: RuleKind, reason: String },
}

impl RuleCondition {
    pub fn kind(&self) -> Option<RuleKind> {
        match self {
            RuleCondition::Time(_) => Some(RuleKind::Time),
            RuleCondition::Device(_) => Some(RuleKind::Device),
            RuleCondition::Location(_) => Some(RuleKind::Location),
            RuleCondition::Performance(_) => Some(RuleKind::Performance),
            RuleCondition::Unsupported { .. } => None,
            RuleCondition::Malformed { rule_type, .. } => Some(*rule_type),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuleAction {
    Show {
        priority_boost: Option<f64>,
        highlight: Option<bool>,
    },
    Hide,
    SetPriority {
        priority: Option<f64>,
        highlight: Option<bool>,
    },
    /// 未知动作，空操作
    Unsupported { action: String },
}

/// A configured condition → action pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub condition: RuleCondition,
    pub action: RuleAction,
    pub priority: i32,
    pub is_active: bool,
    /// Empty means the rule targets every link of the hub.
    pub target_link_ids: Vec<String>,
}

/// Who is looking at the hub right now.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitorContext {
    pub device: DeviceClass,
    /// ISO 3166-1 alpha-2, upper-case
    pub country: String,
    pub current_time: DateTime<Utc>,
    /// IANA timezone used by time rules without their own timezone
    pub timezone: String,
}

impl VisitorContext {
    pub fn new(device: DeviceClass, country: impl Into<String>, current_time: DateTime<Utc>) -> Self {
        Self {
            device,
            country: country.into(),
            current_time,
            timezone: "UTC".to_string(),
        }
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }
}

/// Link after rule processing, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedLink {
    pub id: String,
    pub title: String,
    pub url: String,
    pub icon: Option<String>,
    pub position: i32,
    pub is_highlighted: bool,
    pub priority_score: f64,
    pub is_visible: bool,
}

impl ProcessedLink {
    pub(crate) fn seed(link: &Link) -> Self {
        Self {
            id: link.id.clone(),
            title: link.title.clone(),
            url: link.url.clone(),
            icon: link.icon.clone(),
            position: link.position,
            is_highlighted: false,
            priority_score: BASE_SCORE - f64::from(link.position),
            is_visible: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_device_class_parse_is_case_insensitive() {
        assert_eq!(DeviceClass::from_str("Mobile").unwrap(), DeviceClass::Mobile);
        assert_eq!(DeviceClass::from_str("TABLET").unwrap(), DeviceClass::Tablet);
        assert!(DeviceClass::from_str("watch").is_err());
        assert_eq!(DeviceClass::Desktop.to_string(), "desktop");
    }

    #[test]
    fn test_seed_score_from_position() {
        let link = Link {
            id: "a".into(),
            title: "A".into(),
            url: "https://a.example".into(),
            icon: None,
            position: 3,
            is_enabled: true,
            click_count: 0,
        };
        let processed = ProcessedLink::seed(&link);
        assert_eq!(processed.priority_score, 997.0);
        assert!(processed.is_visible);
        assert!(!processed.is_highlighted);
    }
}
