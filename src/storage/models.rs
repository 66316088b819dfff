use serde::{Deserialize, Serialize};

use crate::engine::{Link, Rule, RuleRecord};

/// Hub 页面主题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubTheme {
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default = "default_accent")]
    pub accent: String,
}

fn default_background() -> String {
    "#000000".to_string()
}

fn default_accent() -> String {
    "#22C55E".to_string()
}

impl Default for HubTheme {
    fn default() -> Self {
        Self {
            background: default_background(),
            accent: default_accent(),
        }
    }
}

/// Hub snapshot handed to the rule engine.
///
/// `links[*].click_count` and `total_visits` already include the
/// counts recorded since the store was loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Hub {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub theme: HubTheme,
    pub is_active: bool,
    pub links: Vec<Link>,
    pub rules: Vec<Rule>,
    pub total_visits: u64,
}

impl Hub {
    pub fn active_rule_count(&self) -> usize {
        self.rules.iter().filter(|r| r.is_active).count()
    }
}

/// Hub as written in the hub data file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubRecord {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub theme: HubTheme,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub total_visits: u64,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub rules: Vec<RuleRecord>,
}

fn default_active() -> bool {
    true
}

/// Hub 数据文件根结构
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HubFile {
    #[serde(default)]
    pub hubs: Vec<HubRecord>,
}
