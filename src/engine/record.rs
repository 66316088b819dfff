//! Rule store boundary
//!
//! Rules are stored as loose records (`rule_type` + JSON `condition` +
//! JSON `action`). They are converted to the typed [`Rule`] once, when the
//! store loads them. Conversion never fails: anything unreadable becomes an
//! `Unsupported` / `Malformed` variant that the engine skips.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::model::{
    DeviceCondition, LocationCondition, PerformanceCondition, Rule, RuleAction, RuleCondition,
    RuleKind, TimeCondition,
};

/// Rule as persisted by the rule store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub rule_type: String,
    #[serde(default = "empty_object")]
    pub condition: Value,
    #[serde(default = "empty_object")]
    pub action: Value,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_link_ids: Option<Vec<String>>,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

fn default_active() -> bool {
    true
}

/// 动作的宽松表示；缺省 action 视为 show
#[derive(Debug, Deserialize)]
struct ActionFields {
    #[serde(default = "default_action")]
    action: String,
    #[serde(default)]
    priority_boost: Option<f64>,
    #[serde(default)]
    priority: Option<f64>,
    #[serde(default)]
    highlight: Option<bool>,
}

fn default_action() -> String {
    "show".to_string()
}

impl From<RuleRecord> for Rule {
    fn from(record: RuleRecord) -> Self {
        let condition = parse_condition(&record.rule_type, record.condition);
        let action = parse_action(record.action);

        if let RuleCondition::Malformed { reason, .. } = &condition {
            warn!("Rule '{}' has a malformed condition: {}", record.id, reason);
        }

        Rule {
            id: record.id,
            name: record.name,
            condition,
            action,
            priority: record.priority,
            is_active: record.is_active,
            target_link_ids: record.target_link_ids.unwrap_or_default(),
        }
    }
}

impl From<&Rule> for RuleRecord {
    fn from(rule: &Rule) -> Self {
        let (rule_type, condition) = condition_to_value(&rule.condition);
        RuleRecord {
            id: rule.id.clone(),
            name: rule.name.clone(),
            rule_type,
            condition,
            action: action_to_value(&rule.action),
            priority: rule.priority,
            is_active: rule.is_active,
            target_link_ids: if rule.target_link_ids.is_empty() {
                None
            } else {
                Some(rule.target_link_ids.clone())
            },
        }
    }
}

fn parse_condition(rule_type: &str, value: Value) -> RuleCondition {
    let Ok(kind) = rule_type.parse::<RuleKind>() else {
        return RuleCondition::Unsupported {
            rule_type: rule_type.to_string(),
        };
    };

    match kind {
        RuleKind::Time => typed(kind, value).map(RuleCondition::Time),
        RuleKind::Device => typed(kind, value).map(RuleCondition::Device),
        RuleKind::Location => typed(kind, value).map(RuleCondition::Location),
        RuleKind::Performance => typed(kind, value).map(RuleCondition::Performance),
    }
    .unwrap_or_else(|e| e)
}

fn typed<T: DeserializeOwned>(kind: RuleKind, value: Value) -> Result<T, RuleCondition> {
    serde_json::from_value(value).map_err(|e| RuleCondition::Malformed {
        rule_type: kind,
        reason: e.to_string(),
    })
}

fn parse_action(value: Value) -> RuleAction {
    let fields: ActionFields = match serde_json::from_value(value) {
        Ok(f) => f,
        Err(e) => {
            return RuleAction::Unsupported {
                action: format!("unreadable action: {}", e),
            };
        }
    };

    match fields.action.as_str() {
        "show" => RuleAction::Show {
            priority_boost: fields.priority_boost,
            highlight: fields.highlight,
        },
        "hide" => RuleAction::Hide,
        "set_priority" => RuleAction::SetPriority {
            priority: fields.priority,
            highlight: fields.highlight,
        },
        other => RuleAction::Unsupported {
            action: other.to_string(),
        },
    }
}

fn condition_to_value(condition: &RuleCondition) -> (String, Value) {
    let value = match condition {
        RuleCondition::Time(c) => serde_json::to_value(c),
        RuleCondition::Device(c) => serde_json::to_value(c),
        RuleCondition::Location(c) => serde_json::to_value(c),
        RuleCondition::Performance(c) => serde_json::to_value(c),
        RuleCondition::Unsupported { rule_type } => return (rule_type.clone(), empty_object()),
        RuleCondition::Malformed { rule_type, .. } => {
            return (rule_type.to_string(), empty_object());
        }
    };
    let kind = condition
        .kind()
        .map(|k| k.to_string())
        .unwrap_or_default();
    (kind, value.unwrap_or_else(|_| empty_object()))
}

fn action_to_value(action: &RuleAction) -> Value {
    let mut map = serde_json::Map::new();
    match action {
        RuleAction::Show {
            priority_boost,
            highlight,
        } => {
            map.insert("action".into(), "show".into());
            if let Some(boost) = priority_boost {
                map.insert("priority_boost".into(), number(*boost));
            }
            if let Some(h) = highlight {
                map.insert("highlight".into(), (*h).into());
            }
        }
        RuleAction::Hide => {
            map.insert("action".into(), "hide".into());
        }
        RuleAction::SetPriority {
            priority,
            highlight,
        } => {
            map.insert("action".into(), "set_priority".into());
            if let Some(p) = priority {
                map.insert("priority".into(), number(*p));
            }
            if let Some(h) = highlight {
                map.insert("highlight".into(), (*h).into());
            }
        }
        RuleAction::Unsupported { action } => {
            map.insert("action".into(), action.clone().into());
        }
    }
    Value::Object(map)
}

/// 整数值输出为 JSON 整数，保持与存储格式一致
fn number(v: f64) -> Value {
    if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Value::from(v as i64)
    } else {
        Value::from(v)
    }
}
