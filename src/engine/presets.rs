//! Canned rule templates
//!
//! Convenience constructors for rule records; they exercise every
//! condition/action combination the engine supports.

use serde_json::json;

use super::record::RuleRecord;

pub struct RulePresets;

impl RulePresets {
    /// Business hours (9:00–18:00 local): show and boost by 5
    pub fn business_hours(timezone: &str) -> RuleRecord {
        RuleRecord {
            id: "preset-business-hours".into(),
            name: "Business Hours Only".into(),
            rule_type: "time".into(),
            condition: json!({"start_hour": 9, "end_hour": 18, "timezone": timezone}),
            action: json!({"action": "show", "priority_boost": 5}),
            priority: 0,
            is_active: true,
            target_link_ids: None,
        }
    }

    /// Mobile visitors: boost by 20 and highlight
    pub fn mobile_priority() -> RuleRecord {
        RuleRecord {
            id: "preset-mobile-priority".into(),
            name: "Mobile Priority".into(),
            rule_type: "device".into(),
            condition: json!({"devices": ["mobile"]}),
            action: json!({"action": "show", "priority_boost": 20, "highlight": true}),
            priority: 0,
            is_active: true,
            target_link_ids: None,
        }
    }

    /// Visitors from one country: boost by 50 and highlight
    pub fn country_boost(country: &str) -> RuleRecord {
        let country = country.to_ascii_uppercase();
        RuleRecord {
            id: format!("preset-country-{}", country.to_ascii_lowercase()),
            name: format!("{} Visitors", country),
            rule_type: "location".into(),
            condition: json!({"countries": [country]}),
            action: json!({"action": "show", "priority_boost": 50, "highlight": true}),
            priority: 0,
            is_active: true,
            target_link_ids: None,
        }
    }

    /// High performers: absolute priority 100 and highlight
    pub fn high_performer_boost() -> RuleRecord {
        RuleRecord {
            id: "preset-high-performer".into(),
            name: "High Performer Boost".into(),
            rule_type: "performance".into(),
            condition: json!({"min_ctr": 0.1, "min_clicks": 5}),
            action: json!({"action": "set_priority", "priority": 100, "highlight": true}),
            priority: 0,
            is_active: true,
            target_link_ids: None,
        }
    }

    /// 全部预设（CLI 列表用）
    pub fn all(timezone: &str, country: &str) -> Vec<RuleRecord> {
        vec![
            Self::business_hours(timezone),
            Self::mobile_priority(),
            Self::country_boost(country),
            Self::high_performer_boost(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::model::{Rule, RuleAction, RuleCondition, RuleKind};

    #[test]
    fn test_presets_convert_to_typed_rules() {
        let rules: Vec<Rule> = RulePresets::all("Asia/Kolkata", "in")
            .into_iter()
            .map(Rule::from)
            .collect();

        let kinds: Vec<_> = rules.iter().map(|r| r.condition.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                Some(RuleKind::Time),
                Some(RuleKind::Device),
                Some(RuleKind::Location),
                Some(RuleKind::Performance)
            ]
        );
        assert!(
            rules
                .iter()
                .all(|r| !matches!(r.condition, RuleCondition::Malformed { .. }))
        );
    }

    #[test]
    fn test_country_boost_upper_cases_code() {
        let rule: Rule = RulePresets::country_boost("in").into();
        match rule.condition {
            RuleCondition::Location(loc) => assert_eq!(loc.countries, vec!["IN".to_string()]),
            other => panic!("unexpected condition: {:?}", other),
        }
    }

    #[test]
    fn test_high_performer_sets_absolute_priority() {
        let rule: Rule = RulePresets::high_performer_boost().into();
        assert_eq!(
            rule.action,
            RuleAction::SetPriority {
                priority: Some(100.0),
                highlight: Some(true)
            }
        );
    }
}
