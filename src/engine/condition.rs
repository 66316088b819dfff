//! Hub-level rule predicates

use chrono::Timelike;
use chrono_tz::Tz;
use tracing::trace;

use super::model::{
    DeviceCondition, LocationCondition, RuleCondition, TimeCondition, VisitorContext,
};

/// 评估规则条件是否匹配当前访客
pub fn matches(condition: &RuleCondition, context: &VisitorContext) -> bool {
    match condition {
        RuleCondition::Time(time) => matches_time(time, context),
        RuleCondition::Device(device) => matches_device(device, context),
        RuleCondition::Location(location) => matches_location(location, context),
        // performance 规则在 hub 层面恒为真
        RuleCondition::Performance(_) => true,
        RuleCondition::Unsupported { rule_type } => {
            trace!("No handler for rule type '{}', skipping", rule_type);
            false
        }
        RuleCondition::Malformed { rule_type, reason } => {
            trace!("Malformed {} condition ({}), skipping", rule_type, reason);
            false
        }
    }
}

fn matches_time(condition: &TimeCondition, context: &VisitorContext) -> bool {
    let (Some(start), Some(end)) = (condition.start_hour, condition.end_hour) else {
        return false;
    };
    if start > 23 || end > 23 {
        return false;
    }

    let tz_name = condition.timezone.as_deref().unwrap_or(&context.timezone);
    let Ok(tz) = tz_name.parse::<Tz>() else {
        trace!("Unknown timezone '{}' in time rule", tz_name);
        return false;
    };

    let hour = context.current_time.with_timezone(&tz).hour();
    hour_in_window(hour, start, end)
}

/// `start <= end` is a same-day window `[start, end)`; otherwise the window
/// wraps past midnight.
pub fn hour_in_window(hour: u32, start: u32, end: u32) -> bool {
    if start <= end {
        start <= hour && hour < end
    } else {
        hour >= start || hour < end
    }
}

fn matches_device(condition: &DeviceCondition, context: &VisitorContext) -> bool {
    if condition.devices.is_empty() {
        return true;
    }
    let device = context.device.as_ref();
    condition
        .devices
        .iter()
        .any(|d| d.eq_ignore_ascii_case(device))
}

fn matches_location(condition: &LocationCondition, context: &VisitorContext) -> bool {
    if condition.countries.is_empty() {
        return true;
    }
    condition
        .countries
        .iter()
        .any(|c| c.eq_ignore_ascii_case(&context.country))
}
