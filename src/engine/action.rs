use super::model::{HIDDEN_SCORE, ProcessedLink, RuleAction};

/// 对单个链接应用规则动作
///
/// 只修改 score / visibility / highlight，从不改动链接本身的字段。
pub fn apply(link: &mut ProcessedLink, action: &RuleAction) {
    match action {
        RuleAction::Hide => {
            link.is_visible = false;
            link.priority_score = HIDDEN_SCORE;
        }
        RuleAction::Show {
            priority_boost,
            highlight,
        } => {
            link.is_visible = true;
            link.priority_score += priority_boost.unwrap_or(0.0);
            if highlight.unwrap_or(false) {
                link.is_highlighted = true;
            }
        }
        RuleAction::SetPriority {
            priority,
            highlight,
        } => {
            if let Some(priority) = priority {
                link.priority_score = *priority;
            }
            if highlight.unwrap_or(false) {
                link.is_highlighted = true;
            }
        }
        RuleAction::Unsupported { .. } => {}
    }
}
