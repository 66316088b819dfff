//! Link ranking / rule evaluation engine
//!
//! Given a hub's links and rules plus a visitor context, computes which
//! links are visible, in what order, and which are highlighted.
//!
//! # Pipeline
//! 1. Seed: every enabled link gets `BASE_SCORE - position`
//! 2. Active rules are applied in descending `priority` (stable)
//! 3. Automatic CTR boost when the hub has visits (capped at +50)
//! 4. Hidden / negative-score links are dropped, the rest sorted by
//!    score desc, position asc
//!
//! The engine is pure: no I/O, no shared state, no clock besides
//! `VisitorContext::current_time`. It never fails; malformed rules are
//! skipped.

pub mod action;
pub mod condition;
pub mod model;
pub mod presets;
pub mod record;

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

pub use model::{
    BASE_SCORE, DeviceClass, DeviceCondition, HIDDEN_SCORE, Link, LocationCondition,
    PERFORMANCE_BOOST_CAP, PerformanceCondition, ProcessedLink, Rule, RuleAction,
    RuleCondition, RuleKind, TimeCondition, VisitorContext,
};
pub use presets::RulePresets;
pub use record::RuleRecord;

/// Stateless rule engine. Cheap to construct; safe to share across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate `rules` against `links` for one visitor.
    pub fn evaluate(
        &self,
        links: &[Link],
        rules: &[Rule],
        context: &VisitorContext,
        total_visits: u64,
    ) -> Vec<ProcessedLink> {
        let mut working = WorkingSet::seed(links);

        let mut active: Vec<&Rule> = rules.iter().filter(|r| r.is_active).collect();
        // sort_by 是稳定排序，同优先级保持输入顺序
        active.sort_by(|a, b| b.priority.cmp(&a.priority));

        for rule in active {
            if !condition::matches(&rule.condition, context) {
                trace!("Rule '{}' did not match", rule.id);
                continue;
            }

            let targets = working.resolve_targets(&rule.target_link_ids);
            trace!("Rule '{}' matched, applying to {} links", rule.id, targets.len());
            for idx in targets {
                action::apply(&mut working.links[idx], &rule.action);
            }
        }

        if total_visits > 0 {
            working.apply_performance_boost(total_visits);
        }

        let result = working.finish();
        debug!(
            "Evaluated {} links / {} rules -> {} visible",
            links.len(),
            rules.len(),
            result.len()
        );
        result
    }
}

/// Convenience wrapper around [`RuleEngine::evaluate`].
pub fn evaluate(
    links: &[Link],
    rules: &[Rule],
    context: &VisitorContext,
    total_visits: u64,
) -> Vec<ProcessedLink> {
    RuleEngine.evaluate(links, rules, context, total_visits)
}

/// Per-call working set: links kept in seed order, plus an id index.
struct WorkingSet {
    links: Vec<ProcessedLink>,
    /// 与 `links` 一一对应的点击数
    clicks: Vec<u64>,
    index: HashMap<String, usize>,
}

impl WorkingSet {
    fn seed(links: &[Link]) -> Self {
        let mut processed = Vec::with_capacity(links.len());
        let mut clicks = Vec::with_capacity(links.len());
        let mut index = HashMap::with_capacity(links.len());
        for link in links.iter().filter(|l| l.is_enabled) {
            // 重复 id 只保留第一个
            if index.contains_key(&link.id) {
                continue;
            }
            index.insert(link.id.clone(), processed.len());
            processed.push(ProcessedLink::seed(link));
            clicks.push(link.click_count);
        }
        Self {
            links: processed,
            clicks,
            index,
        }
    }

    fn resolve_targets(&self, target_ids: &[String]) -> Vec<usize> {
        if target_ids.is_empty() {
            return (0..self.links.len()).collect();
        }
        let mut seen = HashSet::with_capacity(target_ids.len());
        target_ids
            .iter()
            .filter_map(|id| self.index.get(id).copied())
            .filter(|idx| seen.insert(*idx))
            .collect()
    }

    fn apply_performance_boost(&mut self, total_visits: u64) {
        let total = total_visits as f64;
        for (link, clicks) in self.links.iter_mut().zip(&self.clicks) {
            let ctr = *clicks as f64 / total;
            link.priority_score += (ctr * 100.0).min(PERFORMANCE_BOOST_CAP);
        }
    }

    fn finish(self) -> Vec<ProcessedLink> {
        let mut visible: Vec<ProcessedLink> = self
            .links
            .into_iter()
            .filter(|l| l.is_visible && l.priority_score >= 0.0)
            .collect();
        visible.sort_by(|a, b| {
            b.priority_score
                .total_cmp(&a.priority_score)
                .then(a.position.cmp(&b.position))
        });
        visible
    }
}
