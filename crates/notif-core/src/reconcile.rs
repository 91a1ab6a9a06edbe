use std::collections::BTreeSet;

use super::catalog::IntensityLevel;
use super::catalog::RawRule;
use super::catalog::RuleCatalog;
use super::catalog::RuleCategory;
use super::state::SettingsState;

/// First level, in enumeration order, whose preset for `category` equals the
/// rule's effective action set.
pub fn classify(
    catalog: &RuleCatalog,
    category: RuleCategory,
    rule: &RawRule,
) -> Option<IntensityLevel> {
    let action_set = rule.action_set();
    IntensityLevel::ALL
        .into_iter()
        .find(|level| catalog.standard_actions(category, *level) == action_set)
}

/// Unmatched action sets count as unchecked.
pub fn rule_checked(catalog: &RuleCatalog, category: RuleCategory, rule: &RawRule) -> bool {
    classify(catalog, category, rule).is_some_and(IntensityLevel::is_enabled)
}

fn sibling_checked(catalog: &RuleCatalog, sibling: &RawRule) -> Option<bool> {
    let category = sibling.category()?;
    Some(rule_checked(catalog, category, sibling))
}

/// Checked state of `rule`, where any checked sibling of a synced category
/// makes the whole group read as checked.
pub fn is_checked(
    catalog: &RuleCatalog,
    category: RuleCategory,
    rule: &RawRule,
    synced: &[&RawRule],
) -> bool {
    let own = rule_checked(catalog, category, rule);
    if !catalog.has_synced_group(category) {
        return own;
    }
    own || synced
        .iter()
        .any(|sibling| sibling_checked(catalog, sibling) == Some(true))
}

pub fn is_out_of_sync(
    catalog: &RuleCatalog,
    category: RuleCategory,
    rule: &RawRule,
    synced: &[&RawRule],
) -> bool {
    if !catalog.has_synced_group(category) {
        return false;
    }
    let own = rule_checked(catalog, category, rule);
    synced
        .iter()
        .filter_map(|sibling| sibling_checked(catalog, sibling))
        .any(|checked| checked != own)
}

/// Rules in `rules` that belong to the synced group of `category`.
pub fn synced_rules<'a>(
    catalog: &RuleCatalog,
    category: RuleCategory,
    rules: &'a [RawRule],
) -> Vec<&'a RawRule> {
    let group = catalog.synced_group(category);
    if group.is_empty() {
        return Vec::new();
    }
    rules
        .iter()
        .filter(|rule| rule.category().is_some_and(|c| group.contains(&c)))
        .collect()
}

/// Full reconciliation pass over an all-rules snapshot.
pub fn apply_rule_snapshot(catalog: &RuleCatalog, state: &mut SettingsState, rules: &[RawRule]) {
    for rule in rules {
        let Some(category) = rule.category() else {
            continue;
        };
        if !state.view.is_watched(category) {
            continue;
        }
        let synced = synced_rules(catalog, category, rules);
        let checked = is_checked(catalog, category, rule, &synced);
        let out_of_sync = is_out_of_sync(catalog, category, rule, &synced);
        state.view.checked.insert(category, checked);
        if out_of_sync {
            state.view.out_of_sync.insert(category);
        } else {
            state.view.out_of_sync.remove(&category);
        }
    }
}

/// Applies a content-rule snapshot: reorders keywords, clears pending
/// markers and aggregates the keyword checked state.
pub fn apply_keyword_snapshot(state: &mut SettingsState, rules: &[RawRule]) {
    if !state.watches_keywords() {
        return;
    }
    let canonical: BTreeSet<String> = rules
        .iter()
        .filter(|rule| rule.is_content_rule())
        .map(|rule| rule.rule_id.clone())
        .collect();
    state.keyword_order.reconcile(&canonical);
    state.publish_keywords();
    state.view.pending_keywords.clear();

    if !state.keyword_order.is_empty() {
        let any_enabled = rules
            .iter()
            .filter(|rule| rule.is_content_rule())
            .any(|rule| rule.enabled);
        state.view.checked.insert(RuleCategory::Keywords, any_enabled);
    }
}
