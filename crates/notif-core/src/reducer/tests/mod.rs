pub(super) use super::reduce;
pub(super) use super::RuleUpdate;
pub(super) use super::SettingsEffect;
pub(super) use super::UpdatePlan;
pub(super) use crate::actions::RuntimeAction;
pub(super) use crate::actions::SettingsAction;
pub(super) use crate::actions::UserAction;
pub(super) use crate::catalog::ActionSet;
pub(super) use crate::catalog::IntensityLevel;
pub(super) use crate::catalog::RawRule;
pub(super) use crate::catalog::RuleCatalog;
pub(super) use crate::catalog::RuleCategory;
pub(super) use crate::state::PendingKeyword;
pub(super) use crate::state::SettingsState;

mod keyword_projection;
mod toggle_dispatch;

fn catalog() -> RuleCatalog {
    RuleCatalog::default()
}

fn state() -> SettingsState {
    SettingsState::new(RuleCategory::ALL.iter().copied())
}

fn rule_at(category: RuleCategory, level: IntensityLevel) -> RawRule {
    let actions = catalog().standard_actions(category, level);
    RawRule::new(
        category.rule_id().expect("remote rule"),
        !actions.is_disabled(),
        actions.actions().to_vec(),
    )
}

fn keyword_rule(keyword: &str, enabled: bool) -> RawRule {
    let actions = catalog().standard_actions(RuleCategory::Keywords, IntensityLevel::Noisy);
    RawRule::new(keyword, enabled, actions.actions().to_vec())
}

fn run_runtime(state: &mut SettingsState, action: RuntimeAction) {
    let effects = reduce(&catalog(), state, SettingsAction::Runtime(action));
    assert!(effects.is_empty());
}

fn run_user(state: &mut SettingsState, action: UserAction) -> Vec<SettingsEffect> {
    reduce(&catalog(), state, SettingsAction::User(action))
}

fn toggle(state: &mut SettingsState, category: RuleCategory, checked: bool) -> Vec<SettingsEffect> {
    run_user(state, UserAction::Toggle { category, checked })
}

fn snapshot(state: &mut SettingsState, rules: Vec<RawRule>) {
    run_runtime(state, RuntimeAction::RuleSnapshotChanged(rules));
}

fn keyword_snapshot(state: &mut SettingsState, rules: Vec<RawRule>) {
    run_runtime(state, RuntimeAction::KeywordSnapshotChanged(rules));
}

fn assert_view_invariants(state: &SettingsState) {
    let catalog = catalog();
    for category in state.view.checked.keys() {
        assert!(state.view.watched.contains(category), "{category:?} checked but unwatched");
    }
    for category in &state.view.out_of_sync {
        assert!(state.view.watched.contains(category), "{category:?} out of sync but unwatched");
        assert!(catalog.has_synced_group(*category), "{category:?} has no synced group");
    }
    assert_eq!(state.view.keywords.as_slice(), state.keyword_order.as_slice());
}
