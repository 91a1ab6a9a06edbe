use super::*;
use pretty_assertions::assert_eq;

#[test]
fn singleton_toggle_dispatches_single_update() {
    let mut state = state();
    let effects = toggle(&mut state, RuleCategory::Call, false);

    assert_eq!(
        effects,
        vec![SettingsEffect::Dispatch(UpdatePlan::Single(RuleUpdate {
            rule_id: ".m.rule.call".to_string(),
            enabled: false,
            actions: ActionSet::Disabled,
        }))]
    );
    assert!(!state.view.saving);
}

#[test]
fn dont_notify_preset_keeps_rule_enabled() {
    let mut state = state();
    let effects = toggle(&mut state, RuleCategory::EncryptedGroupMessage, false);

    let [SettingsEffect::Dispatch(UpdatePlan::Single(update))] = effects.as_slice() else {
        panic!("unexpected effects: {effects:?}");
    };
    assert!(update.enabled);
    assert_eq!(
        update.actions,
        catalog().standard_actions(RuleCategory::EncryptedGroupMessage, IntensityLevel::Off)
    );
}

#[test]
fn synced_toggle_sets_saving_and_orders_parent_first() {
    let mut state = state();
    let effects = toggle(&mut state, RuleCategory::OneToOneRoom, true);

    assert!(state.view.saving);
    assert_eq!(
        effects,
        vec![SettingsEffect::Dispatch(UpdatePlan::SyncedGroup {
            parent: RuleUpdate::new(
                ".m.rule.room_one_to_one",
                catalog().standard_actions(RuleCategory::OneToOneRoom, IntensityLevel::Noisy),
            ),
            siblings: vec![RuleUpdate::new(
                ".m.rule.message",
                catalog().standard_actions(RuleCategory::AllOtherMessages, IntensityLevel::Noisy),
            )],
        })]
    );
}

#[test]
fn settle_releases_saving_only_for_synced_plans() {
    let mut state = state();
    toggle(&mut state, RuleCategory::AllOtherMessages, false);
    assert!(state.view.saving);

    run_runtime(
        &mut state,
        RuntimeAction::UpdateSettled {
            releases_saving: false,
        },
    );
    assert!(state.view.saving);

    run_runtime(
        &mut state,
        RuntimeAction::UpdateSettled {
            releases_saving: true,
        },
    );
    assert!(!state.view.saving);
}

#[test]
fn empty_keyword_toggle_is_local_only() {
    let mut state = state();
    let effects = toggle(&mut state, RuleCategory::Keywords, true);

    assert!(effects.is_empty());
    assert_eq!(state.view.is_checked(RuleCategory::Keywords), Some(true));

    let effects = toggle(&mut state, RuleCategory::Keywords, false);
    assert!(effects.is_empty());
    assert_eq!(state.view.is_checked(RuleCategory::Keywords), Some(false));
    assert!(!state.view.saving);
}

#[test]
fn keyword_toggle_fans_out_per_keyword() {
    let mut state = state();
    keyword_snapshot(
        &mut state,
        vec![keyword_rule("b", true), keyword_rule("a", true)],
    );

    let effects = toggle(&mut state, RuleCategory::Keywords, false);
    assert_eq!(
        effects,
        vec![SettingsEffect::Dispatch(UpdatePlan::KeywordBatch(vec![
            RuleUpdate::new("a", ActionSet::Disabled),
            RuleUpdate::new("b", ActionSet::Disabled),
        ]))]
    );
    assert!(!state.view.saving);
    assert_eq!(state.view.is_checked(RuleCategory::Keywords), Some(true));
}

#[test]
fn plan_sizes_count_every_remote_call() {
    let plan = UpdatePlan::SyncedGroup {
        parent: RuleUpdate::new(".m.rule.message", ActionSet::Disabled),
        siblings: vec![RuleUpdate::new(".m.rule.encrypted", ActionSet::Disabled)],
    };
    assert_eq!(plan.len(), 2);
    assert!(plan.releases_saving());
    assert!(UpdatePlan::KeywordBatch(Vec::new()).is_empty());
}
