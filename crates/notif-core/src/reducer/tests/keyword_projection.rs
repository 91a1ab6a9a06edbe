use super::*;
use pretty_assertions::assert_eq;

#[test]
fn keyword_snapshot_orders_new_keywords_ascending() {
    let mut state = state();
    keyword_snapshot(
        &mut state,
        vec![
            keyword_rule("zeta", true),
            keyword_rule("alpha", false),
            keyword_rule("mid", false),
        ],
    );

    assert_eq!(state.view.keywords, vec!["alpha", "mid", "zeta"]);
    assert_eq!(state.view.is_checked(RuleCategory::Keywords), Some(true));
}

#[test]
fn later_snapshots_keep_survivor_order() {
    let mut state = state();
    run_user(&mut state, UserAction::AddKeyword("b".to_string()));
    run_user(&mut state, UserAction::AddKeyword("a".to_string()));
    keyword_snapshot(
        &mut state,
        vec![keyword_rule("a", true), keyword_rule("b", true), keyword_rule("c", true)],
    );

    assert_eq!(state.view.keywords, vec!["b", "a", "c"]);
    assert!(state.view.pending_keywords.is_empty());
}

#[test]
fn all_disabled_keywords_read_unchecked() {
    let mut state = state();
    keyword_snapshot(
        &mut state,
        vec![keyword_rule("a", false), keyword_rule("b", false)],
    );
    assert_eq!(state.view.is_checked(RuleCategory::Keywords), Some(false));
}

#[test]
fn empty_keyword_snapshot_leaves_checked_untouched() {
    let mut state = state();
    toggle(&mut state, RuleCategory::Keywords, true);
    keyword_snapshot(&mut state, Vec::new());

    assert!(state.view.keywords.is_empty());
    assert_eq!(state.view.is_checked(RuleCategory::Keywords), Some(true));
}

#[test]
fn reserved_rules_never_become_keywords() {
    let mut state = state();
    keyword_snapshot(
        &mut state,
        vec![
            RawRule::new(".m.rule.contains_user_name", true, Vec::new()),
            keyword_rule("lunch", true),
        ],
    );
    assert_eq!(state.view.keywords, vec!["lunch"]);
}

#[test]
fn unwatched_keywords_skip_keyword_projection() {
    let mut state = SettingsState::new([RuleCategory::Call]);
    keyword_snapshot(&mut state, vec![keyword_rule("lunch", true)]);

    assert!(state.view.keywords.is_empty());
    assert!(!state.view.checked.contains_key(&RuleCategory::Keywords));
}

#[test]
fn add_keyword_is_optimistic_and_pending() {
    let mut state = state();
    let effects = run_user(&mut state, UserAction::AddKeyword("  coffee ".to_string()));

    assert_eq!(
        effects,
        vec![SettingsEffect::AddKeyword {
            keyword: "coffee".to_string(),
            enabled: true,
        }]
    );
    assert_eq!(state.view.keywords, vec!["coffee"]);
    assert_eq!(
        state.view.pending_keywords.get("coffee"),
        Some(&PendingKeyword::Added)
    );

    let again = run_user(&mut state, UserAction::AddKeyword("coffee".to_string()));
    assert!(again.is_empty());
}

#[test]
fn invalid_keywords_are_ignored() {
    let mut state = state();
    assert!(run_user(&mut state, UserAction::AddKeyword("   ".to_string())).is_empty());
    assert!(run_user(&mut state, UserAction::AddKeyword(".m.rule.x".to_string())).is_empty());
    assert!(run_user(&mut state, UserAction::RemoveKeyword(String::new())).is_empty());
    assert!(state.view.keywords.is_empty());
}

#[test]
fn remove_keyword_is_optimistic_and_overwritten_by_snapshot() {
    let mut state = state();
    keyword_snapshot(
        &mut state,
        vec![keyword_rule("a", true), keyword_rule("b", true)],
    );

    let effects = run_user(&mut state, UserAction::RemoveKeyword("a".to_string()));
    assert_eq!(
        effects,
        vec![SettingsEffect::RemoveKeyword {
            keyword: "a".to_string()
        }]
    );
    assert_eq!(state.view.keywords, vec!["b"]);
    assert_eq!(
        state.view.pending_keywords.get("a"),
        Some(&PendingKeyword::Removed)
    );

    // The store refused the removal; the snapshot brings it back at the end.
    keyword_snapshot(
        &mut state,
        vec![keyword_rule("a", true), keyword_rule("b", true)],
    );
    assert_eq!(state.view.keywords, vec!["b", "a"]);
    assert!(state.view.pending_keywords.is_empty());
}
