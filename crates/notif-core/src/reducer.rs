use super::actions::RuntimeAction;
use super::actions::SettingsAction;
use super::actions::UserAction;
use super::catalog::ActionSet;
use super::catalog::IntensityLevel;
use super::catalog::RuleCatalog;
use super::catalog::RuleCategory;
use super::catalog::RESERVED_RULE_PREFIX;
use super::reconcile::apply_keyword_snapshot;
use super::reconcile::apply_rule_snapshot;
use super::state::PendingKeyword;
use super::state::SettingsState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleUpdate {
    pub rule_id: String,
    pub enabled: bool,
    pub actions: ActionSet,
}

impl RuleUpdate {
    pub fn new(rule_id: impl Into<String>, actions: ActionSet) -> Self {
        Self {
            rule_id: rule_id.into(),
            enabled: !actions.is_disabled(),
            actions,
        }
    }
}

/// Remote writes for one toggle, with the ordering they must be issued in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdatePlan {
    Single(RuleUpdate),
    /// Unordered fan-out, one update per tracked keyword.
    KeywordBatch(Vec<RuleUpdate>),
    /// `parent` settles before any sibling is dispatched; siblings run as
    /// one unordered batch.
    SyncedGroup {
        parent: RuleUpdate,
        siblings: Vec<RuleUpdate>,
    },
}

impl UpdatePlan {
    pub fn releases_saving(&self) -> bool {
        matches!(self, Self::SyncedGroup { .. })
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::KeywordBatch(updates) => updates.len(),
            Self::SyncedGroup { siblings, .. } => 1 + siblings.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsEffect {
    Dispatch(UpdatePlan),
    AddKeyword { keyword: String, enabled: bool },
    RemoveKeyword { keyword: String },
}

pub fn reduce(
    catalog: &RuleCatalog,
    state: &mut SettingsState,
    action: SettingsAction,
) -> Vec<SettingsEffect> {
    match action {
        SettingsAction::User(user) => reduce_user(catalog, state, user),
        SettingsAction::Runtime(runtime) => {
            reduce_runtime(catalog, state, runtime);
            Vec::new()
        }
    }
}

fn reduce_user(
    catalog: &RuleCatalog,
    state: &mut SettingsState,
    action: UserAction,
) -> Vec<SettingsEffect> {
    match action {
        UserAction::Toggle { category, checked } => toggle(catalog, state, category, checked),
        UserAction::AddKeyword(text) => {
            if !state.watches_keywords() {
                tracing::debug!(keyword = %text, "keywords not watched; ignoring add");
                return Vec::new();
            }
            let Some(keyword) = normalize_keyword(&text) else {
                tracing::debug!(keyword = %text, "ignoring invalid keyword");
                return Vec::new();
            };
            if !state.keyword_order.insert_if_absent(&keyword) {
                return Vec::new();
            }
            state.publish_keywords();
            state
                .view
                .pending_keywords
                .insert(keyword.clone(), PendingKeyword::Added);
            vec![SettingsEffect::AddKeyword {
                keyword,
                enabled: true,
            }]
        }
        UserAction::RemoveKeyword(text) => {
            if !state.watches_keywords() {
                tracing::debug!(keyword = %text, "keywords not watched; ignoring remove");
                return Vec::new();
            }
            let Some(keyword) = normalize_keyword(&text) else {
                tracing::debug!(keyword = %text, "ignoring invalid keyword");
                return Vec::new();
            };
            if state.keyword_order.remove(&keyword) {
                state.publish_keywords();
            }
            state
                .view
                .pending_keywords
                .insert(keyword.clone(), PendingKeyword::Removed);
            vec![SettingsEffect::RemoveKeyword { keyword }]
        }
    }
}

fn toggle(
    catalog: &RuleCatalog,
    state: &mut SettingsState,
    category: RuleCategory,
    checked: bool,
) -> Vec<SettingsEffect> {
    let level = IntensityLevel::for_toggle(checked);
    tracing::debug!(
        category = category.label(),
        level = level.label(),
        "resolving toggle"
    );

    if category == RuleCategory::Keywords {
        if !state.watches_keywords() {
            return Vec::new();
        }
        if state.keyword_order.is_empty() {
            state.view.checked.insert(category, checked);
            return Vec::new();
        }
        let actions = catalog.standard_actions(category, level);
        let updates = state
            .keyword_order
            .as_slice()
            .iter()
            .map(|keyword| RuleUpdate::new(keyword.clone(), actions.clone()))
            .collect();
        return vec![SettingsEffect::Dispatch(UpdatePlan::KeywordBatch(updates))];
    }

    let Some(parent) = rule_update_for(catalog, category, level) else {
        return Vec::new();
    };

    if !catalog.has_synced_group(category) {
        return vec![SettingsEffect::Dispatch(UpdatePlan::Single(parent))];
    }

    let siblings = catalog
        .synced_group(category)
        .iter()
        .filter_map(|sibling| rule_update_for(catalog, *sibling, level))
        .collect();
    state.view.saving = true;
    vec![SettingsEffect::Dispatch(UpdatePlan::SyncedGroup {
        parent,
        siblings,
    })]
}

fn rule_update_for(
    catalog: &RuleCatalog,
    category: RuleCategory,
    level: IntensityLevel,
) -> Option<RuleUpdate> {
    let rule_id = category.rule_id()?;
    Some(RuleUpdate::new(
        rule_id,
        catalog.standard_actions(category, level),
    ))
}

fn reduce_runtime(catalog: &RuleCatalog, state: &mut SettingsState, action: RuntimeAction) {
    match action {
        RuntimeAction::RuleSnapshotChanged(rules) => {
            apply_rule_snapshot(catalog, state, &rules);
        }
        RuntimeAction::KeywordSnapshotChanged(rules) => {
            apply_keyword_snapshot(state, &rules);
        }
        RuntimeAction::UpdateSettled { releases_saving } => {
            if releases_saving {
                state.view.saving = false;
            }
        }
    }
}

/// Trimmed keyword text, or `None` when it is empty or collides with the
/// reserved rule namespace.
pub fn normalize_keyword(text: &str) -> Option<String> {
    let keyword = text.trim();
    if keyword.is_empty() || keyword.starts_with(RESERVED_RULE_PREFIX) {
        return None;
    }
    Some(keyword.to_string())
}

#[cfg(test)]
mod tests;
