use super::catalog::RawRule;
use super::catalog::RuleCategory;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsAction {
    User(UserAction),
    Runtime(RuntimeAction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    Toggle { category: RuleCategory, checked: bool },
    AddKeyword(String),
    RemoveKeyword(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeAction {
    /// Full snapshot of every rule in the store.
    RuleSnapshotChanged(Vec<RawRule>),
    /// Snapshot of the user content rules only.
    KeywordSnapshotChanged(Vec<RawRule>),
    /// All remote calls of a dispatched plan have settled, successfully or
    /// not.
    UpdateSettled { releases_saving: bool },
}

impl From<UserAction> for SettingsAction {
    fn from(action: UserAction) -> Self {
        Self::User(action)
    }
}

impl From<RuntimeAction> for SettingsAction {
    fn from(action: RuntimeAction) -> Self {
        Self::Runtime(action)
    }
}
