use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use super::catalog::RuleCategory;
use super::keywords::KeywordOrderTracker;

/// Marker for a keyword change applied locally but not yet confirmed by a
/// content-rule snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingKeyword {
    Added,
    Removed,
}

impl PendingKeyword {
    pub fn label(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
        }
    }
}

/// Snapshot handed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub saving: bool,
    pub watched: Vec<RuleCategory>,
    pub checked: BTreeMap<RuleCategory, bool>,
    pub out_of_sync: BTreeSet<RuleCategory>,
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub pending_keywords: BTreeMap<String, PendingKeyword>,
}

impl ViewState {
    pub fn is_watched(&self, category: RuleCategory) -> bool {
        self.watched.contains(&category)
    }

    pub fn is_checked(&self, category: RuleCategory) -> Option<bool> {
        self.checked.get(&category).copied()
    }

    /// Out-of-sync indicators stay hidden while a synced update is in flight.
    pub fn is_rule_out_of_sync(&self, category: RuleCategory) -> bool {
        self.out_of_sync.contains(&category) && !self.saving
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsState {
    pub view: ViewState,
    pub keyword_order: KeywordOrderTracker,
}

impl SettingsState {
    pub fn new(watched: impl IntoIterator<Item = RuleCategory>) -> Self {
        let mut ordered = Vec::new();
        for category in watched {
            if !ordered.contains(&category) {
                ordered.push(category);
            }
        }
        Self {
            view: ViewState {
                watched: ordered,
                ..ViewState::default()
            },
            keyword_order: KeywordOrderTracker::new(),
        }
    }

    pub fn watches_keywords(&self) -> bool {
        self.view.is_watched(RuleCategory::Keywords)
    }

    pub(crate) fn publish_keywords(&mut self) {
        self.view.keywords = self.keyword_order.as_slice().to_vec();
    }
}
