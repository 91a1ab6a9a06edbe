use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use super::config::CatalogConfig;

/// Identifiers starting with this prefix belong to server-defined rules.
/// Everything else in the content-rule set is a user keyword.
pub const RESERVED_RULE_PREFIX: &str = ".";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    OneToOneRoom,
    EncryptedOneToOneRoom,
    AllOtherMessages,
    EncryptedGroupMessage,
    ContainsDisplayName,
    ContainsUserName,
    RoomNotif,
    InviteForMe,
    Call,
    Tombstone,
    Keywords,
}

impl RuleCategory {
    pub const ALL: &'static [RuleCategory] = &[
        Self::OneToOneRoom,
        Self::EncryptedOneToOneRoom,
        Self::AllOtherMessages,
        Self::EncryptedGroupMessage,
        Self::ContainsDisplayName,
        Self::ContainsUserName,
        Self::RoomNotif,
        Self::InviteForMe,
        Self::Call,
        Self::Tombstone,
        Self::Keywords,
    ];

    /// Remote rule backing this category. `Keywords` aggregates many content
    /// rules and has none.
    pub fn rule_id(self) -> Option<&'static str> {
        match self {
            Self::OneToOneRoom => Some(".m.rule.room_one_to_one"),
            Self::EncryptedOneToOneRoom => Some(".m.rule.encrypted_room_one_to_one"),
            Self::AllOtherMessages => Some(".m.rule.message"),
            Self::EncryptedGroupMessage => Some(".m.rule.encrypted"),
            Self::ContainsDisplayName => Some(".m.rule.contains_display_name"),
            Self::ContainsUserName => Some(".m.rule.contains_user_name"),
            Self::RoomNotif => Some(".m.rule.roomnotif"),
            Self::InviteForMe => Some(".m.rule.invite_for_me"),
            Self::Call => Some(".m.rule.call"),
            Self::Tombstone => Some(".m.rule.tombstone"),
            Self::Keywords => None,
        }
    }

    pub fn from_rule_id(rule_id: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.rule_id() == Some(rule_id))
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::OneToOneRoom => "one_to_one_room",
            Self::EncryptedOneToOneRoom => "encrypted_one_to_one_room",
            Self::AllOtherMessages => "all_other_messages",
            Self::EncryptedGroupMessage => "encrypted_group_message",
            Self::ContainsDisplayName => "contains_display_name",
            Self::ContainsUserName => "contains_user_name",
            Self::RoomNotif => "room_notif",
            Self::InviteForMe => "invite_for_me",
            Self::Call => "call",
            Self::Tombstone => "tombstone",
            Self::Keywords => "keywords",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        let needle = input.trim().replace('-', "_").to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.label() == needle)
    }
}

/// Discrete notification intensities. Declaration order is the matching
/// order used by classification: the first level whose preset equals a
/// rule's action set wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityLevel {
    Noisy,
    Silent,
    Off,
}

impl IntensityLevel {
    pub const ALL: [IntensityLevel; 3] = [Self::Noisy, Self::Silent, Self::Off];

    pub fn is_enabled(self) -> bool {
        !matches!(self, Self::Off)
    }

    /// Level a boolean toggle resolves to: the first enabled level when
    /// checked, the disabled level otherwise.
    pub fn for_toggle(checked: bool) -> Self {
        if checked {
            Self::ALL
                .into_iter()
                .find(|level| level.is_enabled())
                .unwrap_or(Self::Noisy)
        } else {
            Self::Off
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Noisy => "noisy",
            Self::Silent => "silent",
            Self::Off => "off",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    Notify,
    DontNotify,
    Sound(String),
    Highlight(bool),
}

/// What a rule does when it fires. `Disabled` switches the rule off as a
/// whole, independent of its action list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSet {
    Disabled,
    Actions(Vec<RuleAction>),
}

impl ActionSet {
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }

    pub fn actions(&self) -> &[RuleAction] {
        match self {
            Self::Disabled => &[],
            Self::Actions(actions) => actions.as_slice(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRule {
    pub rule_id: String,
    pub enabled: bool,
    #[serde(default)]
    pub actions: Vec<RuleAction>,
}

impl RawRule {
    pub fn new(rule_id: impl Into<String>, enabled: bool, actions: Vec<RuleAction>) -> Self {
        Self {
            rule_id: rule_id.into(),
            enabled,
            actions,
        }
    }

    /// Effective action set: a disabled rule compares as `Disabled` no
    /// matter what actions it still carries.
    pub fn action_set(&self) -> ActionSet {
        if self.enabled {
            ActionSet::Actions(self.actions.clone())
        } else {
            ActionSet::Disabled
        }
    }

    pub fn is_content_rule(&self) -> bool {
        !self.rule_id.starts_with(RESERVED_RULE_PREFIX)
    }

    pub fn category(&self) -> Option<RuleCategory> {
        RuleCategory::from_rule_id(&self.rule_id)
    }
}

/// Static knowledge about categories: the preset action set for every
/// intensity level and the synced groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleCatalog {
    synced_groups: BTreeMap<RuleCategory, Vec<RuleCategory>>,
    default_sound: String,
    preset_overrides: BTreeMap<RuleCategory, BTreeMap<IntensityLevel, ActionSet>>,
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::from_config(&CatalogConfig::default())
    }
}

impl RuleCatalog {
    pub fn from_config(config: &CatalogConfig) -> Self {
        let mut synced_groups = BTreeMap::new();
        for (category, group) in &config.synced_groups {
            if *category == RuleCategory::Keywords {
                continue;
            }
            let mut members: Vec<RuleCategory> = Vec::with_capacity(group.len());
            for member in group {
                if *member == *category
                    || *member == RuleCategory::Keywords
                    || members.contains(member)
                {
                    continue;
                }
                members.push(*member);
            }
            if !members.is_empty() {
                synced_groups.insert(*category, members);
            }
        }
        Self {
            synced_groups,
            default_sound: config.default_sound.clone(),
            preset_overrides: config.preset_overrides.clone(),
        }
    }

    pub fn synced_group(&self, category: RuleCategory) -> &[RuleCategory] {
        self.synced_groups
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_synced_group(&self, category: RuleCategory) -> bool {
        !self.synced_group(category).is_empty()
    }

    pub fn standard_actions(&self, category: RuleCategory, level: IntensityLevel) -> ActionSet {
        if let Some(actions) = self
            .preset_overrides
            .get(&category)
            .and_then(|levels| levels.get(&level))
        {
            return actions.clone();
        }
        self.builtin_actions(category, level)
    }

    fn builtin_actions(&self, category: RuleCategory, level: IntensityLevel) -> ActionSet {
        use RuleAction::*;

        let sound = || Sound(self.default_sound.clone());
        match category {
            RuleCategory::OneToOneRoom
            | RuleCategory::EncryptedOneToOneRoom
            | RuleCategory::AllOtherMessages
            | RuleCategory::EncryptedGroupMessage => match level {
                IntensityLevel::Noisy => ActionSet::Actions(vec![Notify, sound()]),
                IntensityLevel::Silent => ActionSet::Actions(vec![Notify]),
                IntensityLevel::Off => ActionSet::Actions(vec![DontNotify]),
            },
            RuleCategory::ContainsDisplayName | RuleCategory::ContainsUserName => match level {
                IntensityLevel::Noisy => ActionSet::Actions(vec![Notify, sound(), Highlight(true)]),
                IntensityLevel::Silent => ActionSet::Actions(vec![Notify]),
                IntensityLevel::Off => ActionSet::Disabled,
            },
            RuleCategory::RoomNotif | RuleCategory::Tombstone => match level {
                IntensityLevel::Noisy => ActionSet::Actions(vec![Notify, Highlight(true)]),
                IntensityLevel::Silent => ActionSet::Actions(vec![Notify]),
                IntensityLevel::Off => ActionSet::Disabled,
            },
            RuleCategory::InviteForMe | RuleCategory::Keywords => match level {
                IntensityLevel::Noisy => ActionSet::Actions(vec![Notify, sound()]),
                IntensityLevel::Silent => ActionSet::Actions(vec![Notify]),
                IntensityLevel::Off => ActionSet::Disabled,
            },
            RuleCategory::Call => match level {
                IntensityLevel::Noisy => {
                    ActionSet::Actions(vec![Notify, Sound("ring".to_string())])
                }
                IntensityLevel::Silent => ActionSet::Actions(vec![Notify]),
                IntensityLevel::Off => ActionSet::Disabled,
            },
        }
    }

    /// One rule per category that has a remote identifier, each at its noisy
    /// preset. Used to seed an empty rule store.
    pub fn default_rules(&self) -> Vec<RawRule> {
        RuleCategory::ALL
            .iter()
            .filter_map(|category| {
                let rule_id = category.rule_id()?;
                let actions = self.standard_actions(*category, IntensityLevel::Noisy);
                Some(RawRule::new(
                    rule_id,
                    !actions.is_disabled(),
                    actions.actions().to_vec(),
                ))
            })
            .collect()
    }
}
