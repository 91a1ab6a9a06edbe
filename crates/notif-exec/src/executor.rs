use std::sync::Arc;

use futures::future::join_all;
use notif_core::reducer::RuleUpdate;
use notif_core::reducer::SettingsEffect;
use notif_core::reducer::UpdatePlan;

use crate::contracts::RuleStore;

/// Executes reducer effects against the rule store.
///
/// Remote failures are logged and dropped here; the next snapshot from the
/// store is the only source of truth.
#[derive(Clone)]
pub struct UpdateCoordinator {
    store: Arc<dyn RuleStore>,
}

impl UpdateCoordinator {
    pub fn new(store: Arc<dyn RuleStore>) -> Self {
        Self { store }
    }

    /// Runs every effect to completion and reports whether one of them
    /// holds the saving flag.
    pub async fn execute(&self, effects: Vec<SettingsEffect>) -> bool {
        let mut releases_saving = false;
        for effect in effects {
            match effect {
                SettingsEffect::Dispatch(plan) => {
                    releases_saving |= plan.releases_saving();
                    self.run_plan(plan).await;
                }
                SettingsEffect::AddKeyword { keyword, enabled } => {
                    tracing::debug!(keyword = %keyword, "adding keyword");
                    if let Err(err) = self.store.add_keyword(&keyword, enabled).await {
                        tracing::warn!(keyword = %keyword, error = %err, "add keyword failed");
                    }
                }
                SettingsEffect::RemoveKeyword { keyword } => {
                    tracing::debug!(keyword = %keyword, "removing keyword");
                    if let Err(err) = self.store.remove_keyword(&keyword).await {
                        tracing::warn!(keyword = %keyword, error = %err, "remove keyword failed");
                    }
                }
            }
        }
        releases_saving
    }

    pub async fn run_plan(&self, plan: UpdatePlan) {
        match plan {
            UpdatePlan::Single(update) => self.apply(&update).await,
            UpdatePlan::KeywordBatch(updates) => self.apply_batch(&updates).await,
            UpdatePlan::SyncedGroup { parent, siblings } => {
                self.apply(&parent).await;
                self.apply_batch(&siblings).await;
            }
        }
    }

    async fn apply(&self, update: &RuleUpdate) {
        tracing::debug!(
            rule_id = %update.rule_id,
            enabled = update.enabled,
            "dispatching rule update"
        );
        if let Err(err) = self
            .store
            .update_rule_actions(&update.rule_id, update.enabled, &update.actions)
            .await
        {
            tracing::warn!(rule_id = %update.rule_id, error = %err, "rule update failed");
        }
    }

    /// Dispatches all updates at once and waits for every one to settle.
    async fn apply_batch(&self, updates: &[RuleUpdate]) {
        if updates.is_empty() {
            return;
        }
        join_all(updates.iter().map(|update| self.apply(update))).await;
    }
}
