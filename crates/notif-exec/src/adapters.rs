use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use notif_core::catalog::ActionSet;
use notif_core::catalog::IntensityLevel;
use notif_core::catalog::RawRule;
use notif_core::catalog::RuleAction;
use notif_core::catalog::RuleCatalog;
use notif_core::catalog::RuleCategory;
use parking_lot::Mutex;
use serde::Deserialize;
use serde::Serialize;
use tokio::sync::watch;
use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::Semaphore;

use crate::contracts::RuleStore;
use crate::contracts::StoreError;

/// Holds store mutations until permits are released. Tests use it to
/// observe the engine while remote calls are in flight.
#[derive(Debug, Clone)]
pub struct UpdateGate {
    permits: Arc<Semaphore>,
}

impl UpdateGate {
    /// Lets `count` more mutations through.
    pub fn release(&self, count: usize) {
        self.permits.add_permits(count);
    }

    /// Lets every current and future mutation through.
    pub fn open(&self) {
        self.permits.close();
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    rules: Vec<RawRule>,
    failures: HashSet<String>,
    gate: Option<UpdateGate>,
    dispatched: Vec<String>,
    applied: Vec<String>,
}

/// In-process rule store. Every successful mutation publishes fresh
/// snapshots on both streams.
#[derive(Debug)]
pub struct MemoryRuleStore {
    inner: Mutex<MemoryState>,
    rules_tx: watch::Sender<Vec<RawRule>>,
    content_tx: watch::Sender<Vec<RawRule>>,
    keyword_actions: Vec<RuleAction>,
}

impl MemoryRuleStore {
    pub fn new(rules: Vec<RawRule>) -> Self {
        let (rules_tx, _) = watch::channel(rules.clone());
        let (content_tx, _) = watch::channel(content_subset(&rules));
        let keyword_actions = RuleCatalog::default()
            .standard_actions(RuleCategory::Keywords, IntensityLevel::Noisy)
            .actions()
            .to_vec();
        Self {
            inner: Mutex::new(MemoryState {
                rules,
                ..MemoryState::default()
            }),
            rules_tx,
            content_tx,
            keyword_actions,
        }
    }

    /// Actions given to keyword rules created through `add_keyword`.
    pub fn with_keyword_actions(mut self, actions: Vec<RuleAction>) -> Self {
        self.keyword_actions = actions;
        self
    }

    pub fn snapshot(&self) -> Vec<RawRule> {
        self.inner.lock().rules.clone()
    }

    pub fn rule(&self, rule_id: &str) -> Option<RawRule> {
        self.inner
            .lock()
            .rules
            .iter()
            .find(|rule| rule.rule_id == rule_id)
            .cloned()
    }

    /// Replaces every rule, as if another client rewrote the store.
    pub fn replace_rules(&self, rules: Vec<RawRule>) {
        let mut inner = self.inner.lock();
        inner.rules = rules;
        self.publish(&inner.rules);
    }

    /// Makes the next mutation that targets `target` (a rule id or keyword)
    /// fail with a transport error.
    pub fn fail_next(&self, target: impl Into<String>) {
        self.inner.lock().failures.insert(target.into());
    }

    pub fn hold_updates(&self) -> UpdateGate {
        let gate = UpdateGate {
            permits: Arc::new(Semaphore::new(0)),
        };
        self.inner.lock().gate = Some(gate.clone());
        gate
    }

    /// Targets of every mutation that reached the store, in arrival order.
    pub fn dispatched(&self) -> Vec<String> {
        self.inner.lock().dispatched.clone()
    }

    /// Targets of every mutation that was applied, in completion order.
    pub fn applied(&self) -> Vec<String> {
        self.inner.lock().applied.clone()
    }

    async fn enter(&self, target: &str) -> Result<(), StoreError> {
        let gate = {
            let mut inner = self.inner.lock();
            inner.dispatched.push(target.to_string());
            inner.gate.clone()
        };
        if let Some(gate) = gate {
            // A closed gate lets everything through.
            if let Ok(permit) = gate.permits.acquire().await {
                permit.forget();
            }
        }
        let failed = self.inner.lock().failures.remove(target);
        if failed {
            return Err(StoreError::Transport(format!("injected failure for {target}")));
        }
        Ok(())
    }

    fn publish(&self, rules: &[RawRule]) {
        self.rules_tx.send_replace(rules.to_vec());
        self.content_tx.send_replace(content_subset(rules));
    }
}

fn content_subset(rules: &[RawRule]) -> Vec<RawRule> {
    rules
        .iter()
        .filter(|rule| rule.is_content_rule())
        .cloned()
        .collect()
}

#[async_trait]
impl RuleStore for MemoryRuleStore {
    fn rules(&self) -> watch::Receiver<Vec<RawRule>> {
        self.rules_tx.subscribe()
    }

    fn content_rules(&self) -> watch::Receiver<Vec<RawRule>> {
        self.content_tx.subscribe()
    }

    async fn update_rule_actions(
        &self,
        rule_id: &str,
        enabled: bool,
        actions: &ActionSet,
    ) -> Result<(), StoreError> {
        self.enter(rule_id).await?;
        let mut inner = self.inner.lock();
        let Some(rule) = inner.rules.iter_mut().find(|rule| rule.rule_id == rule_id) else {
            return Err(StoreError::UnknownRule(rule_id.to_string()));
        };
        rule.enabled = enabled;
        if let ActionSet::Actions(list) = actions {
            rule.actions = list.clone();
        }
        inner.applied.push(rule_id.to_string());
        self.publish(&inner.rules);
        Ok(())
    }

    async fn add_keyword(&self, text: &str, enabled: bool) -> Result<(), StoreError> {
        self.enter(text).await?;
        let mut inner = self.inner.lock();
        if inner.rules.iter().any(|rule| rule.rule_id == text) {
            return Err(StoreError::Rejected(format!("keyword already exists: {text}")));
        }
        inner.rules.push(RawRule::new(
            text,
            enabled,
            self.keyword_actions.clone(),
        ));
        inner.applied.push(text.to_string());
        self.publish(&inner.rules);
        Ok(())
    }

    async fn remove_keyword(&self, text: &str) -> Result<(), StoreError> {
        self.enter(text).await?;
        let mut inner = self.inner.lock();
        let Some(idx) = inner
            .rules
            .iter()
            .position(|rule| rule.is_content_rule() && rule.rule_id == text)
        else {
            return Err(StoreError::UnknownRule(text.to_string()));
        };
        inner.rules.remove(idx);
        inner.applied.push(text.to_string());
        self.publish(&inner.rules);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRuleFile {
    pub updated_at_ms: i64,
    pub rules: Vec<RawRule>,
}

/// Memory store mirrored to a JSON file after every successful mutation.
#[derive(Debug)]
pub struct FileRuleStore {
    path: PathBuf,
    memory: MemoryRuleStore,
    persist_lock: AsyncMutex<()>,
}

impl FileRuleStore {
    /// Opens `path`, seeding it with `seed()` when the file does not exist.
    pub fn open(
        path: impl AsRef<Path>,
        seed: impl FnOnce() -> Vec<RawRule>,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if path.exists() {
            let bytes = std::fs::read(&path)?;
            let file = serde_json::from_slice::<PersistedRuleFile>(&bytes)?;
            return Ok(Self {
                path,
                memory: MemoryRuleStore::new(file.rules),
                persist_lock: AsyncMutex::new(()),
            });
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let store = Self {
            path,
            memory: MemoryRuleStore::new(seed()),
            persist_lock: AsyncMutex::new(()),
        };
        std::fs::write(&store.path, store.encode()?)?;
        Ok(store)
    }

    /// Actions given to keyword rules created through `add_keyword`.
    pub fn with_keyword_actions(mut self, actions: Vec<RuleAction>) -> Self {
        self.memory = self.memory.with_keyword_actions(actions);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn memory(&self) -> &MemoryRuleStore {
        &self.memory
    }

    pub fn load(&self) -> Result<PersistedRuleFile, StoreError> {
        let bytes = std::fs::read(&self.path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn encode(&self) -> Result<Vec<u8>, StoreError> {
        let file = PersistedRuleFile {
            updated_at_ms: chrono::Utc::now().timestamp_millis(),
            rules: self.memory.snapshot(),
        };
        Ok(serde_json::to_vec_pretty(&file)?)
    }

    /// Snapshot and write happen under one lock, so the last write always
    /// carries the newest rules.
    async fn persist(&self) -> Result<(), StoreError> {
        let _guard = self.persist_lock.lock().await;
        let encoded = self.encode()?;
        tokio::fs::write(&self.path, encoded).await?;
        Ok(())
    }
}

#[async_trait]
impl RuleStore for FileRuleStore {
    fn rules(&self) -> watch::Receiver<Vec<RawRule>> {
        self.memory.rules()
    }

    fn content_rules(&self) -> watch::Receiver<Vec<RawRule>> {
        self.memory.content_rules()
    }

    async fn update_rule_actions(
        &self,
        rule_id: &str,
        enabled: bool,
        actions: &ActionSet,
    ) -> Result<(), StoreError> {
        self.memory
            .update_rule_actions(rule_id, enabled, actions)
            .await?;
        self.persist().await
    }

    async fn add_keyword(&self, text: &str, enabled: bool) -> Result<(), StoreError> {
        self.memory.add_keyword(text, enabled).await?;
        self.persist().await
    }

    async fn remove_keyword(&self, text: &str) -> Result<(), StoreError> {
        self.memory.remove_keyword(text).await?;
        self.persist().await
    }
}
