use async_trait::async_trait;
use notif_core::catalog::ActionSet;
use notif_core::catalog::RawRule;
use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown rule: {0}")]
    UnknownRule(String),
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Remote rule store the settings engine reconciles against.
///
/// Both streams always hold the latest full snapshot. The content stream
/// carries only rules whose id does not start with the reserved prefix.
#[async_trait]
pub trait RuleStore: Send + Sync {
    fn rules(&self) -> watch::Receiver<Vec<RawRule>>;

    fn content_rules(&self) -> watch::Receiver<Vec<RawRule>>;

    async fn update_rule_actions(
        &self,
        rule_id: &str,
        enabled: bool,
        actions: &ActionSet,
    ) -> Result<(), StoreError>;

    async fn add_keyword(&self, text: &str, enabled: bool) -> Result<(), StoreError>;

    async fn remove_keyword(&self, text: &str) -> Result<(), StoreError>;
}
