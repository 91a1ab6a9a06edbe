use std::sync::Arc;

use notif_core::actions::RuntimeAction;
use notif_core::actions::SettingsAction;
use notif_core::actions::UserAction;
use notif_core::catalog::RawRule;
use notif_core::catalog::RuleCatalog;
use notif_core::catalog::RuleCategory;
use notif_core::reducer::reduce;
use notif_core::reducer::SettingsEffect;
use notif_core::state::SettingsState;
use notif_core::state::ViewState;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::contracts::RuleStore;
use crate::executor::UpdateCoordinator;

enum EngineMessage {
    Runtime(RuntimeAction),
    Command {
        action: UserAction,
        done: oneshot::Sender<()>,
    },
    Settled {
        releases_saving: bool,
        done: oneshot::Sender<()>,
    },
    Refresh {
        done: oneshot::Sender<()>,
    },
    Shutdown,
}

/// Owns the settings state for one screen.
///
/// All state changes go through a single ordered channel drained by one
/// task: store snapshots, user commands and plan completions are reduced in
/// arrival order. Remote calls run on their own tasks and report back
/// through the same channel.
pub struct SettingsEngine {
    tx: mpsc::UnboundedSender<EngineMessage>,
    view: watch::Receiver<ViewState>,
    event_loop: Option<JoinHandle<()>>,
    forwarders: Vec<JoinHandle<()>>,
}

impl SettingsEngine {
    /// Starts the engine. The current store snapshots are reduced before
    /// this returns, so the first published view is already reconciled.
    pub fn spawn(
        store: Arc<dyn RuleStore>,
        catalog: RuleCatalog,
        watched: impl IntoIterator<Item = RuleCategory>,
    ) -> Self {
        let mut state = SettingsState::new(watched);
        let mut rules_rx = store.rules();
        let mut content_rx = store.content_rules();

        let rules = rules_rx.borrow_and_update().clone();
        let content = content_rx.borrow_and_update().clone();
        reduce(
            &catalog,
            &mut state,
            RuntimeAction::RuleSnapshotChanged(rules).into(),
        );
        reduce(
            &catalog,
            &mut state,
            RuntimeAction::KeywordSnapshotChanged(content).into(),
        );

        let (view_tx, view) = watch::channel(state.view.clone());
        let (tx, rx) = mpsc::unbounded_channel();

        let mut forwarders = vec![forward_snapshots(
            rules_rx,
            tx.clone(),
            RuntimeAction::RuleSnapshotChanged,
        )];
        if state.watches_keywords() {
            forwarders.push(forward_snapshots(
                content_rx,
                tx.clone(),
                RuntimeAction::KeywordSnapshotChanged,
            ));
        }

        let engine_loop = EngineLoop {
            catalog,
            state,
            coordinator: UpdateCoordinator::new(store.clone()),
            store,
            tx: tx.clone(),
            view_tx,
        };
        let event_loop = tokio::spawn(run_loop(engine_loop, rx));

        Self {
            tx,
            view,
            event_loop: Some(event_loop),
            forwarders,
        }
    }

    pub fn view(&self) -> watch::Receiver<ViewState> {
        self.view.clone()
    }

    pub fn snapshot(&self) -> ViewState {
        self.view.borrow().clone()
    }

    pub fn is_rule_out_of_sync(&self, category: RuleCategory) -> bool {
        self.view.borrow().is_rule_out_of_sync(category)
    }

    /// Waits until the published view satisfies `predicate`.
    pub async fn wait_until(&self, mut predicate: impl FnMut(&ViewState) -> bool) -> ViewState {
        let mut view = self.view.clone();
        if let Ok(state) = view.wait_for(|state| predicate(state)).await {
            return state.clone();
        }
        let last = view.borrow().clone();
        last
    }

    /// Applies a toggle and resolves once every remote call it caused has
    /// settled. Remote failures are not reported.
    pub async fn update(&self, category: RuleCategory, checked: bool) {
        self.submit(UserAction::Toggle { category, checked }).await;
    }

    pub async fn add(&self, keyword: impl Into<String>) {
        self.submit(UserAction::AddKeyword(keyword.into())).await;
    }

    pub async fn remove(&self, keyword: impl Into<String>) {
        self.submit(UserAction::RemoveKeyword(keyword.into())).await;
    }

    /// Re-reads both store snapshots and reduces them in order with
    /// everything already queued.
    pub async fn refresh(&self) {
        let (done, wait) = oneshot::channel();
        if self.tx.send(EngineMessage::Refresh { done }).is_err() {
            tracing::warn!("settings engine stopped; refresh dropped");
            return;
        }
        let _ = wait.await;
    }

    pub async fn shutdown(mut self) {
        for forwarder in self.forwarders.drain(..) {
            forwarder.abort();
        }
        let _ = self.tx.send(EngineMessage::Shutdown);
        if let Some(event_loop) = self.event_loop.take() {
            let _ = event_loop.await;
        }
    }

    async fn submit(&self, action: UserAction) {
        let (done, wait) = oneshot::channel();
        if self.tx.send(EngineMessage::Command { action, done }).is_err() {
            tracing::warn!("settings engine stopped; command dropped");
            return;
        }
        let _ = wait.await;
    }
}

impl Drop for SettingsEngine {
    fn drop(&mut self) {
        for forwarder in &self.forwarders {
            forwarder.abort();
        }
        if let Some(event_loop) = &self.event_loop {
            event_loop.abort();
        }
    }
}

fn forward_snapshots(
    mut rx: watch::Receiver<Vec<RawRule>>,
    tx: mpsc::UnboundedSender<EngineMessage>,
    wrap: fn(Vec<RawRule>) -> RuntimeAction,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            tracing::trace!(rules = snapshot.len(), "forwarding rule snapshot");
            if tx.send(EngineMessage::Runtime(wrap(snapshot))).is_err() {
                break;
            }
        }
    })
}

struct EngineLoop {
    catalog: RuleCatalog,
    state: SettingsState,
    store: Arc<dyn RuleStore>,
    coordinator: UpdateCoordinator,
    tx: mpsc::UnboundedSender<EngineMessage>,
    view_tx: watch::Sender<ViewState>,
}

impl EngineLoop {
    fn apply(&mut self, action: SettingsAction) -> Vec<SettingsEffect> {
        let effects = reduce(&self.catalog, &mut self.state, action);
        self.view_tx.send_if_modified(|view| {
            if *view == self.state.view {
                return false;
            }
            *view = self.state.view.clone();
            true
        });
        effects
    }
}

async fn run_loop(mut event_loop: EngineLoop, mut rx: mpsc::UnboundedReceiver<EngineMessage>) {
    while let Some(message) = rx.recv().await {
        match message {
            EngineMessage::Runtime(action) => {
                event_loop.apply(action.into());
            }
            EngineMessage::Command { action, done } => {
                let effects = event_loop.apply(action.into());
                if effects.is_empty() {
                    let _ = done.send(());
                    continue;
                }
                let coordinator = event_loop.coordinator.clone();
                let tx = event_loop.tx.clone();
                tokio::spawn(async move {
                    let releases_saving = coordinator.execute(effects).await;
                    let _ = tx.send(EngineMessage::Settled {
                        releases_saving,
                        done,
                    });
                });
            }
            EngineMessage::Settled {
                releases_saving,
                done,
            } => {
                event_loop.apply(RuntimeAction::UpdateSettled { releases_saving }.into());
                let _ = done.send(());
            }
            EngineMessage::Refresh { done } => {
                let rules = event_loop.store.rules().borrow().clone();
                let content = event_loop.store.content_rules().borrow().clone();
                event_loop.apply(RuntimeAction::RuleSnapshotChanged(rules).into());
                event_loop.apply(RuntimeAction::KeywordSnapshotChanged(content).into());
                let _ = done.send(());
            }
            EngineMessage::Shutdown => break,
        }
    }
    tracing::debug!("settings engine stopped");
}
