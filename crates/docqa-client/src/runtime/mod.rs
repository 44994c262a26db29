//! Client runtime: owns state, executes effects, collects task results.
//!
//! This is the "Elm runtime" boundary: all side effects happen here. The
//! reducer stays pure and produces effects; this module executes them.
//!
//! ## Inbox Pattern
//!
//! - Service calls are spawned as tokio tasks that send their result to
//!   `inbox_tx`, wrapped in `TaskCompleted` (or `TaskCancelled`).
//! - The front end pulls results with [`ClientRuntime::next_event`] or
//!   [`ClientRuntime::run_until_idle`], which feed them through the reducer.
//! - Snapshot writes run inline: they are local and best-effort.

mod handlers;
mod inbox;

use std::future::Future;
use std::sync::Arc;

use docqa_core::service::DocumentService;
use docqa_core::snapshot::{self, SnapshotStore};
use inbox::{UiEventReceiver, UiEventSender};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::common::{TaskCompleted, TaskId, TaskKind, TaskStarted};
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::features::notifications::Notification;
use crate::state::AppState;
use crate::update;

pub struct ClientRuntime<S, P> {
    /// Application state. Read freely; mutate only through [`Self::dispatch`].
    pub state: AppState,
    service: Arc<S>,
    store: P,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    /// Spawned tasks whose result has not been received yet.
    in_flight: usize,
}

impl<S, P> ClientRuntime<S, P>
where
    S: DocumentService,
    P: SnapshotStore,
{
    pub fn new(service: S, store: P) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::new(),
            service: Arc::new(service),
            store,
            inbox_tx,
            inbox_rx,
            in_flight: 0,
        }
    }

    /// Reads the persisted snapshot into state. Never fails.
    pub fn restore(&mut self) {
        let restored = snapshot::restore(&self.store);
        self.dispatch(UiEvent::Restore(restored));
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    /// Runs one event through the reducer and executes the resulting effects.
    pub fn dispatch(&mut self, event: UiEvent) {
        let effects = update::update(&mut self.state, event);
        self.execute_effects(effects);
    }

    /// True when no spawned task is outstanding.
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }

    /// Waits for the next task result and applies it. Returns `false` when
    /// nothing is in flight.
    pub async fn next_event(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        let Some(event) = self.inbox_rx.recv().await else {
            return false;
        };
        if matches!(
            event,
            UiEvent::TaskCompleted { .. } | UiEvent::TaskCancelled { .. }
        ) {
            self.in_flight = self.in_flight.saturating_sub(1);
        }
        self.dispatch(event);
        true
    }

    /// Applies task results until nothing is in flight, including tasks
    /// spawned by the results themselves.
    pub async fn run_until_idle(&mut self) {
        while self.next_event().await {}
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.state.notifications.drain()
    }

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns a service call with a uniform TaskStarted/TaskCompleted
    /// lifecycle. Tasks superseded before they start are not spawned.
    fn spawn_task<F, Fut>(&mut self, kind: TaskKind, id: TaskId, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        if self.state.tasks.state(kind).active != Some(id) {
            debug!(?kind, id = id.0, "skipping superseded task");
            return;
        }

        let cancel = CancellationToken::new();
        self.dispatch(UiEvent::TaskStarted {
            kind,
            started: TaskStarted {
                id,
                cancel: Some(cancel.clone()),
            },
        });

        self.in_flight += 1;
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            let event = tokio::select! {
                biased;
                () = cancel.cancelled() => UiEvent::TaskCancelled { kind, id },
                result = f() => UiEvent::TaskCompleted {
                    kind,
                    completed: TaskCompleted {
                        id,
                        result: Box::new(result),
                    },
                },
            };
            let _ = tx.send(event);
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            // Service calls
            UiEffect::Authenticate { task, credential } => {
                let service = Arc::clone(&self.service);
                self.spawn_task(TaskKind::Authenticate, task, move || {
                    handlers::authenticate(service, credential)
                });
            }
            UiEffect::LoadConversation { task, session_id } => {
                let service = Arc::clone(&self.service);
                self.spawn_task(TaskKind::ConversationLoad, task, move || {
                    handlers::load_conversation(service, session_id)
                });
            }
            UiEffect::Ask {
                task,
                session_id,
                question,
            } => {
                let service = Arc::clone(&self.service);
                self.spawn_task(TaskKind::Ask, task, move || {
                    handlers::ask(service, session_id, question)
                });
            }
            UiEffect::Upload {
                task,
                user_id,
                file,
            } => {
                let service = Arc::clone(&self.service);
                self.spawn_task(TaskKind::Upload, task, move || {
                    handlers::upload_document(service, user_id, file)
                });
            }
            UiEffect::DeleteConversation {
                task,
                user_id,
                session_id,
                document_id,
            } => {
                let service = Arc::clone(&self.service);
                self.spawn_task(TaskKind::Delete, task, move || {
                    handlers::delete_conversation(service, user_id, session_id, document_id)
                });
            }
            UiEffect::ExportConversation { task, session_id } => {
                let service = Arc::clone(&self.service);
                self.spawn_task(TaskKind::Export, task, move || {
                    handlers::export_conversation(service, session_id)
                });
            }

            // Snapshot writes (best-effort)
            UiEffect::PersistUserSnapshot { user, sessions } => {
                if let Err(e) = snapshot::save_user(&self.store, user.as_ref(), &sessions) {
                    warn!(error = %e, "failed to persist user snapshot");
                }
            }
            UiEffect::PersistActiveFile { active_file } => {
                if let Err(e) = snapshot::save_active_file(&self.store, active_file.as_ref()) {
                    warn!(error = %e, "failed to persist active file");
                }
            }
            UiEffect::ClearSnapshot => {
                if let Err(e) = snapshot::clear(&self.store) {
                    warn!(error = %e, "failed to clear snapshot");
                }
            }

            UiEffect::CancelTask { kind, token } => {
                debug!(?kind, "cancelling task");
                if let Some(cancel) = token {
                    cancel.cancel();
                }
            }
        }
    }
}
