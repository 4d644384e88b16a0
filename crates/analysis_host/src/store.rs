//! Owns the session state and runs effects against the analysis provider.
//!
//! Every mutation goes through [`Store::dispatch`], which applies the pure
//! reducer and, when the transition asks for work, spawns exactly one task on
//! the runtime. That task always dispatches a completion, even if the
//! provider call panics, so a pending flag can never stick.

use crate::action::{Action, Effect, InitialAnalysis};
use crate::reducer::{reduce, seed_chat_history};
use crate::state::{OperationKind, Outcome, SessionState};
use futures::FutureExt;
use parking_lot::RwLock;
use providers::AnalysisProvider;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

/// Called after every state change, e.g. to request a UI repaint.
pub type Notifier = Arc<dyn Fn() + Send + Sync>;

struct Inner {
    state: watch::Sender<SessionState>,
    provider: Arc<dyn AnalysisProvider>,
    runtime: Handle,
    notifier: RwLock<Option<Notifier>>,
}

#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

impl Store {
    pub fn new(provider: Arc<dyn AnalysisProvider>, runtime: Handle) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            inner: Arc::new(Inner {
                state,
                provider,
                runtime,
                notifier: RwLock::new(None),
            }),
        }
    }

    pub fn set_notifier(&self, notifier: impl Fn() + Send + Sync + 'static) {
        *self.inner.notifier.write() = Some(Arc::new(notifier));
    }

    pub fn snapshot(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Apply `action`. Returns the handle of the spawned effect, if any.
    pub fn dispatch(&self, action: Action) -> Option<JoinHandle<()>> {
        let mut effect = None;
        self.inner.state.send_modify(|state| {
            let (next, requested) = reduce(std::mem::take(state), action);
            *state = next;
            effect = requested;
        });
        self.notify();
        effect.map(|effect| self.spawn_effect(effect))
    }

    fn notify(&self) {
        let notifier = self.inner.notifier.read().clone();
        if let Some(notifier) = notifier {
            notifier();
        }
    }

    fn spawn_effect(&self, effect: Effect) -> JoinHandle<()> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "effect",
            operation = effect.kind().as_str(),
            run_id = %run_id
        );
        let store = self.clone();
        let provider = self.inner.provider.clone();

        self.inner.runtime.spawn(
            async move {
                tracing::info!("Effect started");
                let completion = match AssertUnwindSafe(run_effect(provider, effect.clone()))
                    .catch_unwind()
                    .await
                {
                    Ok(completion) => completion,
                    Err(_) => {
                        tracing::error!("Effect panicked");
                        effect.failure("effect panicked")
                    }
                };
                store.dispatch(completion);
                tracing::info!("Effect settled");
            }
            .instrument(span),
        )
    }
}

fn observe<T>(kind: OperationKind, result: anyhow::Result<Option<T>>) -> Outcome<T> {
    let outcome = Outcome::from_result(result);
    match &outcome {
        Outcome::Failed(reason) => {
            tracing::error!(operation = kind.as_str(), error = %reason, "Operation failed")
        }
        Outcome::Absent => tracing::warn!(operation = kind.as_str(), "Operation returned nothing"),
        Outcome::Ready(_) => {}
    }
    outcome
}

async fn run_effect(provider: Arc<dyn AnalysisProvider>, effect: Effect) -> Action {
    match effect {
        Effect::RunInitialAnalysis { text, location } => {
            let joined = tokio::try_join!(
                provider.summarize(&text),
                provider.find_similar(&text),
                provider.geo_insights(&text, location),
            );
            match joined {
                Ok((summary, similar_patents, geo_insights)) => {
                    let chat_history = seed_chat_history(&text);
                    let chat_session = provider.create_chat_session(chat_history.clone());
                    Action::AnalysisSettled(Ok(InitialAnalysis {
                        summary,
                        similar_patents,
                        geo_insights,
                        chat_history,
                        chat_session,
                    }))
                }
                Err(e) => {
                    tracing::error!(error = %format!("{e:#}"), "Initial analysis failed");
                    Action::AnalysisSettled(Err(format!("{e:#}")))
                }
            }
        }
        Effect::RunDeepInsights { text } => Action::DeepInsightsSettled(observe(
            OperationKind::DeepInsights,
            provider.deep_insights(&text).await,
        )),
        Effect::RunChat { session, message } => {
            let result = provider.send_message(&session, &message).await.map(Some);
            let outcome = observe(OperationKind::Chat, result);
            Action::ChatSettled { message, outcome }
        }
        Effect::RunSearch { query } => Action::SearchSettled(observe(
            OperationKind::PriorArtSearch,
            provider.search_prior_art(&query).await,
        )),
        Effect::RunClaimMapping { subject, reference } => Action::ClaimMappingSettled(observe(
            OperationKind::ClaimMapping,
            provider.claim_map(&subject, &reference).await,
        )),
    }
}
