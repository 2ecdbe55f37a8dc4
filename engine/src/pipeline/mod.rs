//! Conversation pipeline
//!
//! The state machine that turns one user message into one assistant turn:
//!
//! ```text
//! MemoryCapture -> MemoryInjection -> Routing -> action -> Terminal
//! ```
//!
//! MemoryCapture spawns the memory write path and moves on without waiting,
//! so persistence latency never shows up in the response. Every downstream
//! stage either succeeds or degrades (absent memory context, fallback
//! routing, apology turn); there is no path that leaves the machine stuck or
//! the turn unanswered.

use sdk::types::{ConversationState, Intent, Turn};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub mod actions;
pub mod isolation;
pub mod retry;
pub mod router;

pub use actions::ActionHandlers;
pub use retry::RetryPolicy;
pub use router::IntentRouter;

use crate::background::BackgroundTasks;
use crate::config::MemoryConfig;
use crate::llm::LanguageModel;
use crate::memory::{MemoryGateway, MemoryStore};
use crate::ticketing::Ticketing;

/// Orchestrates one pipeline run per user turn.
///
/// All ports are injected at construction; the orchestrator holds no global
/// state beyond them and the background registry.
pub struct Orchestrator {
    memory: Arc<MemoryGateway>,
    router: IntentRouter,
    actions: ActionHandlers,
    background: Arc<BackgroundTasks>,
}

impl Orchestrator {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        store: Arc<dyn MemoryStore>,
        ticketing: Arc<dyn Ticketing>,
        memory_config: MemoryConfig,
        retry: RetryPolicy,
    ) -> Self {
        let memory = Arc::new(MemoryGateway::new(
            Arc::clone(&llm),
            store,
            memory_config,
        ));
        Self {
            memory,
            router: IntentRouter::new(Arc::clone(&llm), retry),
            actions: ActionHandlers::new(llm, ticketing, retry),
            background: Arc::new(BackgroundTasks::new(memory_config.background_capacity)),
        }
    }

    /// The background registry carrying the fire-and-forget memory writes.
    ///
    /// Drain it for orderly shutdown, or in tests that need the write of
    /// turn N to be visible before turn N+1.
    pub fn background(&self) -> &Arc<BackgroundTasks> {
        &self.background
    }

    /// Run the pipeline once: append exactly one assistant turn to `state`.
    ///
    /// Prior turns are never mutated, and every path terminates: external
    /// failures end up as apology content, not as errors.
    pub async fn run(&self, mut state: ConversationState) -> ConversationState {
        // Routing decisions are per-run; stale ones must not leak in.
        state.next_node = None;

        let latest = state.latest_text().to_string();

        // MemoryCapture: spawn the write path, don't await it. A failure in
        // this task is logged by the task itself and never reaches the user.
        if state.latest_is_user() && !latest.is_empty() {
            let gateway = Arc::clone(&self.memory);
            let message = latest.clone();
            self.background
                .spawn(async move {
                    if let Err(e) = gateway.extract_and_save(&message).await {
                        warn!(error = %e, "Memory capture failed");
                    }
                })
                .await;
        }

        // MemoryInjection: synchronous; degrades to None on store failure.
        state.memory_context = self.memory.get_relevant(&latest).await;
        debug!(
            has_memory = state.memory_context.is_some(),
            "Memory context injected"
        );

        // Routing: a routing failure is not allowed to stall the machine.
        // It resolves to the fallback action, whose own isolation layer
        // answers if the backend stays down.
        let intent = match self.router.route(&state).await {
            Ok(intent) => intent,
            Err(e) => {
                warn!(error = %e, "Routing failed, falling back");
                Intent::Fallback
            }
        };
        state.next_node = Some(intent);
        info!(%intent, "Dispatching turn");

        // Action dispatch: cannot fail, only apologize.
        let turn: Turn = self.actions.dispatch(intent, &state).await;
        state.turns.push(turn);
        state
    }
}
