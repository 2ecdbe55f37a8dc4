//! Intent routing
//!
//! Classifies the latest turn, in the context of the whole conversation,
//! into one of the closed set of intents. Classification runs under the
//! retry wrapper; label resolution is structural (`Intent::from_label`), so
//! a malformed label can never crash routing; at worst it falls back.

use sdk::types::{ConversationState, Intent};
use std::sync::Arc;
use tracing::debug;

use super::retry::{retry_with_backoff, RetryPolicy};
use crate::llm::outputs::RouterVerdict;
use crate::llm::{classify_as, LanguageModel};
use crate::prompts;

pub struct IntentRouter {
    llm: Arc<dyn LanguageModel>,
    retry: RetryPolicy,
}

impl IntentRouter {
    pub fn new(llm: Arc<dyn LanguageModel>, retry: RetryPolicy) -> Self {
        Self { llm, retry }
    }

    /// Decide which intent handles the conversation's latest turn.
    ///
    /// Fails only once retries are exhausted; the orchestrator maps that
    /// failure to the fallback intent so routing always lands somewhere.
    pub async fn route(&self, state: &ConversationState) -> anyhow::Result<Intent> {
        let schema = RouterVerdict::schema();
        let verdict: RouterVerdict = retry_with_backoff(&self.retry, "routing", || {
            classify_as(
                self.llm.as_ref(),
                prompts::ROUTER_SYSTEM,
                &state.turns,
                &schema,
            )
        })
        .await?;

        let intent = Intent::from_label(&verdict.next);
        debug!(label = %verdict.next, %intent, "Routed turn");
        Ok(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmError, OutputSchema};
    use async_trait::async_trait;
    use sdk::types::Turn;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Model returning a fixed label, optionally after some failures
    struct LabelModel {
        label: String,
        failures_before_success: u32,
        calls: AtomicU32,
    }

    impl LabelModel {
        fn new(label: &str) -> Self {
            Self {
                label: label.to_string(),
                failures_before_success: 0,
                calls: AtomicU32::new(0),
            }
        }

        fn flaky(label: &str, failures: u32) -> Self {
            Self {
                failures_before_success: failures,
                ..Self::new(label)
            }
        }
    }

    #[async_trait]
    impl LanguageModel for LabelModel {
        async fn complete(&self, _system: &str, _history: &[Turn]) -> Result<String, LlmError> {
            Ok(String::new())
        }

        async fn classify(
            &self,
            _system: &str,
            _history: &[Turn],
            _schema: &OutputSchema,
        ) -> Result<serde_json::Value, LlmError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures_before_success {
                return Err(LlmError::Unavailable("overloaded".into()));
            }
            Ok(serde_json::json!({ "next": self.label }))
        }
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            initial_delay: Duration::from_millis(1),
            backoff_multiplier: 2.0,
        }
    }

    fn state_with(text: &str) -> ConversationState {
        let mut state = ConversationState::new();
        state.push_user(text);
        state
    }

    #[tokio::test]
    async fn routes_declared_labels() {
        let router = IntentRouter::new(Arc::new(LabelModel::new("create_task")), fast_retry());
        let intent = router.route(&state_with("make a ticket")).await.unwrap();
        assert_eq!(intent, Intent::CreateTask);
    }

    #[tokio::test]
    async fn unknown_label_resolves_to_fallback() {
        let router = IntentRouter::new(Arc::new(LabelModel::new("order_pizza")), fast_retry());
        let intent = router.route(&state_with("hello")).await.unwrap();
        assert_eq!(intent, Intent::Fallback);
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let model = Arc::new(LabelModel::flaky("get_user_issues", 2));
        let router = IntentRouter::new(Arc::clone(&model) as Arc<dyn LanguageModel>, fast_retry());

        let intent = router
            .route(&state_with("issues for dana@example.com"))
            .await
            .unwrap();
        assert_eq!(intent, Intent::GetUserIssues);
        assert_eq!(model.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_the_error() {
        let model = Arc::new(LabelModel::flaky("fallback", u32::MAX));
        let router = IntentRouter::new(Arc::clone(&model) as Arc<dyn LanguageModel>, fast_retry());

        assert!(router.route(&state_with("hello")).await.is_err());
        assert_eq!(model.calls.load(Ordering::SeqCst), 4);
    }
}
