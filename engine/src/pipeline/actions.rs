//! Action handlers
//!
//! One handler per intent. Each extracts its parameters from the
//! conversation through the classification port, calls the ticketing port
//! where relevant, and formats the response turn. Dispatch composes every
//! handler the same way: retry innermost, error isolation outermost, so a
//! handler can exhaust its retries and still answer with a conversational
//! apology instead of failing the pipeline.

use sdk::types::{ConversationState, Intent, Turn, TurnParams};
use std::sync::Arc;

use super::isolation::isolate;
use super::retry::{retry_with_backoff, RetryPolicy};
use crate::llm::outputs::{CreateTaskFields, CurrentIssuesFields, UserIssuesFields};
use crate::llm::{classify_as, LanguageModel};
use crate::prompts;
use crate::ticketing::{format_tickets, NewTicket, Ticketing};

/// Apology prefixes, one per stage
mod prefixes {
    pub const FALLBACK: &str = "Something went wrong. Please try again";
    pub const CREATE_TASK: &str = "Error creating ticket";
    pub const CURRENT_ISSUES: &str = "Error getting current issues";
    pub const USER_ISSUES: &str = "Error getting user issues";
}

pub struct ActionHandlers {
    llm: Arc<dyn LanguageModel>,
    ticketing: Arc<dyn Ticketing>,
    retry: RetryPolicy,
}

impl ActionHandlers {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        ticketing: Arc<dyn Ticketing>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            llm,
            ticketing,
            retry,
        }
    }

    /// Run the handler for `intent` and return its response turn.
    ///
    /// Never fails: every arm is wrapped in isolation, so the worst outcome
    /// is an apology turn.
    pub async fn dispatch(&self, intent: Intent, state: &ConversationState) -> Turn {
        match intent {
            Intent::Fallback => {
                isolate(
                    prefixes::FALLBACK,
                    retry_with_backoff(&self.retry, "fallback", || self.fallback(state)),
                )
                .await
            }
            Intent::CreateTask => {
                isolate(
                    prefixes::CREATE_TASK,
                    retry_with_backoff(&self.retry, "create_task", || self.create_task(state)),
                )
                .await
            }
            Intent::GetCurrentIssues => {
                isolate(
                    prefixes::CURRENT_ISSUES,
                    retry_with_backoff(&self.retry, "get_current_issues", || {
                        self.current_issues(state)
                    }),
                )
                .await
            }
            Intent::GetUserIssues => {
                isolate(
                    prefixes::USER_ISSUES,
                    retry_with_backoff(&self.retry, "get_user_issues", || self.user_issues(state)),
                )
                .await
            }
        }
    }

    /// Ordinary conversation, with the memory digest in the system context.
    async fn fallback(&self, state: &ConversationState) -> anyhow::Result<Turn> {
        let system = prompts::fallback_system(state.memory_context.as_deref());
        let content = self.llm.complete(&system, &state.turns).await?;
        Ok(Turn::assistant(content))
    }

    /// Create a ticket and attach its data as side-channel parameters.
    async fn create_task(&self, state: &ConversationState) -> anyhow::Result<Turn> {
        let fields: CreateTaskFields = classify_as(
            self.llm.as_ref(),
            prompts::CREATE_TASK_SYSTEM,
            &state.turns,
            &CreateTaskFields::schema(),
        )
        .await?;

        let ticket = self
            .ticketing
            .create_ticket(NewTicket {
                title: fields.task_name.clone(),
                description: fields.description.clone(),
                assignee_email: fields.assignee().map(str::to_string),
            })
            .await?;

        let params = TurnParams {
            task_name: ticket.title,
            description: ticket.description,
            task_id: ticket.id,
            assignee_email: ticket.assignee.map(|a| a.email),
        };
        Ok(Turn::assistant(fields.message).with_params(params))
    }

    /// List the team's tickets for the extracted status.
    async fn current_issues(&self, state: &ConversationState) -> anyhow::Result<Turn> {
        let fields: CurrentIssuesFields = classify_as(
            self.llm.as_ref(),
            prompts::CURRENT_ISSUES_SYSTEM,
            &state.turns,
            &CurrentIssuesFields::schema(),
        )
        .await?;

        let tickets = self.ticketing.list_team_tickets(fields.status).await?;
        Ok(Turn::assistant(format!(
            "{}\n\n{}",
            fields.message,
            format_tickets(&tickets)
        )))
    }

    /// List the tickets assigned to the extracted email.
    async fn user_issues(&self, state: &ConversationState) -> anyhow::Result<Turn> {
        let fields: UserIssuesFields = classify_as(
            self.llm.as_ref(),
            prompts::USER_ISSUES_SYSTEM,
            &state.turns,
            &UserIssuesFields::schema(),
        )
        .await?;

        let tickets = self.ticketing.list_user_tickets(&fields.email).await?;
        Ok(Turn::assistant(format!(
            "{}\n\n{}",
            fields.message,
            format_tickets(&tickets)
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmError, OutputSchema};
    use crate::ticketing::{Assignee, Ticket, TicketStatus, TicketingError};
    use async_trait::async_trait;
    use sdk::types::TurnRole;
    use std::time::Duration;

    struct ScriptedModel {
        classify_output: serde_json::Value,
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn complete(&self, _system: &str, _history: &[Turn]) -> Result<String, LlmError> {
            Ok("Just chatting".to_string())
        }

        async fn classify(
            &self,
            _system: &str,
            _history: &[Turn],
            _schema: &OutputSchema,
        ) -> Result<serde_json::Value, LlmError> {
            Ok(self.classify_output.clone())
        }
    }

    struct StubTicketing {
        fail: bool,
    }

    #[async_trait]
    impl Ticketing for StubTicketing {
        async fn create_ticket(&self, ticket: NewTicket) -> Result<Ticket, TicketingError> {
            if self.fail {
                return Err(TicketingError::Api("tracker down".into()));
            }
            Ok(Ticket {
                id: "LIN-7".into(),
                title: ticket.title,
                description: ticket.description,
                priority: None,
                state: "Todo".into(),
                assignee: ticket.assignee_email.map(|email| Assignee {
                    name: String::new(),
                    email,
                }),
                url: String::new(),
                created_at: String::new(),
                due_date: None,
            })
        }

        async fn list_team_tickets(
            &self,
            _status: TicketStatus,
        ) -> Result<Vec<Ticket>, TicketingError> {
            if self.fail {
                return Err(TicketingError::Network("timeout".into()));
            }
            Ok(vec![Ticket {
                id: "LIN-1".into(),
                title: "Fix login".into(),
                description: String::new(),
                priority: None,
                state: "Todo".into(),
                assignee: None,
                url: String::new(),
                created_at: String::new(),
                due_date: None,
            }])
        }

        async fn list_user_tickets(&self, _email: &str) -> Result<Vec<Ticket>, TicketingError> {
            self.list_team_tickets(TicketStatus::Todo).await
        }
    }

    fn handlers(classify_output: serde_json::Value, fail_ticketing: bool) -> ActionHandlers {
        ActionHandlers::new(
            Arc::new(ScriptedModel { classify_output }),
            Arc::new(StubTicketing {
                fail: fail_ticketing,
            }),
            RetryPolicy {
                max_retries: 1,
                initial_delay: Duration::from_millis(1),
                backoff_multiplier: 2.0,
            },
        )
    }

    fn state_with(text: &str) -> ConversationState {
        let mut state = ConversationState::new();
        state.push_user(text);
        state
    }

    #[tokio::test]
    async fn create_task_attaches_side_channel_params() {
        let handlers = handlers(
            serde_json::json!({
                "task_name": "Fix login",
                "description": "The login page 500s",
                "assignee_email": "dana@example.com",
                "message": "Done, ticket's up."
            }),
            false,
        );

        let turn = handlers
            .dispatch(Intent::CreateTask, &state_with("create a task to fix login"))
            .await;

        assert_eq!(turn.content, "Done, ticket's up.");
        let params = turn.params.expect("side-channel params");
        assert_eq!(params.task_id, "LIN-7");
        assert_eq!(params.assignee_email.as_deref(), Some("dana@example.com"));
    }

    #[tokio::test]
    async fn current_issues_appends_numbered_listing() {
        let handlers = handlers(
            serde_json::json!({ "status": "Todo", "message": "Here's the board:" }),
            false,
        );

        let turn = handlers
            .dispatch(Intent::GetCurrentIssues, &state_with("what are the current issues?"))
            .await;

        assert!(turn.content.starts_with("Here's the board:"));
        assert!(turn.content.contains("1. Fix login - Todo"));
    }

    #[tokio::test]
    async fn ticketing_failure_becomes_apology_turn() {
        let handlers = handlers(
            serde_json::json!({ "status": "Todo", "message": "Here you go" }),
            true,
        );

        let turn = handlers
            .dispatch(Intent::GetCurrentIssues, &state_with("current issues?"))
            .await;

        assert_eq!(turn.role, TurnRole::Assistant);
        assert!(turn.content.starts_with("Error getting current issues:"));
    }

    #[tokio::test]
    async fn fallback_answers_conversationally() {
        let handlers = handlers(serde_json::json!({}), false);
        let turn = handlers.dispatch(Intent::Fallback, &state_with("hey!")).await;
        assert_eq!(turn.content, "Just chatting");
        assert!(turn.params.is_none());
    }
}
