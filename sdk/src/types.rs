//! Conversation boundary types
//!
//! The types exchanged between a front end and the orchestration engine: the
//! turn history, the closed set of intents the router may select, and the
//! side-channel parameters a handler can attach to a turn for rich rendering.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a turn in the conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// User turn
    User,

    /// Assistant turn
    Assistant,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// Structured side-channel data attached to an assistant turn.
///
/// Populated by the task-creation handler so a front end can render the new
/// ticket as a card instead of plain text. Optional enrichment only; the text
/// content of the turn is always complete on its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TurnParams {
    /// Title of the created ticket
    pub task_name: String,

    /// Description of the created ticket
    pub description: String,

    /// Tracker-assigned ticket id
    pub task_id: String,

    /// Assignee email, if the ticket was assigned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_email: Option<String>,
}

/// One exchange in a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    /// Who produced the turn
    pub role: TurnRole,

    /// Text content of the turn
    pub content: String,

    /// Optional structured parameters for rich rendering
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<TurnParams>,
}

impl Turn {
    /// Create a new user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
            params: None,
        }
    }

    /// Create a new assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
            params: None,
        }
    }

    /// Attach side-channel parameters to this turn
    pub fn with_params(mut self, params: TurnParams) -> Self {
        self.params = Some(params);
        self
    }
}

/// The closed set of actions the router may select.
///
/// Routing is structural, not stringly typed: every label outside the four
/// declared intents resolves to `Fallback`. Deserialization goes through
/// `from_label` and follows the same rule, so a malformed classifier output
/// can never produce an invalid intent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Intent {
    /// Ordinary conversation, or an under-specified request
    Fallback,

    /// Create a ticket in the issue tracker
    CreateTask,

    /// List the team's tickets for a status
    GetCurrentIssues,

    /// List the tickets assigned to a user
    GetUserIssues,
}

impl From<String> for Intent {
    fn from(label: String) -> Self {
        Intent::from_label(&label)
    }
}

impl Intent {
    /// All intents, in routing-table order.
    pub const ALL: [Intent; 4] = [
        Intent::Fallback,
        Intent::CreateTask,
        Intent::GetCurrentIssues,
        Intent::GetUserIssues,
    ];

    /// Resolve a classifier label to an intent.
    ///
    /// Total: unknown labels map to `Fallback`, never to an error.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "create_task" => Intent::CreateTask,
            "get_current_issues" => Intent::GetCurrentIssues,
            "get_user_issues" => Intent::GetUserIssues,
            _ => Intent::Fallback,
        }
    }

    /// The wire label for this intent
    pub fn label(&self) -> &'static str {
        match self {
            Intent::Fallback => "fallback",
            Intent::CreateTask => "create_task",
            Intent::GetCurrentIssues => "get_current_issues",
            Intent::GetUserIssues => "get_user_issues",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The unit of orchestration input and output.
///
/// Holds the chronological turn history plus per-run scratch state: the
/// routing decision (`next_node`, recomputed every run) and the memory digest
/// (`memory_context`, `None` when nothing relevant is stored).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationState {
    /// Ordered turn history, oldest first
    pub turns: Vec<Turn>,

    /// Rolling conversation summary. Carried through the pipeline but not
    /// consumed by any stage yet.
    #[serde(default)]
    pub summary: String,

    /// Routing decision for the current run only
    #[serde(skip)]
    pub next_node: Option<Intent>,

    /// Relevant long-term facts for the current run, `None` when absent
    #[serde(skip)]
    pub memory_context: Option<String>,
}

impl ConversationState {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user turn
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(Turn::user(content));
    }

    /// The text of the most recent turn, empty for a fresh conversation
    pub fn latest_text(&self) -> &str {
        self.turns.last().map(|t| t.content.as_str()).unwrap_or("")
    }

    /// Whether the most recent turn came from the user
    pub fn latest_is_user(&self) -> bool {
        self.turns
            .last()
            .map(|t| t.role == TurnRole::User)
            .unwrap_or(false)
    }
}
