//! Issue tracker port
//!
//! The ticketing contract the action handlers depend on: create a ticket,
//! list the team's tickets by status, list a user's assigned tickets. The
//! engine never caches or mutates tracker state; tickets pass through as
//! read-only values.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod linear;
mod queries;

pub use linear::LinearClient;

/// Result type for ticketing operations
pub type Result<T> = std::result::Result<T, TicketingError>;

/// Errors that can occur against the tracker
#[derive(Debug, thiserror::Error)]
pub enum TicketingError {
    #[error("Tracker API error: {0}")]
    Api(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Workflow state of a ticket
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TicketStatus {
    #[serde(rename = "Todo")]
    Todo,

    #[serde(rename = "In Progress")]
    InProgress,

    #[serde(rename = "Done")]
    Done,

    #[serde(rename = "Canceled")]
    Canceled,

    #[serde(rename = "Backlog")]
    Backlog,
}

impl TicketStatus {
    /// The tracker's display name for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Todo => "Todo",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::Done => "Done",
            TicketStatus::Canceled => "Canceled",
            TicketStatus::Backlog => "Backlog",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ticket assignee
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assignee {
    #[serde(default)]
    pub name: String,
    pub email: String,
}

/// A tracker-owned issue record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub assignee: Option<Assignee>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Request to create a ticket
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub assignee_email: Option<String>,
}

/// Port to the issue tracker
#[async_trait]
pub trait Ticketing: Send + Sync {
    /// Create a ticket on the team's board, in the Todo state
    async fn create_ticket(&self, ticket: NewTicket) -> Result<Ticket>;

    /// List the team's tickets in the given state
    async fn list_team_tickets(&self, status: TicketStatus) -> Result<Vec<Ticket>>;

    /// List the tickets assigned to the user with the given email
    async fn list_user_tickets(&self, email: &str) -> Result<Vec<Ticket>>;
}

/// Render tickets as a numbered list, one "title - state" line each.
pub fn format_tickets(tickets: &[Ticket]) -> String {
    tickets
        .iter()
        .enumerate()
        .map(|(i, ticket)| format!("{}. {} - {}", i + 1, ticket.title, ticket.state))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(title: &str, state: &str) -> Ticket {
        Ticket {
            id: "id".into(),
            title: title.into(),
            description: String::new(),
            priority: None,
            state: state.into(),
            assignee: None,
            url: String::new(),
            created_at: String::new(),
            due_date: None,
        }
    }

    #[test]
    fn format_tickets_is_one_indexed() {
        let listing = format_tickets(&[
            ticket("Fix login", "Todo"),
            ticket("Update docs", "In Progress"),
        ]);
        assert_eq!(listing, "1. Fix login - Todo\n2. Update docs - In Progress");
    }

    #[test]
    fn format_tickets_empty_is_empty() {
        assert_eq!(format_tickets(&[]), "");
    }

    #[test]
    fn status_serde_uses_display_names() {
        let json = serde_json::to_string(&TicketStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        let back: TicketStatus = serde_json::from_str("\"Backlog\"").unwrap();
        assert_eq!(back, TicketStatus::Backlog);
    }
}
