//! Structured classification outputs
//!
//! One type per classification shape the pipeline requests, each paired with
//! the response schema sent to the model. Field-level guidance (what to do
//! when the user omitted a value) lives in the schema descriptions so the
//! model sees it next to the field it constrains.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::OutputSchema;
use crate::ticketing::TicketStatus;

/// Routing decision: which intent handles the latest turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterVerdict {
    /// Label of the selected intent
    pub next: String,
}

impl RouterVerdict {
    pub fn schema() -> OutputSchema {
        OutputSchema::new(
            "router_verdict",
            json!({
                "type": "OBJECT",
                "properties": {
                    "next": {
                        "type": "STRING",
                        "enum": ["fallback", "create_task", "get_current_issues", "get_user_issues"],
                        "description": "The action that should handle the user's latest message."
                    }
                },
                "required": ["next"]
            }),
        )
    }
}

/// Memory extraction: is the latest message worth remembering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryVerdict {
    /// Whether the message contains a durable personal fact
    pub should_save: bool,

    /// The fact, rewritten as a third-person statement
    #[serde(default)]
    pub content: Option<String>,
}

impl MemoryVerdict {
    pub fn schema() -> OutputSchema {
        OutputSchema::new(
            "memory_verdict",
            json!({
                "type": "OBJECT",
                "properties": {
                    "should_save": {
                        "type": "BOOLEAN",
                        "description": "True only when the message states a durable personal fact."
                    },
                    "content": {
                        "type": "STRING",
                        "nullable": true,
                        "description": "The fact as a short third-person statement, e.g. 'Lives in Madrid'. Null when should_save is false."
                    }
                },
                "required": ["should_save"]
            }),
        )
    }
}

/// Parameters extracted for ticket creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskFields {
    pub task_name: String,

    /// Always present: when the user gave no usable description, the model
    /// synthesizes one from the task name. This is the documented policy for
    /// under-specified creation requests that still reach this handler.
    pub description: String,

    /// Empty string when the user mentioned no email
    #[serde(default)]
    pub assignee_email: String,

    /// Short confirmation message for the user
    pub message: String,
}

impl CreateTaskFields {
    pub fn schema() -> OutputSchema {
        OutputSchema::new(
            "create_task_fields",
            json!({
                "type": "OBJECT",
                "properties": {
                    "task_name": {
                        "type": "STRING",
                        "description": "Title of the task to create."
                    },
                    "description": {
                        "type": "STRING",
                        "description": "Task description. When the conversation has no usable description, write one from the task name; never leave it empty."
                    },
                    "assignee_email": {
                        "type": "STRING",
                        "description": "Assignee email exactly as the user wrote it. Empty string when none was given; never invent one."
                    },
                    "message": {
                        "type": "STRING",
                        "description": "Short confirmation for the user about the created task."
                    }
                },
                "required": ["task_name", "description", "message"]
            }),
        )
    }

    /// The assignee email, treating the empty string as absent
    pub fn assignee(&self) -> Option<&str> {
        let email = self.assignee_email.trim();
        (!email.is_empty()).then_some(email)
    }
}

/// Parameters extracted for the team ticket listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentIssuesFields {
    /// Status filter; the model defaults this to Todo when unspecified
    pub status: TicketStatus,

    /// Short lead-in message for the user
    pub message: String,
}

impl CurrentIssuesFields {
    pub fn schema() -> OutputSchema {
        OutputSchema::new(
            "current_issues_fields",
            json!({
                "type": "OBJECT",
                "properties": {
                    "status": {
                        "type": "STRING",
                        "enum": ["Todo", "In Progress", "Done", "Canceled", "Backlog"],
                        "description": "Status the user asked about. Default to Todo when none was mentioned."
                    },
                    "message": {
                        "type": "STRING",
                        "description": "Short lead-in for the list, asking what to do next."
                    }
                },
                "required": ["status", "message"]
            }),
        )
    }
}

/// Parameters extracted for the per-user ticket listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIssuesFields {
    /// Empty string when the user mentioned no email
    #[serde(default)]
    pub email: String,

    /// Short lead-in message for the user
    pub message: String,
}

impl UserIssuesFields {
    pub fn schema() -> OutputSchema {
        OutputSchema::new(
            "user_issues_fields",
            json!({
                "type": "OBJECT",
                "properties": {
                    "email": {
                        "type": "STRING",
                        "description": "Email whose assigned tickets the user wants. Empty string when none was given."
                    },
                    "message": {
                        "type": "STRING",
                        "description": "Short lead-in for the list."
                    }
                },
                "required": ["email", "message"]
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_schema_declares_closed_label_set() {
        let schema = RouterVerdict::schema();
        let labels = schema.schema["properties"]["next"]["enum"]
            .as_array()
            .unwrap();
        assert_eq!(labels.len(), 4);
        assert!(labels.iter().any(|l| l == "fallback"));
    }

    #[test]
    fn create_task_assignee_treats_empty_as_absent() {
        let fields = CreateTaskFields {
            task_name: "Fix login".into(),
            description: "The login page 500s".into(),
            assignee_email: "  ".into(),
            message: "Created".into(),
        };
        assert_eq!(fields.assignee(), None);

        let fields = CreateTaskFields {
            assignee_email: "dev@example.com".into(),
            ..fields
        };
        assert_eq!(fields.assignee(), Some("dev@example.com"));
    }

    #[test]
    fn memory_verdict_accepts_missing_content() {
        let verdict: MemoryVerdict =
            serde_json::from_value(json!({"should_save": false})).unwrap();
        assert!(!verdict.should_save);
        assert_eq!(verdict.content, None);
    }

    #[test]
    fn current_issues_status_deserializes_display_names() {
        let fields: CurrentIssuesFields =
            serde_json::from_value(json!({"status": "In Progress", "message": "Here you go"}))
                .unwrap();
        assert_eq!(fields.status, TicketStatus::InProgress);
    }
}
