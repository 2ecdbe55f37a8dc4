//! Linear adapter for the ticketing port
//!
//! Wraps the Linear GraphQL API. Every operation resolves the team by its
//! configured name first; state and user ids are looked up per call rather
//! than cached, keeping the adapter stateless.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::queries;
use super::{Assignee, NewTicket, Result, Ticket, TicketStatus, Ticketing, TicketingError};
use crate::config::TicketingConfig;
use crate::secrets::SecretString;

pub struct LinearClient {
    base_url: String,
    team_name: String,
    api_key: SecretString,
    client: reqwest::Client,
}

impl LinearClient {
    pub fn new(config: &TicketingConfig, api_key: SecretString) -> Self {
        Self {
            base_url: config.base_url.clone(),
            team_name: config.team_name.clone(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    async fn run_query(&self, query: &str, variables: Value) -> Result<Value> {
        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", self.api_key.expose())
            .header("Content-Type", "application/json")
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| TicketingError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TicketingError::Api(format!(
                "query failed with status {status}: {body}"
            )));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| TicketingError::Parse(e.to_string()))?;

        if let Some(errors) = data.get("errors").and_then(|e| e.as_array()) {
            let message = errors
                .first()
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown GraphQL error");
            return Err(TicketingError::Api(format!("GraphQL error: {message}")));
        }

        Ok(data)
    }

    async fn team_id(&self) -> Result<String> {
        let data = self.run_query(&queries::list_teams(), json!({})).await?;
        let teams = data["data"]["teams"]["nodes"]
            .as_array()
            .ok_or_else(|| TicketingError::Parse("No teams in response".to_string()))?;

        teams
            .iter()
            .find(|team| team["name"].as_str() == Some(self.team_name.as_str()))
            .and_then(|team| team["id"].as_str())
            .map(str::to_string)
            .ok_or_else(|| TicketingError::NotFound(format!("team {}", self.team_name)))
    }

    async fn state_id(&self, team_id: &str, status: TicketStatus) -> Result<String> {
        let data = self
            .run_query(&queries::team_states(), json!({ "teamId": team_id }))
            .await?;
        let states = data["data"]["team"]["states"]["nodes"]
            .as_array()
            .ok_or_else(|| TicketingError::Parse("No states in response".to_string()))?;

        states
            .iter()
            .find(|state| state["name"].as_str() == Some(status.as_str()))
            .and_then(|state| state["id"].as_str())
            .map(str::to_string)
            .ok_or_else(|| TicketingError::NotFound(format!("state {status}")))
    }

    async fn user_id(&self, email: &str) -> Result<String> {
        let data = self
            .run_query(&queries::user_by_email(), json!({ "email": email }))
            .await?;
        data["data"]["users"]["nodes"]
            .as_array()
            .and_then(|users| users.first())
            .and_then(|user| user["id"].as_str())
            .map(str::to_string)
            .ok_or_else(|| TicketingError::NotFound(format!("user with email {email}")))
    }

    fn issue_to_ticket(issue: &Value) -> Ticket {
        let assignee = issue.get("assignee").filter(|a| !a.is_null()).map(|a| Assignee {
            name: a["name"].as_str().unwrap_or_default().to_string(),
            email: a["email"].as_str().unwrap_or_default().to_string(),
        });

        Ticket {
            id: issue["id"].as_str().unwrap_or_default().to_string(),
            title: issue["title"].as_str().unwrap_or_default().to_string(),
            description: issue["description"].as_str().unwrap_or_default().to_string(),
            priority: issue["priority"].as_i64(),
            state: issue["state"]["name"].as_str().unwrap_or_default().to_string(),
            assignee,
            url: issue["url"].as_str().unwrap_or_default().to_string(),
            created_at: issue["createdAt"].as_str().unwrap_or_default().to_string(),
            due_date: issue["dueDate"].as_str().map(str::to_string),
        }
    }

    fn issues_to_tickets(nodes: Option<&Value>) -> Result<Vec<Ticket>> {
        let issues = nodes
            .and_then(|n| n.as_array())
            .ok_or_else(|| TicketingError::Parse("No issues in response".to_string()))?;
        Ok(issues.iter().map(Self::issue_to_ticket).collect())
    }
}

#[async_trait]
impl Ticketing for LinearClient {
    async fn create_ticket(&self, ticket: NewTicket) -> Result<Ticket> {
        let team_id = self.team_id().await?;
        let state_id = self.state_id(&team_id, TicketStatus::Todo).await?;

        let mut variables = json!({
            "teamId": team_id,
            "title": ticket.title,
            "description": ticket.description,
            "stateId": state_id,
        });
        if let Some(email) = &ticket.assignee_email {
            variables["assigneeId"] = Value::String(self.user_id(email).await?);
        }

        let data = self.run_query(&queries::create_issue(), variables).await?;
        let issue = &data["data"]["issueCreate"]["issue"];
        if issue.is_null() {
            return Err(TicketingError::Api(
                "issueCreate returned no issue".to_string(),
            ));
        }
        Ok(Self::issue_to_ticket(issue))
    }

    async fn list_team_tickets(&self, status: TicketStatus) -> Result<Vec<Ticket>> {
        let team_id = self.team_id().await?;
        let data = self
            .run_query(
                &queries::team_issues_by_state(),
                json!({ "teamId": team_id, "status": status.as_str() }),
            )
            .await?;
        Self::issues_to_tickets(data["data"]["issues"].get("nodes"))
    }

    async fn list_user_tickets(&self, email: &str) -> Result<Vec<Ticket>> {
        let user_id = self.user_id(email).await?;
        let data = self
            .run_query(&queries::user_assigned_issues(), json!({ "userId": user_id }))
            .await?;
        Self::issues_to_tickets(data["data"]["user"]["assignedIssues"].get("nodes"))
    }
}
