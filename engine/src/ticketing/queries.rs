//! GraphQL documents for the Linear API

/// Shared selection set for issue nodes
const ISSUE_FIELDS: &str = "
id
title
description
priority
state { name }
assignee { name email }
url
createdAt
dueDate";

pub fn list_teams() -> String {
    "query Teams { teams { nodes { id name } } }".to_string()
}

pub fn team_states() -> String {
    "query TeamStates($teamId: String!) {
        team(id: $teamId) { states { nodes { id name } } }
    }"
    .to_string()
}

pub fn user_by_email() -> String {
    "query UserByEmail($email: String!) {
        users(filter: { email: { eq: $email } }) { nodes { id } }
    }"
    .to_string()
}

pub fn team_issues_by_state() -> String {
    format!(
        "query TeamIssuesByState($teamId: ID!, $status: String!) {{
            issues(
                first: 50,
                filter: {{
                    state: {{ name: {{ eq: $status }} }},
                    team: {{ id: {{ eq: $teamId }} }}
                }}
            ) {{ nodes {{{ISSUE_FIELDS} }} }}
        }}"
    )
}

pub fn user_assigned_issues() -> String {
    format!(
        "query UserAssignedIssues($userId: String!) {{
            user(id: $userId) {{ assignedIssues {{ nodes {{{ISSUE_FIELDS} }} }} }}
        }}"
    )
}

pub fn create_issue() -> String {
    format!(
        "mutation CreateIssue($teamId: String!, $title: String!, $description: String!, $stateId: String!, $assigneeId: String) {{
            issueCreate(input: {{
                teamId: $teamId,
                title: $title,
                description: $description,
                stateId: $stateId,
                assigneeId: $assigneeId
            }}) {{ success issue {{{ISSUE_FIELDS} }} }}
        }}"
    )
}
