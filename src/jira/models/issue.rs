//! Issue model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::jira::adf::{adf_to_text, text_to_adf};
use crate::jira::client::JiraClient;
use crate::jira::error::{JiraError, Result};
use crate::jira::models::datetime;
use crate::jira::traits::{Create, Delete, Get, Update};

/// Fields requested on every issue read so the model deserializes fully.
const ISSUE_FIELDS: &str = "summary,description,issuetype,status,priority,\
assignee,reporter,labels,components,project,created,updated,resolutiondate";

/// A Jira issue type (Bug, Story, Task, …).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueType {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subtask: bool,
}

/// An issue priority (Highest, High, Medium, Low, Lowest).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Priority {
    pub id: String,
    pub name: String,
}

/// The workflow status of an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    pub id: String,
    pub name: String,
    /// Status category key: `"new"`, `"indeterminate"`, or `"done"`.
    pub category: String,
}

/// A Jira issue.
#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    pub id: String,
    /// The issue key, e.g. `PROJ-42`.
    pub key: String,
    pub summary: String,
    pub issue_type: IssueType,
    pub status: Status,
    pub project_key: String,
    /// Description as plain text, extracted from the ADF document.
    pub description: Option<String>,
    pub priority: Option<Priority>,
    /// Assignee display name.
    pub assignee: Option<String>,
    /// Reporter display name.
    pub reporter: Option<String>,
    pub labels: Vec<String>,
    pub components: Vec<String>,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub resolved: Option<DateTime<Utc>>,
}

impl Issue {
    /// True once the issue's status category is `done`.
    pub fn is_done(&self) -> bool {
        self.status.category == "done"
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct IssueResponse {
    id: String,
    key: String,
    fields: IssueFieldsWire,
}

#[derive(Debug, Deserialize)]
struct IssueFieldsWire {
    summary: String,
    #[serde(default)]
    description: Value,
    issuetype: IssueType,
    status: StatusWire,
    project: ProjectRef,
    #[serde(default)]
    priority: Option<Priority>,
    #[serde(default)]
    assignee: Option<UserRef>,
    #[serde(default)]
    reporter: Option<UserRef>,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    components: Vec<NamedRef>,
    #[serde(default, deserialize_with = "datetime::deserialize_opt")]
    created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime::deserialize_opt")]
    updated: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime::deserialize_opt")]
    resolutiondate: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct StatusWire {
    id: String,
    name: String,
    #[serde(rename = "statusCategory", default)]
    status_category: Option<CategoryRef>,
}

#[derive(Debug, Deserialize)]
struct CategoryRef {
    key: String,
}

#[derive(Debug, Deserialize)]
struct ProjectRef {
    key: String,
}

#[derive(Debug, Deserialize)]
struct NamedRef {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRef {
    #[serde(default)]
    display_name: Option<String>,
}

impl From<IssueResponse> for Issue {
    fn from(wire: IssueResponse) -> Self {
        let fields = wire.fields;
        Self {
            id: wire.id,
            key: wire.key,
            summary: fields.summary,
            issue_type: fields.issuetype,
            status: Status {
                id: fields.status.id,
                name: fields.status.name,
                category: fields
                    .status
                    .status_category
                    .map(|c| c.key)
                    .unwrap_or_default(),
            },
            project_key: fields.project.key,
            description: adf_to_text(&fields.description),
            priority: fields.priority,
            assignee: fields.assignee.and_then(|u| u.display_name),
            reporter: fields.reporter.and_then(|u| u.display_name),
            labels: fields.labels,
            components: fields.components.into_iter().map(|c| c.name).collect(),
            created: fields.created,
            updated: fields.updated,
            resolved: fields.resolutiondate,
        }
    }
}

// ---------------------------------------------------------------------------
// Create / update parameters
// ---------------------------------------------------------------------------

/// Parameters for creating a new issue.
#[derive(Debug, Clone, Default)]
pub struct IssueCreate {
    pub project_key: String,
    pub summary: String,
    /// Issue type name; `Task` when left empty.
    pub issue_type: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub assignee_account_id: Option<String>,
    pub labels: Vec<String>,
    pub components: Vec<String>,
    /// Due date as `YYYY-MM-DD`.
    pub due_date: Option<String>,
}

impl IssueCreate {
    /// Serialize to the Jira REST API v3 payload shape.
    pub(crate) fn to_payload(&self) -> Value {
        let issue_type = if self.issue_type.is_empty() {
            "Task"
        } else {
            &self.issue_type
        };
        let mut fields = json!({
            "project": {"key": self.project_key},
            "summary": self.summary,
            "issuetype": {"name": issue_type},
        });
        let map = fields.as_object_mut().expect("fields is an object");
        if let Some(description) = &self.description {
            map.insert(
                "description".to_string(),
                serde_json::to_value(text_to_adf(description)).expect("ADF serializes"),
            );
        }
        if let Some(priority) = &self.priority {
            map.insert("priority".to_string(), json!({"name": priority}));
        }
        if let Some(account_id) = &self.assignee_account_id {
            map.insert("assignee".to_string(), json!({"accountId": account_id}));
        }
        if !self.labels.is_empty() {
            map.insert("labels".to_string(), json!(self.labels));
        }
        if !self.components.is_empty() {
            let components: Vec<Value> =
                self.components.iter().map(|c| json!({"name": c})).collect();
            map.insert("components".to_string(), Value::Array(components));
        }
        if let Some(due_date) = &self.due_date {
            map.insert("duedate".to_string(), json!(due_date));
        }
        json!({"fields": fields})
    }
}

/// Parameters for updating an existing issue.
///
/// Only populated fields are included in the payload.
#[derive(Debug, Clone, Default)]
pub struct IssueUpdate {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub assignee_account_id: Option<String>,
    pub labels: Option<Vec<String>>,
    pub components: Option<Vec<String>>,
    pub due_date: Option<String>,
}

impl IssueUpdate {
    pub(crate) fn to_payload(&self) -> Value {
        let mut fields = serde_json::Map::new();
        if let Some(summary) = &self.summary {
            fields.insert("summary".to_string(), json!(summary));
        }
        if let Some(description) = &self.description {
            fields.insert(
                "description".to_string(),
                serde_json::to_value(text_to_adf(description)).expect("ADF serializes"),
            );
        }
        if let Some(priority) = &self.priority {
            fields.insert("priority".to_string(), json!({"name": priority}));
        }
        if let Some(account_id) = &self.assignee_account_id {
            fields.insert("assignee".to_string(), json!({"accountId": account_id}));
        }
        if let Some(labels) = &self.labels {
            fields.insert("labels".to_string(), json!(labels));
        }
        if let Some(components) = &self.components {
            let components: Vec<Value> = components.iter().map(|c| json!({"name": c})).collect();
            fields.insert("components".to_string(), Value::Array(components));
        }
        if let Some(due_date) = &self.due_date {
            fields.insert("duedate".to_string(), json!(due_date));
        }
        json!({"fields": fields})
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// One page of a JQL search result.
#[derive(Debug)]
pub struct IssueSearchPage {
    pub total: u64,
    pub start_at: u64,
    pub max_results: u64,
    pub issues: Vec<Issue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    start_at: Option<u64>,
    #[serde(default)]
    max_results: Option<u64>,
    #[serde(default)]
    issues: Vec<IssueResponse>,
}

/// An available workflow transition for an issue.
#[derive(Debug, Clone, Deserialize)]
pub struct Transition {
    pub id: String,
    pub name: String,
    /// Status the transition leads to.
    #[serde(default)]
    pub to: Option<TransitionTarget>,
}

/// Target status of a [`Transition`].
#[derive(Debug, Clone, Deserialize)]
pub struct TransitionTarget {
    pub id: String,
    pub name: String,
}

/// A watcher of an issue.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Watcher {
    pub account_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransitionsResponse {
    #[serde(default)]
    transitions: Vec<Transition>,
}

#[derive(Debug, Deserialize)]
struct WatchersResponse {
    #[serde(default)]
    watchers: Vec<Watcher>,
}

#[derive(Debug, Deserialize)]
struct CreatedIssueRef {
    key: String,
}

#[derive(Debug, Deserialize)]
struct BulkCreateResponse {
    #[serde(default)]
    issues: Vec<CreatedIssueRef>,
}

// ---------------------------------------------------------------------------
// Trait implementations
// ---------------------------------------------------------------------------

#[async_trait]
impl Get for Issue {
    type Id = String; // Issue key

    #[tracing::instrument(skip(client))]
    async fn get(client: &JiraClient, key: String) -> Result<Self> {
        let path = format!("issue/{}", urlencoding::encode(&key));
        let response = client
            .get_with_query(&path, &[("fields", ISSUE_FIELDS)])
            .await?;
        let wire: IssueResponse = response.json().await.map_err(JiraError::Http)?;
        Ok(wire.into())
    }
}

#[async_trait]
impl Create for Issue {
    type Params = IssueCreate;

    #[tracing::instrument(skip(client, params))]
    async fn create(client: &JiraClient, params: IssueCreate) -> Result<Self> {
        let response = client.post("issue", &params.to_payload()).await?;
        let created: CreatedIssueRef = response.json().await.map_err(JiraError::Http)?;
        // The create endpoint only returns {id, key}; re-fetch the full issue.
        Self::get(client, created.key).await
    }
}

#[async_trait]
impl Update for Issue {
    type Id = String;
    type Params = IssueUpdate;

    #[tracing::instrument(skip(client, params))]
    async fn update(client: &JiraClient, key: String, params: IssueUpdate) -> Result<Self> {
        let path = format!("issue/{}", urlencoding::encode(&key));
        client.put(&path, &params.to_payload()).await?;
        Self::get(client, key).await
    }
}

#[async_trait]
impl Delete for Issue {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn delete(client: &JiraClient, key: String) -> Result<()> {
        Issue::delete_with_subtasks(client, &key, false).await
    }
}

// ---------------------------------------------------------------------------
// Inherent operations
// ---------------------------------------------------------------------------

impl Issue {
    /// Delete an issue, optionally removing its subtasks as well.
    #[tracing::instrument(skip(client))]
    pub async fn delete_with_subtasks(
        client: &JiraClient,
        key: &str,
        delete_subtasks: bool,
    ) -> Result<()> {
        let path = format!("issue/{}", urlencoding::encode(key));
        client
            .delete_with_query(&path, &[("deleteSubtasks", delete_subtasks.to_string())])
            .await?;
        Ok(())
    }

    /// Return the available workflow transitions for an issue.
    #[tracing::instrument(skip(client))]
    pub async fn transitions(client: &JiraClient, key: &str) -> Result<Vec<Transition>> {
        let path = format!("issue/{}/transitions", urlencoding::encode(key));
        let response = client.get(&path).await?;
        let data: TransitionsResponse = response.json().await.map_err(JiraError::Http)?;
        Ok(data.transitions)
    }

    /// Apply a workflow transition to change the issue status.
    #[tracing::instrument(skip(client))]
    pub async fn transition(client: &JiraClient, key: &str, transition_id: &str) -> Result<()> {
        let path = format!("issue/{}/transitions", urlencoding::encode(key));
        client
            .post(&path, &json!({"transition": {"id": transition_id}}))
            .await?;
        Ok(())
    }

    /// Assign an issue to a user. Pass `None` to unassign.
    #[tracing::instrument(skip(client))]
    pub async fn assign(client: &JiraClient, key: &str, account_id: Option<&str>) -> Result<()> {
        let path = format!("issue/{}/assignee", urlencoding::encode(key));
        client.put(&path, &json!({"accountId": account_id})).await?;
        Ok(())
    }

    /// Return the list of watchers for an issue.
    #[tracing::instrument(skip(client))]
    pub async fn watchers(client: &JiraClient, key: &str) -> Result<Vec<Watcher>> {
        let path = format!("issue/{}/watchers", urlencoding::encode(key));
        let response = client.get(&path).await?;
        let data: WatchersResponse = response.json().await.map_err(JiraError::Http)?;
        Ok(data.watchers)
    }

    /// Add a user as a watcher.
    #[tracing::instrument(skip(client))]
    pub async fn add_watcher(client: &JiraClient, key: &str, account_id: &str) -> Result<()> {
        let path = format!("issue/{}/watchers", urlencoding::encode(key));
        // The watchers endpoint takes the bare account ID as the JSON body.
        client.post(&path, &json!(account_id)).await?;
        Ok(())
    }

    /// Create an issue link between two issues.
    ///
    /// Common `link_type` values: `Blocks`, `Cloners`, `Duplicate`, `Relates`.
    #[tracing::instrument(skip(client, comment))]
    pub async fn link(
        client: &JiraClient,
        link_type: &str,
        inward_key: &str,
        outward_key: &str,
        comment: Option<&str>,
    ) -> Result<()> {
        let mut payload = json!({
            "type": {"name": link_type},
            "inwardIssue": {"key": inward_key},
            "outwardIssue": {"key": outward_key},
        });
        if let Some(text) = comment {
            payload.as_object_mut().expect("payload is an object").insert(
                "comment".to_string(),
                json!({"body": text_to_adf(text)}),
            );
        }
        client.post("issueLink", &payload).await?;
        Ok(())
    }

    /// Create multiple issues in a single API call.
    ///
    /// Fails as a whole if the bulk call or any follow-up fetch fails.
    #[tracing::instrument(skip(client, issues))]
    pub async fn bulk_create(client: &JiraClient, issues: &[IssueCreate]) -> Result<Vec<Issue>> {
        let payload = json!({
            "issueUpdates": issues.iter().map(IssueCreate::to_payload).collect::<Vec<_>>(),
        });
        let response = client.post("issue/bulk", &payload).await?;
        let data: BulkCreateResponse = response.json().await.map_err(JiraError::Http)?;

        let mut created = Vec::with_capacity(data.issues.len());
        for item in data.issues {
            created.push(Self::get(client, item.key).await?);
        }
        Ok(created)
    }
}

// ---------------------------------------------------------------------------
// Search functions
// ---------------------------------------------------------------------------

/// Search issues using a JQL query string.
#[tracing::instrument(skip(client))]
pub async fn search_issues(
    client: &JiraClient,
    jql: &str,
    max_results: u64,
    start_at: u64,
) -> Result<IssueSearchPage> {
    let response = client
        .get_with_query(
            "search/jql",
            &[
                ("jql", jql),
                ("maxResults", &max_results.to_string()),
                ("startAt", &start_at.to_string()),
                ("fields", ISSUE_FIELDS),
            ],
        )
        .await?;
    let data: SearchResponse = response.json().await.map_err(JiraError::Http)?;
    let issues: Vec<Issue> = data.issues.into_iter().map(Issue::from).collect();
    Ok(IssueSearchPage {
        total: data.total.unwrap_or(issues.len() as u64),
        start_at: data.start_at.unwrap_or(0),
        max_results: data.max_results.unwrap_or(issues.len() as u64),
        issues,
    })
}

/// Return open (not-done) issues, optionally filtered by project.
///
/// Falls back to the configured default project when `project_key` is `None`.
pub async fn search_open_issues(
    client: &JiraClient,
    project_key: Option<&str>,
    max_results: u64,
    start_at: u64,
) -> Result<IssueSearchPage> {
    let mut conditions = vec!["statusCategory != Done".to_string()];
    if let Some(project) = project_key.or(client.config().default_project.as_deref()) {
        conditions.insert(0, format!("project = \"{project}\""));
    }
    let jql = format!("{} ORDER BY created DESC", conditions.join(" AND "));
    search_issues(client, &jql, max_results, start_at).await
}

/// Return closed issues, optionally filtered by project and resolution date range.
pub async fn search_closed_issues(
    client: &JiraClient,
    project_key: Option<&str>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    max_results: u64,
    start_at: u64,
) -> Result<IssueSearchPage> {
    let mut conditions = vec!["statusCategory = Done".to_string()];
    if let Some(project) = project_key.or(client.config().default_project.as_deref()) {
        conditions.insert(0, format!("project = \"{project}\""));
    }
    if let Some(from) = date_from {
        conditions.push(format!("resolutiondate >= \"{from}\""));
    }
    if let Some(to) = date_to {
        conditions.push(format!("resolutiondate <= \"{to}\""));
    }
    let jql = format!("{} ORDER BY resolutiondate DESC", conditions.join(" AND "));
    search_issues(client, &jql, max_results, start_at).await
}
