//! Project model and trait implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::jira::client::JiraClient;
use crate::jira::error::{JiraError, Result};
use crate::jira::models::issue::IssueType;
use crate::jira::traits::{Get, List};

const PROJECT_EXPAND: &str = "description,lead,category";

/// A Jira project category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A Jira project.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: String,
    /// The project key, e.g. `PROJ`.
    pub key: String,
    pub name: String,
    /// Project type key, e.g. `software`.
    pub project_type: String,
    pub description: String,
    /// Lead display name.
    pub lead: Option<String>,
    pub category: Option<ProjectCategory>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectWire {
    id: String,
    key: String,
    name: String,
    #[serde(default)]
    project_type_key: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    lead: Option<LeadRef>,
    #[serde(default)]
    project_category: Option<ProjectCategory>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeadRef {
    #[serde(default)]
    display_name: Option<String>,
}

impl From<ProjectWire> for Project {
    fn from(wire: ProjectWire) -> Self {
        Self {
            id: wire.id,
            key: wire.key,
            name: wire.name,
            project_type: wire.project_type_key,
            description: wire.description,
            lead: wire.lead.and_then(|l| l.display_name),
            category: wire.project_category,
        }
    }
}

/// A component defined within a project.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectComponent {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A version defined within a project.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectVersion {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub released: bool,
    #[serde(default)]
    pub archived: bool,
}

/// Query parameters for listing projects. The project listing endpoint takes
/// no filters; this exists to satisfy the `List` trait.
#[derive(Debug, Clone, Default)]
pub struct ProjectListQuery;

#[async_trait]
impl Get for Project {
    type Id = String; // Project key

    #[tracing::instrument(skip(client))]
    async fn get(client: &JiraClient, key: String) -> Result<Self> {
        let path = format!("project/{}", urlencoding::encode(&key));
        let response = client
            .get_with_query(&path, &[("expand", PROJECT_EXPAND)])
            .await?;
        let wire: ProjectWire = response.json().await.map_err(JiraError::Http)?;
        Ok(wire.into())
    }
}

#[async_trait]
impl List for Project {
    type Query = ProjectListQuery;

    #[tracing::instrument(skip(client, _query))]
    async fn list(client: &JiraClient, _query: &Self::Query) -> Result<Vec<Self>> {
        let response = client
            .get_with_query("project", &[("expand", PROJECT_EXPAND)])
            .await?;
        let wires: Vec<ProjectWire> = response.json().await.map_err(JiraError::Http)?;
        Ok(wires.into_iter().map(Project::from).collect())
    }
}

impl Project {
    /// Return the issue types available in a project.
    ///
    /// Tries the dedicated issue-type endpoint first and falls back to the
    /// project expand when the instance does not support it.
    #[tracing::instrument(skip(client))]
    pub async fn issue_types(client: &JiraClient, project_key: &str) -> Result<Vec<IssueType>> {
        let project_id = Self::project_id(client, project_key).await?;
        match client
            .get_with_query("issuetype/project", &[("projectId", project_id.as_str())])
            .await
        {
            Ok(response) => {
                let value: serde_json::Value = response.json().await.map_err(JiraError::Http)?;
                if value.is_array() {
                    return Ok(serde_json::from_value(value)?);
                }
            }
            // Older instances do not expose the endpoint at all.
            Err(JiraError::NotFound { .. }) => {}
            Err(err) => return Err(err),
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct ExpandedProject {
            #[serde(default)]
            issue_types: Vec<IssueType>,
        }

        let path = format!("project/{}", urlencoding::encode(project_key));
        let response = client
            .get_with_query(&path, &[("expand", "issueTypes")])
            .await?;
        let expanded: ExpandedProject = response.json().await.map_err(JiraError::Http)?;
        Ok(expanded.issue_types)
    }

    /// Return all components defined in a project.
    #[tracing::instrument(skip(client))]
    pub async fn components(client: &JiraClient, project_key: &str) -> Result<Vec<ProjectComponent>> {
        let path = format!("project/{}/components", urlencoding::encode(project_key));
        let response = client.get(&path).await?;
        response.json().await.map_err(JiraError::Http)
    }

    /// Return all versions defined in a project.
    #[tracing::instrument(skip(client))]
    pub async fn versions(client: &JiraClient, project_key: &str) -> Result<Vec<ProjectVersion>> {
        let path = format!("project/{}/versions", urlencoding::encode(project_key));
        let response = client.get(&path).await?;
        response.json().await.map_err(JiraError::Http)
    }

    /// Resolve a project key to its numeric ID.
    async fn project_id(client: &JiraClient, project_key: &str) -> Result<String> {
        #[derive(Deserialize)]
        struct IdOnly {
            id: String,
        }
        let path = format!("project/{}", urlencoding::encode(project_key));
        let response = client.get(&path).await?;
        let data: IdOnly = response.json().await.map_err(JiraError::Http)?;
        Ok(data.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_from_wire() {
        let raw = serde_json::json!({
            "id": "10000",
            "key": "PROJ",
            "name": "Platform",
            "projectTypeKey": "software",
            "description": "Core platform work",
            "lead": {"displayName": "Carol Lead"},
            "projectCategory": {"id": "1", "name": "Engineering"}
        });
        let wire: ProjectWire = serde_json::from_value(raw).unwrap();
        let project = Project::from(wire);
        assert_eq!(project.key, "PROJ");
        assert_eq!(project.project_type, "software");
        assert_eq!(project.lead.as_deref(), Some("Carol Lead"));
        assert_eq!(project.category.unwrap().name, "Engineering");
    }

    #[test]
    fn test_project_minimal_wire() {
        let raw = serde_json::json!({"id": "1", "key": "X", "name": "X"});
        let wire: ProjectWire = serde_json::from_value(raw).unwrap();
        let project = Project::from(wire);
        assert_eq!(project.lead, None);
        assert_eq!(project.category.is_none(), true);
    }
}
