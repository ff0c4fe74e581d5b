//! Comment model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::jira::adf::{adf_to_text, text_to_adf};
use crate::jira::client::JiraClient;
use crate::jira::error::{JiraError, Result};
use crate::jira::models::datetime;
use crate::jira::traits::{Create, Delete, Get, Update};

/// A comment on a Jira issue.
#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: String,
    /// Author display name.
    pub author: String,
    /// Body as plain text, extracted from the ADF document.
    pub body: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct CommentWire {
    id: String,
    #[serde(default)]
    author: Option<AuthorRef>,
    #[serde(default)]
    body: Value,
    #[serde(default, deserialize_with = "datetime::deserialize_opt")]
    created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime::deserialize_opt")]
    updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthorRef {
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentListResponse {
    #[serde(default)]
    comments: Vec<CommentWire>,
}

impl From<CommentWire> for Comment {
    fn from(wire: CommentWire) -> Self {
        Self {
            id: wire.id,
            author: wire
                .author
                .and_then(|a| a.display_name)
                .unwrap_or_default(),
            body: adf_to_text(&wire.body),
            created: wire.created,
            updated: wire.updated,
        }
    }
}

/// Parameters for adding a comment to an issue.
#[derive(Debug, Clone)]
pub struct CommentCreate {
    pub issue_key: String,
    pub body: String,
}

/// Parameters for replacing the body of an existing comment.
#[derive(Debug, Clone)]
pub struct CommentUpdate {
    pub body: String,
}

#[async_trait]
impl Get for Comment {
    /// `(issue key, comment ID)`.
    type Id = (String, String);

    #[tracing::instrument(skip(client))]
    async fn get(client: &JiraClient, (issue_key, comment_id): Self::Id) -> Result<Self> {
        let path = format!(
            "issue/{}/comment/{}",
            urlencoding::encode(&issue_key),
            urlencoding::encode(&comment_id)
        );
        let response = client.get(&path).await?;
        let wire: CommentWire = response.json().await.map_err(JiraError::Http)?;
        Ok(wire.into())
    }
}

#[async_trait]
impl Create for Comment {
    type Params = CommentCreate;

    #[tracing::instrument(skip(client, params))]
    async fn create(client: &JiraClient, params: CommentCreate) -> Result<Self> {
        let path = format!("issue/{}/comment", urlencoding::encode(&params.issue_key));
        let response = client
            .post(&path, &json!({"body": text_to_adf(&params.body)}))
            .await?;
        let wire: CommentWire = response.json().await.map_err(JiraError::Http)?;
        Ok(wire.into())
    }
}

#[async_trait]
impl Update for Comment {
    type Id = (String, String);
    type Params = CommentUpdate;

    #[tracing::instrument(skip(client, params))]
    async fn update(
        client: &JiraClient,
        (issue_key, comment_id): Self::Id,
        params: CommentUpdate,
    ) -> Result<Self> {
        let path = format!(
            "issue/{}/comment/{}",
            urlencoding::encode(&issue_key),
            urlencoding::encode(&comment_id)
        );
        let response = client
            .put(&path, &json!({"body": text_to_adf(&params.body)}))
            .await?;
        let wire: CommentWire = response.json().await.map_err(JiraError::Http)?;
        Ok(wire.into())
    }
}

#[async_trait]
impl Delete for Comment {
    type Id = (String, String);

    #[tracing::instrument(skip(client))]
    async fn delete(client: &JiraClient, (issue_key, comment_id): Self::Id) -> Result<()> {
        let path = format!(
            "issue/{}/comment/{}",
            urlencoding::encode(&issue_key),
            urlencoding::encode(&comment_id)
        );
        client.delete(&path).await?;
        Ok(())
    }
}

impl Comment {
    /// Return all comments for an issue, ordered oldest first.
    #[tracing::instrument(skip(client))]
    pub async fn list_for_issue(client: &JiraClient, issue_key: &str) -> Result<Vec<Comment>> {
        let path = format!("issue/{}/comment", urlencoding::encode(issue_key));
        let response = client
            .get_with_query(&path, &[("orderBy", "created")])
            .await?;
        let data: CommentListResponse = response.json().await.map_err(JiraError::Http)?;
        Ok(data.comments.into_iter().map(Comment::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_from_wire() {
        let raw = serde_json::json!({
            "id": "20001",
            "author": {"displayName": "Bob Reviewer"},
            "body": {
                "type": "doc",
                "version": 1,
                "content": [
                    {"type": "paragraph", "content": [{"type": "text", "text": "looks good"}]}
                ]
            },
            "created": "2024-06-01T10:00:00.000+0000",
            "updated": "2024-06-01T10:00:00.000+0000"
        });
        let wire: CommentWire = serde_json::from_value(raw).unwrap();
        let comment = Comment::from(wire);
        assert_eq!(comment.author, "Bob Reviewer");
        assert_eq!(comment.body.as_deref(), Some("looks good"));
        assert!(comment.created.is_some());
    }

    #[test]
    fn test_comment_missing_author_and_body() {
        let raw = serde_json::json!({"id": "20002"});
        let wire: CommentWire = serde_json::from_value(raw).unwrap();
        let comment = Comment::from(wire);
        assert_eq!(comment.author, "");
        assert_eq!(comment.body, None);
    }
}
