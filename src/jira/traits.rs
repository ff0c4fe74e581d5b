//! Trait definitions for Jira operations.
//!
//! Each entity type implements the traits its endpoints support,
//! encapsulating API differences in the implementations.

use async_trait::async_trait;

use crate::jira::client::JiraClient;
use crate::jira::error::Result;

/// Fetch a single entity by ID.
///
/// # Example
///
/// ```ignore
/// use collabapi::jira::{Get, Issue, JiraClient};
///
/// let client = JiraClient::from_env()?;
/// let issue = Issue::get(&client, "PROJ-42".to_string()).await?;
/// ```
#[async_trait]
pub trait Get: Sized {
    /// The ID type for this entity (e.g. an issue key, or a composite key).
    type Id: Send;

    /// Fetch the entity by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found or the request fails.
    async fn get(client: &JiraClient, id: Self::Id) -> Result<Self>;
}

/// List entities matching a query.
///
/// Jira collection endpoints are heterogeneous (some return plain arrays,
/// some paginate with `startAt`/`maxResults`), so implementations return
/// the full collection and handle paging internally where it exists.
#[async_trait]
pub trait List: Sized + Send {
    /// Query parameters for filtering.
    type Query: Default + Send + Sync;

    /// List all entities matching the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn list(client: &JiraClient, query: &Self::Query) -> Result<Vec<Self>>;
}

/// Create a new entity.
#[async_trait]
pub trait Create: Sized {
    /// Parameters for the create call, including any parent identifiers.
    type Params: Send + Sync;

    /// Create the entity and return the created version.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected or the request fails.
    async fn create(client: &JiraClient, params: Self::Params) -> Result<Self>;
}

/// Update an existing entity.
#[async_trait]
pub trait Update: Sized {
    /// The ID type for this entity.
    type Id: Send;

    /// Parameters for the update. Only populated fields are sent.
    type Params: Send + Sync;

    /// Update the entity and return the updated version.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found or the request fails.
    async fn update(client: &JiraClient, id: Self::Id, params: Self::Params) -> Result<Self>;
}

/// Delete an entity permanently.
#[async_trait]
pub trait Delete {
    /// The ID type for this entity.
    type Id: Send;

    /// Delete the entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found or the request fails.
    async fn delete(client: &JiraClient, id: Self::Id) -> Result<()>;
}
