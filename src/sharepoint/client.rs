//! High-level SharePoint client façade.
//!
//! Composes the token provider, Graph client, and per-hostname REST clients
//! behind one flat API: site resolution, document-library and file
//! operations, and permission inspection. Authentication happens lazily on
//! first use; [`authenticate`](SharePointClient::authenticate) exists to
//! verify credentials upfront.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::sharepoint::auth::{ClientCredentialsTokenProvider, TokenProvider};
use crate::sharepoint::config::SharePointConfig;
use crate::sharepoint::error::{Result, SharePointError};
use crate::sharepoint::http::{GraphClient, RestClient, GRAPH_SCOPE};
use crate::sharepoint::models::{Drive, DriveItem, PermissionReport, Site};
use crate::sharepoint::permissions;

/// High-level client for SharePoint Online via Microsoft Graph.
///
/// # Example
///
/// ```no_run
/// use collabapi::sharepoint::{SharePointClient, SharePointConfig};
///
/// # async fn example() -> collabapi::sharepoint::Result<()> {
/// let client = SharePointClient::from_env()?;
/// let site = client.get_site("contoso.sharepoint.com", "/sites/TeamSite").await?;
/// let drives = client.list_drives(&site.id).await?;
/// # Ok(())
/// # }
/// ```
pub struct SharePointClient {
    config: SharePointConfig,
    tokens: Arc<dyn TokenProvider>,
    graph: GraphClient,
}

impl std::fmt::Debug for SharePointClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharePointClient")
            .field("graph_base_url", &self.config.graph_base_url.as_str())
            .field("tenant_id", &self.config.tenant_id)
            .finish_non_exhaustive()
    }
}

impl SharePointClient {
    /// Create a client from environment variables.
    ///
    /// See [`SharePointConfig::from_env`] for the variable set.
    pub fn from_env() -> Result<Self> {
        Self::new(SharePointConfig::from_env()?)
    }

    /// Create a new client from an explicit configuration.
    pub fn new(config: SharePointConfig) -> Result<Self> {
        let tokens: Arc<dyn TokenProvider> =
            Arc::new(ClientCredentialsTokenProvider::new(&config)?);
        let graph = GraphClient::new(&config, Arc::clone(&tokens))?;
        Ok(Self {
            config,
            tokens,
            graph,
        })
    }

    /// Proactively authenticate against Microsoft Graph.
    ///
    /// Under normal use the client authenticates lazily on the first API
    /// call; call this to get a clear error at startup if credentials are
    /// wrong.
    pub async fn authenticate(&self) -> Result<()> {
        self.tokens.get_token(GRAPH_SCOPE).await?;
        Ok(())
    }

    /// The token provider shared by all of this client's requests.
    ///
    /// Exposed so callers can invalidate a scope after an auth failure.
    pub fn token_provider(&self) -> &Arc<dyn TokenProvider> {
        &self.tokens
    }

    fn rest_client(&self, hostname: &str) -> Result<RestClient> {
        RestClient::new(&self.config, Arc::clone(&self.tokens), hostname)
    }

    // ------------------------------------------------------------------
    // Sites
    // ------------------------------------------------------------------

    /// Resolve a site by hostname and server-relative path.
    #[tracing::instrument(skip(self))]
    pub async fn get_site(&self, hostname: &str, site_path: &str) -> Result<Site> {
        // Graph addresses sites as /sites/{hostname}:/{path} without slashes
        // around the path.
        let clean = site_path.trim_matches('/');
        self.graph.get(&format!("/sites/{hostname}:/{clean}")).await
    }

    // ------------------------------------------------------------------
    // Drives (document libraries)
    // ------------------------------------------------------------------

    /// List all document libraries in a site.
    #[tracing::instrument(skip(self))]
    pub async fn list_drives(&self, site_id: &str) -> Result<Vec<Drive>> {
        self.graph.get_paged(&format!("/sites/{site_id}/drives")).await
    }

    /// Find a document library by display name (case-insensitive).
    #[tracing::instrument(skip(self))]
    pub async fn get_drive_by_name(&self, site_id: &str, drive_name: &str) -> Result<Drive> {
        let drives = self.list_drives(site_id).await?;
        let wanted = drive_name.to_lowercase();
        if let Some(drive) = drives
            .iter()
            .find(|d| d.name.as_deref().unwrap_or_default().to_lowercase() == wanted)
        {
            return Ok(drive.clone());
        }
        let available: Vec<&str> = drives
            .iter()
            .filter_map(|d| d.name.as_deref())
            .collect();
        Err(SharePointError::NotFound {
            message: format!(
                "document library '{drive_name}' not found; available: {available:?}"
            ),
        })
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    /// List all items at the root of a document library.
    #[tracing::instrument(skip(self))]
    pub async fn list_root_items(&self, site_id: &str, drive_id: &str) -> Result<Vec<DriveItem>> {
        self.graph
            .get_paged(&format!("/sites/{site_id}/drives/{drive_id}/root/children"))
            .await
    }

    /// List items inside a folder identified by its path from the drive root.
    #[tracing::instrument(skip(self))]
    pub async fn list_folder_items(
        &self,
        site_id: &str,
        drive_id: &str,
        folder_path: &str,
    ) -> Result<Vec<DriveItem>> {
        let clean = folder_path.trim_matches('/');
        self.graph
            .get_paged(&format!(
                "/sites/{site_id}/drives/{drive_id}/root:/{clean}:/children"
            ))
            .await
    }

    /// List items inside a folder identified by its Graph item ID.
    #[tracing::instrument(skip(self))]
    pub async fn list_items_by_id(
        &self,
        site_id: &str,
        drive_id: &str,
        item_id: &str,
    ) -> Result<Vec<DriveItem>> {
        self.graph
            .get_paged(&format!(
                "/sites/{site_id}/drives/{drive_id}/items/{item_id}/children"
            ))
            .await
    }

    /// Get metadata for a single item by its Graph item ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_item_by_id(
        &self,
        site_id: &str,
        drive_id: &str,
        item_id: &str,
    ) -> Result<DriveItem> {
        self.graph
            .get(&format!("/sites/{site_id}/drives/{drive_id}/items/{item_id}"))
            .await
    }

    /// Get metadata for a single item by its path from the drive root.
    #[tracing::instrument(skip(self))]
    pub async fn get_item_by_path(
        &self,
        site_id: &str,
        drive_id: &str,
        item_path: &str,
    ) -> Result<DriveItem> {
        let clean = item_path.trim_matches('/');
        self.graph
            .get(&format!("/sites/{site_id}/drives/{drive_id}/root:/{clean}"))
            .await
    }

    // ------------------------------------------------------------------
    // File transfers
    // ------------------------------------------------------------------

    /// Download a file to a local path.
    ///
    /// Parent directories are created as needed; the resolved path of the
    /// written file is returned.
    #[tracing::instrument(skip(self))]
    pub async fn download_file(
        &self,
        site_id: &str,
        drive_id: &str,
        item_id: &str,
        destination: &Path,
    ) -> Result<PathBuf> {
        let content = self
            .graph
            .get_raw(&format!(
                "/sites/{site_id}/drives/{drive_id}/items/{item_id}/content"
            ))
            .await?;
        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(destination, content).await?;
        Ok(destination.to_path_buf())
    }

    /// Upload a local file to a folder in a document library.
    ///
    /// Single-shot PUT of the whole body; large files needing the resumable
    /// upload session are not supported. Pass an empty `folder_path` to
    /// upload to the library root. The file is read before any network call,
    /// so a missing local file fails without touching the server.
    #[tracing::instrument(skip(self))]
    pub async fn upload_file(
        &self,
        site_id: &str,
        drive_id: &str,
        folder_path: &str,
        local_file: &Path,
    ) -> Result<DriveItem> {
        let file_name = local_file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                SharePointError::Validation(format!(
                    "local file path has no usable file name: {}",
                    local_file.display()
                ))
            })?;
        let data = tokio::fs::read(local_file).await?;

        let clean_folder = folder_path.trim_matches('/');
        let endpoint = if clean_folder.is_empty() {
            format!("/sites/{site_id}/drives/{drive_id}/root:/{file_name}:/content")
        } else {
            format!(
                "/sites/{site_id}/drives/{drive_id}/root:/{clean_folder}/{file_name}:/content"
            )
        };
        self.graph
            .put_bytes(&endpoint, data, "application/octet-stream")
            .await
    }

    // ------------------------------------------------------------------
    // Permissions
    // ------------------------------------------------------------------

    /// Return the effective SharePoint permissions of a user on a site.
    ///
    /// Inspects direct user assignments, site-group memberships, and
    /// directory security-group memberships. See [`PermissionReport`].
    #[tracing::instrument(skip(self))]
    pub async fn get_user_site_permissions(
        &self,
        user_email: &str,
        hostname: &str,
        site_path: &str,
    ) -> Result<PermissionReport> {
        let rest = self.rest_client(hostname)?;
        permissions::get_user_site_permissions(&self.graph, &rest, user_email, hostname, site_path)
            .await
    }
}
