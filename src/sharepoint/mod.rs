//! SharePoint Online / Microsoft Graph API client.
//!
//! Authenticates app-only via the OAuth2 client-credentials grant, resolves
//! sites, works with document libraries and files, and inspects effective
//! user permissions by combining Graph and SharePoint REST data.
//!
//! # Quick start
//!
//! ```no_run
//! use collabapi::sharepoint::SharePointClient;
//!
//! # async fn example() -> collabapi::sharepoint::Result<()> {
//! let client = SharePointClient::from_env()?;
//!
//! let site = client.get_site("contoso.sharepoint.com", "/sites/TeamSite").await?;
//! let drive = client.get_drive_by_name(&site.id, "Documents").await?;
//! for item in client.list_root_items(&site.id, &drive.id).await? {
//!     println!("{}", item.name.unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod config;
mod error;
mod http;
mod models;
mod permissions;

pub use auth::{ClientCredentialsTokenProvider, TokenProvider};
pub use client::SharePointClient;
pub use config::SharePointConfig;
pub use error::{Result, SharePointError};
pub use http::{GraphClient, RestClient, GRAPH_SCOPE};
pub use models::{
    DirectoryUser, Drive, DriveItem, FileFacet, FolderFacet, PermissionReport, PrincipalKind,
    ReportSite, ReportUser, RoleAssignment, Site,
};
