//! API client libraries for two collaboration services.
//!
//! Two independent subsystems, each a typed façade over a remote JSON HTTP
//! API:
//!
//! - [`jira`]: Jira Cloud REST API v3: issues, comments, projects, JQL
//!   search, with conversion between plain text and the Atlassian Document Format for
//!   rich-text fields.
//! - [`sharepoint`]: SharePoint Online via Microsoft Graph (plus the
//!   SharePoint REST API where Graph has no coverage): site resolution,
//!   document libraries, file transfer, and effective-permission reports.
//!
//! Each subsystem carries its own configuration, client, and error types;
//! nothing is shared between them beyond conventions. All operations are
//! single sequential HTTP calls (or a bounded pagination loop); the crate
//! spawns no concurrent work of its own.
//!
//! # Quick start
//!
//! ```no_run
//! use collabapi::jira::{Get, Issue, JiraClient};
//! use collabapi::sharepoint::SharePointClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let jira = JiraClient::from_env()?;
//!     let issue = Issue::get(&jira, "PROJ-42".to_string()).await?;
//!     println!("{}: {}", issue.key, issue.summary);
//!
//!     let sharepoint = SharePointClient::from_env()?;
//!     let report = sharepoint
//!         .get_user_site_permissions(
//!             "alice@contoso.com",
//!             "contoso.sharepoint.com",
//!             "/sites/TeamSite",
//!         )
//!         .await?;
//!     println!("roles: {:?}", report.effective_roles);
//!     Ok(())
//! }
//! ```

pub mod jira;
pub mod sharepoint;
