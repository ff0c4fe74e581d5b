//! Jira Cloud API client.
//!
//! Wraps the Jira REST API v3 behind typed request/response objects. The
//! client authenticates with either HTTP Basic (email + API token) or a
//! bearer token, selected by configuration. Operations are implemented via
//! the [`Get`], [`List`], [`Create`], [`Update`], and [`Delete`] traits on
//! entity types, plus free search functions for JQL queries.
//!
//! # Quick start
//!
//! ```no_run
//! use collabapi::jira::{Get, Issue, JiraClient, List, Project};
//!
//! # async fn example() -> collabapi::jira::Result<()> {
//! let client = JiraClient::from_env()?;
//!
//! let issue = Issue::get(&client, "PROJ-42".to_string()).await?;
//! println!("{}: {}", issue.key, issue.summary);
//!
//! let projects = Project::list(&client, &Default::default()).await?;
//! println!("{} projects visible", projects.len());
//! # Ok(())
//! # }
//! ```

pub mod adf;
mod client;
mod config;
mod error;
mod models;
mod traits;

pub use client::JiraClient;
pub use config::{AuthType, JiraConfig};
pub use error::{JiraError, Result};
pub use traits::{Create, Delete, Get, List, Update};

pub use models::{
    // Issues
    Issue,
    IssueCreate,
    IssueSearchPage,
    IssueType,
    IssueUpdate,
    Priority,
    Status,
    Transition,
    TransitionTarget,
    Watcher,
    // Comments
    Comment,
    CommentCreate,
    CommentUpdate,
    // Projects
    Project,
    ProjectCategory,
    ProjectComponent,
    ProjectListQuery,
    ProjectVersion,
};

pub use models::{search_closed_issues, search_issues, search_open_issues};
