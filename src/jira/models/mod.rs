//! Jira API model types.

mod comment;
mod issue;
mod project;

pub(crate) mod datetime;

pub use comment::*;
pub use issue::*;
pub use project::*;
