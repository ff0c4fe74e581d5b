//! Basic example demonstrating the Jira client.
//!
//! Run with:
//! ```
//! JIRA_DOMAIN=org.atlassian.net JIRA_API_TOKEN=... JIRA_EMAIL=... \
//!     cargo run --example jira_basic
//! ```

use collabapi::jira::{search_open_issues, Comment, Get, Issue, JiraClient, List, Project};

#[tokio::main]
async fn main() -> collabapi::jira::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    println!("Creating Jira client...");
    let client = JiraClient::from_env()?;
    println!("Connected to: {}", client.base_url());

    // List visible projects
    println!("\n--- Listing Projects ---");
    let projects = Project::list(&client, &Default::default()).await?;
    println!("Found {} projects", projects.len());
    for project in &projects {
        println!("  - {} ({})", project.name, project.key);
    }

    // Search open issues in the default project
    println!("\n--- Open Issues ---");
    let page = search_open_issues(&client, None, 10, 0).await?;
    println!("Found {} open issues (total: {})", page.issues.len(), page.total);

    for issue in &page.issues {
        println!("  {} [{}] {}", issue.key, issue.status.name, issue.summary);
    }

    // Show details and comments for the first one
    if let Some(first) = page.issues.first() {
        println!("\n--- Issue Details ---");
        let issue = Issue::get(&client, first.key.clone()).await?;
        println!("Issue: {} - {}", issue.key, issue.summary);
        println!("  Type: {}", issue.issue_type.name);
        println!("  Status: {}", issue.status.name);
        if let Some(description) = &issue.description {
            println!("  Description: {description}");
        }

        let comments = Comment::list_for_issue(&client, &issue.key).await?;
        println!("  Comments: {}", comments.len());
        for comment in comments.iter().take(3) {
            println!("    {}: {}", comment.author, comment.body.as_deref().unwrap_or(""));
        }
    }

    Ok(())
}
