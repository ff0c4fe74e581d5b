//! Basic example demonstrating the SharePoint client.
//!
//! Run with:
//! ```
//! SHAREPOINT_TENANT_ID=... SHAREPOINT_CLIENT_ID=... SHAREPOINT_CLIENT_SECRET=... \
//!     cargo run --example sharepoint_basic -- contoso.sharepoint.com /sites/TeamSite
//! ```

use collabapi::sharepoint::{Result, SharePointClient, SharePointError};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let hostname = args
        .next()
        .ok_or_else(|| SharePointError::Validation("usage: sharepoint_basic <hostname> <site-path>".into()))?;
    let site_path = args
        .next()
        .ok_or_else(|| SharePointError::Validation("usage: sharepoint_basic <hostname> <site-path>".into()))?;

    println!("Creating SharePoint client...");
    let client = SharePointClient::from_env()?;
    client.authenticate().await?;
    println!("Authenticated.");

    // Resolve the site
    println!("\n--- Resolving Site ---");
    let site = client.get_site(&hostname, &site_path).await?;
    println!("Site: {} ({})", site.display_name.as_deref().unwrap_or("?"), site.id);

    // List document libraries
    println!("\n--- Document Libraries ---");
    let drives = client.list_drives(&site.id).await?;
    for drive in &drives {
        println!("  - {} ({})", drive.name.as_deref().unwrap_or("?"), drive.id);
    }

    // List items at the root of the first library
    if let Some(drive) = drives.first() {
        println!("\n--- Root Items ---");
        let items = client.list_root_items(&site.id, &drive.id).await?;
        for item in items.iter().take(10) {
            let kind = if item.is_folder() { "dir " } else { "file" };
            println!("  [{kind}] {}", item.name.as_deref().unwrap_or("?"));
        }
    }

    Ok(())
}
