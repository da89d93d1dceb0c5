//! CLI Storage Commands
//!
//! Lists bucket objects and prints the reports manifest.

use accessplus_config::Config;
use anyhow::Result;

use crate::services::Services;

pub async fn list_objects(services: &Services, prefix: Option<&str>) -> Result<()> {
    let keys = services.images().list(prefix).await?;
    if keys.is_empty() {
        println!("No objects found.");
    }
    for key in keys {
        println!("{key}");
    }
    Ok(())
}

pub async fn print_reports(config: &Config, services: &Services) -> Result<()> {
    let reports = services.index(&config.reports_index_key).load().await?;
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}
