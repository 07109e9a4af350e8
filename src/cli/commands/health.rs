//! Cloud service health command.

use console::style;

use crate::config::Config;
use crate::services::{check_services, CloudServices};

use super::super::helpers::status_mark;

/// Probe each cloud service and print its status.
pub async fn cmd_health(config: &Config) -> anyhow::Result<()> {
    let services = CloudServices::from_config(config)?;

    println!("\n{}", style("Cloud Service Status").bold());
    println!("{}", "-".repeat(40));

    let health = check_services(&services).await;
    println!(
        "  {:<15} {} {}",
        "Cloud Storage",
        status_mark(health.storage),
        style(config.storage.backend.as_str()).dim()
    );
    println!("  {:<15} {}", "Vision API", status_mark(health.vision));
    println!(
        "  {:<15} {} {}",
        "Vertex AI",
        status_mark(health.vertex_ai),
        style(&config.model.name).dim()
    );
    println!();

    if health.overall {
        println!("{} All services are operational", style("✓").green());
        Ok(())
    } else {
        anyhow::bail!("Some cloud services are not available")
    }
}
