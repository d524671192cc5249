//! List command handler

use anyhow::Result;
use colored::*;
use xla_ci_core::Catalog;

/// List every known job name with the build it runs
pub fn handle_list(catalog: &Catalog, json: bool) -> Result<()> {
    if json {
        let jobs: Vec<_> = catalog
            .jobs()
            .map(|(job_name, build)| {
                serde_json::json!({
                    "job_name": job_name,
                    "build_type": build.build_type(),
                    "repo": build.repo(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&jobs)?);
        return Ok(());
    }

    println!("{}", format!("{} known job(s):", catalog.jobs().count()).bold());
    println!();
    for (job_name, build) in catalog.jobs() {
        println!("  {} {}", "▸".cyan(), job_name.bold());
        println!(
            "    {} ({})",
            build.build_type(),
            build.repo().to_string().dimmed()
        );
    }

    Ok(())
}
