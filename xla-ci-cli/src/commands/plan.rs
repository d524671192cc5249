//! Plan command handler
//!
//! Dry run: prints the command sequence of the selected build.

use anyhow::Result;
use colored::*;
use xla_ci_core::{Build, Catalog};
use xla_ci_runner::Config;

pub fn handle_plan(config: &Config, catalog: &Catalog, json: bool) -> Result<()> {
    let build = catalog.lookup(&config.job_name)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan_json(&config.job_name, build))?);
    } else {
        print_plan(&config.job_name, build);
    }

    Ok(())
}

fn plan_json(job_name: &str, build: &Build) -> serde_json::Value {
    serde_json::json!({
        "job_name": job_name,
        "build": build,
        "commands": build.commands(),
    })
}

fn print_plan(job_name: &str, build: &Build) {
    println!("{}", format!("Plan for job {}:", job_name).bold());
    println!("  Build: {}", build.build_type().to_string().cyan());
    println!("  Repo:  {}", build.repo());
    println!("  Image: {}", build.image_url().dimmed());
    println!();

    for (idx, command) in build.commands().iter().enumerate() {
        println!("  {:>2}. {}", idx + 1, command);
    }
}
