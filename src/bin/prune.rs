//! Schema Prune CLI
//!
//! Removes the system health module from `shared/schema.ts`. Run without
//! arguments to apply the built-in rules in place.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use schema_prune::{rewrite_file, PruneConfig, RewriteOptions, RuleSet};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-prune")]
#[command(about = "Remove retired declarations from a Drizzle schema file")]
struct Cli {
    /// Schema file to rewrite in place
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// TOML rule file (defaults to the built-in system health rules)
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// Config file, layered over prune.toml and SCHEMA_PRUNE__* env vars
    #[arg(short, long)]
    config: Option<String>,

    /// Dry run - don't write the file back
    #[arg(long)]
    dry_run: bool,

    /// Print a unified diff of the change
    #[arg(long)]
    diff: bool,

    /// Print the filter report as JSON
    #[arg(long)]
    json: bool,

    /// Write the effective configuration to this file and exit
    #[arg(long, value_name = "PATH")]
    save_config: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = PruneConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    if let Some(file) = cli.file {
        config.target.path = file;
    }
    if let Some(rules) = cli.rules {
        config.rules.file = Some(rules);
    }
    config.output.dry_run |= cli.dry_run;
    config.output.diff |= cli.diff;
    config.output.json |= cli.json;

    if let Some(path) = cli.save_config {
        config.save(&path).with_context(|| format!("saving configuration to {}", path))?;
        println!("Configuration written to {}", path);
        return Ok(());
    }

    let rules: RuleSet = config.rule_set()?;
    if rules.is_empty() {
        warn!("rule set is empty, nothing will be removed");
    }
    let options = RewriteOptions {
        dry_run: config.output.dry_run,
        diff: config.output.diff,
    };

    let outcome = rewrite_file(&config.target.path, &rules, &options)?;

    if let Some(diff) = &outcome.diff {
        print!("{}", diff);
    }

    if config.output.json {
        println!("{}", outcome.report.to_json_pretty()?);
    } else if options.dry_run {
        println!(
            "Dry run: {} lines would be removed from {}",
            outcome.report.lines_removed(),
            outcome.path.display()
        );
    } else {
        println!("System health components removed from schema.ts");
    }

    Ok(())
}
