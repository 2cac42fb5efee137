use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::Confirm;

use dbmend_runtime::migrations::{regenerate, MigrationReset, MigrationResetPlan};

/// Inspect and reset generated migration files.
#[derive(Parser)]
pub struct MigrationsCommand {
    #[command(subcommand)]
    pub action: MigrationsAction,

    /// Configuration file path (defaults to dbmend.toml when present).
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Django project root (overrides config).
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum MigrationsAction {
    /// Delete generated migration files and regenerate them.
    Reset {
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,

        /// Delete only; do not run the regenerate command.
        #[arg(long)]
        skip_regenerate: bool,
    },

    /// List migration files without deleting anything.
    List,
}

impl MigrationsCommand {
    pub async fn execute(self) -> Result<()> {
        // Load .env if present
        dotenvy::dotenv().ok();

        // The reset never touches the database, so only the default config
        // file may be absent; an explicit --config path must load.
        let config = super::load_config_file(self.config.as_deref())?
            .unwrap_or_else(|| dbmend_core::MendConfig::default_with_database_url(""));

        let root = self
            .root
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.project.root));

        let reset = MigrationReset::new(&root, config.reset.protected_apps.clone());
        let plan = reset.scan()?;

        match self.action {
            MigrationsAction::Reset {
                yes,
                skip_regenerate,
            } => {
                run_reset(&reset, &plan, &root, &config.reset.regenerate_command, yes, skip_regenerate)
            }
            MigrationsAction::List => {
                print_plan(&plan);
                Ok(())
            }
        }
    }
}

fn run_reset(
    reset: &MigrationReset,
    plan: &MigrationResetPlan,
    root: &Path,
    regenerate_command: &[String],
    yes: bool,
    skip_regenerate: bool,
) -> Result<()> {
    println!();
    println!("  {} Migration reset", style("dbmend").bold().cyan());
    println!();

    if plan.is_empty() {
        println!("  {} No migration files to delete", style("ℹ").blue());
    } else {
        for file in &plan.delete {
            println!("  {} {}", style("✗").red(), file.path.display());
        }
        println!();

        if !yes {
            let confirmed = Confirm::new()
                .with_prompt(format!("Delete {} migration file(s)?", plan.delete.len()))
                .default(false)
                .interact()?;

            if !confirmed {
                println!("  {} Aborted, nothing deleted", style("ℹ").blue());
                println!();
                return Ok(());
            }
        }

        let deleted = reset.apply(plan)?;
        println!(
            "  {} Deleted {} migration file(s), {} protected file(s) kept",
            style("✓").green(),
            deleted.len(),
            plan.keep.len()
        );
    }

    if skip_regenerate {
        println!();
        return Ok(());
    }

    println!();
    println!(
        "  {} Regenerating migrations: {}",
        style("→").dim(),
        regenerate_command.join(" ")
    );
    regenerate(root, regenerate_command)?;

    println!("  {} Migrations regenerated", style("✓").green());
    println!(
        "  {} Review them and decide whether to fake-apply (e.g. `migrate --fake`)",
        style("ℹ").blue()
    );
    println!();

    Ok(())
}

fn print_plan(plan: &MigrationResetPlan) {
    println!();
    println!("  {} Migration files", style("dbmend").bold().cyan());
    println!();

    if plan.delete.is_empty() && plan.keep.is_empty() {
        println!("  {} No migration files found", style("ℹ").blue());
        println!();
        return;
    }

    for file in &plan.delete {
        println!(
            "  {} {} ({})",
            style("○").yellow(),
            file.path.display(),
            file.app
        );
    }
    for file in &plan.keep {
        println!(
            "  {} {} ({}, {})",
            style("✓").green(),
            file.path.display(),
            file.app,
            style("protected").dim()
        );
    }

    println!();
    println!(
        "  {} {} deletable, {} protected",
        style("ℹ").blue(),
        plan.delete.len(),
        plan.keep.len()
    );
    println!();
}
