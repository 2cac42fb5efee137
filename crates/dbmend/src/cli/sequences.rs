use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;

use dbmend_core::sequence::RepairAction;
use dbmend_runtime::{Database, RepairReport, SequenceRepairer};

/// Inspect and repair primary-key sequences.
#[derive(Parser)]
pub struct SequencesCommand {
    #[command(subcommand)]
    pub action: SequencesAction,

    /// Configuration file path (defaults to dbmend.toml when present).
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Database URL (overrides config and DATABASE_URL).
    #[arg(long, global = true)]
    pub database_url: Option<String>,
}

#[derive(Subcommand)]
pub enum SequencesAction {
    /// Advance sequences that have fallen behind their tables.
    Repair {
        /// Plan the pass without changing the database.
        #[arg(long)]
        dry_run: bool,
    },

    /// Show every primary-key sequence and what a repair would do.
    Status,
}

impl SequencesCommand {
    pub async fn execute(self) -> Result<()> {
        // Load .env if present
        dotenvy::dotenv().ok();

        let config = super::load_config(self.config.as_deref(), self.database_url.as_deref())?;
        let db = Database::from_config(&config.database).await?;
        db.health_check().await?;
        let repairer = SequenceRepairer::new(db.pool().clone());

        let result = match self.action {
            SequencesAction::Repair { dry_run } => run_repair(&repairer, dry_run).await,
            SequencesAction::Status => run_status(&repairer).await,
        };

        db.close().await;
        result
    }
}

async fn run_repair(repairer: &SequenceRepairer, dry_run: bool) -> Result<()> {
    println!();
    println!(
        "  {} Sequence repair{}",
        style("dbmend").bold().cyan(),
        if dry_run {
            style(" (dry run)").yellow().to_string()
        } else {
            String::new()
        }
    );
    println!();

    let report = repairer.run(dry_run).await?;

    if report.examined() == 0 {
        println!(
            "  {} No primary-key sequences found",
            style("ℹ").blue()
        );
        println!();
        return Ok(());
    }

    let repaired = report.repaired();
    for entry in &repaired {
        println!("  {} {}", style("✓").green(), entry);
    }

    println!();
    if report.is_noop() {
        println!(
            "  {} {} sequence(s) examined, nothing to repair",
            style("ℹ").blue(),
            report.examined()
        );
    } else {
        println!(
            "  {} {} sequence(s) examined, {} {}",
            style("ℹ").blue(),
            report.examined(),
            repaired.len(),
            if dry_run { "would be advanced" } else { "advanced" }
        );
    }
    println!();

    Ok(())
}

async fn run_status(repairer: &SequenceRepairer) -> Result<()> {
    println!();
    println!("  {} Sequence status", style("dbmend").bold().cyan());
    println!();

    let report = repairer.run(true).await?;

    if report.examined() == 0 {
        println!(
            "  {} No primary-key sequences found",
            style("ℹ").blue()
        );
        println!();
        return Ok(());
    }

    print_status(&report);
    Ok(())
}

fn print_status(report: &RepairReport) {
    for outcome in &report.outcomes {
        let record = &outcome.record;
        let name = format!("{}.{}", record.schema, record.table);
        let last_value = match record.last_value {
            Some(v) => v.to_string(),
            None => "-".to_string(),
        };
        let max_id = match record.max_id {
            Some(v) => v.to_string(),
            None => "-".to_string(),
        };

        match &outcome.action {
            RepairAction::Advance { new_value, .. } => {
                println!(
                    "  {} {} ({}): last_value={}, max_id={}, would advance to {}",
                    style("○").yellow(),
                    style(&name).cyan(),
                    record.sequence,
                    last_value,
                    max_id,
                    style(new_value).yellow()
                );
            }
            RepairAction::Skip(reason) => {
                println!(
                    "  {} {} ({}): last_value={}, max_id={}, {}",
                    style("✓").green(),
                    style(&name).cyan(),
                    record.sequence,
                    last_value,
                    max_id,
                    style(reason).dim()
                );
            }
        }
    }

    let behind = report
        .outcomes
        .iter()
        .filter(|o| matches!(o.action, RepairAction::Advance { .. }))
        .count();

    println!();
    println!(
        "  {} {} sequence(s), {} behind",
        style("ℹ").blue(),
        report.examined(),
        behind
    );
    println!();
}
