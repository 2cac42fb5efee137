pub mod db;
pub mod migrations;
pub mod sequences;

pub use db::Database;
pub use migrations::{MigrationReset, MigrationResetPlan};
pub use sequences::{RepairOutcome, RepairReport, SequenceRepairer};
