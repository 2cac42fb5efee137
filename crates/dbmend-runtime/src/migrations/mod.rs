mod regenerate;
mod reset;

pub use regenerate::regenerate;
pub use reset::{MigrationFile, MigrationReset, MigrationResetPlan};
