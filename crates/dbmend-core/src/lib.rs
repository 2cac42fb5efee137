pub mod config;
pub mod error;
pub mod sequence;

pub use config::MendConfig;
pub use error::{MendError, Result};
pub use sequence::{plan_repair, RepairAction, RepairedSequence, SequenceRecord, SkipReason};
