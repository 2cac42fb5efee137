mod catalog;
mod repair;

pub use repair::{RepairOutcome, RepairReport, SequenceRepairer};
