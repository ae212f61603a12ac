//! File-based storage implementations.
//!
//! Records are YAML documents. All writes go through a temp file followed by
//! a rename so readers never see a partially written record.

mod alarm;

pub use alarm::FileAlarmStore;
