//! Persistence for the active alarm.
//!
//! The [`AlarmStore`] trait abstracts the backend; [`file::FileAlarmStore`]
//! keeps the record as a YAML document on the local filesystem.

mod alarm;
pub mod error;
pub mod file;

pub use alarm::AlarmStore;
pub use error::{StorageError, StorageResult};
