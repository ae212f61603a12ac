//! Alarm Scheduler - a single recurring alarm with manual overrides.
//!
//! The scheduling core lives in [`scheduler`]; [`store`] keeps the alarm
//! record across restarts and [`notify`] delivers fired alarms.

pub mod action;
pub mod api;
pub mod build_info;
pub mod client;
pub mod config;
pub mod handlers;
pub mod notify;
pub mod response;
pub mod scheduler;
pub mod server;
pub mod store;
