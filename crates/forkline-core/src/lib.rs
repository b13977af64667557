//! Core forkline library (thread registry, derived status, config, logging).

pub mod config;
pub mod core;
pub mod logging;
