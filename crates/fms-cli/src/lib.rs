//! FMS CLI - Command line tools for building flight plans.
//!
//! This crate provides the `fms-plan` binary plus the pieces it shares:
//! - config: environment configuration
//! - report: table and JSON rendering of a plan

pub mod config;
pub mod report;

pub use config::Config;
