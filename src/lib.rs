//! triage: test run diagnosis for native app projects
//!
//! Runs an Xcode scheme's tests (or lints, or reads an existing result bundle) and turns
//! the raw tool output into a prioritized, structured diagnosis for an automated fixer.

pub mod classify;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod lint;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod runner;
pub mod task;
pub mod tree;
