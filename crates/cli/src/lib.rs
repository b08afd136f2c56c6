//! CLI tool for inspecting how a node cluster routes keys.
//!
//! Builds a manager over simulated nodes and provides commands for:
//! - Routing individual keys
//! - Inspecting key distribution and ring ownership
//! - Measuring how many keys move when one node joins or leaves

pub mod commands;
pub mod config;
pub mod sim;

pub use commands::{Command, CommandResult};
pub use config::CliConfig;
