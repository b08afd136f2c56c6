//! Command-line arguments and process setup.

use crate::commands::Command;
use crate::sim::SimFactory;
use anyhow::Context;
use clap::Parser;
use router::{Group, Manager, RouterConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;

/// Inspect consistent-hash routing over a set of full node URLs.
#[derive(Debug, Parser)]
#[command(name = "noderoute", version, about)]
pub struct CliConfig {
    /// Full node URL; repeat for every node in the cluster.
    #[arg(long = "url", required = true)]
    pub urls: Vec<String>,

    /// JSON router configuration (ring, repartition, health).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Chain family of the group, used as a metrics label.
    #[arg(long, default_value = "eth")]
    pub space: String,

    /// Group name.
    #[arg(long, default_value = "ethhttp")]
    pub group: String,

    #[arg(long, default_value_t = Level::WARN)]
    pub log_level: Level,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    pub fn run(self) -> anyhow::Result<()> {
        tracing_subscriber::fmt()
            .with_max_level(self.log_level)
            .with_writer(std::io::stderr)
            .init();

        let manager = self.build_manager()?;
        let result = self.command.execute(&manager)?;
        println!("{result}");
        Ok(())
    }

    pub fn router_config(&self) -> anyhow::Result<RouterConfig> {
        match &self.config {
            Some(path) => RouterConfig::load(path)
                .with_context(|| format!("loading {}", path.display())),
            None => Ok(RouterConfig::default()),
        }
    }

    pub fn build_manager(&self) -> anyhow::Result<Manager> {
        let config = self.router_config()?;
        let manager = Manager::builder(
            Group::new(self.space.clone(), self.group.clone()),
            Arc::new(SimFactory),
        )
        .from_config(&config)?
        .with_urls(self.urls.iter().cloned())
        .build()?;
        Ok(manager)
    }
}
