//! Subcommands and their results.

use clap::Subcommand;
use router::{Manager, MemberShare};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the node URL each key routes to.
    Route {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Route sample keys and show how they spread over the nodes.
    Distribution {
        #[arg(long, default_value_t = 10_000)]
        samples: usize,
    },
    /// Add or remove one node and count the sample keys that move.
    Churn {
        #[arg(long, conflicts_with = "remove", required_unless_present = "remove")]
        add: Option<String>,
        #[arg(long)]
        remove: Option<String>,
        #[arg(long, default_value_t = 10_000)]
        samples: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    Routes(Vec<(String, Option<String>)>),
    Distribution {
        samples: usize,
        /// Keys routed to each node, by node name.
        keys: BTreeMap<String, usize>,
        shares: Vec<MemberShare>,
    },
    Churn {
        samples: usize,
        moved: usize,
    },
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

fn sample_key(i: usize) -> Vec<u8> {
    format!("sample:{i}").into_bytes()
}

fn owners(manager: &Manager, samples: usize) -> Vec<Option<String>> {
    (0..samples)
        .map(|i| manager.distribute(&sample_key(i)).map(|n| n.name().to_owned()))
        .collect()
}

impl Command {
    pub fn execute(&self, manager: &Manager) -> anyhow::Result<CommandResult> {
        match self {
            Command::Route { keys } => Ok(CommandResult::Routes(
                keys.iter()
                    .map(|key| (key.clone(), manager.route(key.as_bytes())))
                    .collect(),
            )),
            Command::Distribution { samples } => {
                let mut keys = BTreeMap::new();
                for owner in owners(manager, *samples).into_iter().flatten() {
                    *keys.entry(owner).or_insert(0) += 1;
                }
                Ok(CommandResult::Distribution {
                    samples: *samples,
                    keys,
                    shares: manager.ownership(),
                })
            }
            Command::Churn {
                add,
                remove,
                samples,
            } => {
                let before = owners(manager, *samples);
                match (add, remove) {
                    (Some(url), _) => {
                        if !manager.add(url)? {
                            anyhow::bail!("{url} is already part of the cluster");
                        }
                    }
                    (None, Some(url)) => {
                        if !manager.remove(url) {
                            anyhow::bail!("{url} is not part of the cluster");
                        }
                    }
                    (None, None) => anyhow::bail!("churn needs --add or --remove"),
                }
                let after = owners(manager, *samples);
                let moved = before.iter().zip(&after).filter(|(b, a)| b != a).count();
                Ok(CommandResult::Churn {
                    samples: *samples,
                    moved,
                })
            }
        }
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandResult::Routes(routes) => {
                for (key, url) in routes {
                    writeln!(f, "{key} -> {}", url.as_deref().unwrap_or("<no node>"))?;
                }
                Ok(())
            }
            CommandResult::Distribution {
                samples,
                keys,
                shares,
            } => {
                writeln!(f, "{:<32} {:>8} {:>8} {:>8}", "node", "keys", "keys%", "ring%")?;
                for share in shares {
                    let count = keys.get(&share.name).copied().unwrap_or(0);
                    let pct = percent(count, *samples);
                    writeln!(
                        f,
                        "{:<32} {:>8} {:>7.2}% {:>7.2}%",
                        share.name,
                        count,
                        pct,
                        share.share * 100.0
                    )?;
                }
                Ok(())
            }
            CommandResult::Churn { samples, moved } => {
                let pct = percent(*moved, *samples);
                writeln!(f, "{moved} of {samples} keys moved ({pct:.2}%)")
            }
        }
    }
}
