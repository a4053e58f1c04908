//! Zoomin - a reticle that frames what a magnifier would capture

mod config;
#[cfg(windows)]
mod magnifier;
#[cfg_attr(not(windows), allow(dead_code))]
mod state;

use crate::config::{config_path, ZoominConfig, CONFIG_ENV};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let path = config_path(std::env::args_os().nth(1), std::env::var_os(CONFIG_ENV));
    let config = ZoominConfig::load(path.as_deref())?;

    run(config)
}

#[cfg(windows)]
fn run(config: ZoominConfig) -> anyhow::Result<()> {
    magnifier::run(config)
}

#[cfg(not(windows))]
fn run(_config: ZoominConfig) -> anyhow::Result<()> {
    anyhow::bail!("zoomin draws on the Windows desktop and cannot run on this platform")
}
