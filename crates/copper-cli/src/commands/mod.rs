pub mod dashboard;
pub mod inspect;
pub mod plot;
pub mod snapshot;

use anyhow::{Context, Result};
use copper_core::Network;
use std::path::Path;
use tracing::info;

pub(crate) fn load(dir: &Path) -> Result<Network> {
    info!("Loading network from {}", dir.display());
    copper_io::load_network(dir).with_context(|| format!("loading network {}", dir.display()))
}
