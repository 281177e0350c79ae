use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use copper_cli::CopperConfig;
use copper_viz::{net_power_figure, Dashboard};
use tracing::info;

use super::load;

pub fn handle(
    config: &CopperConfig,
    network_dir: &Path,
    output: &Path,
    snapshot: usize,
) -> Result<()> {
    let network = load(network_dir)?;
    let figure = net_power_figure(&network)?;
    let options = config.dashboard_options(snapshot)?;
    let dashboard = Dashboard::new(&figure, network.snapshots(), options)?;
    fs::write(output, dashboard.render_html()?)
        .with_context(|| format!("writing {}", output.display()))?;
    info!(
        "Wrote {} snapshot dashboard to {}",
        network.snapshots().len(),
        output.display()
    );
    Ok(())
}
