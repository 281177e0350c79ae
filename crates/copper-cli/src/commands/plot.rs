use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use copper_algo::DisplayMode;
use copper_cli::CopperConfig;
use copper_viz::{colored_network_figure_for_mode, show_snapshot, Dashboard};
use tracing::info;

use super::load;

pub fn handle(
    config: &CopperConfig,
    network_dir: &Path,
    mode: &str,
    technology: Option<&str>,
    snapshot: usize,
    output: Option<&Path>,
) -> Result<()> {
    let mode: DisplayMode = mode.parse()?;
    if technology.is_some() && !mode.uses_technology() {
        info!("--technology has no effect for {mode}");
    }
    let network = load(network_dir)?;
    info!("Building {mode} figure for {}", network.name);
    let figure = colored_network_figure_for_mode(&network, mode, technology)?;

    match output {
        Some(path) if is_html(path) => {
            let options = config.dashboard_options(snapshot)?;
            let dashboard = Dashboard::new(&figure, network.snapshots(), options)?;
            fs::write(path, dashboard.render_html()?)
                .with_context(|| format!("writing {}", path.display()))?;
            info!("Wrote dashboard page to {}", path.display());
        }
        Some(path) => {
            let figure = show_snapshot(&figure, snapshot)?;
            fs::write(path, figure.to_json_pretty()?)
                .with_context(|| format!("writing {}", path.display()))?;
            info!("Wrote figure JSON to {}", path.display());
        }
        None => {
            let figure = show_snapshot(&figure, snapshot)?;
            println!("{}", figure.to_json()?);
        }
    }
    Ok(())
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
        .unwrap_or(false)
}
