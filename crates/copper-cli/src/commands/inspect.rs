//! Network summary: element counts, snapshot range and congestion.

use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use copper_algo::{branch_flows, DEFAULT_CONGESTION_THRESHOLD};
use tabwriter::TabWriter;

use super::load;

pub fn handle(network_dir: &Path) -> Result<()> {
    let network = load(network_dir)?;

    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "Network\t{}", network.name)?;
    writeln!(writer, "Buses\t{}", network.bus_count())?;
    writeln!(writer, "Lines\t{}", network.lines().count())?;
    writeln!(writer, "Links\t{}", network.links().count())?;
    writeln!(writer, "Generators\t{}", network.generators.len())?;
    writeln!(writer, "Loads\t{}", network.loads.len())?;
    writeln!(writer, "Carriers\t{}", network.carriers.len())?;
    match (network.snapshots().first(), network.snapshots().last()) {
        (Some(first), Some(last)) => writeln!(
            writer,
            "Snapshots\t{} ({first} .. {last})",
            network.snapshots().len()
        )?,
        _ => writeln!(writer, "Snapshots\t0")?,
    }
    writer.flush()?;

    if network.snapshots().is_empty() {
        return Ok(());
    }

    println!();
    let mut writer = TabWriter::new(io::stdout());
    writeln!(
        writer,
        "SNAPSHOT\tCONGESTED (>= {:.0}%)\tMAX LOADING",
        DEFAULT_CONGESTION_THRESHOLD * 100.0
    )?;
    for snapshot in network.snapshots() {
        let flows = branch_flows(&network, snapshot)?;
        let congested = flows
            .iter()
            .filter(|flow| flow.is_congested(DEFAULT_CONGESTION_THRESHOLD))
            .count();
        let max_loading = flows
            .iter()
            .filter_map(|flow| flow.loading_percent())
            .fold(None, |acc: Option<f64>, l| Some(acc.map_or(l, |a| a.max(l))));
        let max_loading = max_loading
            .map(|l| format!("{l:.1}%"))
            .unwrap_or_else(|| "-".to_string());
        writeln!(writer, "{snapshot}\t{congested}/{}\t{max_loading}", flows.len())?;
    }
    writer.flush()?;
    Ok(())
}
