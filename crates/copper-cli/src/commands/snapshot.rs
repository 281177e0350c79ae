use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use copper_algo::{NetworkSnapshot, NodeInfo};
use copper_cli::OutputFormat;
use serde::Serialize;
use tabwriter::TabWriter;

use super::load;

#[derive(Serialize)]
struct SnapshotReport<'a> {
    snapshot: String,
    nodes: &'a BTreeMap<String, NodeInfo>,
}

pub fn handle(
    network_dir: &Path,
    index: usize,
    format: OutputFormat,
    group_carriers: bool,
) -> Result<()> {
    let network = load(network_dir)?;
    let state = NetworkSnapshot::at(&network, index)?;
    let nodes = if group_carriers {
        state.grouped_node_infos()
    } else {
        state.node_infos.clone()
    };

    match format {
        OutputFormat::Json => {
            let report = SnapshotReport {
                snapshot: state.snapshot.to_string(),
                nodes: &nodes,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => {
            println!("Snapshot {}", state.snapshot);
            print_table(&nodes)?;
        }
    }
    Ok(())
}

fn print_table(nodes: &BTreeMap<String, NodeInfo>) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "BUS\tLOAD\tGENERATION\tNET POWER\tGENERATORS")?;
    for (bus, info) in nodes {
        let generators = info
            .generators
            .iter()
            .map(|(label, generator)| {
                format!(
                    "{label} {:.2}/{:.2}",
                    generator.p.value(),
                    generator.p_max.value()
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}",
            bus,
            info.load_p(),
            info.generation(),
            info.net_power(),
            generators
        )?;
    }
    writer.flush()?;
    Ok(())
}
