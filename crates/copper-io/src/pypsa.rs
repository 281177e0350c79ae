//! PyPSA CSV folder importer.
//!
//! A folder export holds one static table per component (`buses.csv`,
//! `lines.csv`, ...) and one file per time-varying attribute named
//! `<component>-<attribute>.csv`. Time-varying files carry the snapshot in
//! their first column and one column per element.
//!
//! Only `buses.csv` is required. Every other table is optional and loads as
//! empty when absent, which lets unsolved or partially exported networks
//! still render.

use std::fs::File;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use copper_core::{
    Bus, Carrier, Generator, Line, Link, Load, Network, Snapshot, SnapshotFrame,
};
use polars::prelude::*;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
struct BusRecord {
    #[serde(alias = "Bus")]
    name: String,
    x: Option<f64>,
    y: Option<f64>,
    v_nom: Option<f64>,
    carrier: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LineRecord {
    #[serde(alias = "Line")]
    name: String,
    bus0: String,
    bus1: String,
    s_nom: Option<f64>,
    s_nom_opt: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct LinkRecord {
    #[serde(alias = "Link")]
    name: String,
    bus0: String,
    bus1: String,
    p_nom: Option<f64>,
    p_nom_opt: Option<f64>,
    carrier: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeneratorRecord {
    #[serde(alias = "Generator")]
    name: String,
    bus: String,
    carrier: Option<String>,
    p_nom: Option<f64>,
    p_nom_opt: Option<f64>,
    p_max_pu: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct LoadRecord {
    #[serde(alias = "Load")]
    name: String,
    bus: String,
}

#[derive(Debug, Deserialize)]
struct CarrierRecord {
    #[serde(alias = "Carrier")]
    name: String,
    nice_name: Option<String>,
    color: Option<String>,
}

impl From<BusRecord> for Bus {
    fn from(record: BusRecord) -> Self {
        Bus {
            name: record.name,
            x: record.x.unwrap_or(0.0),
            y: record.y.unwrap_or(0.0),
            v_nom: record.v_nom,
            carrier: record.carrier,
        }
    }
}

impl From<LineRecord> for Line {
    fn from(record: LineRecord) -> Self {
        Line {
            name: record.name,
            bus0: record.bus0,
            bus1: record.bus1,
            s_nom: record.s_nom.unwrap_or(0.0),
            s_nom_opt: record.s_nom_opt,
        }
    }
}

impl From<LinkRecord> for Link {
    fn from(record: LinkRecord) -> Self {
        Link {
            name: record.name,
            bus0: record.bus0,
            bus1: record.bus1,
            p_nom: record.p_nom.unwrap_or(0.0),
            p_nom_opt: record.p_nom_opt,
            carrier: record.carrier,
        }
    }
}

impl From<GeneratorRecord> for Generator {
    fn from(record: GeneratorRecord) -> Self {
        Generator {
            name: record.name,
            bus: record.bus,
            carrier: record.carrier.unwrap_or_default(),
            p_nom: record.p_nom.unwrap_or(0.0),
            p_nom_opt: record.p_nom_opt,
            p_max_pu: record.p_max_pu.unwrap_or(1.0),
        }
    }
}

impl From<CarrierRecord> for Carrier {
    fn from(record: CarrierRecord) -> Self {
        Carrier {
            name: record.name,
            nice_name: record.nice_name,
            color: record.color,
        }
    }
}

/// Time-varying files in the order used to infer snapshots when
/// `snapshots.csv` is missing.
const SERIES_FILES: &[&str] = &[
    "buses-p",
    "buses-marginal_price",
    "generators-p",
    "generators-p_max_pu",
    "loads-p",
    "loads-p_set",
    "lines-p0",
    "links-p0",
];

/// Loads a network from a PyPSA CSV folder export.
///
/// Branches that reference unknown buses abort the load, since the graph
/// cannot hold them. Generators and loads on unknown buses are skipped with
/// a warning.
pub fn load_network(dir: impl AsRef<Path>) -> Result<Network> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        bail!("network folder {} does not exist", dir.display());
    }
    let name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("network")
        .to_string();
    let mut network = Network::new(name);

    let buses: Vec<BusRecord> = read_static(dir, "buses.csv")?
        .ok_or_else(|| anyhow!("{} has no buses.csv", dir.display()))?;
    for record in buses {
        network.add_bus(record.into())?;
    }

    for record in read_static::<LineRecord>(dir, "lines.csv")?.unwrap_or_default() {
        let line: Line = record.into();
        let name = line.name.clone();
        network
            .add_line(line)
            .with_context(|| format!("adding line {name}"))?;
    }
    for record in read_static::<LinkRecord>(dir, "links.csv")?.unwrap_or_default() {
        let link: Link = record.into();
        let name = link.name.clone();
        network
            .add_link(link)
            .with_context(|| format!("adding link {name}"))?;
    }

    for record in read_static::<GeneratorRecord>(dir, "generators.csv")?.unwrap_or_default() {
        if let Err(err) = network.add_generator(record.into()) {
            warn!("skipping generator: {err}");
        }
    }
    for record in read_static::<LoadRecord>(dir, "loads.csv")?.unwrap_or_default() {
        if let Err(err) = network.add_load(Load::new(record.name, record.bus)) {
            warn!("skipping load: {err}");
        }
    }
    for record in read_static::<CarrierRecord>(dir, "carriers.csv")?.unwrap_or_default() {
        network.add_carrier(record.into());
    }

    let mut series = Vec::with_capacity(SERIES_FILES.len());
    for stem in SERIES_FILES {
        series.push(read_series_if_present(dir, stem)?);
    }
    let snapshots = match read_snapshots(dir)? {
        Some(snapshots) => snapshots,
        None => series
            .iter()
            .find(|frame| frame.height() > 0)
            .map(|frame| frame.snapshots().to_vec())
            .unwrap_or_default(),
    };
    network.set_snapshots(snapshots);

    let mut series = series.into_iter();
    let mut next = || series.next().unwrap_or_default();
    network.buses_t.p = next();
    network.buses_t.marginal_price = next();
    network.generators_t.p = next();
    network.generators_t.p_max_pu = next();
    network.loads_t.p = next();
    network.loads_t.p_set = next();
    network.lines_t.p0 = next();
    network.links_t.p0 = next();

    info!(
        "Loaded network {} ({} buses, {} branches, {} generators, {} snapshots)",
        network.name,
        network.bus_count(),
        network.graph.edge_count(),
        network.generators.len(),
        network.snapshots().len()
    );
    Ok(network)
}

fn read_static<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<Option<Vec<T>>> {
    let path = dir.join(file);
    if !path.exists() {
        debug!("{} not present", path.display());
        return Ok(None);
    }
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(&path)
        .with_context(|| format!("opening {}", path.display()))?;
    let mut records = Vec::new();
    for (i, row) in reader.deserialize().enumerate() {
        let record: T = row.with_context(|| format!("parsing {} row {}", path.display(), i + 2))?;
        records.push(record);
    }
    debug!("read {} rows from {}", records.len(), path.display());
    Ok(Some(records))
}

fn read_snapshots(dir: &Path) -> Result<Option<Vec<Snapshot>>> {
    let path = dir.join("snapshots.csv");
    if !path.exists() {
        return Ok(None);
    }
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(&path)
        .with_context(|| format!("opening {}", path.display()))?;
    let mut snapshots = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("reading {} row {}", path.display(), i + 2))?;
        let cell = row
            .get(0)
            .ok_or_else(|| anyhow!("{} row {} is empty", path.display(), i + 2))?;
        let snapshot: Snapshot = cell
            .parse()
            .with_context(|| format!("parsing {} row {}", path.display(), i + 2))?;
        snapshots.push(snapshot);
    }
    Ok(Some(snapshots))
}

fn read_series_if_present(dir: &Path, stem: &str) -> Result<SnapshotFrame> {
    let path = dir.join(format!("{stem}.csv"));
    if !path.exists() {
        debug!("{} not present", path.display());
        return Ok(SnapshotFrame::default());
    }
    read_series(&path)
}

/// Reads one `<component>-<attribute>.csv` table.
pub fn read_series(path: &Path) -> Result<SnapshotFrame> {
    let mut file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let df = CsvReader::new(&mut file)
        .has_header(true)
        .finish()
        .with_context(|| format!("reading {}", path.display()))?;

    let (index, values) = df
        .get_columns()
        .split_first()
        .ok_or_else(|| anyhow!("{} has no columns", path.display()))?;

    let index = index
        .cast(&DataType::Utf8)
        .with_context(|| format!("casting snapshot column of {}", path.display()))?;
    let mut snapshots = Vec::with_capacity(index.len());
    for (row, cell) in index.utf8()?.into_iter().enumerate() {
        let cell =
            cell.ok_or_else(|| anyhow!("{} row {} has no snapshot", path.display(), row + 2))?;
        let snapshot: Snapshot = cell
            .parse()
            .with_context(|| format!("parsing snapshot in {} row {}", path.display(), row + 2))?;
        snapshots.push(snapshot);
    }

    let mut columns = Vec::with_capacity(values.len());
    for series in values {
        let cast = series
            .cast(&DataType::Float64)
            .with_context(|| format!("casting column '{}' of {}", series.name(), path.display()))?;
        let cells: Vec<Option<f64>> = cast.f64()?.into_iter().collect();
        columns.push((series.name().to_string(), cells));
    }

    debug!(
        "read {} snapshots x {} columns from {}",
        snapshots.len(),
        columns.len(),
        path.display()
    );
    Ok(SnapshotFrame::from_columns(snapshots, columns)?)
}
