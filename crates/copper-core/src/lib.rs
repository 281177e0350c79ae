//! # copper-core: solved network model
//!
//! Holds the data of an already-solved power network in the shape the map
//! figures consume it: buses with geographic positions, branches between them,
//! the generators and loads attached to each bus, and one [`SnapshotFrame`]
//! per time-varying attribute.
//!
//! ## Design
//!
//! The topology is an **undirected multigraph**:
//! - **Nodes**: [`Bus`] (name plus longitude `x` / latitude `y`)
//! - **Edges**: [`Edge::Line`] (AC lines) and [`Edge::Link`] (controllable links, e.g. HVDC)
//!
//! Parallel branches between the same two buses are common in aggregated
//! models, which is why the graph allows multi-edges. Generators and loads are
//! kept in flat lists keyed by name and refer to their bus by name, matching
//! how the time-series tables are indexed.
//!
//! ## Quick Start
//!
//! ```rust
//! use copper_core::*;
//!
//! let mut network = Network::new("demo");
//! network.add_bus(Bus::new("1004", 9.0, 53.0)).unwrap();
//! network.add_bus(Bus::new("1005", 10.0, 54.0)).unwrap();
//! network
//!     .add_line(Line::new("L1", "1004", "1005").with_s_nom(100.0))
//!     .unwrap();
//! network
//!     .add_generator(Generator::new("1004 solar", "1004", "solar").with_p_nom(46.0))
//!     .unwrap();
//!
//! assert_eq!(network.bus_count(), 2);
//! assert_eq!(network.lines().count(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`timeseries`] - [`Snapshot`] and the [`SnapshotFrame`] table
//! - [`units`] - unit newtypes for tooltips and bearings
//! - [`error`] - [`CopperError`] / [`CopperResult`]

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};

pub mod error;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod timeseries;
pub mod units;

pub use error::{CopperError, CopperResult};
pub use timeseries::{Snapshot, SnapshotFrame};
pub use units::{Degrees, Megawatts, Radians};

/// A network node with a geographic position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    pub name: String,
    /// Longitude in degrees
    pub x: f64,
    /// Latitude in degrees
    pub y: f64,
    /// Nominal voltage in kV
    pub v_nom: Option<f64>,
    pub carrier: Option<String>,
}

impl Bus {
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            v_nom: None,
            carrier: None,
        }
    }

    pub fn with_v_nom(mut self, v_nom: f64) -> Self {
        self.v_nom = Some(v_nom);
        self
    }
}

/// AC transmission line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub name: String,
    pub bus0: String,
    pub bus1: String,
    /// Nominal apparent power rating in MVA
    pub s_nom: f64,
    /// Optimised rating, when the model was expanded
    pub s_nom_opt: Option<f64>,
}

impl Line {
    pub fn new(name: impl Into<String>, bus0: impl Into<String>, bus1: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bus0: bus0.into(),
            bus1: bus1.into(),
            s_nom: 0.0,
            s_nom_opt: None,
        }
    }

    pub fn with_s_nom(mut self, s_nom: f64) -> Self {
        self.s_nom = s_nom;
        self
    }

    pub fn with_s_nom_opt(mut self, s_nom_opt: f64) -> Self {
        self.s_nom_opt = Some(s_nom_opt);
        self
    }
}

/// Controllable point-to-point link (HVDC, converters).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub bus0: String,
    pub bus1: String,
    /// Nominal active power rating in MW
    pub p_nom: f64,
    pub p_nom_opt: Option<f64>,
    pub carrier: Option<String>,
}

impl Link {
    pub fn new(name: impl Into<String>, bus0: impl Into<String>, bus1: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bus0: bus0.into(),
            bus1: bus1.into(),
            p_nom: 0.0,
            p_nom_opt: None,
            carrier: None,
        }
    }

    pub fn with_p_nom(mut self, p_nom: f64) -> Self {
        self.p_nom = p_nom;
        self
    }

    pub fn with_p_nom_opt(mut self, p_nom_opt: f64) -> Self {
        self.p_nom_opt = Some(p_nom_opt);
        self
    }

    pub fn with_carrier(mut self, carrier: impl Into<String>) -> Self {
        self.carrier = Some(carrier.into());
        self
    }
}

/// Which kind of branch an edge is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchKind {
    Line,
    Link,
}

impl fmt::Display for BranchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchKind::Line => write!(f, "Line"),
            BranchKind::Link => write!(f, "Link"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Edge {
    Line(Line),
    Link(Link),
}

impl Edge {
    pub fn name(&self) -> &str {
        match self {
            Edge::Line(line) => &line.name,
            Edge::Link(link) => &link.name,
        }
    }

    pub fn bus0(&self) -> &str {
        match self {
            Edge::Line(line) => &line.bus0,
            Edge::Link(link) => &link.bus0,
        }
    }

    pub fn bus1(&self) -> &str {
        match self {
            Edge::Line(line) => &line.bus1,
            Edge::Link(link) => &link.bus1,
        }
    }

    pub fn kind(&self) -> BranchKind {
        match self {
            Edge::Line(_) => BranchKind::Line,
            Edge::Link(_) => BranchKind::Link,
        }
    }

    /// Rating used for loading: optimised capacity first, nominal otherwise.
    /// Non-positive ratings count as unknown.
    pub fn capacity(&self) -> Option<f64> {
        let rating = match self {
            Edge::Line(line) => line.s_nom_opt.unwrap_or(line.s_nom),
            Edge::Link(link) => link.p_nom_opt.unwrap_or(link.p_nom),
        };
        (rating > 0.0).then_some(rating)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generator {
    pub name: String,
    pub bus: String,
    pub carrier: String,
    /// Nominal capacity in MW
    pub p_nom: f64,
    /// Optimised capacity in MW
    pub p_nom_opt: Option<f64>,
    /// Static per-unit availability, used when no time series exists
    pub p_max_pu: f64,
}

impl Generator {
    pub fn new(
        name: impl Into<String>,
        bus: impl Into<String>,
        carrier: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            bus: bus.into(),
            carrier: carrier.into(),
            p_nom: 0.0,
            p_nom_opt: None,
            p_max_pu: 1.0,
        }
    }

    pub fn with_p_nom(mut self, p_nom: f64) -> Self {
        self.p_nom = p_nom;
        self
    }

    pub fn with_p_nom_opt(mut self, p_nom_opt: f64) -> Self {
        self.p_nom_opt = Some(p_nom_opt);
        self
    }

    pub fn with_p_max_pu(mut self, p_max_pu: f64) -> Self {
        self.p_max_pu = p_max_pu;
        self
    }

    /// Optimised capacity, falling back to the nominal one.
    pub fn capacity(&self) -> f64 {
        self.p_nom_opt.unwrap_or(self.p_nom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Load {
    pub name: String,
    pub bus: String,
}

impl Load {
    pub fn new(name: impl Into<String>, bus: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bus: bus.into(),
        }
    }
}

/// Energy carrier metadata (technology display names and colors).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Carrier {
    pub name: String,
    pub nice_name: Option<String>,
    pub color: Option<String>,
}

impl Carrier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nice_name: None,
            color: None,
        }
    }

    pub fn with_nice_name(mut self, nice_name: impl Into<String>) -> Self {
        self.nice_name = Some(nice_name.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct BusSeries {
    /// Net active power injection per bus
    pub p: SnapshotFrame,
    pub marginal_price: SnapshotFrame,
}

#[derive(Debug, Clone, Default)]
pub struct GeneratorSeries {
    /// Dispatch per generator
    pub p: SnapshotFrame,
    /// Per-unit availability of variable generators
    pub p_max_pu: SnapshotFrame,
}

#[derive(Debug, Clone, Default)]
pub struct LoadSeries {
    pub p: SnapshotFrame,
    pub p_set: SnapshotFrame,
}

#[derive(Debug, Clone, Default)]
pub struct BranchSeries {
    /// Active power entering the branch at bus0
    pub p0: SnapshotFrame,
}

/// A solved network.
#[derive(Debug, Clone, Default)]
pub struct Network {
    pub name: String,
    pub graph: UnGraph<Bus, Edge>,
    pub generators: Vec<Generator>,
    pub loads: Vec<Load>,
    pub carriers: BTreeMap<String, Carrier>,
    snapshots: Vec<Snapshot>,
    pub buses_t: BusSeries,
    pub generators_t: GeneratorSeries,
    pub loads_t: LoadSeries,
    pub lines_t: BranchSeries,
    pub links_t: BranchSeries,
    bus_lookup: HashMap<String, NodeIndex>,
    generator_lookup: HashMap<String, usize>,
    snapshot_lookup: HashMap<Snapshot, usize>,
}

impl Network {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add_bus(&mut self, bus: Bus) -> CopperResult<NodeIndex> {
        if self.bus_lookup.contains_key(&bus.name) {
            return Err(CopperError::Network(format!(
                "duplicate bus '{}'",
                bus.name
            )));
        }
        let name = bus.name.clone();
        let idx = self.graph.add_node(bus);
        self.bus_lookup.insert(name, idx);
        Ok(idx)
    }

    pub fn add_line(&mut self, line: Line) -> CopperResult<EdgeIndex> {
        self.add_edge(Edge::Line(line))
    }

    pub fn add_link(&mut self, link: Link) -> CopperResult<EdgeIndex> {
        self.add_edge(Edge::Link(link))
    }

    fn add_edge(&mut self, edge: Edge) -> CopperResult<EdgeIndex> {
        let from = self.require_bus(edge.bus0(), edge.name())?;
        let to = self.require_bus(edge.bus1(), edge.name())?;
        Ok(self.graph.add_edge(from, to, edge))
    }

    fn require_bus(&self, bus: &str, element: &str) -> CopperResult<NodeIndex> {
        self.bus_index(bus).ok_or_else(|| {
            CopperError::Network(format!("{element} references unknown bus '{bus}'"))
        })
    }

    pub fn add_generator(&mut self, generator: Generator) -> CopperResult<()> {
        self.require_bus(&generator.bus, &generator.name)?;
        if self.generator_lookup.contains_key(&generator.name) {
            return Err(CopperError::Network(format!(
                "duplicate generator '{}'",
                generator.name
            )));
        }
        self.generator_lookup
            .insert(generator.name.clone(), self.generators.len());
        self.generators.push(generator);
        Ok(())
    }

    pub fn add_load(&mut self, load: Load) -> CopperResult<()> {
        self.require_bus(&load.bus, &load.name)?;
        self.loads.push(load);
        Ok(())
    }

    pub fn add_carrier(&mut self, carrier: Carrier) {
        self.carriers.insert(carrier.name.clone(), carrier);
    }

    pub fn bus_index(&self, name: &str) -> Option<NodeIndex> {
        self.bus_lookup.get(name).copied()
    }

    pub fn bus(&self, name: &str) -> Option<&Bus> {
        self.bus_index(name).map(|idx| &self.graph[idx])
    }

    pub fn bus_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Buses ordered by name.
    pub fn buses(&self) -> Vec<&Bus> {
        let mut buses: Vec<&Bus> = self.graph.node_weights().collect();
        buses.sort_by(|a, b| a.name.cmp(&b.name));
        buses
    }

    /// Bus names in sorted order.
    pub fn bus_names(&self) -> Vec<String> {
        self.buses().into_iter().map(|b| b.name.clone()).collect()
    }

    pub fn branches(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.graph.edge_weights()
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> + '_ {
        self.branches().filter_map(|edge| match edge {
            Edge::Line(line) => Some(line),
            Edge::Link(_) => None,
        })
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> + '_ {
        self.branches().filter_map(|edge| match edge {
            Edge::Link(link) => Some(link),
            Edge::Line(_) => None,
        })
    }

    pub fn generator(&self, name: &str) -> Option<&Generator> {
        self.generator_lookup
            .get(name)
            .map(|&idx| &self.generators[idx])
    }

    /// Display label for a carrier: its nice name when known.
    pub fn carrier_label(&self, carrier: &str) -> String {
        self.carriers
            .get(carrier)
            .and_then(|c| c.nice_name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| carrier.to_string())
    }

    /// Solved snapshots in order.
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn set_snapshots(&mut self, snapshots: Vec<Snapshot>) {
        self.snapshot_lookup = timeseries::snapshot_lookup(&snapshots);
        self.snapshots = snapshots;
    }

    pub fn snapshot_position(&self, snapshot: &Snapshot) -> Option<usize> {
        self.snapshot_lookup.get(snapshot).copied()
    }

    /// Time series for one branch kind.
    pub fn branch_series(&self, kind: BranchKind) -> &BranchSeries {
        match kind {
            BranchKind::Line => &self.lines_t,
            BranchKind::Link => &self.links_t,
        }
    }
}
