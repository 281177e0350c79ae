//! Per-bus summaries of one snapshot.
//!
//! [`NetworkSnapshot`] collects, for a single snapshot, the load at each bus
//! and every generator's dispatch and availability, then folds them into one
//! [`NodeInfo`] per bus. Node tooltips on the map are rendered from these.

use std::collections::{BTreeMap, HashMap};

use copper_core::{CopperError, CopperResult, Megawatts, Network, Snapshot};
use serde::Serialize;
use tracing::debug;

/// Maps a carrier to the technology group shown in grouped summaries.
///
/// Carriers outside the table land in `"other"`.
pub fn carrier_group(carrier: &str) -> &'static str {
    match carrier {
        "coal" | "CCGT" | "OCGT" | "oil" | "lignite" => "fossil",
        "nuclear" => "nuclear",
        "geothermal" => "geothermal",
        "biomass" => "biomass",
        "hydro" | "PHS" | "ror" => "hydro",
        "offwind-ac" | "offwind-dc" | "onwind" => "wind",
        "solar" => "solar",
        _ => "other",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoadInfo {
    pub p: Megawatts,
}

/// Dispatch and availability of one generator (or a group of them).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeneratorInfo {
    pub p: Megawatts,
    pub p_max_pu: f64,
    pub p_nom_opt: Megawatts,
    /// Available capacity: `p_max_pu * p_nom_opt`
    pub p_max: Megawatts,
}

impl GeneratorInfo {
    pub fn new(p: Megawatts, p_max_pu: f64, p_nom_opt: Megawatts) -> Self {
        Self {
            p,
            p_max_pu,
            p_nom_opt,
            p_max: p_nom_opt * p_max_pu,
        }
    }

    /// Sums two entries; `p_max_pu` is recomputed from the summed capacities.
    pub fn merge(self, other: GeneratorInfo) -> GeneratorInfo {
        let p_nom_opt = self.p_nom_opt + other.p_nom_opt;
        let p_max = self.p_max + other.p_max;
        let p_max_pu = if p_nom_opt.value() > 0.0 {
            p_max / p_nom_opt
        } else {
            0.0
        };
        GeneratorInfo {
            p: self.p + other.p,
            p_max_pu,
            p_nom_opt,
            p_max,
        }
    }
}

/// Load and generation at one bus.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeInfo {
    pub load: Option<LoadInfo>,
    /// Generators keyed by carrier label (or carrier group)
    pub generators: BTreeMap<String, GeneratorInfo>,
}

impl NodeInfo {
    pub fn generation(&self) -> Megawatts {
        self.generators.values().map(|g| g.p).sum()
    }

    pub fn load_p(&self) -> Megawatts {
        self.load.map(|l| l.p).unwrap_or_default()
    }

    /// Generation minus load.
    pub fn net_power(&self) -> Megawatts {
        self.generation() - self.load_p()
    }
}

/// One generator's row at a snapshot, before grouping by bus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratorRow {
    pub name: String,
    pub bus: String,
    pub carrier: String,
    pub info: GeneratorInfo,
}

#[derive(Debug, Clone)]
pub struct NetworkSnapshot {
    pub snapshot: Snapshot,
    /// Load per bus
    pub loads: BTreeMap<String, LoadInfo>,
    pub generators: Vec<GeneratorRow>,
    /// One entry per bus with a load or a generator
    pub node_infos: BTreeMap<String, NodeInfo>,
}

impl NetworkSnapshot {
    pub fn new(network: &Network, snapshot: &Snapshot) -> CopperResult<Self> {
        if network.snapshot_position(snapshot).is_none() {
            return Err(CopperError::MissingData(format!(
                "snapshot {snapshot} is not part of network {}",
                network.name
            )));
        }
        let loads = Self::loads(network, snapshot);
        let generators = Self::generators(network, snapshot);
        let node_infos = Self::to_node_infos(network, &loads, &generators);
        Ok(Self {
            snapshot: *snapshot,
            loads,
            generators,
            node_infos,
        })
    }

    /// Snapshot by its position in `network.snapshots()`.
    pub fn at(network: &Network, position: usize) -> CopperResult<Self> {
        let snapshot = network.snapshots().get(position).ok_or_else(|| {
            CopperError::MissingData(format!(
                "snapshot index {position} out of range (network has {})",
                network.snapshots().len()
            ))
        })?;
        Self::new(network, snapshot)
    }

    pub fn node_info(&self, bus: &str) -> Option<&NodeInfo> {
        self.node_infos.get(bus)
    }

    fn loads(network: &Network, snapshot: &Snapshot) -> BTreeMap<String, LoadInfo> {
        let mut by_bus: BTreeMap<String, LoadInfo> = BTreeMap::new();
        for load in &network.loads {
            let p = network
                .loads_t
                .p
                .value(snapshot, &load.name)
                .or_else(|| network.loads_t.p_set.value(snapshot, &load.name));
            let Some(p) = p else {
                debug!("load {} has no value at {snapshot}", load.name);
                continue;
            };
            by_bus
                .entry(load.bus.clone())
                .and_modify(|info| info.p = info.p + Megawatts(p))
                .or_insert(LoadInfo { p: Megawatts(p) });
        }
        by_bus
    }

    fn generators(network: &Network, snapshot: &Snapshot) -> Vec<GeneratorRow> {
        network
            .generators
            .iter()
            .map(|generator| {
                let p = network
                    .generators_t
                    .p
                    .value(snapshot, &generator.name)
                    .unwrap_or(0.0);
                let p_max_pu = network
                    .generators_t
                    .p_max_pu
                    .value(snapshot, &generator.name)
                    .unwrap_or(generator.p_max_pu);
                GeneratorRow {
                    name: generator.name.clone(),
                    bus: generator.bus.clone(),
                    carrier: generator.carrier.clone(),
                    info: GeneratorInfo::new(
                        Megawatts(p),
                        p_max_pu,
                        Megawatts(generator.capacity()),
                    ),
                }
            })
            .collect()
    }

    fn to_node_infos(
        network: &Network,
        loads: &BTreeMap<String, LoadInfo>,
        generators: &[GeneratorRow],
    ) -> BTreeMap<String, NodeInfo> {
        let mut nodes: BTreeMap<String, NodeInfo> = loads
            .iter()
            .map(|(bus, load)| {
                (
                    bus.clone(),
                    NodeInfo {
                        load: Some(*load),
                        generators: BTreeMap::new(),
                    },
                )
            })
            .collect();
        let mut labels: HashMap<&str, String> = HashMap::new();
        for row in generators {
            let label = labels
                .entry(row.carrier.as_str())
                .or_insert_with(|| network.carrier_label(&row.carrier))
                .clone();
            insert_merged(
                &mut nodes.entry(row.bus.clone()).or_default().generators,
                label,
                row.info,
            );
        }
        nodes
    }

    /// Generators per bus regrouped by [`carrier_group`].
    pub fn generators_by_carrier_group(&self) -> BTreeMap<String, BTreeMap<String, GeneratorInfo>> {
        let mut grouped: BTreeMap<String, BTreeMap<String, GeneratorInfo>> = BTreeMap::new();
        for row in &self.generators {
            insert_merged(
                grouped.entry(row.bus.clone()).or_default(),
                carrier_group(&row.carrier).to_string(),
                row.info,
            );
        }
        grouped
    }

    /// Node infos with generators keyed by carrier group instead of carrier.
    pub fn grouped_node_infos(&self) -> BTreeMap<String, NodeInfo> {
        let mut grouped = self.generators_by_carrier_group();
        let mut buses: Vec<String> = self.node_infos.keys().cloned().collect();
        buses.extend(grouped.keys().cloned());
        buses.sort();
        buses.dedup();
        buses
            .into_iter()
            .map(|bus| {
                let info = NodeInfo {
                    load: self.loads.get(&bus).copied(),
                    generators: grouped.remove(&bus).unwrap_or_default(),
                };
                (bus, info)
            })
            .collect()
    }
}

fn insert_merged(map: &mut BTreeMap<String, GeneratorInfo>, key: String, info: GeneratorInfo) {
    match map.get_mut(&key) {
        Some(existing) => *existing = existing.merge(info),
        None => {
            map.insert(key, info);
        }
    }
}
