//! # copper-algo: per-snapshot network analytics
//!
//! Turns the raw tables of a solved [`copper_core::Network`] into the values
//! the map colors and annotates:
//!
//! - [`snapshot`] - per-bus load and generator summaries at one snapshot
//! - [`aggregate`] - generator attributes summed by bus, curtailment, net power
//! - [`loading`] - branch loading and congestion
//! - [`stats`] - quantiles and interquartile fences for color scales
//! - [`mode`] - the named quantities a map can be colored by
//!
//! Nothing here solves power flow; every number is derived from the solved
//! model by aggregation.

pub mod aggregate;
pub mod loading;
pub mod mode;
pub mod snapshot;
pub mod stats;

pub use aggregate::{
    curtailed_power, generation_by_bus, load_by_bus, net_power, sum_generators_t_attribute_by_bus,
};
pub use loading::{branch_flows, congested_branches, BranchFlow, DEFAULT_CONGESTION_THRESHOLD};
pub use mode::{node_values, DisplayMode};
pub use snapshot::{carrier_group, GeneratorInfo, GeneratorRow, LoadInfo, NetworkSnapshot, NodeInfo};
pub use stats::{quantile, remove_extremes, symmetric_color_range, ColorRange, Fences};
