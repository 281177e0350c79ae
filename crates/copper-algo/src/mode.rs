//! The quantities a node map can be colored by.

use std::fmt;
use std::str::FromStr;

use copper_core::{CopperError, Network, SnapshotFrame};
use serde::{Deserialize, Serialize};

use crate::aggregate::{curtailed_power, generation_by_bus, load_by_bus, net_power};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    Load,
    Generation,
    Curtailment,
    MarginalPrice,
    NetPower,
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 5] = [
        DisplayMode::Load,
        DisplayMode::Generation,
        DisplayMode::Curtailment,
        DisplayMode::MarginalPrice,
        DisplayMode::NetPower,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Load => "load",
            DisplayMode::Generation => "generation",
            DisplayMode::Curtailment => "curtailment",
            DisplayMode::MarginalPrice => "marginal_price",
            DisplayMode::NetPower => "net_power",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            DisplayMode::Curtailment => "%",
            DisplayMode::MarginalPrice => "EUR/MWh",
            _ => "MW",
        }
    }

    /// Title shown on the node colorbar.
    pub fn title(&self) -> &'static str {
        match self {
            DisplayMode::Load => "Load",
            DisplayMode::Generation => "Generation",
            DisplayMode::Curtailment => "Curtailment",
            DisplayMode::MarginalPrice => "Marginal price",
            DisplayMode::NetPower => "Net power",
        }
    }

    /// Whether a technology filter narrows this mode's table.
    pub fn uses_technology(&self) -> bool {
        matches!(self, DisplayMode::Generation | DisplayMode::Curtailment)
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayMode {
    type Err = CopperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        DisplayMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| CopperError::UnknownMode(s.to_string()))
    }
}

/// Per-bus table for `mode`. `technology` only applies to generation and
/// curtailment.
pub fn node_values(
    network: &Network,
    mode: DisplayMode,
    technology: Option<&str>,
) -> SnapshotFrame {
    match mode {
        DisplayMode::Load => load_by_bus(network),
        DisplayMode::Generation => generation_by_bus(network, technology),
        DisplayMode::Curtailment => curtailed_power(network, technology),
        DisplayMode::MarginalPrice => network.buses_t.marginal_price.clone(),
        DisplayMode::NetPower => net_power(network),
    }
}
