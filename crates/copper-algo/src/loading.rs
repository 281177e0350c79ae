//! Branch loading and congestion at a snapshot.

use copper_core::{BranchKind, CopperError, CopperResult, Network, Snapshot};
use serde::Serialize;

/// Loading at or above which a branch counts as congested.
pub const DEFAULT_CONGESTION_THRESHOLD: f64 = 0.99;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchFlow {
    pub name: String,
    pub kind: BranchKind,
    pub bus0: String,
    pub bus1: String,
    /// Active power entering at `bus0`; negative means flow towards `bus0`
    pub p0: Option<f64>,
    pub capacity: Option<f64>,
    /// `|p0| / capacity`
    pub loading: Option<f64>,
}

impl BranchFlow {
    pub fn loading_percent(&self) -> Option<f64> {
        self.loading.map(|l| l * 100.0)
    }

    pub fn is_congested(&self, threshold: f64) -> bool {
        self.loading.map(|l| l >= threshold).unwrap_or(false)
    }

    /// Flow runs from `bus0` to `bus1`. Unknown flow counts as forward.
    pub fn flows_forward(&self) -> bool {
        self.p0.map(|p| p >= 0.0).unwrap_or(true)
    }
}

/// Flow and loading of every line and link at `snapshot`, in graph order.
pub fn branch_flows(network: &Network, snapshot: &Snapshot) -> CopperResult<Vec<BranchFlow>> {
    if network.snapshot_position(snapshot).is_none() {
        return Err(CopperError::MissingData(format!(
            "snapshot {snapshot} is not part of network {}",
            network.name
        )));
    }
    let flows = network
        .branches()
        .map(|edge| {
            let p0 = network
                .branch_series(edge.kind())
                .p0
                .value(snapshot, edge.name());
            let capacity = edge.capacity();
            let loading = match (p0, capacity) {
                (Some(p), Some(c)) => Some(p.abs() / c),
                _ => None,
            };
            BranchFlow {
                name: edge.name().to_string(),
                kind: edge.kind(),
                bus0: edge.bus0().to_string(),
                bus1: edge.bus1().to_string(),
                p0,
                capacity,
                loading,
            }
        })
        .collect();
    Ok(flows)
}

/// Branches whose loading reaches `threshold` at `snapshot`.
pub fn congested_branches(
    network: &Network,
    snapshot: &Snapshot,
    threshold: f64,
) -> CopperResult<Vec<BranchFlow>> {
    Ok(branch_flows(network, snapshot)?
        .into_iter()
        .filter(|flow| flow.is_congested(threshold))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use copper_core::fixtures::three_bus;

    #[test]
    fn loading_is_flow_over_capacity() {
        let network = three_bus();
        let flows = branch_flows(&network, &network.snapshots()[0]).unwrap();
        assert_eq!(flows.len(), 3);
        let l2 = flows.iter().find(|f| f.name == "L2").unwrap();
        assert_eq!(l2.kind, BranchKind::Line);
        assert_eq!(l2.loading, Some(0.5));
        assert_eq!(l2.loading_percent(), Some(50.0));

        let k1 = flows.iter().find(|f| f.name == "K1").unwrap();
        assert_eq!(k1.kind, BranchKind::Link);
        assert_eq!(k1.loading, Some(0.5));
        assert!(!k1.flows_forward());
    }

    #[test]
    fn congestion_uses_threshold() {
        let network = three_bus();
        let snapshot = network.snapshots()[1];
        let congested =
            congested_branches(&network, &snapshot, DEFAULT_CONGESTION_THRESHOLD).unwrap();
        let names: Vec<&str> = congested.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(congested.len(), 3, "{names:?}");

        let strict = congested_branches(&network, &snapshot, 1.0).unwrap();
        assert_eq!(strict.len(), 2);
        assert!(strict.iter().all(|f| f.name != "L1"));
    }

    #[test]
    fn missing_flow_has_no_loading() {
        let mut network = three_bus();
        network.links_t.p0 = Default::default();
        let flows = branch_flows(&network, &network.snapshots()[0]).unwrap();
        let k1 = flows.iter().find(|f| f.name == "K1").unwrap();
        assert_eq!(k1.p0, None);
        assert_eq!(k1.loading, None);
        assert!(!k1.is_congested(0.0));
    }

    #[test]
    fn unknown_snapshot_is_an_error() {
        let network = three_bus();
        let other: Snapshot = "1999-01-01 00:00:00".parse().unwrap();
        assert!(branch_flows(&network, &other).is_err());
    }
}
