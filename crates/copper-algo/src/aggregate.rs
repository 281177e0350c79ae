//! Bus-level aggregation of generator and load tables.

use std::collections::HashMap;

use copper_core::{Network, SnapshotFrame};
use tracing::{debug, warn};

/// Sums a per-generator table by the generators' buses.
///
/// With `technology`, only generator columns whose name contains that
/// substring are kept first, so `"wind"` collects both `onwind` and
/// `offwind-ac` generators. Columns naming unknown generators are dropped
/// with a warning.
pub fn sum_generators_t_attribute_by_bus(
    network: &Network,
    attribute: &SnapshotFrame,
    technology: Option<&str>,
) -> SnapshotFrame {
    let selected = match technology {
        Some(tech) => attribute.select_columns(|name| name.contains(tech)),
        None => attribute.clone(),
    };
    selected.group_columns_sum(|name| match network.generator(name) {
        Some(generator) => Some(generator.bus.clone()),
        None => {
            warn!("dropping column for unknown generator '{name}'");
            None
        }
    })
}

/// Dispatch summed by bus.
pub fn generation_by_bus(network: &Network, technology: Option<&str>) -> SnapshotFrame {
    sum_generators_t_attribute_by_bus(network, &network.generators_t.p, technology)
}

/// Curtailed share of available capacity in percent, summed by bus.
///
/// Per generator and snapshot: `usage = p / (p_max_pu * p_nom) * 100`
/// rounded to two decimals, `curtailed = 100 - usage`. Generators without an
/// availability series and zero available capacity leave the cell missing,
/// so they add nothing to their bus.
pub fn curtailed_power(network: &Network, technology: Option<&str>) -> SnapshotFrame {
    let dispatch = &network.generators_t.p;
    let availability = &network.generators_t.p_max_pu;
    let availability_rows: Vec<Option<usize>> = dispatch
        .snapshots()
        .iter()
        .map(|s| availability.snapshot_position(s))
        .collect();

    let mut curtailed =
        SnapshotFrame::new(dispatch.snapshots().to_vec(), dispatch.columns().to_vec());
    for (col, name) in dispatch.columns().iter().enumerate() {
        let Some(generator) = network.generator(name) else {
            continue;
        };
        let Some(availability_col) = availability.column_position(name) else {
            continue;
        };
        for (row, availability_row) in availability_rows.iter().enumerate() {
            let (Some(p), Some(p_max_pu)) = (
                dispatch.get(row, col),
                availability_row.and_then(|r| availability.get(r, availability_col)),
            ) else {
                continue;
            };
            let available = p_max_pu * generator.p_nom;
            if available == 0.0 || !available.is_finite() {
                continue;
            }
            let usage = round2(p / available * 100.0);
            curtailed.set(row, col, Some(100.0 - usage));
        }
    }
    sum_generators_t_attribute_by_bus(network, &curtailed, technology)
}

/// Load set points summed by bus.
pub fn load_by_bus(network: &Network) -> SnapshotFrame {
    sum_loads_by_bus(network, &network.loads_t.p_set)
}

fn sum_loads_by_bus(network: &Network, frame: &SnapshotFrame) -> SnapshotFrame {
    let buses: HashMap<&str, &str> = network
        .loads
        .iter()
        .map(|load| (load.name.as_str(), load.bus.as_str()))
        .collect();
    frame.group_columns_sum(|name| buses.get(name).map(|bus| bus.to_string()))
}

/// Net active power per bus, columns in bus-name order.
///
/// Uses the solved bus injections when the network carries them. Otherwise
/// it is derived as generation minus load over `network.snapshots()`, counting
/// missing contributions as zero.
pub fn net_power(network: &Network) -> SnapshotFrame {
    let buses = network.bus_names();
    if !network.buses_t.p.is_empty() {
        return network.buses_t.p.reindex_columns(&buses);
    }

    debug!("no solved bus injections, deriving net power from generation and load");
    let generation = generation_by_bus(network, None);
    let load_source = if network.loads_t.p.is_empty() {
        &network.loads_t.p_set
    } else {
        &network.loads_t.p
    };
    let load = sum_loads_by_bus(network, load_source);

    let mut out = SnapshotFrame::new(network.snapshots().to_vec(), buses.clone());
    for (row, snapshot) in network.snapshots().iter().enumerate() {
        for (col, bus) in buses.iter().enumerate() {
            let g = generation.value(snapshot, bus).unwrap_or(0.0);
            let l = load.value(snapshot, bus).unwrap_or(0.0);
            out.set(row, col, Some(g - l));
        }
    }
    out
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use copper_core::fixtures::three_bus;
    use copper_core::Load;

    #[test]
    fn generation_groups_by_bus() {
        let network = three_bus();
        let generation = generation_by_bus(&network, None);
        assert_eq!(generation.columns(), &["1004", "1005", "1208"]);
        assert!((generation.get(0, 1).unwrap() - 1.578451).abs() < 1e-9);
        assert_eq!(generation.get(0, 2), Some(40.0));
    }

    #[test]
    fn technology_filter_matches_substrings() {
        let network = three_bus();
        let wind = generation_by_bus(&network, Some("wind"));
        assert_eq!(wind.columns(), &["1005"]);
        assert!((wind.get(1, 0).unwrap() - (2.965762 + 0.032157)).abs() < 1e-9);

        let none = generation_by_bus(&network, Some("nuclear"));
        assert_eq!(none.width(), 0);
    }

    #[test]
    fn curtailment_uses_rounded_usage() {
        let network = three_bus();
        let curtailed = curtailed_power(&network, None);
        // 13 / (0.5 * 46) * 100 = 56.52 -> 43.48 curtailed
        assert!((curtailed.value_at(2, "1004").unwrap() - 43.48).abs() < 1e-9);
        // onwind 111.11 -> -11.11, offwind 100.0 -> 0.0
        assert!((curtailed.value_at(2, "1005").unwrap() + 11.11).abs() < 1e-9);
    }

    #[test]
    fn curtailment_ignores_generators_without_availability_series() {
        let network = three_bus();
        assert!(network.generators_t.p_max_pu.column_position("1208 CCGT").is_none());
        let curtailed = curtailed_power(&network, None);
        // the CCGT dispatches below nameplate but is never counted as curtailed
        for row in 0..curtailed.height() {
            assert_eq!(curtailed.value_at(row, "1208"), Some(0.0));
        }
    }

    #[test]
    fn unknown_generator_columns_are_dropped() {
        let network = three_bus();
        let mut dispatch = network.generators_t.p.clone();
        let mut columns = dispatch.columns().to_vec();
        columns.push("ghost".to_string());
        dispatch = dispatch.reindex_columns(&columns);
        let by_bus = sum_generators_t_attribute_by_bus(&network, &dispatch, None);
        assert_eq!(by_bus.columns(), &["1004", "1005", "1208"]);
    }

    #[test]
    fn curtailment_skips_zero_availability() {
        let network = three_bus();
        let by_generator = curtailed_power(&network, Some("solar"));
        // solar at night has p_max_pu = 0, so the group has nothing to sum
        assert_eq!(by_generator.value_at(0, "1004"), Some(0.0));
        assert_eq!(by_generator.width(), 1);
    }

    #[test]
    fn curtailment_filters_by_technology() {
        let network = three_bus();
        let wind = curtailed_power(&network, Some("wind"));
        assert_eq!(wind.columns(), &["1005"]);
        assert!((wind.value_at(2, "1005").unwrap() + 11.11).abs() < 1e-9);
    }

    #[test]
    fn load_sums_every_load_on_a_bus() {
        let mut network = three_bus();
        network.add_load(Load::new("1004 extra", "1004")).unwrap();
        let mut p_set = network.loads_t.p_set.reindex_columns(&[
            "1004".to_string(),
            "1005".to_string(),
            "1208".to_string(),
            "1004 extra".to_string(),
        ]);
        p_set.set(0, 3, Some(0.5));
        network.loads_t.p_set = p_set;

        let load = load_by_bus(&network);
        assert_eq!(load.value_at(0, "1004"), Some(60.0));
        assert_eq!(load.value_at(1, "1004"), Some(86.04));
    }

    #[test]
    fn net_power_prefers_solved_injections() {
        let network = three_bus();
        let net = net_power(&network);
        assert_eq!(net.columns(), &["1004", "1005", "1208"]);
        assert_eq!(net.get(0, 0), Some(-59.5));
    }

    #[test]
    fn net_power_is_derived_without_injections() {
        let mut network = three_bus();
        let solved = network.buses_t.p.clone();
        network.buses_t.p = SnapshotFrame::default();
        let derived = net_power(&network);
        for row in 0..solved.height() {
            for col in 0..solved.width() {
                let (a, b) = (solved.get(row, col).unwrap(), derived.get(row, col).unwrap());
                assert!((a - b).abs() < 1e-6, "row {row} col {col}: {a} != {b}");
            }
        }
    }
}
