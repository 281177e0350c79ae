//! Figure builders for network maps.
//!
//! Every builder emits one group of traces per snapshot plus a slider whose
//! steps show exactly one group. Only the first group starts visible.

use copper_algo::{
    branch_flows, net_power, node_values, remove_extremes, symmetric_color_range, BranchFlow,
    DisplayMode, NetworkSnapshot, NodeInfo,
};
use copper_core::{BranchKind, Bus, CopperError, CopperResult, Megawatts, Network, SnapshotFrame};
use tracing::{debug, info};

use crate::figure::{
    ColorBar, Figure, Layout, LineStyle, Mapbox, Margin, Marker, MarkerColor, MarkerSize, SizeMode,
    Slider, Trace, TraceMode,
};
use crate::geo::{bearing, midpoint, GeoPoint};

/// Traces per snapshot in [`colored_network_figure`]: edges, nodes.
pub const COLORED_GROUP_SIZE: usize = 2;
/// Traces per snapshot in [`net_power_figure`]: lines, links, loading, arrows, nodes.
pub const NET_POWER_GROUP_SIZE: usize = 5;

const DEFAULT_MAP_STYLE: &str = "open-street-map";
/// Largest node marker diameter in pixels on the net power map.
const MAX_NODE_SIZE_PX: f64 = 40.0;
/// Icon symbols ignore per-point colors, so arrows draw in one color on top
/// of circles that carry the loading.
const ARROW_COLOR: &str = "#333";
const ARROW_SIZE_PX: f64 = 8.0;
const LOADING_SIZE_PX: f64 = 14.0;

/// Flattened `[bus0, bus1, null]` coordinates of every branch of `kind`.
pub fn edge_coordinates(
    network: &Network,
    kind: BranchKind,
) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let mut lon = Vec::new();
    let mut lat = Vec::new();
    for edge in network.branches().filter(|edge| edge.kind() == kind) {
        let (Some(from), Some(to)) = (network.bus(edge.bus0()), network.bus(edge.bus1())) else {
            continue;
        };
        lon.extend([Some(from.x), Some(to.x), None]);
        lat.extend([Some(from.y), Some(to.y), None]);
    }
    (lon, lat)
}

/// Node marker trace and edge line trace for one snapshot, both hidden.
pub fn create_traces(
    nodes_lon: &[f64],
    nodes_lat: &[f64],
    edges_lon: &[Option<f64>],
    edges_lat: &[Option<f64>],
    node_values: &[Option<f64>],
) -> (Trace, Trace) {
    let mut edge_trace = Trace::scattermapbox(TraceMode::Lines);
    edge_trace.lon = edges_lon.to_vec();
    edge_trace.lat = edges_lat.to_vec();
    edge_trace.line = Some(LineStyle {
        width: 0.5,
        color: "#888".into(),
    });
    edge_trace.hoverinfo = Some("none".into());
    edge_trace.visible = false;

    let mut node_trace = Trace::scattermapbox(TraceMode::Markers);
    node_trace.lon = nodes_lon.iter().copied().map(Some).collect();
    node_trace.lat = nodes_lat.iter().copied().map(Some).collect();
    node_trace.hoverinfo = Some("text".into());
    node_trace.visible = false;
    node_trace.text = Some(
        node_values
            .iter()
            .map(|v| v.map(|v| format!("{v:.2}")).unwrap_or_default())
            .collect(),
    );
    node_trace.marker = Some(Marker {
        showscale: Some(true),
        colorscale: Some("YlGnBu".into()),
        reversescale: Some(false),
        color: Some(MarkerColor::PerPoint(node_values.to_vec())),
        size: Some(MarkerSize::Fixed(7.0)),
        colorbar: Some(ColorBar::titled("Node Connections")),
        ..Marker::default()
    });

    (node_trace, edge_trace)
}

fn base_layout() -> Layout {
    Layout {
        showlegend: Some(false),
        hovermode: Some("closest".into()),
        margin: Some(Margin::zero()),
        mapbox: Mapbox {
            style: Some(DEFAULT_MAP_STYLE.into()),
            ..Mapbox::default()
        },
        ..Layout::default()
    }
}

/// Colors buses by a per-bus table, one snapshot per slider step.
///
/// Extremes are removed from the table first. Only buses that are columns of
/// the table are drawn; edges are the network's lines.
pub fn colored_network_figure(network: &Network, values: &SnapshotFrame) -> CopperResult<Figure> {
    colored_figure(network, values, "Node Connections")
}

/// [`colored_network_figure`] for a named quantity. Net power gets the flow map.
pub fn colored_network_figure_for_mode(
    network: &Network,
    mode: DisplayMode,
    technology: Option<&str>,
) -> CopperResult<Figure> {
    if mode == DisplayMode::NetPower {
        return net_power_figure(network);
    }
    let values = node_values(network, mode, technology);
    let title = format!("{} [{}]", mode.title(), mode.unit());
    colored_figure(network, &values, &title)
}

fn colored_figure(
    network: &Network,
    values: &SnapshotFrame,
    colorbar_title: &str,
) -> CopperResult<Figure> {
    require_snapshots(network)?;
    let values = remove_extremes(values);

    let buses: Vec<&Bus> = values
        .columns()
        .iter()
        .filter_map(|column| network.bus(column))
        .collect();
    let nodes_lon: Vec<f64> = buses.iter().map(|bus| bus.x).collect();
    let nodes_lat: Vec<f64> = buses.iter().map(|bus| bus.y).collect();
    let (edges_lon, edges_lat) = edge_coordinates(network, BranchKind::Line);
    debug!(
        "coloring {} of {} buses over {} snapshots",
        buses.len(),
        network.bus_count(),
        network.snapshots().len()
    );

    let mut figure = Figure::new(base_layout());
    for snapshot in network.snapshots() {
        let row: Vec<Option<f64>> = buses
            .iter()
            .map(|bus| values.value(snapshot, &bus.name))
            .collect();
        let (mut node_trace, edge_trace) =
            create_traces(&nodes_lon, &nodes_lat, &edges_lon, &edges_lat, &row);
        if let Some(ColorBar { title, .. }) =
            node_trace.marker.as_mut().and_then(|m| m.colorbar.as_mut())
        {
            title.text = colorbar_title.to_string();
        }
        figure.add_traces([edge_trace, node_trace]);
    }
    finish(figure, network, COLORED_GROUP_SIZE)
}

/// Net power map: branch lines, flow arrows and buses sized by net power.
///
/// Per snapshot the traces are, in order, lines, links, loading circles and
/// flow arrows at the branch midpoints, then bus markers. Bus color is the net power on a
/// zero-centred scale, marker area is its magnitude.
pub fn net_power_figure(network: &Network) -> CopperResult<Figure> {
    require_snapshots(network)?;
    let net = net_power(network);
    let buses = network.buses();
    let nodes_lon: Vec<Option<f64>> = buses.iter().map(|bus| Some(bus.x)).collect();
    let nodes_lat: Vec<Option<f64>> = buses.iter().map(|bus| Some(bus.y)).collect();

    let (lines_lon, lines_lat) = edge_coordinates(network, BranchKind::Line);
    let (links_lon, links_lat) = edge_coordinates(network, BranchKind::Link);

    let color_range = symmetric_color_range(net.present_values());
    let max_abs = net.present_values().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let sizeref = if max_abs > 0.0 {
        2.0 * max_abs / MAX_NODE_SIZE_PX.powi(2)
    } else {
        1.0
    };

    let mut figure = Figure::new(base_layout());
    for (position, snapshot) in network.snapshots().iter().enumerate() {
        let state = NetworkSnapshot::at(network, position)?;
        let flows = branch_flows(network, snapshot)?;

        let lines = line_trace("Lines", &lines_lon, &lines_lat, "#888", 1.0);
        let links = line_trace("Links", &links_lon, &links_lat, "#6a3d9a", 1.5);
        let (loading, arrows) = flow_traces(network, &flows);

        let power: Vec<Option<f64>> = buses
            .iter()
            .map(|bus| net.value(snapshot, &bus.name))
            .collect();
        let text: Vec<String> = buses
            .iter()
            .zip(&power)
            .map(|(bus, p)| node_tooltip(bus, state.node_info(&bus.name), *p))
            .collect();

        let mut nodes = Trace::scattermapbox(TraceMode::Markers);
        nodes.name = Some("Buses".into());
        nodes.lon = nodes_lon.clone();
        nodes.lat = nodes_lat.clone();
        nodes.hoverinfo = Some("text".into());
        nodes.text = Some(text);
        nodes.visible = false;
        nodes.marker = Some(Marker {
            color: Some(MarkerColor::PerPoint(power.clone())),
            size: Some(MarkerSize::PerPoint(
                power.iter().map(|p| p.map(f64::abs)).collect(),
            )),
            sizemode: Some(SizeMode::Area),
            sizeref: Some(sizeref),
            sizemin: Some(3.0),
            colorscale: Some("RdBu".into()),
            showscale: Some(true),
            cmin: color_range.map(|r| r.cmin),
            cmax: color_range.map(|r| r.cmax),
            cmid: color_range.is_none().then_some(0.0),
            colorbar: Some(ColorBar::titled("Net power [MW]")),
            ..Marker::default()
        });

        figure.add_traces([lines, links, loading, arrows, nodes]);
    }
    finish(figure, network, NET_POWER_GROUP_SIZE)
}

fn line_trace(
    name: &str,
    lon: &[Option<f64>],
    lat: &[Option<f64>],
    color: &str,
    width: f64,
) -> Trace {
    let mut trace = Trace::scattermapbox(TraceMode::Lines);
    trace.name = Some(name.into());
    trace.lon = lon.to_vec();
    trace.lat = lat.to_vec();
    trace.line = Some(LineStyle {
        width,
        color: color.into(),
    });
    trace.hoverinfo = Some("none".into());
    trace.visible = false;
    trace
}

/// Loading circles and direction triangles at the branch midpoints.
///
/// The circles are colored by loading percent and carry the tooltips. The
/// triangles point along the flow.
fn flow_traces(network: &Network, flows: &[BranchFlow]) -> (Trace, Trace) {
    let mut loading = Trace::scattermapbox(TraceMode::Markers);
    loading.name = Some("Loading".into());
    loading.hoverinfo = Some("text".into());
    loading.visible = false;

    let mut arrows = Trace::scattermapbox(TraceMode::Markers);
    arrows.name = Some("Flow".into());
    arrows.hoverinfo = Some("skip".into());
    arrows.visible = false;

    let mut angles = Vec::with_capacity(flows.len());
    let mut colors = Vec::with_capacity(flows.len());
    let mut text = Vec::with_capacity(flows.len());
    for flow in flows {
        let (Some(from), Some(to)) = (network.bus(&flow.bus0), network.bus(&flow.bus1)) else {
            continue;
        };
        let (from, to) = if flow.flows_forward() {
            (GeoPoint::from(from), GeoPoint::from(to))
        } else {
            (GeoPoint::from(to), GeoPoint::from(from))
        };
        let center = midpoint(from, to);
        for trace in [&mut loading, &mut arrows] {
            trace.lon.push(Some(center.lon));
            trace.lat.push(Some(center.lat));
        }
        angles.push(bearing(from, to).value());
        colors.push(flow.loading_percent());
        text.push(flow_tooltip(flow));
    }

    loading.text = Some(text);
    loading.marker = Some(Marker {
        symbol: Some("circle".into()),
        size: Some(MarkerSize::Fixed(LOADING_SIZE_PX)),
        color: Some(MarkerColor::PerPoint(colors)),
        colorscale: Some("YlOrRd".into()),
        cmin: Some(0.0),
        cmax: Some(100.0),
        showscale: Some(false),
        ..Marker::default()
    });
    arrows.marker = Some(Marker {
        symbol: Some("triangle".into()),
        angle: Some(angles),
        allowoverlap: Some(true),
        size: Some(MarkerSize::Fixed(ARROW_SIZE_PX)),
        color: Some(MarkerColor::Fixed(ARROW_COLOR.into())),
        ..Marker::default()
    });
    (loading, arrows)
}

fn flow_tooltip(flow: &BranchFlow) -> String {
    let (from, to) = if flow.flows_forward() {
        (&flow.bus0, &flow.bus1)
    } else {
        (&flow.bus1, &flow.bus0)
    };
    let mut text = format!("<b>{} {}</b><br>", flow.kind, flow.name);
    match flow.p0 {
        Some(p0) => text.push_str(&format!("Flow: {} ({from} → {to})", Megawatts(p0.abs()))),
        None => text.push_str("Flow: n/a"),
    }
    if let Some(loading) = flow.loading_percent() {
        text.push_str(&format!("<br>Loading: {loading:.1} %"));
    }
    text
}

fn node_tooltip(bus: &Bus, info: Option<&NodeInfo>, net: Option<f64>) -> String {
    let mut text = format!("<b>Bus {}</b><br>", bus.name);
    if let Some(info) = info {
        if let Some(load) = info.load {
            text.push_str(&format!("Load: {}<br>", load.p));
        }
        for (carrier, generator) in &info.generators {
            text.push_str(&format!(
                "{carrier}: {:.2} / {}<br>",
                generator.p.value(),
                generator.p_max
            ));
        }
    }
    let net = net
        .map(Megawatts)
        .or_else(|| info.map(NodeInfo::net_power))
        .unwrap_or_default();
    text.push_str(&format!("<b>= Net power: {net}</b>"));
    text
}

fn require_snapshots(network: &Network) -> CopperResult<()> {
    if network.snapshots().is_empty() {
        return Err(CopperError::MissingData(format!(
            "network {} has no snapshots",
            network.name
        )));
    }
    Ok(())
}

/// Adds the snapshot slider and shows the first trace group.
fn finish(mut figure: Figure, network: &Network, group_size: usize) -> CopperResult<Figure> {
    let labels = network.snapshots().iter().map(|s| s.to_string());
    figure.layout.sliders = vec![Slider::visibility_steps(labels, group_size)];
    figure.select_step(0)?;
    info!(
        "built figure with {} traces over {} snapshots",
        figure.data.len(),
        network.snapshots().len()
    );
    Ok(figure)
}

/// Copy of `figure` showing only the traces of snapshot `index`.
pub fn show_snapshot(figure: &Figure, index: usize) -> CopperResult<Figure> {
    let mut shown = figure.clone();
    shown.select_step(index)?;
    Ok(shown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use copper_core::fixtures::{grid, three_bus};

    fn marker_values(trace: &Trace) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
        let marker = trace.marker.as_ref().unwrap();
        let color = match marker.color.as_ref().unwrap() {
            MarkerColor::PerPoint(values) => values.clone(),
            MarkerColor::Fixed(_) => panic!("expected per-point colors"),
        };
        let size = match marker.size.as_ref().unwrap() {
            MarkerSize::PerPoint(values) => values.clone(),
            MarkerSize::Fixed(_) => panic!("expected per-point sizes"),
        };
        (color, size)
    }

    #[test]
    fn net_power_nodes_match_bus_injections() {
        let network = three_bus();
        let figure = net_power_figure(&network).unwrap();

        let nodes = &figure.data[4];
        let (color, size) = marker_values(nodes);
        let expected: Vec<Option<f64>> = network
            .buses_t
            .p
            .reindex_columns(&network.bus_names())
            .row_values(0)
            .to_vec();
        assert_eq!(color, expected);
        assert_eq!(
            size,
            expected.iter().map(|p| p.map(f64::abs)).collect::<Vec<_>>()
        );
        assert!((color[0].unwrap() + 59.50).abs() < 0.01);

        let first_tooltip = &nodes.text.as_ref().unwrap()[0];
        assert!(
            first_tooltip.contains("<b>= Net power: -59.50 MW</b>"),
            "{first_tooltip}"
        );
        assert!(first_tooltip.contains("Load: 59.50 MW"));

        let ccgt_tooltip = &nodes.text.as_ref().unwrap()[2];
        assert!(
            ccgt_tooltip.contains("Combined-Cycle Gas: 40.00 / 476.00 MW"),
            "{ccgt_tooltip}"
        );
        let wind_tooltip = &nodes.text.as_ref().unwrap()[1];
        assert!(wind_tooltip.contains("Onshore Wind: 1.56 / "), "{wind_tooltip}");
    }

    #[test]
    fn net_power_figure_has_five_traces_per_snapshot() {
        let network = three_bus();
        let figure = net_power_figure(&network).unwrap();
        assert_eq!(figure.data.len(), 3 * NET_POWER_GROUP_SIZE);
        assert_eq!(figure.visible_traces(), vec![0, 1, 2, 3, 4]);
        let names: Vec<_> = figure.data[..NET_POWER_GROUP_SIZE]
            .iter()
            .map(|trace| trace.name.as_deref())
            .collect();
        assert_eq!(
            names,
            [Some("Lines"), Some("Links"), Some("Loading"), Some("Flow"), Some("Buses")]
        );
        let slider = figure.slider().unwrap();
        assert_eq!(slider.steps.len(), 3);
        assert_eq!(slider.steps[1].label, "2013-01-01 02:00:00");
        assert_eq!(figure.layout.mapbox.style.as_deref(), Some("open-street-map"));
    }

    #[test]
    fn arrows_point_along_the_flow() {
        let network = three_bus();
        let figure = net_power_figure(&network).unwrap();
        let arrows = &figure.data[3];
        let marker = arrows.marker.as_ref().unwrap();
        let angles = marker.angle.as_ref().unwrap();
        assert_eq!(angles.len(), 3);
        // L1 1004 -> 1005 carries -30 MW, so the arrow points from 1005 (NE) back to 1004
        assert!((180.0..270.0).contains(&angles[0]), "{angles:?}");
        assert_eq!(marker.symbol.as_deref(), Some("triangle"));
        assert_eq!(marker.color, Some(MarkerColor::Fixed(ARROW_COLOR.into())));
    }

    #[test]
    fn loading_circles_carry_colors_and_tooltips() {
        let network = three_bus();
        let figure = net_power_figure(&network).unwrap();
        let (loading, arrows) = (&figure.data[2], &figure.data[3]);
        assert_eq!(loading.lon, arrows.lon);
        assert_eq!(loading.lat, arrows.lat);

        let marker = loading.marker.as_ref().unwrap();
        assert_eq!(marker.symbol.as_deref(), Some("circle"));
        assert_eq!((marker.cmin, marker.cmax), (Some(0.0), Some(100.0)));
        let flows = branch_flows(&network, &network.snapshots()[0]).unwrap();
        let expected: Vec<Option<f64>> = flows.iter().map(BranchFlow::loading_percent).collect();
        assert_eq!(marker.color, Some(MarkerColor::PerPoint(expected)));

        let text = loading.text.as_ref().unwrap();
        assert!(text[0].contains("Flow: 30.00 MW (1005 → 1004)"), "{}", text[0]);
        assert!(text[1].contains("Loading: 50.0 %"));
        assert_eq!(arrows.hoverinfo.as_deref(), Some("skip"));
    }

    #[test]
    fn colored_figure_limits_nodes_to_table_columns() {
        let network = three_bus();
        let wind = node_values(&network, DisplayMode::Generation, Some("wind"));
        let figure = colored_network_figure(&network, &wind).unwrap();
        assert_eq!(figure.data.len(), 3 * COLORED_GROUP_SIZE);
        assert_eq!(figure.visible_traces(), vec![0, 1]);

        let edges = &figure.data[0];
        assert_eq!(edges.mode, TraceMode::Lines);
        assert_eq!(edges.len(), 6);

        let nodes = &figure.data[1];
        assert_eq!(nodes.lon, vec![Some(10.0)]);
        assert_eq!(figure.layout.margin, Some(Margin::zero()));
    }

    #[test]
    fn colored_figure_drops_extremes() {
        let network = three_bus();
        let figure =
            colored_network_figure_for_mode(&network, DisplayMode::MarginalPrice, None).unwrap();
        // snapshot 1 nodes; 1208 at 1000 EUR/MWh is outside the fences
        let marker = figure.data[3].marker.as_ref().unwrap();
        assert_eq!(
            marker.color,
            Some(MarkerColor::PerPoint(vec![Some(45.0), Some(50.0), None]))
        );
        let colorbar = figure.data[3].marker.as_ref().unwrap().colorbar.as_ref().unwrap();
        assert_eq!(colorbar.title.text, "Marginal price [EUR/MWh]");
    }

    #[test]
    fn net_power_mode_builds_flow_map() {
        let network = three_bus();
        let figure =
            colored_network_figure_for_mode(&network, DisplayMode::NetPower, None).unwrap();
        assert_eq!(figure.data.len(), 3 * NET_POWER_GROUP_SIZE);
    }

    #[test]
    fn show_snapshot_switches_the_visible_group() {
        let network = three_bus();
        let figure = net_power_figure(&network).unwrap();
        let shown = show_snapshot(&figure, 2).unwrap();
        assert_eq!(shown.visible_traces(), vec![10, 11, 12, 13, 14]);
        assert_eq!(shown.slider().unwrap().active, 2);
        assert_eq!(figure.visible_traces(), vec![0, 1, 2, 3, 4]);
        assert!(show_snapshot(&figure, 3).is_err());
    }

    #[test]
    fn long_horizons_keep_groups_aligned_with_snapshots() {
        let network = grid(2, 2, 500);
        let figure = net_power_figure(&network).unwrap();
        assert_eq!(figure.data.len(), 500 * NET_POWER_GROUP_SIZE);

        let last = &figure.data[499 * NET_POWER_GROUP_SIZE + 4];
        let (color, _) = marker_values(last);
        let expected = network.buses_t.p.reindex_columns(&network.bus_names());
        assert_eq!(color, expected.row_values(499).to_vec());
    }

    #[test]
    fn network_without_snapshots_is_an_error() {
        let mut network = three_bus();
        network.set_snapshots(Vec::new());
        assert!(net_power_figure(&network).is_err());
    }
}
