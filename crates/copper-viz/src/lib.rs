//! # copper-viz: network map figures
//!
//! Builds interactive map figures of a solved network for plotly.js:
//!
//! - [`figure`] - serializable figure model (traces, layout, sliders)
//! - [`geo`] - great-circle midpoints and bearings for flow arrows
//! - [`power_flow`] - figure builders, one trace group per snapshot
//! - [`dashboard`] - map view and self-contained HTML page
//!
//! ```rust,ignore
//! let figure = copper_viz::net_power_figure(&network)?;
//! let page = Dashboard::new(&figure, network.snapshots(), DashboardOptions::default())?;
//! std::fs::write("map.html", page.render_html()?)?;
//! ```

pub mod dashboard;
pub mod figure;
pub mod geo;
pub mod power_flow;

pub use dashboard::{Dashboard, DashboardOptions, MapView};
pub use figure::Figure;
pub use geo::{bearing, midpoint, GeoPoint};
pub use power_flow::{
    colored_network_figure, colored_network_figure_for_mode, create_traces, edge_coordinates,
    net_power_figure, show_snapshot,
};
