//! Self-contained dashboard page around a map figure.
//!
//! The page draws the figure with plotly.js. Its built-in slider, relabelled
//! with snapshot times, switches the visible trace group in the browser.

use copper_core::{CopperError, CopperResult, Snapshot};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::figure::{Center, Figure};
use crate::power_flow::show_snapshot;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.27.0.min.js";

/// Camera and tiles of the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub style: String,
    pub center: Center,
    pub zoom: f64,
    pub pitch: f64,
    /// Needed by Mapbox-hosted styles only
    pub access_token: Option<String>,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            style: "open-street-map".into(),
            center: Center { lat: 53.0, lon: 9.0 },
            zoom: 3.9,
            pitch: 60.0,
            access_token: None,
        }
    }
}

impl MapView {
    pub fn apply(&self, figure: &mut Figure) {
        let mapbox = &mut figure.layout.mapbox;
        mapbox.style = Some(self.style.clone());
        mapbox.center = Some(self.center);
        mapbox.zoom = Some(self.zoom);
        mapbox.pitch = Some(self.pitch);
        mapbox.accesstoken = self.access_token.clone();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardOptions {
    pub title: String,
    pub view: MapView,
    /// Snapshot shown when the page opens
    pub initial_snapshot: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            title: "Copper Sushi".into(),
            view: MapView::default(),
            initial_snapshot: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub title: String,
    pub figure: Figure,
}

impl Dashboard {
    pub fn new(
        figure: &Figure,
        snapshots: &[Snapshot],
        options: DashboardOptions,
    ) -> CopperResult<Self> {
        let mut figure = show_snapshot(figure, options.initial_snapshot)?;
        let slider = figure
            .layout
            .sliders
            .first_mut()
            .ok_or_else(|| CopperError::MissingData("figure has no snapshot slider".into()))?;
        if slider.steps.len() != snapshots.len() {
            return Err(CopperError::Validation(format!(
                "figure has {} slider steps for {} snapshots",
                slider.steps.len(),
                snapshots.len()
            )));
        }
        for (step, snapshot) in slider.steps.iter_mut().zip(snapshots) {
            step.label = snapshot.time_label();
        }
        options.view.apply(&mut figure);
        figure.layout.autosize = Some(true);
        Ok(Self {
            title: options.title,
            figure,
        })
    }

    pub fn render_html(&self) -> CopperResult<String> {
        let figure = self.figure.to_json()?.replace("</", "<\\/");
        let title = escape_html(&self.title);
        debug!("rendering dashboard page with {} bytes of figure JSON", figure.len());
        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{PLOTLY_CDN}"></script>
<style>body {{ margin: 0; background: #222; color: #eee; font-family: sans-serif; }}</style>
</head>
<body>
<div id="map" style="height: 90vh;"></div>
<script>
const figure = {figure};
Plotly.newPlot("map", figure.data, figure.layout, {{"responsive": true, "displayModeBar": false}});
</script>
</body>
</html>
"#
        ))
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
