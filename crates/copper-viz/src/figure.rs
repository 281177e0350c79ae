//! Map figures in the plotly.js JSON schema.
//!
//! Only the parts of the schema the map builders emit are modelled. Every
//! optional attribute is skipped when unset so plotly.js applies its own
//! defaults. A [`Figure`] serializes to exactly the `{"data": [...],
//! "layout": {...}}` object that `Plotly.newPlot` accepts.

use copper_core::{CopperError, CopperResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    pub fn new(layout: Layout) -> Self {
        Self {
            data: Vec::new(),
            layout,
        }
    }

    pub fn add_traces(&mut self, traces: impl IntoIterator<Item = Trace>) {
        self.data.extend(traces);
    }

    /// Indices of the traces currently shown.
    pub fn visible_traces(&self) -> Vec<usize> {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, trace)| trace.visible)
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn slider(&self) -> Option<&Slider> {
        self.layout.sliders.first()
    }

    pub fn to_json(&self) -> CopperResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> CopperResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Applies slider step `index`: its visibility list and the active step.
    pub fn select_step(&mut self, index: usize) -> CopperResult<()> {
        let slider = self
            .layout
            .sliders
            .first_mut()
            .ok_or_else(|| CopperError::MissingData("figure has no slider".into()))?;
        let step = slider.steps.get(index).ok_or_else(|| {
            CopperError::Validation(format!(
                "snapshot index {index} out of range (figure has {} steps)",
                slider.steps.len()
            ))
        })?;
        let visible = &step.args[0].visible;
        if visible.len() != self.data.len() {
            return Err(CopperError::Validation(format!(
                "slider step {index} toggles {} traces but figure has {}",
                visible.len(),
                self.data.len()
            )));
        }
        for (trace, &shown) in self.data.iter_mut().zip(visible) {
            trace.visible = shown;
        }
        slider.active = index;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceMode {
    Lines,
    Markers,
    #[serde(rename = "lines+markers")]
    LinesAndMarkers,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `None` entries break a line into segments
    pub lon: Vec<Option<f64>>,
    pub lat: Vec<Option<f64>>,
    pub mode: TraceMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoverinfo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
}

impl Trace {
    pub fn scattermapbox(mode: TraceMode) -> Self {
        Self {
            kind: "scattermapbox",
            name: None,
            lon: Vec::new(),
            lat: Vec::new(),
            mode,
            hoverinfo: None,
            text: None,
            visible: true,
            line: None,
            marker: None,
            showlegend: None,
        }
    }

    pub fn len(&self) -> usize {
        self.lon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lon.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub width: f64,
    pub color: String,
}

/// A single value for all points, or one per point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MarkerColor {
    Fixed(String),
    PerPoint(Vec<Option<f64>>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MarkerSize {
    Fixed(f64),
    PerPoint(Vec<Option<f64>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeMode {
    Diameter,
    Area,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Marker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<MarkerColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<MarkerSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorscale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reversescale: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showscale: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmax: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmid: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizemode: Option<SizeMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizeref: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizemin: Option<f64>,
    /// Map icon name, e.g. `"triangle"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Icon rotation per point, degrees clockwise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowoverlap: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorbar: Option<ColorBar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorBar {
    pub thickness: f64,
    pub title: ColorBarTitle,
    pub xanchor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
}

impl ColorBar {
    pub fn titled(text: impl Into<String>) -> Self {
        Self {
            thickness: 15.0,
            title: ColorBarTitle {
                text: text.into(),
                side: "right".into(),
            },
            xanchor: "left".into(),
            x: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorBarTitle {
    pub text: String,
    pub side: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovermode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autosize: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
    pub mapbox: Mapbox,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sliders: Vec<Slider>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Margin {
    pub l: f64,
    pub r: f64,
    pub t: f64,
    pub b: f64,
}

impl Margin {
    pub fn zero() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Mapbox {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<Center>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accesstoken: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slider {
    pub active: usize,
    pub currentvalue: CurrentValue,
    pub pad: Pad,
    pub steps: Vec<SliderStep>,
}

impl Slider {
    /// One step per label, step `i` showing traces
    /// `i * group_size .. (i + 1) * group_size` and hiding the rest.
    pub fn visibility_steps(labels: impl IntoIterator<Item = String>, group_size: usize) -> Self {
        let labels: Vec<String> = labels.into_iter().collect();
        let total = labels.len() * group_size;
        let steps = labels
            .into_iter()
            .enumerate()
            .map(|(i, label)| {
                let mut visible = vec![false; total];
                visible[i * group_size..(i + 1) * group_size].fill(true);
                SliderStep {
                    label,
                    method: "update".into(),
                    args: [VisibilityUpdate { visible }],
                }
            })
            .collect();
        Self {
            active: 0,
            currentvalue: CurrentValue {
                prefix: "Snapshot: ".into(),
            },
            pad: Pad { t: 50.0 },
            steps,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentValue {
    pub prefix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pad {
    pub t: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliderStep {
    pub label: String,
    pub method: String,
    pub args: [VisibilityUpdate; 1],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibilityUpdate {
    pub visible: Vec<bool>,
}
