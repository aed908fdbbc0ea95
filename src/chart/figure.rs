// =============================================================================
// Declarative figure model
// =============================================================================
//
// Serialises to the JSON shape plotly.js accepts in `Plotly.react(el, data,
// layout)`: `{ "data": [traces...], "layout": {...} }`. Only the attributes the
// dashboard uses are modelled; unset options are omitted from the output.
// =============================================================================

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

// =============================================================================
// Traces
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Candlestick(CandlestickTrace),
    Scatter(ScatterTrace),
    Bar(BarTrace),
}

impl Trace {
    pub fn name(&self) -> &str {
        match self {
            Self::Candlestick(t) => &t.name,
            Self::Scatter(t) => &t.name,
            Self::Bar(t) => &t.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandlestickTrace {
    pub name: String,
    pub x: Vec<String>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub xaxis: &'static str,
    pub yaxis: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterTrace {
    pub name: String,
    pub x: Vec<String>,
    /// `None` renders as a gap.
    pub y: Vec<Option<f64>>,
    pub mode: &'static str,
    pub line: Line,
    pub xaxis: &'static str,
    pub yaxis: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarTrace {
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<Option<f64>>,
    pub marker: Marker,
    pub xaxis: &'static str,
    pub yaxis: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub color: &'static str,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub color: MarkerColor,
}

/// One colour for every bar, or one per bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MarkerColor {
    Single(&'static str),
    PerPoint(Vec<&'static str>),
}

// =============================================================================
// Layout
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub showlegend: bool,
    pub margin: Margin,
    pub xaxis: Axis,
    pub xaxis2: Axis,
    pub xaxis3: Axis,
    /// Price.
    pub yaxis: Axis,
    /// Volume, overlaid on the price panel.
    pub yaxis2: Axis,
    /// MACD.
    pub yaxis3: Axis,
    /// RSI.
    pub yaxis4: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<&'static str>,
    /// Id of the axis whose range this one follows (`"x"` keeps the panels
    /// in step when zooming).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlaying: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<AxisTitle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showgrid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showticklabels: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rangeslider: Option<RangeSlider>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTitle {
    pub text: &'static str,
}

impl AxisTitle {
    pub fn new(text: &'static str) -> Option<Self> {
        Some(Self { text })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSlider {
    pub visible: bool,
}

/// Vertical domains of stacked subplot rows, top row first.
///
/// `heights` are relative; they are scaled to fill the unit interval minus
/// `spacing` between adjacent rows.
pub fn row_domains(heights: &[f64], spacing: f64) -> Vec<[f64; 2]> {
    let total: f64 = heights.iter().sum();
    if heights.is_empty() || total <= 0.0 {
        return Vec::new();
    }
    let usable = 1.0 - spacing * (heights.len() - 1) as f64;

    let mut top = 1.0_f64;
    let mut domains = Vec::with_capacity(heights.len());
    for (i, h) in heights.iter().enumerate() {
        let bottom = if i + 1 == heights.len() {
            0.0
        } else {
            top - usable * h / total
        };
        domains.push([bottom, top]);
        top = bottom - spacing;
    }
    domains
}
