// =============================================================================
// Chart Renderer — enriched table + MACD to a three-panel figure
// =============================================================================
//
//   row 1 (0.80): candlesticks, MA20, MA7, volume bars on a right-hand axis
//   row 2 (0.20): MACD histogram, MACD line, signal line
//   row 3 (0.15): RSI
//
// All x axes follow `x`, so zooming one panel moves the others. An empty
// table yields the same layout with empty traces.
// =============================================================================

use tracing::debug;

use super::figure::{
    row_domains, Axis, AxisTitle, BarTrace, CandlestickTrace, Figure, Layout, Line, Margin,
    Marker, MarkerColor, RangeSlider, ScatterTrace, Trace,
};
use crate::indicators::MacdSeries;
use crate::market_data::CandleTable;

/// Relative panel heights, top to bottom.
pub const ROW_HEIGHTS: [f64; 3] = [0.8, 0.2, 0.15];
pub const VERTICAL_SPACING: f64 = 0.01;

/// The volume axis is stretched to this multiple of the largest bar so the
/// bars stay low under the candles.
pub const VOLUME_HEADROOM: f64 = 5.0;

const MA20_COLOR: &str = "#ff9900";
const MA7_COLOR: &str = "#1f77b4";
const MACD_COLOR: &str = "#2962ff";
const SIGNAL_COLOR: &str = "#ff6d00";
const HISTOGRAM_COLOR: &str = "#9e9e9e";
const RSI_COLOR: &str = "#7e57c2";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Assemble the dashboard figure.
pub fn render_chart(table: &CandleTable, macd: &MacdSeries) -> Figure {
    let rows = table.rows();
    let x: Vec<String> = rows
        .iter()
        .map(|r| r.timestamp.format(TIME_FORMAT).to_string())
        .collect();

    let data = vec![
        Trace::Candlestick(CandlestickTrace {
            name: "Price".into(),
            x: x.clone(),
            open: rows.iter().map(|r| r.open).collect(),
            high: rows.iter().map(|r| r.high).collect(),
            low: rows.iter().map(|r| r.low).collect(),
            close: rows.iter().map(|r| r.close).collect(),
            xaxis: "x",
            yaxis: "y",
        }),
        line_trace("MA20", &x, rows.iter().map(|r| r.ma20).collect(), MA20_COLOR, "x", "y"),
        line_trace("MA7", &x, rows.iter().map(|r| r.ma7).collect(), MA7_COLOR, "x", "y"),
        Trace::Bar(BarTrace {
            name: "Volume".into(),
            x: x.clone(),
            y: rows.iter().map(|r| Some(r.volume)).collect(),
            marker: Marker {
                color: MarkerColor::PerPoint(rows.iter().map(|r| r.color.as_str()).collect()),
            },
            xaxis: "x",
            yaxis: "y2",
        }),
        Trace::Bar(BarTrace {
            name: "Histogram".into(),
            x: x.clone(),
            y: fit(&macd.histogram, rows.len()),
            marker: Marker {
                color: MarkerColor::Single(HISTOGRAM_COLOR),
            },
            xaxis: "x2",
            yaxis: "y3",
        }),
        line_trace("MACD", &x, fit(&macd.macd, rows.len()), MACD_COLOR, "x2", "y3"),
        line_trace("Signal", &x, fit(&macd.signal, rows.len()), SIGNAL_COLOR, "x2", "y3"),
        line_trace(
            "RSI",
            &x,
            rows.iter().map(|r| r.rsi).collect(),
            RSI_COLOR,
            "x3",
            "y4",
        ),
    ];

    let figure = Figure {
        data,
        layout: layout(table.max_volume()),
    };
    debug!(
        rows = rows.len(),
        traces = ?figure.data.iter().map(Trace::name).collect::<Vec<_>>(),
        "figure rendered"
    );
    figure
}

/// Upper bound of the volume axis, `None` when there is no volume to scale.
pub fn volume_axis_max(max_volume: Option<f64>) -> Option<f64> {
    max_volume.map(|v| v * VOLUME_HEADROOM)
}

/// Pad or cut an indicator column to `len` rows, so a MACD set computed for a
/// different table cannot misalign the panels.
fn fit(col: &[Option<f64>], len: usize) -> Vec<Option<f64>> {
    (0..len).map(|i| col.get(i).copied().flatten()).collect()
}

fn line_trace(
    name: &str,
    x: &[String],
    y: Vec<Option<f64>>,
    color: &'static str,
    xaxis: &'static str,
    yaxis: &'static str,
) -> Trace {
    Trace::Scatter(ScatterTrace {
        name: name.to_string(),
        x: x.to_vec(),
        y,
        mode: "lines",
        line: Line { color, width: 1.5 },
        xaxis,
        yaxis,
    })
}

fn layout(max_volume: Option<f64>) -> Layout {
    let domains = row_domains(&ROW_HEIGHTS, VERTICAL_SPACING);
    let (price, macd, rsi) = (domains[0], domains[1], domains[2]);

    Layout {
        showlegend: false,
        margin: Margin {
            l: 50,
            r: 50,
            t: 20,
            b: 30,
        },
        xaxis: Axis {
            anchor: Some("y"),
            showticklabels: Some(false),
            rangeslider: Some(RangeSlider { visible: false }),
            ..Axis::default()
        },
        xaxis2: Axis {
            anchor: Some("y3"),
            matches: Some("x"),
            showticklabels: Some(false),
            ..Axis::default()
        },
        xaxis3: Axis {
            anchor: Some("y4"),
            matches: Some("x"),
            ..Axis::default()
        },
        yaxis: Axis {
            domain: Some(price),
            anchor: Some("x"),
            title: AxisTitle::new("Price"),
            ..Axis::default()
        },
        yaxis2: Axis {
            anchor: Some("x"),
            overlaying: Some("y"),
            side: Some("right"),
            title: AxisTitle::new("Volume"),
            range: volume_axis_max(max_volume).map(|hi| [0.0, hi]),
            showgrid: Some(false),
            ..Axis::default()
        },
        yaxis3: Axis {
            domain: Some(macd),
            anchor: Some("x2"),
            title: AxisTitle::new("MACD"),
            showgrid: Some(false),
            ..Axis::default()
        },
        yaxis4: Axis {
            domain: Some(rsi),
            anchor: Some("x3"),
            title: AxisTitle::new("RSI"),
            ..Axis::default()
        },
    }
}
