//! Risk gauge: a dial over 0–10 with green, amber and red bands.
//!
//! `render_gauge` is a pure function of the score. The result serialises to a
//! Plotly indicator figure that the dashboard draws in the browser.

use serde::Serialize;
use serde_json::{json, Value};

pub const GAUGE_MIN: f64 = 0.0;
pub const GAUGE_MAX: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Green,
    Amber,
    Red,
}

impl Band {
    pub fn color(&self) -> &'static str {
        match self {
            Band::Green => "#00cc44",
            Band::Amber => "#ffcc00",
            Band::Red   => "#ff4444",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Band::Green => "Low risk",
            Band::Amber => "Elevated risk",
            Band::Red   => "High risk",
        }
    }

    /// Lower bounds are inclusive: 3 is amber, 7 is red.
    pub fn for_value(value: f64) -> Self {
        if value < 3.0 {
            Band::Green
        } else if value < 7.0 {
            Band::Amber
        } else {
            Band::Red
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeStep {
    pub range: [f64; 2],
    pub band: Band,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeSpec {
    pub title: &'static str,
    pub value: f64,
    pub axis_range: [f64; 2],
    pub steps: Vec<GaugeStep>,
    pub bar_color: &'static str,
    pub height: u32,
}

pub fn render_gauge(score: f64) -> GaugeSpec {
    let step = |lo: f64, hi: f64, band: Band| GaugeStep { range: [lo, hi], band, color: band.color() };
    GaugeSpec {
        title: "Risk Level",
        value: score,
        axis_range: [GAUGE_MIN, GAUGE_MAX],
        steps: vec![
            step(0.0, 3.0, Band::Green),
            step(3.0, 7.0, Band::Amber),
            step(7.0, 10.0, Band::Red),
        ],
        bar_color: "black",
        height: 250,
    }
}

impl GaugeSpec {
    pub fn band(&self) -> Band {
        Band::for_value(self.value)
    }

    /// Bar position on the dial. Values past either end are pinned to it.
    pub fn clipped_value(&self) -> f64 {
        self.value.clamp(self.axis_range[0], self.axis_range[1])
    }

    /// Plotly `indicator` figure (`{data, layout}`) in "gauge+number" mode.
    /// The readout shows the raw value; only the bar is clipped by the axis.
    pub fn to_plotly(&self) -> Value {
        let steps: Vec<Value> = self
            .steps
            .iter()
            .map(|s| json!({ "range": s.range, "color": s.color }))
            .collect();

        json!({
            "data": [{
                "type": "indicator",
                "mode": "gauge+number",
                "value": self.value,
                "title": { "text": self.title, "font": { "size": 18 } },
                "gauge": {
                    "axis": { "range": self.axis_range },
                    "steps": steps,
                    "bar": { "color": self.bar_color }
                }
            }],
            "layout": {
                "height": self.height,
                "margin": { "l": 20, "r": 20, "t": 40, "b": 20 }
            }
        })
    }
}
