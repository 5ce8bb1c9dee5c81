//! Chart description: the declarative value handed to a rendering surface.
//!
//! A [`ChartSpec`] is plain data. It never refers back to the dataset it was
//! built from, serializes to JSON as-is, and two descriptions built from the
//! same inputs compare equal.

use serde::Serialize;

/// A fully assembled chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub series: Vec<Series>,
    pub layout: Layout,
    /// Non-fatal conditions found while aggregating (empty regions, ...)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ChartSpec {
    pub fn bars(&self) -> impl Iterator<Item = &BarSeries> {
        self.series.iter().filter_map(|s| match s {
            Series::Bar(b) => Some(b),
            _ => None,
        })
    }

    pub fn heatmap(&self) -> Option<&HeatmapSeries> {
        self.series.iter().find_map(|s| match s {
            Series::Heatmap(h) => Some(h),
            _ => None,
        })
    }

    pub fn scatter(&self) -> Option<&ScatterSeries> {
        self.series.iter().find_map(|s| match s {
            Series::Scatter(p) => Some(p),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Series {
    Bar(BarSeries),
    Line(LineSeries),
    Heatmap(HeatmapSeries),
    Scatter(ScatterSeries),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Categories along x, values up the y axis
    #[default]
    Vertical,
    /// Categories down the y axis, values along x
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextPosition {
    Inside,
}

/// One bar per category. `values[i]` belongs to `categories[i]`; `None` is an
/// empty bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub name: String,
    pub categories: Vec<String>,
    pub values: Vec<Option<f64>>,
    pub orientation: Orientation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Per-bar label; empty strings are not drawn
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub text: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_position: Option<TextPosition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub name: String,
    pub categories: Vec<String>,
    pub values: Vec<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub markers: bool,
}

/// `z[row][col]` is the cell at (`y[row]`, `x[col]`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapSeries {
    pub x: Vec<String>,
    pub y: Vec<String>,
    pub z: Vec<Vec<Option<f64>>>,
    pub colorscale: ColorScale,
}

impl HeatmapSeries {
    pub fn cell(&self, y_label: &str, x_label: &str) -> Option<f64> {
        let row = self.y.iter().position(|l| l == y_label)?;
        let col = self.x.iter().position(|l| l == x_label)?;
        self.z.get(row)?.get(col).copied().flatten()
    }
}

/// Maps a value onto a sequential colour ramp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorScale {
    pub name: String,
    pub zmin: f64,
    pub zmax: f64,
}

impl ColorScale {
    /// Position of `value` on the ramp, 0 at `zmin` and 1 at `zmax`
    pub fn intensity(&self, value: f64) -> f64 {
        if self.zmax <= self.zmin {
            return if value > self.zmin { 1.0 } else { 0.0 };
        }
        ((value - self.zmin) / (self.zmax - self.zmin)).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub name: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub text: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub size: f64,
}

// =============================================================================
// Layout
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BarMode {
    Stack,
    Group,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Explicit category order; the axis never re-sorts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<(f64, f64)>,
}

impl Axis {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = Some(categories);
        self
    }

    pub fn with_range(mut self, range: (f64, f64)) -> Self {
        self.range = Some(range);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    pub x_axis: Axis,
    pub y_axis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_mode: Option<BarMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
}
