use crate::error::ChartError;
use crate::ir::{Axis, BarMode, ChartSpec, Layout, Margin, Series};

/// Assembles a [`ChartSpec`] by value.
///
/// Every method consumes the builder and hands back a new one, so a half-built
/// chart never escapes; [`ChartBuilder::build`] checks the pieces fit together
/// before anything reaches a renderer.
#[derive(Debug, Clone)]
#[must_use]
pub struct ChartBuilder {
    title: String,
    series: Vec<Series>,
    layout: Layout,
    warnings: Vec<String>,
}

impl ChartBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            series: Vec::new(),
            layout: Layout::default(),
            warnings: Vec::new(),
        }
    }

    pub fn series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    pub fn all_series(mut self, series: impl IntoIterator<Item = Series>) -> Self {
        self.series.extend(series);
        self
    }

    pub fn x_axis(mut self, axis: Axis) -> Self {
        self.layout.x_axis = axis;
        self
    }

    pub fn y_axis(mut self, axis: Axis) -> Self {
        self.layout.y_axis = axis;
        self
    }

    pub fn bar_mode(mut self, mode: BarMode) -> Self {
        self.layout.bar_mode = Some(mode);
        self
    }

    pub fn legend_title(mut self, title: impl Into<String>) -> Self {
        self.layout.legend_title = Some(title.into());
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.layout.height = Some(height);
        self
    }

    pub fn margin(mut self, l: u32, r: u32, t: u32, b: u32) -> Self {
        self.layout.margin = Some(Margin { l, r, t, b });
        self
    }

    pub fn warnings<I, W>(mut self, warnings: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: ToString,
    {
        self.warnings
            .extend(warnings.into_iter().map(|w| w.to_string()));
        self
    }

    /// Validate and return the finished description
    pub fn build(self) -> Result<ChartSpec, ChartError> {
        if self.series.is_empty() {
            return Err(self.invalid("chart has no series".to_string()));
        }

        for series in &self.series {
            if let Err(message) = check_series(series) {
                return Err(self.invalid(message));
            }
        }

        Ok(ChartSpec {
            title: self.title,
            series: self.series,
            layout: self.layout,
            warnings: self.warnings,
        })
    }

    fn invalid(&self, message: String) -> ChartError {
        ChartError::InvalidChart {
            title: self.title.clone(),
            message,
        }
    }
}

fn check_series(series: &Series) -> Result<(), String> {
    match series {
        Series::Bar(b) => {
            if b.categories.len() != b.values.len() {
                return Err(format!(
                    "bar series '{}' has {} categories but {} values",
                    b.name,
                    b.categories.len(),
                    b.values.len()
                ));
            }
            if !b.text.is_empty() && b.text.len() != b.values.len() {
                return Err(format!(
                    "bar series '{}' has {} labels for {} values",
                    b.name,
                    b.text.len(),
                    b.values.len()
                ));
            }
        }
        Series::Line(l) => {
            if l.categories.len() != l.values.len() {
                return Err(format!(
                    "line series '{}' has {} categories but {} values",
                    l.name,
                    l.categories.len(),
                    l.values.len()
                ));
            }
        }
        Series::Heatmap(h) => {
            if h.z.len() != h.y.len() {
                return Err(format!(
                    "heatmap has {} rows for {} y labels",
                    h.z.len(),
                    h.y.len()
                ));
            }
            if let Some(row) = h.z.iter().position(|row| row.len() != h.x.len()) {
                return Err(format!(
                    "heatmap row '{}' has {} cells for {} x labels",
                    h.y[row],
                    h.z[row].len(),
                    h.x.len()
                ));
            }
        }
        Series::Scatter(s) => {
            if s.x.len() != s.y.len() {
                return Err(format!(
                    "scatter series '{}' has {} x values but {} y values",
                    s.name,
                    s.x.len(),
                    s.y.len()
                ));
            }
            if !s.text.is_empty() && s.text.len() != s.x.len() {
                return Err(format!(
                    "scatter series '{}' has {} labels for {} points",
                    s.name,
                    s.text.len(),
                    s.x.len()
                ));
            }
        }
    }
    Ok(())
}
