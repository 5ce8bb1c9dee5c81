use crate::builder::ChartBuilder;
use crate::config::ScatterConfig;
use crate::data::Dataset;
use crate::error::ChartResult;
use crate::ir::{Axis, ChartSpec, ScatterSeries, Series};
use crate::scale::MinMax;

const MARKER_SIZE: f64 = 10.0;

/// One point per row: x from the distance column, y from the rate column.
pub fn rate_vs_distance(data: &Dataset, config: &ScatterConfig) -> ChartResult<ChartSpec> {
    let x = data.numbers(&config.x_column)?;
    let y = data.numbers(&config.y_column)?;
    let text = match &config.label_column {
        Some(col) => data
            .labels(col)?
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect(),
        None => Vec::new(),
    };

    let mut x_axis = Axis::titled(config.x_title.as_deref().unwrap_or(&config.x_column));
    if let Some(mm) = MinMax::of(x.iter().copied()) {
        x_axis = x_axis.with_range(mm.padded());
    }
    let mut y_axis = Axis::titled(config.y_title.as_deref().unwrap_or(&config.y_column));
    if let Some(mm) = MinMax::of(y.iter().copied()) {
        y_axis = y_axis.with_range(mm.padded());
    }

    ChartBuilder::new(&config.title)
        .series(Series::Scatter(ScatterSeries {
            name: config.y_column.clone(),
            x,
            y,
            text,
            color: Some(config.color.clone()),
            size: MARKER_SIZE,
        }))
        .x_axis(x_axis)
        .y_axis(y_axis)
        .build()
}
