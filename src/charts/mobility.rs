use crate::builder::ChartBuilder;
use crate::config::MobilityConfig;
use crate::data::{Dataset, Value};
use crate::error::{ChartResult, SchemaError};
use crate::ir::{Axis, ChartSpec, ColorScale, HeatmapSeries, Series};
use crate::scale::MinMax;
use std::collections::HashMap;

use super::log_warnings;

/// Origin × destination heatmap. Rows of `data` are origins (its row index),
/// columns are destinations; both axes are laid out in `regions` order.
pub fn mobility_matrix(
    data: &Dataset,
    config: &MobilityConfig,
    regions: &[String],
) -> ChartResult<ChartSpec> {
    if !data.has_index() {
        return Err(SchemaError::MissingIndex.into());
    }

    let origin_rows: HashMap<&str, usize> = data
        .index
        .iter()
        .enumerate()
        .map(|(i, label)| (label.as_str(), i))
        .collect();
    let destination_cols: HashMap<&str, usize> = data
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.as_str(), i))
        .collect();

    let mut warnings = Vec::new();
    for region in regions {
        if !origin_rows.contains_key(region.as_str()) {
            warnings.push(format!("origin region '{}' missing from matrix rows", region));
        }
        if !destination_cols.contains_key(region.as_str()) {
            warnings.push(format!(
                "destination region '{}' missing from matrix columns",
                region
            ));
        }
    }

    let mut z = Vec::with_capacity(regions.len());
    for origin in regions {
        let mut row = Vec::with_capacity(regions.len());
        for destination in regions {
            let cell = match (
                origin_rows.get(origin.as_str()),
                destination_cols.get(destination.as_str()),
            ) {
                (Some(&r), Some(&c)) => cell_value(data, r, c)?,
                _ => None,
            };
            row.push(cell);
        }
        z.push(row);
    }

    let observed = MinMax::of(z.iter().flatten().flatten().copied());
    // Colour runs from zero so a count's shade is proportional to its size
    let (zmin, zmax) = observed
        .map(|mm| (mm.min.min(0.0), mm.max))
        .unwrap_or((0.0, 0.0));

    log_warnings(&config.title, &warnings);

    ChartBuilder::new(&config.title)
        .series(Series::Heatmap(HeatmapSeries {
            x: regions.to_vec(),
            y: regions.to_vec(),
            z,
            colorscale: ColorScale {
                name: config.colorscale.clone(),
                zmin,
                zmax,
            },
        }))
        .x_axis(Axis::titled(&config.x_title).with_categories(regions.to_vec()))
        .y_axis(Axis::titled(&config.y_title).with_categories(regions.to_vec()))
        .height(config.height)
        .warnings(warnings)
        .build()
}

fn cell_value(data: &Dataset, row: usize, col: usize) -> Result<Option<f64>, SchemaError> {
    match data.value(row, col) {
        Value::Number(n) => Ok(Some(*n)),
        Value::Null => Ok(None),
        Value::Text(s) => s.parse::<f64>().map(Some).map_err(|_| SchemaError::NonNumeric {
            column: data.headers[col].clone(),
            row,
            value: s.clone(),
        }),
    }
}
