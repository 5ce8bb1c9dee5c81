use crate::builder::ChartBuilder;
use crate::config::{RateMode, RatesConfig};
use crate::data::Dataset;
use crate::error::{ChartResult, SchemaError};
use crate::ir::{Axis, BarMode, BarSeries, ChartSpec, LineSeries, Orientation, Series};
use std::collections::HashMap;

use super::log_warnings;

/// Migration and reception rate per region, side by side, in `regions` order.
pub fn migration_reception_rates(
    data: &Dataset,
    config: &RatesConfig,
    regions: &[String],
) -> ChartResult<ChartSpec> {
    let labels = data.labels(&config.region_column)?;
    let migration = optional_numbers(data, &config.migration_column)?;
    let reception = optional_numbers(data, &config.reception_column)?;

    // Last row wins if a region appears twice
    let by_region: HashMap<&str, usize> = labels
        .iter()
        .enumerate()
        .filter_map(|(i, l)| l.as_deref().map(|l| (l, i)))
        .collect();

    let mut warnings = Vec::new();
    let mut migration_values = Vec::with_capacity(regions.len());
    let mut reception_values = Vec::with_capacity(regions.len());
    for region in regions {
        match by_region.get(region.as_str()) {
            Some(&row) => {
                migration_values.push(migration[row]);
                reception_values.push(reception[row]);
            }
            None => {
                warnings.push(format!("region '{}' has no rate row", region));
                migration_values.push(None);
                reception_values.push(None);
            }
        }
    }

    let migration_series = Series::Bar(BarSeries {
        name: config.migration_column.clone(),
        categories: regions.to_vec(),
        values: migration_values,
        orientation: Orientation::Vertical,
        color: Some(config.migration_color.clone()),
        text: Vec::new(),
        text_position: None,
    });

    let reception_series = match config.mode {
        RateMode::Grouped => Series::Bar(BarSeries {
            name: config.reception_column.clone(),
            categories: regions.to_vec(),
            values: reception_values,
            orientation: Orientation::Vertical,
            color: Some(config.reception_color.clone()),
            text: Vec::new(),
            text_position: None,
        }),
        RateMode::Dual => Series::Line(LineSeries {
            name: config.reception_column.clone(),
            categories: regions.to_vec(),
            values: reception_values,
            color: Some(config.reception_color.clone()),
            markers: true,
        }),
    };

    log_warnings(&config.title, &warnings);

    ChartBuilder::new(&config.title)
        .series(migration_series)
        .series(reception_series)
        .bar_mode(BarMode::Group)
        .x_axis(Axis::titled(&config.x_title).with_categories(regions.to_vec()))
        .y_axis(Axis::titled(&config.y_title))
        .warnings(warnings)
        .build()
}

/// Numeric column where empty cells are allowed (an unknown rate)
fn optional_numbers(data: &Dataset, column: &str) -> Result<Vec<Option<f64>>, SchemaError> {
    let idx = data.column_index(column)?;
    (0..data.len())
        .map(|row| {
            let value = data.value(row, idx);
            if value.is_null() {
                return Ok(None);
            }
            value
                .as_f64()
                .or_else(|| value.to_string().parse::<f64>().ok())
                .map(Some)
                .ok_or_else(|| SchemaError::NonNumeric {
                    column: data.headers[idx].clone(),
                    row,
                    value: value.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates() -> Dataset {
        Dataset::from_strings(
            &["Región", "Tasa Migración (%)", "Tasa Recepción (%)"],
            &[
                vec!["Metropolitana", "4.0", "20.1"],
                vec!["Tarapacá", "96.0", "12.0"],
                vec!["Los Ríos", "40.2", "52.7"],
                vec!["Atlántida", "1", "1"],
            ],
        )
    }

    fn regions() -> Vec<String> {
        vec![
            "Tarapacá".into(),
            "Metropolitana".into(),
            "Biobío".into(),
            "Los Ríos".into(),
        ]
    }

    #[test]
    fn test_grouped_bars_in_region_order() {
        let chart = migration_reception_rates(&rates(), &RatesConfig::default(), &regions()).unwrap();
        assert_eq!(chart.layout.bar_mode, Some(BarMode::Group));

        let bars: Vec<&BarSeries> = chart.bars().collect();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].categories, regions());
        assert_eq!(bars[0].values, vec![Some(96.0), Some(4.0), None, Some(40.2)]);
        assert_eq!(bars[1].values, vec![Some(12.0), Some(20.1), None, Some(52.7)]);
        assert_eq!(chart.warnings, vec!["region 'Biobío' has no rate row"]);
    }

    #[test]
    fn test_dual_mode_uses_line_for_reception() {
        let config = RatesConfig {
            mode: RateMode::Dual,
            ..RatesConfig::default()
        };
        let chart = migration_reception_rates(&rates(), &config, &regions()).unwrap();
        assert_eq!(chart.bars().count(), 1);
        match &chart.series[1] {
            Series::Line(line) => {
                assert!(line.markers);
                assert_eq!(line.values[3], Some(52.7));
            }
            other => panic!("expected line, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_rate() {
        let data = Dataset::from_strings(
            &["Región", "Tasa Migración (%)", "Tasa Recepción (%)"],
            &[vec!["Maule", "alta", "3"]],
        );
        let err = migration_reception_rates(&data, &RatesConfig::default(), &regions()).unwrap_err();
        assert!(err.to_string().contains("alta"));
    }

    #[test]
    fn test_blank_rate_is_gap() {
        let data = Dataset::from_strings(
            &["Región", "Tasa Migración (%)", "Tasa Recepción (%)"],
            &[vec!["Tarapacá", "", "3"]],
        );
        let chart = migration_reception_rates(&data, &RatesConfig::default(), &regions()).unwrap();
        assert_eq!(chart.bars().next().unwrap().values[0], None);
    }
}
