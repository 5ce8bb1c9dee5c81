use crate::aggregate::{percent_label, share_by_region, ShareQuery};
use crate::builder::ChartBuilder;
use crate::config::ShareChartConfig;
use crate::data::Dataset;
use crate::error::ChartResult;
use crate::ir::{Axis, BarMode, BarSeries, ChartSpec, Orientation, Series, TextPosition};

use super::{log_warnings, series_color};

/// Stacked horizontal bars: one bar per region in `regions` order, one
/// segment per configured category, each labelled with its rounded share.
pub fn share_by_region_chart(
    data: &Dataset,
    config: &ShareChartConfig,
    regions: &[String],
) -> ChartResult<ChartSpec> {
    let categories = config.category_labels();
    let table = share_by_region(
        data,
        &ShareQuery {
            id_column: config.id_column.as_deref(),
            region_column: &config.region_column,
            category_column: &config.category_column,
            categories: &categories,
            regions,
        },
    )?;

    let series = config.categories.iter().enumerate().map(|(c, style)| {
        let values = table.column(c);
        Series::Bar(BarSeries {
            name: style.label.clone(),
            categories: table.regions.clone(),
            text: values.iter().map(|&v| percent_label(v)).collect(),
            values: values.into_iter().map(Some).collect(),
            orientation: Orientation::Horizontal,
            color: Some(series_color(style.color.as_deref(), c)),
            text_position: Some(TextPosition::Inside),
        })
    });

    let warnings: Vec<String> = table.warnings.iter().map(|w| w.to_string()).collect();
    log_warnings(&config.title, &warnings);

    ChartBuilder::new(&config.title)
        .all_series(series)
        .bar_mode(BarMode::Stack)
        .x_axis(Axis::titled(&config.x_title).with_range((0.0, 100.0)))
        .y_axis(Axis::titled(&config.y_title).with_categories(regions.to_vec()))
        .legend_title(&config.legend_title)
        .height(config.height)
        .margin(100, 20, 50, 50)
        .warnings(warnings)
        .build()
}

/// Share of each university type among the institutions located in a region
pub fn institution_types(
    data: &Dataset,
    config: &ShareChartConfig,
    regions: &[String],
) -> ChartResult<ChartSpec> {
    share_by_region_chart(data, config, regions)
}

/// Share of each administrative dependency among a region's schools
pub fn dependency_types(
    data: &Dataset,
    config: &ShareChartConfig,
    regions: &[String],
) -> ChartResult<ChartSpec> {
    share_by_region_chart(data, config, regions)
}

/// Share of each IVM level among a region's schools
pub fn vulnerability_levels(
    data: &Dataset,
    config: &ShareChartConfig,
    regions: &[String],
) -> ChartResult<ChartSpec> {
    share_by_region_chart(data, config, regions)
}
