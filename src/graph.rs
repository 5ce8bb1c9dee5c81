//! Static preview of a chart description, drawn with plotters.
//!
//! The interactive surface consumes the JSON form of a [`ChartSpec`]; this
//! renderer exists for quick looks from the command line and for reports.

use crate::ir::{BarMode, BarSeries, ChartSpec, HeatmapSeries, Orientation, ScatterSeries, Series};
use crate::palette::{parse_rgb, ColorPalette, Ramp};
use crate::scale::{value_domain, MinMax};
use crate::{OutputFormat, RenderOptions};
use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::collections::HashMap;
use std::ops::Range;

/// Share of a category slot taken by its bar(s)
const BAR_WIDTH: f64 = 0.8;
const MISSING_CELL: RGBColor = RGBColor(235, 235, 235);

/// Render `chart` to PNG or SVG bytes.
pub fn render(chart: &ChartSpec, options: &RenderOptions) -> Result<Vec<u8>> {
    if options.width == 0 || options.height == 0 {
        anyhow::bail!(
            "Cannot render a {}x{} image",
            options.width,
            options.height
        );
    }

    match options.format {
        OutputFormat::Png => render_png(chart, options.width, options.height),
        OutputFormat::Svg => render_svg(chart, options.width, options.height),
    }
}

fn render_png(chart: &ChartSpec, width: u32, height: u32) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw(&root, chart)?;
        root.present().context("Failed to present drawing")?;
    }

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(&buffer, width, height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }

    Ok(png_bytes)
}

fn render_svg(chart: &ChartSpec, width: u32, height: u32) -> Result<Vec<u8>> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        draw(&root, chart)?;
        root.present().context("Failed to present drawing")?;
    }
    Ok(svg.into_bytes())
}

fn draw<DB>(root: &DrawingArea<DB, Shift>, chart: &ChartSpec) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).context("Failed to fill background")?;

    if let Some(heatmap) = chart.heatmap() {
        draw_heatmap(root, chart, heatmap)
    } else if let Some(points) = chart.scatter() {
        draw_scatter(root, chart, points)
    } else {
        draw_categorical(root, chart)
    }
}

// =============================================================================
// Bars and lines
// =============================================================================

/// One drawn bar segment, in category-slot and value coordinates.
#[derive(Debug, Clone, PartialEq)]
struct BarRect {
    series: usize,
    /// Index into the series' values
    index: usize,
    slot: usize,
    base: f64,
    top: f64,
    offset: f64,
    width: f64,
}

/// Lay out every bar segment. Values whose category is not on the axis and
/// empty values produce nothing.
fn bar_rects(bars: &[&BarSeries], categories: &[String], mode: BarMode) -> Vec<BarRect> {
    let slots: HashMap<&str, usize> = categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();
    let group_width = BAR_WIDTH / bars.len().max(1) as f64;
    let mut positive = vec![0.0; categories.len()];
    let mut negative = vec![0.0; categories.len()];

    let mut rects = Vec::new();
    for (series, bar) in bars.iter().enumerate() {
        for (index, (category, value)) in bar.categories.iter().zip(&bar.values).enumerate() {
            let (Some(&slot), Some(value)) = (slots.get(category.as_str()), *value) else {
                continue;
            };
            let rect = match mode {
                BarMode::Stack => {
                    let cursor = if value >= 0.0 {
                        &mut positive[slot]
                    } else {
                        &mut negative[slot]
                    };
                    let base = *cursor;
                    *cursor += value;
                    BarRect {
                        series,
                        index,
                        slot,
                        base,
                        top: base + value,
                        offset: 0.0,
                        width: BAR_WIDTH,
                    }
                }
                BarMode::Group => BarRect {
                    series,
                    index,
                    slot,
                    base: 0.0,
                    top: value,
                    offset: (series as f64 - (bars.len() as f64 - 1.0) / 2.0) * group_width,
                    width: group_width,
                },
            };
            rects.push(rect);
        }
    }
    rects
}

/// Axis position of a category slot. Horizontal charts list the first
/// category at the top.
fn slot_position(slot: usize, count: usize, reversed: bool) -> f64 {
    if reversed {
        (count - 1 - slot) as f64
    } else {
        slot as f64
    }
}

/// Tick label for an axis position; only whole positions name a category
fn category_label(categories: &[String], position: f64, reversed: bool) -> String {
    let rounded = position.round();
    if (position - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    let idx = rounded as usize;
    if idx >= categories.len() {
        return String::new();
    }
    let slot = if reversed { categories.len() - 1 - idx } else { idx };
    categories[slot].clone()
}

fn slot_range(count: usize) -> Range<f64> {
    -0.5..(count.max(1) as f64 - 0.5)
}

fn draw_categorical<DB>(root: &DrawingArea<DB, Shift>, chart: &ChartSpec) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let bars: Vec<&BarSeries> = chart.bars().collect();
    let horizontal = bars
        .first()
        .map(|b| b.orientation == Orientation::Horizontal)
        .unwrap_or(false);

    let (category_axis, value_axis) = if horizontal {
        (&chart.layout.y_axis, &chart.layout.x_axis)
    } else {
        (&chart.layout.x_axis, &chart.layout.y_axis)
    };

    let categories: Vec<String> = match &category_axis.categories {
        Some(categories) => categories.clone(),
        None => chart
            .series
            .iter()
            .find_map(|s| match s {
                Series::Bar(b) => Some(b.categories.clone()),
                Series::Line(l) => Some(l.categories.clone()),
                _ => None,
            })
            .unwrap_or_default(),
    };
    if categories.is_empty() {
        anyhow::bail!("Cannot create bar chart with no categories");
    }
    let count = categories.len();

    let (lo, hi) = value_axis.range.unwrap_or_else(|| value_domain(chart));
    let (x_range, y_range) = if horizontal {
        (lo..hi, slot_range(count))
    } else {
        (slot_range(count), lo..hi)
    };

    let mut plot = ChartBuilder::on(root)
        .margin(10)
        .caption(&chart.title, ("sans-serif", 20))
        .x_label_area_size(if horizontal { 40 } else { 60 })
        .y_label_area_size(if horizontal { 150 } else { 50 })
        .build_cartesian_2d(x_range, y_range)
        .context("Failed to build chart")?;

    let label = |v: &f64| category_label(&categories, *v, horizontal);
    let mut mesh = plot.configure_mesh();
    if horizontal {
        mesh.y_labels(count).y_label_formatter(&label);
    } else {
        mesh.x_labels(count).x_label_formatter(&label);
    }
    if let Some(title) = &chart.layout.x_axis.title {
        mesh.x_desc(title.as_str());
    }
    if let Some(title) = &chart.layout.y_axis.title {
        mesh.y_desc(title.as_str());
    }
    mesh.draw().context("Failed to draw mesh")?;

    let mode = chart.layout.bar_mode.unwrap_or(BarMode::Group);
    let rects = bar_rects(&bars, &categories, mode);
    let corners = |r: &BarRect| {
        let center = slot_position(r.slot, count, horizontal) + r.offset;
        let (a, b) = (center - r.width / 2.0, center + r.width / 2.0);
        if horizontal {
            [(r.base, a), (r.top, b)]
        } else {
            [(a, r.base), (b, r.top)]
        }
    };

    for (s, bar) in bars.iter().enumerate() {
        let color = resolve_color(bar.color.as_deref(), s);
        plot.draw_series(
            rects
                .iter()
                .filter(|r| r.series == s)
                .map(|r| Rectangle::new(corners(r), color.filled())),
        )
        .context("Failed to draw bars")?
        .label(bar.name.clone())
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    // Segment labels sit centred inside their bar
    let labels: Vec<Text<(f64, f64), String>> = rects
        .iter()
        .filter_map(|r| {
            let bar = bars[r.series];
            let text = bar.text.get(r.index).filter(|t| !t.is_empty())?;
            let [(x0, y0), (x1, y1)] = corners(r);
            let anchor = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
            let font = ("sans-serif", 12)
                .into_font()
                .color(&WHITE)
                .pos(Pos::new(HPos::Center, VPos::Center));
            Some(Text::new(text.clone(), anchor, font))
        })
        .collect();
    plot.draw_series(labels).context("Failed to draw bar labels")?;

    for (s, series) in chart.series.iter().enumerate() {
        let Series::Line(line) = series else { continue };
        let color = resolve_color(line.color.as_deref(), s);
        let slots: HashMap<&str, usize> = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();
        let points: Vec<(f64, f64)> = line
            .categories
            .iter()
            .zip(&line.values)
            .filter_map(|(c, v)| Some((slot_position(*slots.get(c.as_str())?, count, false), (*v)?)))
            .collect();

        plot.draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))
            .context("Failed to draw line series")?
            .label(line.name.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], color.stroke_width(2)));
        if line.markers {
            plot.draw_series(points.iter().map(|&p| Circle::new(p, 4, color.filled())))
                .context("Failed to draw line markers")?;
        }
    }

    plot.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .context("Failed to draw legend")?;

    Ok(())
}

// =============================================================================
// Heatmap
// =============================================================================

fn draw_heatmap<DB>(
    root: &DrawingArea<DB, Shift>,
    chart: &ChartSpec,
    heatmap: &HeatmapSeries,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (nx, ny) = (heatmap.x.len(), heatmap.y.len());
    if nx == 0 || ny == 0 {
        anyhow::bail!("Cannot create heatmap with no cells");
    }

    let mut plot = ChartBuilder::on(root)
        .margin(10)
        .caption(&chart.title, ("sans-serif", 20))
        .x_label_area_size(120)
        .y_label_area_size(150)
        .build_cartesian_2d(slot_range(nx), slot_range(ny))
        .context("Failed to build chart")?;

    let x_label = |v: &f64| category_label(&heatmap.x, *v, false);
    let y_label = |v: &f64| category_label(&heatmap.y, *v, true);
    let mut mesh = plot.configure_mesh();
    mesh.disable_mesh()
        .x_labels(nx)
        .x_label_formatter(&x_label)
        .x_label_style(("sans-serif", 11).into_font().transform(FontTransform::Rotate90))
        .y_labels(ny)
        .y_label_formatter(&y_label);
    if let Some(title) = &chart.layout.x_axis.title {
        mesh.x_desc(title.as_str());
    }
    if let Some(title) = &chart.layout.y_axis.title {
        mesh.y_desc(title.as_str());
    }
    mesh.draw().context("Failed to draw mesh")?;

    let ramp = Ramp::named(&heatmap.colorscale.name);
    let ramp = &ramp;
    let cells = heatmap.z.iter().enumerate().flat_map(move |(row, cells)| {
        let y = slot_position(row, ny, true);
        cells.iter().enumerate().map(move |(col, cell)| {
            let x = col as f64;
            let color = match cell {
                Some(v) => {
                    let (r, g, b) = ramp.at(heatmap.colorscale.intensity(*v));
                    RGBColor(r, g, b)
                }
                None => MISSING_CELL,
            };
            Rectangle::new([(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)], color.filled())
        })
    });
    plot.draw_series(cells).context("Failed to draw heatmap cells")?;

    Ok(())
}

// =============================================================================
// Scatter
// =============================================================================

fn axis_range(explicit: Option<(f64, f64)>, values: &[f64]) -> Range<f64> {
    let (lo, hi) = explicit
        .or_else(|| MinMax::of(values.iter().copied()).map(MinMax::padded))
        .unwrap_or((0.0, 1.0));
    lo..hi
}

fn draw_scatter<DB>(
    root: &DrawingArea<DB, Shift>,
    chart: &ChartSpec,
    points: &ScatterSeries,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let x_range = axis_range(chart.layout.x_axis.range, &points.x);
    let y_range = axis_range(chart.layout.y_axis.range, &points.y);

    let mut plot = ChartBuilder::on(root)
        .margin(10)
        .caption(&chart.title, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)
        .context("Failed to build chart")?;

    let mut mesh = plot.configure_mesh();
    if let Some(title) = &chart.layout.x_axis.title {
        mesh.x_desc(title.as_str());
    }
    if let Some(title) = &chart.layout.y_axis.title {
        mesh.y_desc(title.as_str());
    }
    mesh.draw().context("Failed to draw mesh")?;

    let color = resolve_color(points.color.as_deref(), 0);
    let radius = (points.size / 2.0).round().max(1.0) as i32;
    let font = ("sans-serif", 11).into_font();

    plot.draw_series(points.x.iter().zip(&points.y).enumerate().map(|(i, (&x, &y))| {
        let text = points.text.get(i).cloned().unwrap_or_default();
        EmptyElement::at((x, y))
            + Circle::new((0, 0), radius, color.filled())
            + Text::new(text, (radius + 2, -radius - 2), font.clone())
    }))
    .context("Failed to draw point series")?;

    Ok(())
}

/// Colour of a series: its configured colour when recognised, otherwise the
/// palette colour for its position.
fn resolve_color(color: Option<&str>, position: usize) -> RGBColor {
    let (r, g, b) = color
        .and_then(parse_rgb)
        .or_else(|| parse_rgb(ColorPalette::category10().get(position)))
        .unwrap_or((0, 0, 255));
    RGBColor(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ChartBuilder as SpecBuilder;
    use crate::charts;
    use crate::config::{MobilityConfig, RateMode, RatesConfig, ScatterConfig};
    use crate::data::Dataset;
    use crate::ir::{Axis, BarSeries};
    use crate::loader::{parse_csv, IndexColumn};

    fn bar(name: &str, categories: &[&str], values: Vec<Option<f64>>) -> BarSeries {
        BarSeries {
            name: name.into(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            values,
            orientation: Orientation::Horizontal,
            color: None,
            text: vec![],
            text_position: None,
        }
    }

    fn cats(names: &[&str]) -> Vec<String> {
        names.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_stacked_segments_accumulate() {
        let a = bar("a", &["Maule", "Aysén"], vec![Some(60.0), Some(100.0)]);
        let b = bar("b", &["Maule", "Aysén"], vec![Some(40.0), Some(0.0)]);
        let rects = bar_rects(&[&a, &b], &cats(&["Maule", "Aysén"]), BarMode::Stack);

        assert_eq!(rects.len(), 4);
        let maule_b = rects.iter().find(|r| r.series == 1 && r.slot == 0).unwrap();
        assert_eq!((maule_b.base, maule_b.top), (60.0, 100.0));
        let aysen_b = rects.iter().find(|r| r.series == 1 && r.slot == 1).unwrap();
        assert_eq!((aysen_b.base, aysen_b.top), (100.0, 100.0));
    }

    #[test]
    fn test_grouped_bars_sit_side_by_side() {
        let a = bar("a", &["Maule"], vec![Some(3.0)]);
        let b = bar("b", &["Maule"], vec![Some(5.0)]);
        let rects = bar_rects(&[&a, &b], &cats(&["Maule"]), BarMode::Group);

        assert_eq!(rects[0].base, 0.0);
        assert_eq!(rects[1].top, 5.0);
        assert!(rects[0].offset < 0.0 && rects[1].offset > 0.0);
        assert!((rects[0].width + rects[1].width - BAR_WIDTH).abs() < 1e-12);
    }

    #[test]
    fn test_gaps_and_unknown_categories_are_skipped() {
        let a = bar("a", &["Maule", "Atlántida"], vec![None, Some(1.0)]);
        let rects = bar_rects(&[&a], &cats(&["Maule"]), BarMode::Stack);
        assert!(rects.is_empty());
    }

    #[test]
    fn test_category_labels_follow_slots() {
        let names = cats(&["Arica y Parinacota", "Tarapacá", "Magallanes"]);
        assert_eq!(category_label(&names, 0.0, false), "Arica y Parinacota");
        assert_eq!(category_label(&names, 0.0, true), "Magallanes");
        assert_eq!(category_label(&names, 2.0, true), "Arica y Parinacota");
        assert_eq!(category_label(&names, 0.5, false), "");
        assert_eq!(category_label(&names, 3.0, false), "");
        assert_eq!(slot_position(0, 3, true), 2.0);
    }

    #[test]
    fn test_resolve_color() {
        assert_eq!(resolve_color(Some("#ff7f0e"), 0), RGBColor(255, 127, 14));
        assert_eq!(resolve_color(Some("steelblue"), 0), RGBColor(70, 130, 180));
        // Unknown names fall back to the palette position
        assert_eq!(resolve_color(Some("chartreuse-ish"), 1), RGBColor(255, 127, 14));
        assert_eq!(resolve_color(None, 0), RGBColor(31, 119, 180));
    }

    #[test]
    fn test_axis_range_prefers_explicit() {
        assert_eq!(axis_range(Some((0.0, 100.0)), &[5.0]), 0.0..100.0);
        assert_eq!(axis_range(None, &[]), 0.0..1.0);
        let r = axis_range(None, &[10.0, 20.0]);
        assert!(r.start < 10.0 && r.end > 20.0);
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let chart = SpecBuilder::new("t")
            .series(Series::Bar(bar("a", &["Maule"], vec![Some(1.0)])))
            .build()
            .unwrap();
        let options = RenderOptions {
            width: 0,
            ..RenderOptions::default()
        };
        assert!(render(&chart, &options).is_err());
    }

    fn stacked_chart() -> ChartSpec {
        let mut a = bar("Municipal", &["Maule", "Aysén"], vec![Some(60.0), Some(100.0)]);
        a.text = vec!["60%".into(), "100%".into()];
        let b = bar("Particular", &["Maule", "Aysén"], vec![Some(40.0), Some(0.0)]);
        SpecBuilder::new("Dependencia")
            .series(Series::Bar(a))
            .series(Series::Bar(b))
            .bar_mode(BarMode::Stack)
            .x_axis(Axis::titled("Porcentaje").with_range((0.0, 100.0)))
            .y_axis(Axis::titled("Región").with_categories(cats(&["Maule", "Aysén"])))
            .build()
            .unwrap()
    }

    fn svg(chart: &ChartSpec) -> String {
        let options = RenderOptions {
            format: OutputFormat::Svg,
            ..RenderOptions::default()
        };
        String::from_utf8(render(chart, &options).unwrap()).unwrap()
    }

    #[test]
    fn test_render_png() {
        let png = render(&stacked_chart(), &RenderOptions::default()).unwrap();
        assert_eq!(&png[..4], b"\x89PNG");
    }

    #[test]
    fn test_render_svg() {
        let svg = svg(&stacked_chart());
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Municipal"));
    }

    #[test]
    fn test_render_scatter() {
        let data = Dataset::from_strings(
            &["Región", "DISTANCIA_PROMEDIO_MIGRACIÓN", "Tasa Migración (%)"],
            &[
                vec!["Maule", "250.5", "31.2"],
                vec!["Aysén", "1400", "88"],
            ],
        );
        let chart = charts::rate_vs_distance(&data, &ScatterConfig::migration_distance()).unwrap();

        let png = render(&chart, &RenderOptions::default()).unwrap();
        assert_eq!(&png[..4], b"\x89PNG");
        assert!(svg(&chart).contains("Maule"));
    }

    #[test]
    fn test_render_bars_with_reception_line() {
        let data = Dataset::from_strings(
            &["Región", "Tasa Migración (%)", "Tasa Recepción (%)"],
            &[vec!["Maule", "40.2", "12"], vec!["Aysén", "", "30.5"]],
        );
        let config = RatesConfig {
            mode: RateMode::Dual,
            ..RatesConfig::default()
        };
        let regions = cats(&["Maule", "Ñuble", "Aysén"]);
        let chart = charts::migration_reception_rates(&data, &config, &regions).unwrap();

        let png = render(&chart, &RenderOptions::default()).unwrap();
        assert_eq!(&png[..4], b"\x89PNG");
        assert!(svg(&chart).contains("<svg"));
    }

    #[test]
    fn test_render_heatmap_with_missing_cells() {
        let data = parse_csv(
            ",Maule,Aysén\nMaule,120,4\nAysén,0,35\n".as_bytes(),
            &IndexColumn::First,
            "matriz.csv",
        )
        .unwrap();
        let regions = cats(&["Maule", "Ñuble", "Aysén"]);
        let chart = charts::mobility_matrix(&data, &MobilityConfig::default(), &regions).unwrap();

        let png = render(&chart, &RenderOptions::default()).unwrap();
        assert_eq!(&png[..4], b"\x89PNG");
    }
}
