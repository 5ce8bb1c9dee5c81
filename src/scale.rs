//! Axis and colour-scale domains.

use crate::ir::{BarMode, BarSeries, ChartSpec, Series};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

impl MinMax {
    /// Min/max of the finite values, `None` if there are none
    pub fn of<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some(MinMax { min: v, max: v }),
                Some(mm) => Some(MinMax {
                    min: mm.min.min(v),
                    max: mm.max.max(v),
                }),
            })
    }

    pub fn merge(self, other: MinMax) -> MinMax {
        MinMax {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Widen by 5% on each side; a degenerate range is widened by 1
    pub fn padded(self) -> (f64, f64) {
        pad_range(self.min, self.max)
    }
}

pub fn pad_range(min: f64, max: f64) -> (f64, f64) {
    if min == max {
        (min - 1.0, max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding, max + padding)
    }
}

/// Value-axis domain of all bar and line series, taking stacking into account.
/// Always includes zero, since bars grow from it.
pub fn value_domain(chart: &ChartSpec) -> (f64, f64) {
    let stacked = chart.layout.bar_mode == Some(BarMode::Stack);
    let bars: Vec<&BarSeries> = chart.bars().collect();

    let mut mm = MinMax { min: 0.0, max: 0.0 };

    if stacked && !bars.is_empty() {
        let n = bars.iter().map(|b| b.values.len()).max().unwrap_or(0);
        let totals = (0..n).map(|i| {
            bars.iter()
                .filter_map(|b| b.values.get(i).copied().flatten())
                .sum::<f64>()
        });
        if let Some(t) = MinMax::of(totals) {
            mm = mm.merge(t);
        }
    } else if let Some(b) = MinMax::of(bars.iter().flat_map(|b| b.values.iter().flatten().copied())) {
        mm = mm.merge(b);
    }

    let lines = chart.series.iter().flat_map(|s| match s {
        Series::Line(l) => l.values.iter().flatten().copied().collect::<Vec<_>>(),
        _ => Vec::new(),
    });
    if let Some(l) = MinMax::of(lines) {
        mm = mm.merge(l);
    }

    if mm.max == mm.min {
        (mm.min, mm.min + 1.0)
    } else {
        (mm.min, mm.max + (mm.max - mm.min) * 0.05)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ChartBuilder;
    use crate::ir::{BarSeries, Orientation};

    fn bar(name: &str, values: Vec<Option<f64>>) -> Series {
        Series::Bar(BarSeries {
            name: name.into(),
            categories: (0..values.len()).map(|i| i.to_string()).collect(),
            values,
            orientation: Orientation::Vertical,
            color: None,
            text: vec![],
            text_position: None,
        })
    }

    #[test]
    fn test_min_max_skips_nan() {
        let mm = MinMax::of([3.0, f64::NAN, -1.0, 7.5]).unwrap();
        assert_eq!(mm, MinMax { min: -1.0, max: 7.5 });
        assert!(MinMax::of(Vec::<f64>::new()).is_none());
    }

    #[test]
    fn test_pad_range() {
        assert_eq!(pad_range(0.0, 100.0), (-5.0, 105.0));
        assert_eq!(pad_range(4.0, 4.0), (3.0, 5.0));
    }

    #[test]
    fn test_stacked_domain_uses_totals() {
        let chart = ChartBuilder::new("t")
            .series(bar("a", vec![Some(60.0), Some(10.0)]))
            .series(bar("b", vec![Some(40.0), None]))
            .bar_mode(BarMode::Stack)
            .build()
            .unwrap();
        let (min, max) = value_domain(&chart);
        assert_eq!(min, 0.0);
        assert!((max - 105.0).abs() < 1e-9);
    }

    #[test]
    fn test_grouped_domain_uses_max_bar() {
        let chart = ChartBuilder::new("t")
            .series(bar("a", vec![Some(96.0), Some(4.0)]))
            .series(bar("b", vec![Some(52.7), Some(7.4)]))
            .bar_mode(BarMode::Group)
            .build()
            .unwrap();
        let (_, max) = value_domain(&chart);
        assert!((max - 100.8).abs() < 1e-9);
    }
}
