//! Percentage-of-category-per-region aggregation.
//!
//! Pipeline for one [`ShareQuery`]:
//! 1. keep rows whose category is one of the requested categories
//! 2. drop duplicate (id, region, category) rows when an id column is given
//! 3. drop rows whose region is not in the fixed ordering
//! 4. count per (region, category) and turn each region row into percentages
//!
//! The output rows follow the supplied region ordering exactly, and the
//! columns follow the supplied category ordering.

use crate::data::Dataset;
use crate::error::SchemaError;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Column names and orderings for one aggregation.
#[derive(Debug, Clone, Copy)]
pub struct ShareQuery<'a> {
    pub id_column: Option<&'a str>,
    pub region_column: &'a str,
    pub category_column: &'a str,
    pub categories: &'a [String],
    pub regions: &'a [String],
}

/// A region or category that ended up with nothing to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregationWarning {
    EmptyRegion(String),
    EmptyCategory(String),
}

impl fmt::Display for AggregationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationWarning::EmptyRegion(r) => write!(f, "region '{}' has no matching rows", r),
            AggregationWarning::EmptyCategory(c) => {
                write!(f, "category '{}' has no matching rows", c)
            }
        }
    }
}

/// Region × category counts and per-region percentages.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareTable {
    pub regions: Vec<String>,
    pub categories: Vec<String>,
    /// `counts[region][category]`
    pub counts: Vec<Vec<usize>>,
    /// `percentages[region][category]`; each row sums to 100, or 0 if empty
    pub percentages: Vec<Vec<f64>>,
    /// Rows dropped because their region is outside the ordering
    pub dropped_rows: usize,
    pub warnings: Vec<AggregationWarning>,
}

impl ShareTable {
    /// Percentages of one category across all regions, in region order
    pub fn column(&self, category: usize) -> Vec<f64> {
        self.percentages.iter().map(|row| row[category]).collect()
    }

    pub fn region_total(&self, region: usize) -> usize {
        self.counts[region].iter().sum()
    }

    pub fn percentage(&self, region: &str, category: &str) -> Option<f64> {
        let r = self.regions.iter().position(|x| x == region)?;
        let c = self.categories.iter().position(|x| x == category)?;
        Some(self.percentages[r][c])
    }
}

/// Count each category per region and convert to percentage shares.
pub fn share_by_region(data: &Dataset, query: &ShareQuery<'_>) -> Result<ShareTable, SchemaError> {
    let region_labels = data.labels(query.region_column)?;
    let category_labels = data.labels(query.category_column)?;
    let id_labels = match query.id_column {
        Some(col) => Some(data.labels(col)?),
        None => None,
    };

    let region_pos: HashMap<&str, usize> = query
        .regions
        .iter()
        .enumerate()
        .map(|(i, r)| (r.as_str(), i))
        .collect();
    let category_pos: HashMap<&str, usize> = query
        .categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();

    let mut counts = vec![vec![0usize; query.categories.len()]; query.regions.len()];
    let mut seen: HashSet<(&str, &str, &str)> = HashSet::new();
    let mut dropped_rows = 0;

    for row in 0..data.len() {
        let (Some(region), Some(category)) = (&region_labels[row], &category_labels[row]) else {
            continue;
        };
        let Some(&c) = category_pos.get(category.as_str()) else {
            continue;
        };

        if let Some(ids) = &id_labels {
            let id = ids[row].as_deref().unwrap_or("");
            if !seen.insert((id, region.as_str(), category.as_str())) {
                continue;
            }
        }

        match region_pos.get(region.as_str()) {
            Some(&r) => counts[r][c] += 1,
            None => dropped_rows += 1,
        }
    }

    let percentages = counts.iter().map(|row| row_percentages(row)).collect();

    let mut warnings = Vec::new();
    for (r, region) in query.regions.iter().enumerate() {
        if counts[r].iter().all(|&n| n == 0) {
            warnings.push(AggregationWarning::EmptyRegion(region.clone()));
        }
    }
    for (c, category) in query.categories.iter().enumerate() {
        if counts.iter().all(|row| row[c] == 0) {
            warnings.push(AggregationWarning::EmptyCategory(category.clone()));
        }
    }

    if dropped_rows > 0 {
        log::debug!(
            "{} rows dropped: region outside the configured ordering",
            dropped_rows
        );
    }

    Ok(ShareTable {
        regions: query.regions.to_vec(),
        categories: query.categories.to_vec(),
        counts,
        percentages,
        dropped_rows,
        warnings,
    })
}

fn row_percentages(row: &[usize]) -> Vec<f64> {
    let total: usize = row.iter().sum();
    if total == 0 {
        return vec![0.0; row.len()];
    }
    row.iter()
        .map(|&n| n as f64 / total as f64 * 100.0)
        .collect()
}

/// Segment label: whole-number percentage, blank for zero.
pub fn percent_label(value: f64) -> String {
    if value > 0.0 {
        format!("{:.0}%", value)
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ESTATAL: &str = "Universidades Estatales CRUCH";
    const PRIVADA: &str = "Universidades Privadas";
    const PRIVADA_CRUCH: &str = "Universidades Privadas CRUCH";

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn institutions(rows: &[(&str, &str, &str)]) -> Dataset {
        Dataset::from_strings(
            &["cod_inst", "region_sede", "tipo_inst_3"],
            &rows.iter().map(|(a, b, c)| vec![*a, *b, *c]).collect::<Vec<_>>(),
        )
    }

    fn run(data: &Dataset, regions: &[String], categories: &[String]) -> ShareTable {
        share_by_region(
            data,
            &ShareQuery {
                id_column: Some("cod_inst"),
                region_column: "region_sede",
                category_column: "tipo_inst_3",
                categories,
                regions,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_two_thirds_one_third() {
        let data = institutions(&[
            ("1", "Valparaíso", PRIVADA),
            ("2", "Valparaíso", PRIVADA),
            ("3", "Valparaíso", ESTATAL),
        ]);
        let table = run(
            &data,
            &strings(&["Valparaíso"]),
            &strings(&[ESTATAL, PRIVADA, PRIVADA_CRUCH]),
        );
        let privada = table.percentage("Valparaíso", PRIVADA).unwrap();
        let estatal = table.percentage("Valparaíso", ESTATAL).unwrap();
        assert!((privada - 66.666).abs() < 0.01);
        assert!((estatal - 33.333).abs() < 0.01);
        assert_eq!(percent_label(privada), "67%");
        assert_eq!(percent_label(estatal), "33%");
        assert_eq!(percent_label(0.0), "");
        assert_eq!(
            table.warnings,
            vec![AggregationWarning::EmptyCategory(PRIVADA_CRUCH.to_string())]
        );
    }

    #[test]
    fn test_rows_sum_to_100_or_0() {
        let data = institutions(&[
            ("1", "Maule", ESTATAL),
            ("2", "Maule", PRIVADA),
            ("3", "Maule", PRIVADA_CRUCH),
            ("4", "Biobío", PRIVADA),
            ("5", "Biobío", ESTATAL),
            ("6", "Biobío", ESTATAL),
            ("7", "Biobío", PRIVADA_CRUCH),
        ]);
        let table = run(
            &data,
            &strings(&["Maule", "Ñuble", "Biobío"]),
            &strings(&[ESTATAL, PRIVADA, PRIVADA_CRUCH]),
        );
        for (r, row) in table.percentages.iter().enumerate() {
            let sum: f64 = row.iter().sum();
            if table.region_total(r) > 0 {
                assert!((sum - 100.0).abs() < 1e-9, "row {} sums to {}", r, sum);
            } else {
                assert_eq!(sum, 0.0);
            }
        }
        assert!(table
            .warnings
            .contains(&AggregationWarning::EmptyRegion("Ñuble".to_string())));
    }

    #[test]
    fn test_region_order_ignores_input_order() {
        let data = institutions(&[
            ("1", "Magallanes", ESTATAL),
            ("2", "Arica y Parinacota", ESTATAL),
            ("3", "Metropolitana", PRIVADA),
        ]);
        let regions = strings(&["Arica y Parinacota", "Metropolitana", "Magallanes"]);
        let table = run(&data, &regions, &strings(&[ESTATAL, PRIVADA]));
        assert_eq!(table.regions, regions);
        assert_eq!(table.percentages[0], vec![100.0, 0.0]);
        assert_eq!(table.percentages[1], vec![0.0, 100.0]);
    }

    #[test]
    fn test_unknown_region_dropped() {
        let data = institutions(&[("1", "Maule", ESTATAL), ("2", "Atlántida", ESTATAL)]);
        let table = run(&data, &strings(&["Maule"]), &strings(&[ESTATAL]));
        assert_eq!(table.regions, vec!["Maule"]);
        assert_eq!(table.counts, vec![vec![1]]);
        assert_eq!(table.dropped_rows, 1);
    }

    #[test]
    fn test_unrequested_types_filtered() {
        let data = institutions(&[
            ("1", "Maule", ESTATAL),
            ("2", "Maule", "Institutos Profesionales"),
        ]);
        let table = run(&data, &strings(&["Maule"]), &strings(&[ESTATAL]));
        assert_eq!(table.percentages, vec![vec![100.0]]);
    }

    #[test]
    fn test_dedup_multi_campus() {
        let regions = strings(&["Valparaíso", "Metropolitana"]);
        let categories = strings(&[ESTATAL, PRIVADA]);
        let unique = institutions(&[
            ("1", "Valparaíso", ESTATAL),
            ("2", "Valparaíso", PRIVADA),
            ("1", "Metropolitana", ESTATAL),
        ]);
        let duplicated = institutions(&[
            ("1", "Valparaíso", ESTATAL),
            ("1", "Valparaíso", ESTATAL),
            ("2", "Valparaíso", PRIVADA),
            ("1", "Metropolitana", ESTATAL),
            ("2", "Valparaíso", PRIVADA),
            ("1", "Valparaíso", ESTATAL),
        ]);

        let once = run(&unique, &regions, &categories);
        let twice = run(&duplicated, &regions, &categories);
        assert_eq!(once.percentages, twice.percentages);
        assert_eq!(once.counts, twice.counts);
        assert_eq!(twice.percentages[0], vec![50.0, 50.0]);
    }

    #[test]
    fn test_without_id_every_row_counts() {
        let data = Dataset::from_strings(
            &["region", "categoria_ivm"],
            &[
                vec!["Aysén", "IVM Alto"],
                vec!["Aysén", "IVM Alto"],
                vec!["Aysén", "IVM Bajo"],
                vec!["Aysén", "IVM Muy Alto"],
            ],
        );
        let regions = strings(&["Aysén"]);
        let levels = strings(&["IVM Bajo", "IVM Medio", "IVM Alto", "IVM Muy Alto"]);
        let table = share_by_region(
            &data,
            &ShareQuery {
                id_column: None,
                region_column: "region",
                category_column: "categoria_ivm",
                categories: &levels,
                regions: &regions,
            },
        )
        .unwrap();
        assert_eq!(table.percentages[0], vec![25.0, 0.0, 50.0, 25.0]);
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let data = Dataset::from_strings(&["cod_inst", "region_sede"], &[vec!["1", "Maule"]]);
        let err = share_by_region(
            &data,
            &ShareQuery {
                id_column: Some("cod_inst"),
                region_column: "region_sede",
                category_column: "tipo_inst_3",
                categories: &[],
                regions: &[],
            },
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::MissingColumn { ref column, .. } if column == "tipo_inst_3"));
    }
}
