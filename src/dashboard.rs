//! Dashboard assembly: configured sections turned into finished blocks.

use crate::charts;
use crate::config::{BlockConfig, ChartKind, DashboardConfig};
use crate::data::Dataset;
use crate::error::ChartResult;
use crate::ir::ChartSpec;
use crate::loader::{load_csv, IndexColumn};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub sections: Vec<Section>,
}

impl Dashboard {
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub blocks: Vec<Block>,
}

/// A built block. A chart or table that could not be produced is replaced by
/// `Error` so the rest of the section still renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Block {
    Text {
        text: String,
    },
    Chart {
        chart: ChartKind,
        spec: ChartSpec,
    },
    Table {
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        data: Dataset,
    },
    Error {
        source: String,
        message: String,
    },
}

impl Block {
    pub fn is_error(&self) -> bool {
        matches!(self, Block::Error { .. })
    }
}

/// Load the dataset behind `kind` from `data_dir` and build its chart.
pub fn build_chart(
    kind: ChartKind,
    data_dir: impl AsRef<Path>,
    config: &DashboardConfig,
) -> ChartResult<ChartSpec> {
    let path = data_dir.as_ref().join(config.chart_file(kind));
    let regions = &config.regions;

    match kind {
        ChartKind::InstitutionTypes => {
            let data = load_csv(&path, &IndexColumn::None)?;
            charts::institution_types(&data, &config.institutions, regions)
        }
        ChartKind::DependencyTypes => {
            let data = load_csv(&path, &IndexColumn::None)?;
            charts::dependency_types(&data, &config.dependencies, regions)
        }
        ChartKind::Vulnerability => {
            let data = load_csv(&path, &IndexColumn::None)?;
            charts::vulnerability_levels(&data, &config.vulnerability, regions)
        }
        ChartKind::Mobility => {
            let data = load_csv(&path, &config.mobility.index_column)?;
            charts::mobility_matrix(&data, &config.mobility, regions)
        }
        ChartKind::Rates => {
            let data = load_csv(&path, &IndexColumn::None)?;
            charts::migration_reception_rates(&data, &config.rates, regions)
        }
        ChartKind::MigrationDistance => {
            let data = load_csv(&path, &IndexColumn::None)?;
            charts::rate_vs_distance(&data, &config.migration_distance)
        }
        ChartKind::ReceptionDistance => {
            let data = load_csv(&path, &IndexColumn::None)?;
            charts::rate_vs_distance(&data, &config.reception_distance)
        }
    }
}

/// Build every configured section. Each block is independent: a failure is
/// logged and kept as [`Block::Error`].
pub fn build_dashboard(data_dir: impl AsRef<Path>, config: &DashboardConfig) -> Dashboard {
    let data_dir = data_dir.as_ref();
    let sections = config
        .sections
        .iter()
        .map(|section| Section {
            id: section.id.clone(),
            title: section.title.clone(),
            blocks: section
                .blocks
                .iter()
                .map(|block| build_block(block, data_dir, config))
                .collect(),
        })
        .collect();

    Dashboard {
        title: config.title.clone(),
        sections,
    }
}

fn build_block(block: &BlockConfig, data_dir: &Path, config: &DashboardConfig) -> Block {
    match block {
        BlockConfig::Text { text } => Block::Text { text: text.clone() },
        BlockConfig::Chart { chart } => match build_chart(*chart, data_dir, config) {
            Ok(spec) => Block::Chart {
                chart: *chart,
                spec,
            },
            Err(e) => {
                log::error!("chart '{}' failed: {}", chart.name(), e);
                Block::Error {
                    source: chart.name().to_string(),
                    message: e.to_string(),
                }
            }
        },
        BlockConfig::Table { file, title } => match load_csv(data_dir.join(file), &IndexColumn::None) {
            Ok(data) => Block::Table {
                title: title.clone(),
                data,
            },
            Err(e) => {
                log::error!("table '{}' failed: {}", file, e);
                Block::Error {
                    source: file.clone(),
                    message: e.to_string(),
                }
            }
        },
    }
}
