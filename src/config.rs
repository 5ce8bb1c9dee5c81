//! Dashboard configuration.
//!
//! Everything a chart needs besides its dataset lives here: the region
//! ordering, category labels and colours, column names, titles, file names and
//! the section layout. The defaults describe the published dashboard; a TOML
//! file can override any top-level table.

use crate::error::ConfigError;
use crate::loader::IndexColumn;
use crate::RenderOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Chilean regions from north to south.
pub const REGIONS: [&str; 16] = [
    "Arica y Parinacota",
    "Tarapacá",
    "Antofagasta",
    "Atacama",
    "Coquimbo",
    "Valparaíso",
    "Metropolitana",
    "Lib. Gral B. O'Higgins",
    "Maule",
    "Ñuble",
    "Biobío",
    "La Araucanía",
    "Los Ríos",
    "Los Lagos",
    "Aysén",
    "Magallanes",
];

/// Every chart the dashboard knows how to build.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    InstitutionTypes,
    DependencyTypes,
    Vulnerability,
    Mobility,
    Rates,
    MigrationDistance,
    ReceptionDistance,
}

impl ChartKind {
    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::InstitutionTypes => "institution-types",
            ChartKind::DependencyTypes => "dependency-types",
            ChartKind::Vulnerability => "vulnerability",
            ChartKind::Mobility => "mobility",
            ChartKind::Rates => "rates",
            ChartKind::MigrationDistance => "migration-distance",
            ChartKind::ReceptionDistance => "reception-distance",
        }
    }
}

/// A category label and the colour of its segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStyle {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CategoryStyle {
    fn new(label: &str, color: &str) -> Self {
        Self {
            label: label.to_string(),
            color: Some(color.to_string()),
        }
    }
}

/// Percentage-of-category-per-region stacked bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareChartConfig {
    pub file: String,
    /// Rows sharing (id, region, category) are counted once
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_column: Option<String>,
    pub region_column: String,
    pub category_column: String,
    pub categories: Vec<CategoryStyle>,
    pub title: String,
    pub legend_title: String,
    #[serde(default = "default_percent_title")]
    pub x_title: String,
    #[serde(default = "default_region_title")]
    pub y_title: String,
    #[serde(default = "default_share_height")]
    pub height: u32,
}

impl ShareChartConfig {
    pub fn institutions() -> Self {
        Self {
            file: "df_tipo_universidad.csv".to_string(),
            id_column: Some("cod_inst".to_string()),
            region_column: "region_sede".to_string(),
            category_column: "tipo_inst_3".to_string(),
            categories: vec![
                CategoryStyle::new("Universidades Estatales CRUCH", "#1f77b4"),
                CategoryStyle::new("Universidades Privadas", "#2ca02c"),
                CategoryStyle::new("Universidades Privadas CRUCH", "#ff7f0e"),
            ],
            title: "Porcentaje Tipo Universidad por Región".to_string(),
            legend_title: "Tipo de Universidad".to_string(),
            x_title: default_percent_title(),
            y_title: default_region_title(),
            height: default_share_height(),
        }
    }

    pub fn dependencies() -> Self {
        Self {
            file: "df_tipodepen.csv".to_string(),
            id_column: Some("rbd".to_string()),
            region_column: "region".to_string(),
            category_column: "dependencia".to_string(),
            categories: vec![
                CategoryStyle::new("Municipal", "#1f77b4"),
                CategoryStyle::new("Particular Subvencionado", "#ff7f0e"),
                CategoryStyle::new("Particular Pagado", "#2ca02c"),
            ],
            title: "Porcentaje Dependencia Administrativa por Región".to_string(),
            legend_title: "Dependencia".to_string(),
            x_title: default_percent_title(),
            y_title: default_region_title(),
            height: default_share_height(),
        }
    }

    pub fn vulnerability() -> Self {
        Self {
            file: "df_ivm.csv".to_string(),
            id_column: None,
            region_column: "region".to_string(),
            category_column: "categoria_ivm".to_string(),
            categories: vec![
                CategoryStyle::new("IVM Bajo", "#2ca02c"),
                CategoryStyle::new("IVM Medio", "#bcbd22"),
                CategoryStyle::new("IVM Alto", "#ff7f0e"),
                CategoryStyle::new("IVM Muy Alto", "#d62728"),
            ],
            title: "Porcentaje Categoría IVM por Región".to_string(),
            legend_title: "Categoría IVM".to_string(),
            x_title: default_percent_title(),
            y_title: default_region_title(),
            height: default_share_height(),
        }
    }

    pub fn category_labels(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.label.clone()).collect()
    }
}

fn default_percent_title() -> String {
    "Porcentaje".to_string()
}

fn default_region_title() -> String {
    "Región".to_string()
}

fn default_share_height() -> u32 {
    600
}

/// Origin × destination heatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobilityConfig {
    pub file: String,
    pub index_column: IndexColumn,
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub colorscale: String,
    pub height: u32,
}

impl Default for MobilityConfig {
    fn default() -> Self {
        Self {
            file: "df_matriz_movilidad.csv".to_string(),
            index_column: IndexColumn::First,
            title: "Matriz de Movilidad Interregional".to_string(),
            x_title: "Región de destino".to_string(),
            y_title: "Región de origen".to_string(),
            colorscale: "Blues".to_string(),
            height: 700,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateMode {
    /// Two bar series side by side
    #[default]
    Grouped,
    /// Migration as bars, reception as a line
    Dual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatesConfig {
    pub file: String,
    pub region_column: String,
    pub migration_column: String,
    pub reception_column: String,
    pub migration_color: String,
    pub reception_color: String,
    pub mode: RateMode,
    pub title: String,
    pub x_title: String,
    pub y_title: String,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            file: "df_tasas_migracion.csv".to_string(),
            region_column: "Región".to_string(),
            migration_column: "Tasa Migración (%)".to_string(),
            reception_column: "Tasa Recepción (%)".to_string(),
            migration_color: "#1f77b4".to_string(),
            reception_color: "#ff7f0e".to_string(),
            mode: RateMode::Grouped,
            title: "Tasas de Migración y Recepción por Región".to_string(),
            x_title: default_region_title(),
            y_title: default_percent_title(),
        }
    }
}

/// Direct pass-through scatter of two numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterConfig {
    pub file: String,
    pub x_column: String,
    pub y_column: String,
    /// Column whose value labels each point
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_column: Option<String>,
    pub title: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_title: Option<String>,
}

impl ScatterConfig {
    pub fn migration_distance() -> Self {
        Self {
            file: "df_migracion_distancia.csv".to_string(),
            x_column: "DISTANCIA_PROMEDIO_MIGRACIÓN".to_string(),
            y_column: "Tasa Migración (%)".to_string(),
            label_column: Some("Región".to_string()),
            title: "Tasa de Migración vs Distancia Promedio de Migración".to_string(),
            color: "steelblue".to_string(),
            x_title: None,
            y_title: None,
        }
    }

    pub fn reception_distance() -> Self {
        Self {
            file: "df_migracion_distancia.csv".to_string(),
            x_column: "DISTANCIA_PROMEDIO_RECEPCIÓN".to_string(),
            y_column: "Tasa Recepción (%)".to_string(),
            label_column: Some("Región".to_string()),
            title: "Tasa de Recepción vs Distancia Promedio de Recepción".to_string(),
            color: "orange".to_string(),
            x_title: None,
            y_title: None,
        }
    }
}

/// One content block inside a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BlockConfig {
    Text {
        text: String,
    },
    Chart {
        chart: ChartKind,
    },
    Table {
        file: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
}

/// A labelled tab of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionConfig {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub blocks: Vec<BlockConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub title: String,
    /// Fixed category axis order for every regional chart
    pub regions: Vec<String>,
    pub render: RenderOptions,
    pub institutions: ShareChartConfig,
    pub dependencies: ShareChartConfig,
    pub vulnerability: ShareChartConfig,
    pub mobility: MobilityConfig,
    pub rates: RatesConfig,
    pub migration_distance: ScatterConfig,
    pub reception_distance: ScatterConfig,
    pub sections: Vec<SectionConfig>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "GeoEdu Chile: Exploración Territorial Universitaria".to_string(),
            regions: REGIONS.iter().map(|r| r.to_string()).collect(),
            render: RenderOptions::default(),
            institutions: ShareChartConfig::institutions(),
            dependencies: ShareChartConfig::dependencies(),
            vulnerability: ShareChartConfig::vulnerability(),
            mobility: MobilityConfig::default(),
            rates: RatesConfig::default(),
            migration_distance: ScatterConfig::migration_distance(),
            reception_distance: ScatterConfig::reception_distance(),
            sections: default_sections(),
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        // Regions are bar positions; a repeated name would shadow its first slot
        let mut seen = HashSet::new();
        if let Some(region) = config.regions.iter().find(|r| !seen.insert(r.as_str())) {
            return Err(ConfigError::DuplicateRegion {
                path: path.to_path_buf(),
                region: region.clone(),
            });
        }
        Ok(config)
    }

    /// The file holding the data of a chart kind
    pub fn chart_file(&self, kind: ChartKind) -> &str {
        match kind {
            ChartKind::InstitutionTypes => &self.institutions.file,
            ChartKind::DependencyTypes => &self.dependencies.file,
            ChartKind::Vulnerability => &self.vulnerability.file,
            ChartKind::Mobility => &self.mobility.file,
            ChartKind::Rates => &self.rates.file,
            ChartKind::MigrationDistance => &self.migration_distance.file,
            ChartKind::ReceptionDistance => &self.reception_distance.file,
        }
    }
}

fn text(text: &str) -> BlockConfig {
    BlockConfig::Text {
        text: text.to_string(),
    }
}

fn chart(chart: ChartKind) -> BlockConfig {
    BlockConfig::Chart { chart }
}

fn table(file: &str, title: &str) -> BlockConfig {
    BlockConfig::Table {
        file: file.to_string(),
        title: Some(title.to_string()),
    }
}

fn default_sections() -> Vec<SectionConfig> {
    vec![
        SectionConfig {
            id: "poblacion".to_string(),
            title: "Población Objetivo".to_string(),
            blocks: vec![
                table("tabla1.csv", "Egresados de educación escolar e ingreso a educación superior"),
                table("tabla2.csv", "Matrícula de primer año"),
                table("tabla4.csv", "Variables clave y cobertura de la muestra"),
            ],
        },
        SectionConfig {
            id: "contexto".to_string(),
            title: "Contexto Institucional".to_string(),
            blocks: vec![
                text("Distribución de instituciones universitarias por tipo y dependencia."),
                chart(ChartKind::InstitutionTypes),
                chart(ChartKind::DependencyTypes),
                chart(ChartKind::Vulnerability),
            ],
        },
        SectionConfig {
            id: "movilidad".to_string(),
            title: "Movilidad Interregional".to_string(),
            blocks: vec![
                chart(ChartKind::Mobility),
                chart(ChartKind::Rates),
                chart(ChartKind::MigrationDistance),
                chart(ChartKind::ReceptionDistance),
            ],
        },
        SectionConfig {
            id: "ingreso".to_string(),
            title: "Ingreso Juvenil Regional".to_string(),
            blocks: Vec::new(),
        },
    ]
}
