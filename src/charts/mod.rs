//! Chart builders. Each is a pure function from a dataset plus configuration
//! to a finished [`crate::ir::ChartSpec`].

mod mobility;
mod rates;
mod scatter;
mod share;

pub use mobility::mobility_matrix;
pub use rates::migration_reception_rates;
pub use scatter::rate_vs_distance;
pub use share::{dependency_types, institution_types, share_by_region_chart, vulnerability_levels};

use crate::palette::ColorPalette;

/// Configured colour, or the palette colour for that position
fn series_color(configured: Option<&str>, position: usize) -> String {
    configured
        .map(str::to_string)
        .unwrap_or_else(|| ColorPalette::category10().get(position).to_string())
}

fn log_warnings(title: &str, warnings: &[String]) {
    for warning in warnings {
        log::warn!("{}: {}", title, warning);
    }
}
