use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use geoedu::config::{ChartKind, DashboardConfig};
use geoedu::{dashboard, graph, OutputFormat, RenderOptions};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "geoedu")]
#[command(about = "Build GeoEdu Chile dashboard charts from prepared CSV files", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a single chart
    Chart {
        #[arg(value_enum)]
        kind: ChartKind,

        /// Directory holding the prepared CSV files
        #[arg(long)]
        data_dir: PathBuf,

        /// TOML file overriding the default configuration
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Write here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Preview width in pixels (png/svg only)
        #[arg(long)]
        width: Option<u32>,

        /// Preview height in pixels (png/svg only)
        #[arg(long)]
        height: Option<u32>,
    },
    /// Build every configured section as JSON
    Dashboard {
        #[arg(long)]
        data_dir: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print the default configuration as TOML
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Png,
    Svg,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    match args.command {
        Command::Chart {
            kind,
            data_dir,
            config,
            format,
            output,
            width,
            height,
        } => {
            let config = load_config(config.as_deref())?;
            let chart = dashboard::build_chart(kind, &data_dir, &config)
                .with_context(|| format!("Failed to build chart '{}'", kind.name()))?;

            let bytes = match format {
                Format::Json => to_json(&chart)?,
                Format::Png | Format::Svg => {
                    let options = RenderOptions {
                        width: width.unwrap_or(config.render.width),
                        height: height.unwrap_or(config.render.height),
                        format: if format == Format::Svg {
                            OutputFormat::Svg
                        } else {
                            OutputFormat::Png
                        },
                    };
                    graph::render(&chart, &options).context("Failed to render chart")?
                }
            };
            write_output(output.as_deref(), &bytes)
        }
        Command::Dashboard {
            data_dir,
            config,
            output,
        } => {
            let config = load_config(config.as_deref())?;
            let built = dashboard::build_dashboard(&data_dir, &config);
            let failed = built
                .sections
                .iter()
                .flat_map(|s| &s.blocks)
                .filter(|b| b.is_error())
                .count();
            if failed > 0 {
                log::warn!("{} block(s) could not be built", failed);
            }
            write_output(output.as_deref(), &to_json(&built)?)
        }
        Command::Config => {
            let text = toml::to_string_pretty(&DashboardConfig::default())
                .context("Failed to serialize default configuration")?;
            write_output(None, text.as_bytes())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<DashboardConfig> {
    match path {
        Some(path) => DashboardConfig::from_file(path).context("Failed to load configuration"),
        None => Ok(DashboardConfig::default()),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut json = serde_json::to_vec_pretty(value).context("Failed to serialize JSON")?;
    json.push(b'\n');
    Ok(json)
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    if let Some(path) = path {
        return fs::write(path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()));
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(bytes)
        .context("Failed to write to stdout")?;
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}
