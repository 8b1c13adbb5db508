mod error;
mod input;
mod logging;
mod model;
mod pipeline;
mod report;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::error::KpiError;
use crate::input::{DEFAULT_TABLE, SourceConfig};
use crate::model::thresholds::SupportProfile;
use crate::pipeline::run_report;
use crate::pipeline::stage4_draw::{DEFAULT_SIZE, OutputFormat, RenderTarget};
use crate::report::theme::Theme;
use crate::report::variants::{ReportDefinition, ReportKind};

const DATABASE_URL_ENV: &str = "DELAY_KPI_DATABASE_URL";

#[derive(Debug, Parser)]
#[command(
    name = "delay-kpi",
    version,
    about = "Flight-delay KPI outlier reports for airports and airlines"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// PostgreSQL connection string for the canonical KPI table.
    #[arg(long, env = DATABASE_URL_ENV, global = true, hide_env_values = true)]
    database_url: Option<String>,

    /// Exported canonical table (.tsv, .tsv.gz, .json); takes precedence over --database-url.
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_TABLE, global = true)]
    table: String,

    #[arg(long, default_value = ".", global = true)]
    out: PathBuf,

    #[arg(long, value_enum, default_value_t = FormatArg::Png, global = true)]
    format: FormatArg,

    #[arg(long, default_value_t = SupportProfile::default_v1().min_severity_support, global = true)]
    min_severity_support: u64,

    #[arg(long, default_value_t = SupportProfile::default_v1().min_frequency_support, global = true)]
    min_frequency_support: u64,

    #[arg(long, default_value_t = DEFAULT_SIZE.0, global = true)]
    width: u32,

    #[arg(long, default_value_t = DEFAULT_SIZE.1, global = true)]
    height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
enum Command {
    /// Average delay severity against operated flights.
    SeverityVolume,
    /// Delay frequency against average delay severity.
    FrequencySeverity,
    /// Both reports, one after the other.
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Png,
    Svg,
}

#[derive(Debug, Clone)]
struct RunConfig {
    kinds: Vec<ReportKind>,
    source: SourceConfig,
    out_dir: PathBuf,
    format: OutputFormat,
    size: (u32, u32),
    support: SupportProfile,
}

fn main() {
    logging::init_logging();
    if let Err(err) = run() {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), KpiError> {
    let config = build_config(Cli::parse())?;
    let theme = Theme::dark();

    for &kind in &config.kinds {
        let report = ReportDefinition::build(kind, &config.support);
        let target = RenderTarget::in_dir(&config.out_dir, report.file_stem, config.format, config.size);
        run_report(&config.source, &report, &theme, &target)?;
    }
    Ok(())
}

fn build_config(cli: Cli) -> Result<RunConfig, KpiError> {
    let source = match (cli.snapshot, cli.database_url) {
        (Some(path), _) => SourceConfig::Snapshot { path },
        (None, Some(url)) => SourceConfig::Postgres {
            url,
            table: cli.table,
        },
        (None, None) => {
            return Err(KpiError::DataUnavailable(format!(
                "no KPI source configured (use --snapshot, --database-url or {DATABASE_URL_ENV})"
            )));
        }
    };

    let kinds = match cli.command {
        Command::SeverityVolume => vec![ReportKind::SeverityVolume],
        Command::FrequencySeverity => vec![ReportKind::FrequencySeverity],
        Command::All => ReportKind::all().to_vec(),
    };

    Ok(RunConfig {
        kinds,
        source,
        out_dir: cli.out,
        format: match cli.format {
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Svg => OutputFormat::Svg,
        },
        size: (cli.width, cli.height),
        support: SupportProfile {
            min_severity_support: cli.min_severity_support,
            min_frequency_support: cli.min_frequency_support,
        },
    })
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
