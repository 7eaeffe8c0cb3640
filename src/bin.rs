// std imports
use std::fs::read_to_string;
use std::path::PathBuf;

// 3rd party imports
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info, Level};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// internal imports
use clipper::configuration::AnnotationConfiguration;
use clipper::pipeline::AnnotationPipeline;

/// Target for tracing
///
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum TracingTarget {
    File,
    Terminal,
    All,
}

/// Log rotation values for CLI
///
#[derive(clap::ValueEnum, Clone, Debug)]
enum TracingLogRotation {
    Minutely,
    Hourly,
    Daily,
    Never,
}

impl From<TracingLogRotation> for Rotation {
    fn from(rotation: TracingLogRotation) -> Self {
        match rotation {
            TracingLogRotation::Minutely => Rotation::MINUTELY,
            TracingLogRotation::Hourly => Rotation::HOURLY,
            TracingLogRotation::Daily => Rotation::DAILY,
            TracingLogRotation::Never => Rotation::NEVER,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Annotates a peptide table from Proteome Discoverer or Spectronaut
    ///
    Annotate {
        /// Condition file, one condition per line: `<condition> <channel> [<channel> ...]`
        #[arg(short, long)]
        conditions: Option<PathBuf>,
        /// Path to the configuration file, the default configuration is used if omitted
        #[arg(short = 'p', long)]
        config: Option<PathBuf>,
        /// Output file, default: `<infile>_annotated.<format>` next to the input
        #[arg(short, long)]
        outfile: Option<PathBuf>,
        /// Delimited peptide table (csv, tsv or txt)
        infile: PathBuf,
    },
    /// Prints the default configuration to stdout
    Config {},
}

#[derive(Debug, Parser)]
#[command(name = "clipper")]
struct Cli {
    /// Verbosity level
    /// 0 - Error
    /// 1 - Warn
    /// 2 - Info
    /// 3 - Debug
    /// > 3 - Trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// How to log tracing. Can be used multiple times
    #[arg(short, long, value_enum, action = clap::ArgAction::Append)]
    tracing_target: Vec<TracingTarget>,
    /// Tracing log file. Only used if `file` is set in `tracing_target`.
    #[arg(short, long, default_value = "./logs/clipper.log")]
    file: PathBuf,
    /// Tracing log rotation. Only used if `file` is set in `tracing_target`.
    #[arg(short, long, value_enum, default_value = "never")]
    rotation: TracingLogRotation,
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    //// Set up tracing
    let verbosity = match args.verbose {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(verbosity.into())
        .add_directive("hyper=error".parse()?)
        .add_directive("reqwest=error".parse()?);

    let log_to_terminal = args.tracing_target.is_empty()
        || args.tracing_target.contains(&TracingTarget::Terminal)
        || args.tracing_target.contains(&TracingTarget::All);
    let log_to_file = args.tracing_target.contains(&TracingTarget::File)
        || args.tracing_target.contains(&TracingTarget::All);

    // Tracing layers
    let mut tracing_indicatif_layer = None;
    let mut tracing_terminal_layer = None;
    let mut tracing_file_layer = None;

    // Tracing guards
    let mut _tracing_log_writer_guard = None;

    if log_to_terminal {
        let layer = IndicatifLayer::new()
            .with_span_child_prefix_symbol("\t")
            .with_span_child_prefix_indent("")
            .with_max_progress_bars(20, None);
        tracing_terminal_layer =
            Some(tracing_subscriber::fmt::layer().with_writer(layer.get_stderr_writer()));
        tracing_indicatif_layer = Some(layer);
    }

    if log_to_file {
        let directory = args
            .file
            .parent()
            .map(|parent| parent.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        let file_name = args
            .file
            .file_name()
            .context("Tracing log file has no file name")?;
        let file_appender = RollingFileAppender::new(args.rotation.into(), directory, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        tracing_file_layer = Some(tracing_subscriber::fmt::layer().with_writer(non_blocking));
        _tracing_log_writer_guard = Some(guard);
    }

    tracing_subscriber::registry()
        .with(tracing_terminal_layer)
        .with(tracing_indicatif_layer)
        .with(tracing_file_layer)
        .with(filter)
        .init();

    match args.command {
        Commands::Annotate {
            conditions,
            config,
            outfile,
            infile,
        } => {
            let configuration: AnnotationConfiguration = match config {
                Some(config) => toml::from_str(
                    &read_to_string(&config)
                        .with_context(|| format!("Reading config `{}`", config.display()))?,
                )
                .with_context(|| format!("Deserializing config `{}`", config.display()))?,
                None => AnnotationConfiguration::new(),
            };
            let pipeline = AnnotationPipeline::new(configuration)
                .context("Validating configuration")?;
            info!("Annotating `{}`...", infile.display());
            match pipeline
                .run(&infile, conditions.as_deref(), outfile)
                .await
            {
                Ok(outfile) => info!("Annotation written to `{}`", outfile.display()),
                Err(err) => {
                    error!("{}", err);
                    return Err(err).context("Annotation failed");
                }
            }
        }
        Commands::Config {} => {
            let new_config = AnnotationConfiguration::new();
            println!("{}", toml::to_string_pretty(&new_config)?);
        }
    }

    Ok(())
}
