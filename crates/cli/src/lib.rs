pub mod commands;
pub mod input;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dealscope_core::config::{AppConfig, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "dealscope",
    about = "Sales-pipeline analytics over opportunity and commitment exports",
    long_about = "Join a flat opportunity export against a commitment/action export, unfold \
                  per-performer analytic records, detect coverage gaps, and compute \
                  deduplicated KPIs, funnels, and rankings.",
    after_help = "Examples:\n  dealscope analyze --opportunities opps.json --commitments actions.json\n  dealscope gaps --opportunities opps.json --commitments actions.json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run the full analytics pass and print the report as JSON")]
    Analyze {
        #[arg(long, help = "JSON file with the opportunity export (array of objects)")]
        opportunities: Option<PathBuf>,
        #[arg(long, help = "JSON file with the commitment/action export (array of objects)")]
        commitments: Option<PathBuf>,
        #[arg(long, help = "TOML config file with analytics thresholds")]
        config: Option<PathBuf>,
        #[arg(long, help = "Include the per-performer analytic records in the output")]
        records: bool,
    },
    #[command(about = "Print only the coverage-gap records as JSON")]
    Gaps {
        #[arg(long, help = "JSON file with the opportunity export (array of objects)")]
        opportunities: Option<PathBuf>,
        #[arg(long, help = "JSON file with the commitment/action export (array of objects)")]
        commitments: Option<PathBuf>,
        #[arg(long, help = "TOML config file with analytics thresholds")]
        config: Option<PathBuf>,
    },
}

fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        LogFormat::Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Analyze { opportunities, commitments, config, records } => {
            let app_config = match load_config(config) {
                Ok(config) => config,
                Err(result) => return finish(result),
            };
            init_logging(&app_config);
            commands::analyze::run(commands::analyze::AnalyzeArgs {
                opportunities,
                commitments,
                settings: app_config.analytics,
                include_records: records,
            })
        }
        Command::Gaps { opportunities, commitments, config } => {
            let app_config = match load_config(config) {
                Ok(config) => config,
                Err(result) => return finish(result),
            };
            init_logging(&app_config);
            commands::gaps::run(commands::gaps::GapsArgs {
                opportunities,
                commitments,
                settings: app_config.analytics,
            })
        }
    };

    finish(result)
}

fn load_config(path: Option<PathBuf>) -> Result<AppConfig, commands::CommandResult> {
    let require_file = path.is_some();
    AppConfig::load(LoadOptions { config_path: path, require_file }).map_err(|error| {
        commands::CommandResult::failure("config", "config_validation", error.to_string(), 2)
    })
}

fn finish(result: commands::CommandResult) -> ExitCode {
    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
