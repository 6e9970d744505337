use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use dir_janitor::{run_scheduler, AppConfig, Configuration, SchedulerOptions};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, Level};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let matches = Command::new("dir-janitor")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Polls a directory tree and moves matching files to a destination directory")
        .arg(
            Arg::new("config-dir")
                .value_name("CONFIG_DIR")
                .help("Directory containing parameters.conf")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Set the log level (trace, debug, info, warn, error)")
                .default_value("info"),
        )
        .arg(
            Arg::new("skip-dir")
                .long("skip-dir")
                .value_name("NAME")
                .help("Directory name whose subtree is never scanned (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("max-cycles")
                .long("max-cycles")
                .value_name("N")
                .help("Stop after N scan cycles instead of polling forever"),
        )
        .get_matches();

    let config = create_app_config(&matches)?;

    // .env first so RUST_LOG from it reaches the subscriber
    let env_loaded = load_environment_variables();

    initialize_logging(&config.log_level)?;

    if !env_loaded {
        debug!("No .env file found, using system environment variables");
    }

    run_application(config).await
}

/// Pure function to create application configuration from CLI arguments
fn create_app_config(matches: &clap::ArgMatches) -> Result<AppConfig> {
    let config_dir = matches
        .get_one::<PathBuf>("config-dir")
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Missing configuration directory"))?;

    let log_level = matches
        .get_one::<String>("log-level")
        .cloned()
        .unwrap_or_else(|| "info".to_string());

    let skip_dirs: Vec<String> = matches
        .get_many::<String>("skip-dir")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let max_cycles = matches
        .get_one::<String>("max-cycles")
        .map(|value| value.parse::<u64>())
        .transpose()
        .map_err(|_| anyhow::anyhow!("Invalid max-cycles value"))?;

    Ok(AppConfig {
        config_dir,
        scheduler: SchedulerOptions {
            skip_dirs,
            max_cycles,
        },
        log_level,
    })
}

/// Initialize structured logging with tracing
fn initialize_logging(log_level: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

/// Load a `.env` file if there is one
fn load_environment_variables() -> bool {
    dotenvy::dotenv().is_ok()
}

/// Load parameters.conf once, then poll until Ctrl-C or the cycle limit
async fn run_application(config: AppConfig) -> Result<()> {
    info!("Starting dir-janitor");
    info!("Configuration directory: {:?}", config.config_dir);

    let parameters = Arc::new(Configuration::load(&config.config_dir));
    info!("Parameters: {:#?}", parameters);

    if parameters.active_rules().is_empty() {
        info!("No prefix or extension configured, scan cycles will not move anything");
    }

    let token = CancellationToken::new();
    let shutdown = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested, finishing current cycle");
                shutdown.cancel();
            }
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    let summary = run_scheduler(parameters, config.scheduler, token).await;

    info!("=== FINAL SUMMARY ===");
    info!("Cycles run: {}", summary.cycles);
    info!("Matches: {}", summary.matches);
    info!("Files moved: {}", summary.relocated);
    info!("Destinations replaced: {}", summary.retried);
    info!("Files abandoned: {}", summary.abandoned);
    info!("Success rate: {:.2}%", summary.success_rate() * 100.0);

    if summary.failed_cycles > 0 {
        error!("Scan cycles that failed: {}", summary.failed_cycles);
    }

    Ok(())
}
