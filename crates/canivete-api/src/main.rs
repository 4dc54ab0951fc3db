//! canivete-api - Entry point

use std::path::PathBuf;

use anyhow::Context;

use canivete_api::CaniveteConfig;

/// Command-line arguments.
struct Args {
    /// Path to configuration file.
    config: Option<PathBuf>,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut config = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    config = args.next().map(PathBuf::from);
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("canivete-api {}", canivete_api::VERSION);
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown argument: {other}");
                    eprintln!("Use --help for usage information");
                    std::process::exit(1);
                }
            }
        }

        Self { config }
    }
}

fn print_help() {
    println!(
        r"canivete-api - developer utilities over HTTP

USAGE:
    canivete-api [OPTIONS]

OPTIONS:
    -c, --config <PATH>    Path to configuration file (TOML or JSON)
    -h, --help             Print help information
    -v, --version          Print version information

ENVIRONMENT VARIABLES:
    PORT                        Listen port (default: 8080)
    CANIVETE_LISTEN_PORT        Listen port, wins over PORT
    CANIVETE_LISTEN_ADDR        Listen address (default: 0.0.0.0)
    CANIVETE_LOG_LEVEL          Log filter, e.g. info or canivete_api=debug
    CANIVETE_JSON_LOGS          Emit JSON logs (default: true)
    CANIVETE_METRICS            Record Prometheus metrics (default: true)
    CANIVETE_MEDIUM_BASE_URL    Medium origin (default: https://medium.com)
    CANIVETE_REQUEST_TIMEOUT    Timeout for Medium requests, e.g. 10s

EXAMPLES:
    # Run with configuration file
    canivete-api --config /etc/canivete/canivete.toml

    # Run on another port with debug logs
    PORT=3000 CANIVETE_LOG_LEVEL=debug canivete-api
"
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match args.config {
        Some(path) => CaniveteConfig::from_file(&path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => CaniveteConfig::default(),
    }
    .with_env_overrides();

    config.validate().context("invalid configuration")?;

    canivete_api::run(config).await.context("server error")?;
    Ok(())
}
