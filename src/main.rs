use clap::Parser;
use resume_builder::cli::{handle_command, Cli, RED, RESET};
use resume_builder::core::config_manager::{load_dotenv, ConfigManager};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "resume_builder=info,rocket=warn";

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var("RESUME_BUILDER_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(false)
                    .with_span_list(false),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .init();
    }
}

#[tokio::main]
async fn main() {
    init_logging();
    load_dotenv();

    let cli = Cli::parse();

    let result = match ConfigManager::load() {
        Ok(config) => handle_command(cli, config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("{}Error: {:#}{}", RED, e, RESET);
        std::process::exit(1);
    }
}
