use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vaidya_app::{
    cli::{Cli, Command},
    commands,
    config::Config,
    open_persist,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::load(&cli.config_dir)
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    if let Command::Config = cli.command {
        return commands::show_config(&config);
    }

    tracing::debug!(data_dir = %config.storage.data_dir.display(), "Opening storage");
    let persist = open_persist(&config).await?;

    match cli.command {
        Command::Ask { query, html } => {
            commands::ask(&config, persist, &query.join(" "), html).await
        }
        Command::History(command) => commands::history(&persist, command).await,
        Command::Appointments(command) => commands::appointments(&persist, command).await,
        Command::Feedback(args) => commands::feedback(&persist, args).await,
        Command::Config => commands::show_config(&config),
    }
}

/// Logs go to stderr; stdout carries command output.
fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }
}
