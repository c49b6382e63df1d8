use anyhow::Result;
use clap::Parser;
use pic_bot::bot::telegram;
use pic_bot::config::{self, Config};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "pic-bot")]
#[command(about = "Telegram bot generating images with YandexART")]
struct CliArgs {
    /// Dotenv file to load instead of `./.env`.
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,
}

fn init_tracing() -> Result<()> {
    let file_layer = match std::env::var_os(config::LOG_FILE) {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pic_bot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    // The env file may carry LOG_FILE, so load it before logging starts.
    let loaded = config::load_env_file(args.env_file.as_deref());
    init_tracing()?;

    info!("Starting pic-bot");
    if let Err(e) = loaded {
        error!("{}", e);
        std::process::exit(1);
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = telegram::run(config).await {
        error!("Bot stopped with error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
