use std::sync::Arc;

use clap::Parser;
use log::info;
use tarot_reading::{ask, cli, config, error, gemini, server};
use cli::{Cli, Commands};
use config::Config;
use error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let config = Config::load()?;

    match cli.command {
        Commands::Serve { bind, model, static_dir } => {
            let mut config = config;
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if let Some(model) = model {
                config.model = model;
            }
            if static_dir.is_some() {
                config.static_dir = static_dir;
            }

            // APIキーがなければ起動しない
            let api_key = config.api_key()?;
            let client = gemini::GeminiClient::new(api_key, config.model.clone());
            info!("model: {}", client.model());

            server::serve(&config, Arc::new(client)).await?;
        }

        Commands::Ask { server, question, images } => {
            ask::run_interactive_reading(&server, question, images).await?;
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  モデル: {}", config.model);
                println!("  待ち受け: {}", config.bind);
                println!("  ボディ上限: {} bytes", config.body_limit_bytes);
                println!(
                    "  Webアプリ: {}",
                    config.static_dir.as_ref().map(|d| d.display().to_string()).unwrap_or_else(|| "なし".into())
                );
                println!("  APIキー: {}", if config.api_key().is_ok() { "設定済み" } else { "未設定" });
            }
        }
    }

    Ok(())
}
