use std::process::ExitCode;

use anyhow::Context;
use polyglot_bot::config::BotConfig;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Configuration error: {e}");
            eprintln!("Set TELEGRAM_TOKEN and ZAI_API_KEY in the environment or in a .env file.");
            return Ok(ExitCode::FAILURE);
        }
    };

    polyglot_bot::bot::init_tracing();

    polyglot_bot::run(config)
        .await
        .context("bot terminated with an error")?;
    Ok(ExitCode::SUCCESS)
}
