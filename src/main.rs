//! Colloquy chat - line-oriented chat loop over stdin
//!
//! Every line is sent as a user turn and run until the model completes.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal;
use tracing::{error, info, warn};

use colloquy::{
    Config, ContentItem, Conversation, Driver, ModelParams, RunMode, RunOptions, VendorClients,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr so replies stay clean on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "colloquy=info".into()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    info!(
        vendor = %config.default_vendor,
        model = %config.default_model,
        "Configuration loaded successfully"
    );

    let clients = VendorClients::from_config(&config)?;

    let mut params = ModelParams::default();
    if let Some(max_tokens) = config.max_output_tokens {
        params = params.with_max_output_tokens(max_tokens);
    }

    let mut driver = Driver::construct(
        &config.default_vendor,
        &config.default_model,
        params,
        Some(Conversation::with_system(config.system_prompt.clone())),
        true,
        &clients,
    )
    .context("Failed to construct driver")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = signal::ctrl_c() => {
                warn!("Received Ctrl+C, exiting");
                break;
            }
        };

        let Some(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let checkpoint = driver.conversation().len();
        driver.add_user_message(vec![ContentItem::text(line)])?;

        match driver
            .run(RunMode::UntilCompletion, RunOptions::default())
            .await
        {
            Ok(text) => {
                stdout.write_all(text.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
            }
            Err(err) => {
                error!(code = err.code(), error = %err, "Turn failed");
                driver.rewind(checkpoint);
                stdout
                    .write_all(format!("error: {}\n", err).as_bytes())
                    .await?;
            }
        }
    }

    info!(turns = driver.assistant_texts().len(), "Chat session ended");
    Ok(())
}
