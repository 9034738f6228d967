use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use clap::Subcommand;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use wordclockd::Config;
use wordclockd::Engine;
use wordclockd::LogLevel;

/// Expose the extra words of AWSW word clocks as switches
#[derive(Debug, Parser)]
#[command(name = "wordclockd", version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "wordclockd.toml")]
    config: PathBuf,

    /// Override the log level from the configuration file
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the word table of a language (or of every language) and exit
    #[cfg(feature = "integration_wordclock")]
    Words {
        /// Language edition, e.g. "English"
        language: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        #[cfg(feature = "integration_wordclock")]
        Some(Command::Words { language }) => return print_words(language.as_deref()),
        None => {}
    }

    let config = Config::from_file(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(config.logging.targets(cli.log_level))
        .init();

    tracing::info!("wordclockd starting");
    tracing::info!("Loaded config from: {}", cli.config.display());

    let engine = Arc::new(Engine::new());
    engine.register_integrations_from_config(&config);

    let runner = {
        let engine = engine.clone();
        tokio::spawn(async move {
            if let Err(e) = engine.run().await {
                tracing::error!("Engine stopped: {}", e);
            }
        })
    };

    let api = config.api.clone().map(|api| {
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let engine = engine.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = wordclockd::api::serve(api.listen, api.port, engine, shutdown_rx).await
            {
                tracing::error!("HTTP API server failed: {:#}", e);
            }
        });
        (shutdown_tx, handle)
    });

    tracing::info!("All integrations started, entering main loop");

    // Wait for Ctrl+C
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received shutdown signal");
        }
        Err(e) => {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
        }
    }

    if let Some((shutdown_tx, handle)) = api {
        shutdown_tx.send(()).ok();
        handle.await.ok();
    }

    tracing::info!("Shutting down integrations...");
    engine.shutdown().await;
    runner.abort();

    tracing::info!("wordclockd shutdown complete");

    Ok(())
}

#[cfg(feature = "integration_wordclock")]
fn print_words(language: Option<&str>) -> anyhow::Result<()> {
    use strum::IntoEnumIterator;
    use wordclockd::integrations::wordclock::Language;

    let languages: Vec<Language> = match language {
        Some(name) => vec![name
            .parse()
            .map_err(|_| anyhow::anyhow!("Unknown language '{}'", name))?],
        None => Language::iter().collect(),
    };

    for language in languages {
        println!("{}", language);
        for (word_id, label) in language.words() {
            println!("  {:>2}  {}", word_id, label);
        }
    }

    Ok(())
}
