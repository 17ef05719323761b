//! Command line shell for the Imagen client

use clap::{Parser, Subcommand};
use imagen_client::{
    config::{LoggingConfig, Settings},
    endpoint::DeploymentContext,
    session::{SessionState, StudioEvent},
    Studio,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "imagen", version, about = "Generate images with a local Imagen backend")]
struct Cli {
    /// Host the client is running on; static hosting domains resolve to localhost
    #[arg(long, default_value = "localhost", global = true)]
    host: String,

    /// Configuration file
    #[arg(long, default_value = "config/default.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the resolved backend URL
    Resolve,
    /// List previously generated images
    History,
    /// Generate an image
    Generate {
        /// What to draw
        #[arg(long)]
        subject: String,
        /// Atmosphere or style; defaults to the configured mood
        #[arg(long)]
        mood: Option<String>,
    },
    /// Show a previously generated image by its position in the history
    Select { index: usize },
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "pretty" {
        registry.with(fmt::layer().pretty().with_writer(std::io::stderr)).init();
    } else {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::load_from_path(&cli.config)?;
    init_tracing(&settings.logging);

    let studio = Studio::new(settings, DeploymentContext::new(cli.host))?;
    info!(endpoint = %studio.endpoint(), "Resolved backend endpoint");

    match cli.command {
        Command::Resolve => {
            println!("{}", studio.endpoint());
        }
        Command::History => {
            for (index, entry) in studio.history_listing().await.iter().enumerate() {
                println!("{:>4}  {}", index, entry);
            }
        }
        Command::Generate { subject, mood } => {
            if subject.is_empty() {
                anyhow::bail!("--subject must not be empty");
            }

            let mut events = studio.subscribe();
            studio.activate().await;

            let state = match mood {
                Some(mood) => studio.controller.submit(&subject, &mood).await?,
                None => studio.submit_with_default_mood(&subject).await?,
            };

            while let Ok(event) = events.try_recv() {
                if let StudioEvent::Notify(notification) = event {
                    eprintln!("{}", notification.message);
                }
            }

            match state {
                SessionState::Succeeded(result) => println!("{}", result.image_url),
                SessionState::Failed(reason) => anyhow::bail!("Generation failed: {:?}", reason),
                other => anyhow::bail!("Unexpected session state: {:?}", other),
            }
        }
        Command::Select { index } => {
            studio.activate().await;
            let entry = studio.history.select_index(index)?;
            println!("{}", entry);
        }
    }

    Ok(())
}
