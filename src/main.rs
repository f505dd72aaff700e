use std::io::Write;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coach::core::app_state::AppState;
use coach::{ChatMessage, FragmentStream, SquatMetrics};
use futures::StreamExt;
use tracing::{Level, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(
    name = "squat-coach",
    about = "Squat coaching with retrieved tips, streamed from an LLM"
)]
struct Cli {
    /// Log level for the workspace crates (RUST_LOG still wins for the rest)
    #[arg(long, env = "COACH_LOG_LEVEL", default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask the coach a question
    Chat {
        /// Message text
        text: String,

        /// Session name; a fresh session is used when omitted
        #[arg(long)]
        session: Option<String>,
    },
    /// Get feedback on measured squat angles
    Metrics {
        /// Average knee angle in degrees
        #[arg(long)]
        knee: f64,

        /// Average trunk angle in degrees
        #[arg(long)]
        trunk: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the environment may already be set.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(ai_llm_service::telemetry::env_filter_with_level(
            "warn",
            cli.log_level,
        ))
        .with(ai_llm_service::telemetry::layer())
        .init();

    let state = AppState::from_env()
        .await
        .context("failed to initialise the coach")?;
    let coach = state.coach;

    let fragments = match cli.command {
        Command::Chat { text, session } => {
            let session = match session {
                Some(name) => services::stable_uuid(&name).to_string(),
                None => coach.start_session(),
            };
            info!(%session, "chat");
            coach
                .chat_turn(&session, &[ChatMessage::user(text)])
                .await?
        }
        Command::Metrics { knee, trunk } => {
            coach
                .metrics_feedback(SquatMetrics {
                    knee_angle: knee,
                    trunk_angle: trunk,
                })
                .await?
        }
    };

    print_fragments(fragments).await
}

/// Writes fragments to stdout as they arrive.
async fn print_fragments(mut fragments: FragmentStream) -> Result<()> {
    let mut out = std::io::stdout().lock();
    while let Some(fragment) = fragments.next().await {
        let fragment = fragment.context("generation failed")?;
        out.write_all(fragment.as_bytes())?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(())
}
