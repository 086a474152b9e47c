//! Wayfind application binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Install the tracing subscriber
//! 3. Either serve the axum API until Ctrl-C, or answer one question and exit

mod cli;

use clap::Parser;

use wayfind_api::state::AppState;
use wayfind_core::{GuideAnswer, UserLocation, WayfindConfig};
use wayfind_chat::Resolution;
use wayfind_ui::{MapSession, PlaybackAction, SpeechPlan, SpeechPlayback, Transcript};

use cli::{CliArgs, Command};

fn greeting(config: &WayfindConfig) -> String {
    format!(
        "Hello! I'm your {}. Ask me about places to eat, drink or visit nearby.",
        config.guide.assistant_name.to_lowercase()
    )
}

async fn serve(config: WayfindConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::from_config(config)?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
        tracing::info!("Shutdown requested");
    };

    wayfind_api::start_server(state, shutdown).await?;
    Ok(())
}

/// Answer one question the way the chat panel would, then print the
/// answer, its speech chunks and the places it found.
async fn ask(
    config: WayfindConfig,
    location: UserLocation,
    radius: Option<u32>,
    question: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let radius = radius.unwrap_or(config.guide.default_radius_m);
    let voice = config.voice.clone();
    let state = AppState::from_config(config)?;

    let mut transcript = Transcript::with_greeting(greeting(&state.config));
    let conversation = transcript
        .begin_request(question)
        .ok_or("question cannot be empty")?;

    let resolution = state
        .orchestrator
        .resolve(&conversation, &location, radius)
        .await;

    let answer: GuideAnswer = match resolution {
        Resolution::Answered(answer) => {
            transcript.complete(&answer);
            answer
        }
        Resolution::Failed(err) => {
            transcript.fail();
            if let Some(turn) = transcript.last() {
                println!("{}", turn.content);
            }
            return Err(err.into());
        }
    };

    println!("{}", answer.content);

    let mut playback = SpeechPlayback::default();
    for action in playback.announce(SpeechPlan::from_answer(&answer.content, &voice)) {
        if let PlaybackAction::Speak(plan) = action {
            if plan.len() > 1 {
                println!();
                for (i, chunk) in plan.texts().iter().enumerate() {
                    println!("  [{}] {}", i + 1, chunk);
                }
            }
        }
    }

    let mut map = MapSession::new(location.latitude, location.longitude, radius);
    map.show_poi(&answer.poi);
    if !map.markers().is_empty() {
        println!();
        let ids: Vec<String> = map.markers().iter().map(|m| m.id.clone()).collect();
        for id in ids {
            if let Some(route) = map.select_marker(&id) {
                let (lat, lon) = route.to;
                println!("  {} ({:.5}, {:.5}) {}", id, lat, lon, route.distance);
            }
        }
        map.clear_route();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing so the file can pick the log level.
    let config_file = args.resolve_config_path();
    let loaded = if config_file.exists() {
        Some(WayfindConfig::load(&config_file))
    } else {
        None
    };
    let mut config = match &loaded {
        Some(Ok(config)) => config.clone(),
        _ => WayfindConfig::default(),
    };
    let directive = args.resolve_log_filter(&config.general.log_level);
    if let Some(level) = args.resolve_log_level() {
        config.general.log_level = level;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&directive)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting Wayfind v{}", env!("CARGO_PKG_VERSION"));
    match loaded {
        Some(Ok(_)) => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Some(Err(e)) => {
            tracing::warn!(path = %config_file.display(), error = %e, "Invalid configuration, using defaults")
        }
        None => tracing::info!(path = %config_file.display(), "No configuration file, using defaults"),
    }

    config.server.port = args.resolve_port(config.server.port);

    match args.command {
        None | Some(Command::Serve) => serve(config).await,
        Some(Command::Ask {
            lat,
            lon,
            radius,
            city,
            question,
        }) => {
            let mut location = UserLocation::new(lat, lon);
            if let Some(city) = city {
                location = location.with_label(city);
            }
            ask(config, location, radius, &question).await
        }
    }
}
