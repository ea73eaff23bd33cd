use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use talkbridge::orchestrator::{Capabilities, Orchestrator, OrchestratorConfig, SlotConfig};
use talkbridge::session::{EventTransport, LocalTransport, NatsTransport, Participant, SessionBus};
use talkbridge::{AppState, Config, ConsolePlayback, PassthroughTranslator, TypedCapture};
use tracing::info;

/// Live conversation translation service
#[derive(Debug, Parser)]
#[command(name = "talkbridge", version)]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(long, default_value = "config/talkbridge")]
    config: String,

    /// Shared session to join on startup
    #[arg(long)]
    session: Option<String>,

    /// Display name announced to other participants
    #[arg(long, default_value = "talkbridge")]
    name: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} starting", cfg.service.name);

    // Headless capability set: typed text in, narrated playback out.
    // A platform build swaps these for real recognizer/synthesizer/
    // provider implementations.
    let typed = Arc::new(TypedCapture::new());
    let capabilities = Capabilities {
        capture: typed.clone(),
        translator: Arc::new(PassthroughTranslator),
        synthesis: Arc::new(ConsolePlayback::new()),
    };

    let orchestrator_config = OrchestratorConfig {
        slots: vec![
            SlotConfig {
                id: "A".to_string(),
                language: cfg.conversation.slot_a_language.clone(),
            },
            SlotConfig {
                id: "B".to_string(),
                language: cfg.conversation.slot_b_language.clone(),
            },
        ],
        error_display: Duration::from_secs(cfg.conversation.error_display_secs),
        translate_timeout: Duration::from_secs(cfg.conversation.translate_timeout_secs),
    };

    let local = Participant {
        id: uuid::Uuid::new_v4().to_string(),
        display_name: args.name.clone(),
        preferred_language: cfg.conversation.slot_a_language.clone(),
    };

    let orchestrator = Orchestrator::new(capabilities, orchestrator_config, local);

    if let Some(session_id) = &args.session {
        let transport: Arc<dyn EventTransport> = match cfg.session.transport.as_str() {
            "nats" => Arc::new(
                NatsTransport::connect(&cfg.session.nats_url, cfg.session.subject.clone()).await?,
            ),
            _ => Arc::new(LocalTransport::new()),
        };
        let bus = SessionBus::start(transport).await?;
        orchestrator.join_session(bus, session_id.clone()).await?;
    }

    let state = AppState::new(orchestrator.clone(), typed);
    let app = talkbridge::create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    orchestrator.leave_session().await?;
    info!("{} stopped", cfg.service.name);

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
