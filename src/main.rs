use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use voxstream_core::SpeechSettings;
use voxstream_recognizer::{BackendRegistry, RecognitionSession, SessionEnd};

mod printer;

#[derive(Parser)]
#[command(
    name = "voxstream",
    about = "Streams a local audio file to a speech service and prints recognition events"
)]
struct Cli {
    /// Path to the audio file to transcribe
    #[arg(default_value = "aboutSpeechSdk.wav")]
    file: PathBuf,

    /// Recognition backend ("azure" or "null")
    #[arg(short, long, default_value = "azure")]
    backend: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env before reading settings; missing file is fine
    dotenvy::dotenv().ok();

    init_tracing()?;

    tracing::info!("voxstream starting");

    let settings = SpeechSettings::from_env();
    if !settings.is_complete() {
        tracing::warn!(
            "speech settings incomplete; set SPEECH_SUBSCRIPTION_KEY, SPEECH_REGION and \
             SPEECH_LANGUAGE (the service rejects empty credentials)"
        );
    }

    let registry = BackendRegistry::new();
    let backend = registry
        .create(&cli.backend, &settings)
        .with_context(|| format!("failed to create backend '{}'", cli.backend))?;

    let audio = voxstream_audio::open_push_stream(&cli.file)
        .await
        .with_context(|| format!("failed to open audio file {:?}", cli.file))?;
    tracing::info!("streaming {:?} via '{}' backend", cli.file, cli.backend);

    let mut session = RecognitionSession::new(backend, audio);
    let stop = session.handle();

    // Event handlers print to stdout; diagnostics stay on stderr
    session.on_recognizing(|e| println!("{}", printer::recognizing_line(e)));
    session.on_recognized(|e| println!("{}", printer::recognized_line(e)));
    session.on_canceled(|e| println!("{}", printer::canceled_line(e)));
    session.on_session_started(|e| println!("{}", printer::session_started_line(e)));
    session.on_session_stopped(|e| println!("{}", printer::session_stopped_line(e)));
    session.on_speech_start_detected(|e| println!("{}", printer::speech_start_line(e)));
    session.on_speech_end_detected(move |e| {
        println!("{}", printer::speech_end_line(e));
        // Speech end is the one normal termination path
        stop.request_stop();
    });

    session
        .start()
        .await
        .context("failed to start continuous recognition")?;
    println!("START");

    match session.run().await {
        SessionEnd::StopRequested => tracing::info!("recognition stopped"),
        SessionEnd::EventsExhausted => {
            tracing::warn!("event stream ended without a stop request");
        }
    }

    Ok(())
}

/// Install the global tracing subscriber: stderr writer, no ANSI, verbosity
/// from `RUST_LOG` with an `info` default.
fn init_tracing() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;
    Ok(())
}
