//! Listen on the default microphone and report each detected utterance.
//!
//! ```text
//! cargo run -p voxgate-core --bin voxgate-listen -- [--config <file.json>] [--seconds <n>]
//! ```

#[cfg(not(feature = "audio-cpal"))]
fn main() {
    eprintln!("voxgate-listen requires the 'audio-cpal' feature");
    std::process::exit(1);
}

#[cfg(feature = "audio-cpal")]
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("voxgate=info")),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("voxgate-listen failed: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(feature = "audio-cpal")]
fn run() -> anyhow::Result<()> {
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    use anyhow::Context;
    use tracing::info;
    use voxgate_core::{audio::default_device_layer, CaptureConfig, CaptureSession};

    const POLL_INTERVAL: Duration = Duration::from_millis(20);

    struct Args {
        config: Option<PathBuf>,
        seconds: u64,
    }

    fn parse_args() -> anyhow::Result<Args> {
        let mut config = None;
        let mut seconds = 30;

        let mut it = std::env::args().skip(1);
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--config" => {
                    let Some(v) = it.next() else {
                        anyhow::bail!("missing value for --config");
                    };
                    config = Some(PathBuf::from(v));
                }
                "--seconds" => {
                    let Some(v) = it.next() else {
                        anyhow::bail!("missing value for --seconds");
                    };
                    seconds = v
                        .parse::<u64>()
                        .with_context(|| format!("invalid value for --seconds: {v}"))?;
                }
                "--help" | "-h" => {
                    println!(
                        "Usage: voxgate-listen [--config <file.json>] [--seconds <n>]"
                    );
                    std::process::exit(0);
                }
                other => anyhow::bail!("unknown argument: {other}"),
            }
        }

        Ok(Args { config, seconds })
    }

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => CaptureConfig::from_json_file(path)?,
        None => CaptureConfig::default(),
    };
    let sample_rate = config.sample_rate as f64;
    let channels = f64::from(config.channels);

    let mut session = CaptureSession::new(config, default_device_layer())?;
    session.initialize()?;
    session.start()?;

    let monitor = session.monitor();
    let deadline = Instant::now() + Duration::from_secs(args.seconds);
    let mut utterances = 0usize;

    info!(seconds = args.seconds, "listening");
    while Instant::now() < deadline {
        if monitor.is_ready_to_process() {
            let audio = monitor.take_all();
            monitor.reset_vad_state();
            utterances += 1;
            info!(
                utterance = utterances,
                samples = audio.len(),
                duration_secs = audio.len() as f64 / (sample_rate * channels),
                "utterance captured"
            );
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    let _ = session.stop();
    let diagnostics = serde_json::to_string(&session.diagnostics())?;
    info!(utterances, %diagnostics, "done");
    Ok(())
}
