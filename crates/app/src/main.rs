mod shell;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use services::{
    Clock, FileFrameSource, FrameSource, HttpIntelligenceService, NoFrameSource, TutorConfig,
    TutorSession,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use shell::{Shell, TerminalPlayer};

const DEFAULT_DURATION_SECS: f64 = 600.0;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDuration { raw: String },
    InvalidApiUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDuration { raw } => write!(f, "invalid --duration value: {raw}"),
            ArgsError::InvalidApiUrl { raw } => write!(f, "invalid --api value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  tutor [--api <base_url>] [--frame <image_path>] [--duration <seconds>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --api http://localhost:5000");
    eprintln!("  --duration {DEFAULT_DURATION_SECS}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TUTOR_API_BASE_URL, TUTOR_REQUEST_TIMEOUT_SECS, TUTOR_DEFAULT_FRAME_DELAY_MS,");
    eprintln!("  TUTOR_CHECKPOINT_TOLERANCE, TUTOR_LOG_JSON, RUST_LOG");
}

struct Args {
    api: Option<String>,
    frame: Option<PathBuf>,
    duration: f64,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            api: None,
            frame: None,
            duration: DEFAULT_DURATION_SECS,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api" => {
                    let value = require_value(args, "--api")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidApiUrl { raw: value });
                    }
                    parsed.api = Some(value);
                }
                "--frame" => {
                    parsed.frame = Some(PathBuf::from(require_value(args, "--frame")?));
                }
                "--duration" => {
                    let value = require_value(args, "--duration")?;
                    let duration: f64 = value
                        .parse()
                        .ok()
                        .filter(|d: &f64| d.is_finite() && *d > 0.0)
                        .ok_or_else(|| ArgsError::InvalidDuration { raw: value.clone() })?;
                    parsed.duration = duration;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    std::env::var(name).map_or(default, |value| {
        matches!(value.trim(), "1" | "true" | "TRUE" | "yes" | "on")
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("TUTOR_LOG_JSON", false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let mut config = TutorConfig::from_env()?;
    if let Some(api) = args.api {
        config = config.with_base_url(api);
    }
    tracing::info!(
        api = %config.base_url,
        tolerance = config.checkpoint_tolerance,
        "starting tutor shell"
    );

    let service = Arc::new(HttpIntelligenceService::new(&config)?);
    let frames: Arc<dyn FrameSource> = match args.frame {
        Some(path) => Arc::new(FileFrameSource::new(path)),
        None => Arc::new(NoFrameSource),
    };
    let player = Arc::new(TerminalPlayer::default());
    let tutor = TutorSession::new(
        &config,
        Clock::system(),
        service,
        frames,
        player.clone(),
    );

    Shell::new(tutor, player, args.duration).run().await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
