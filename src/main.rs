use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;

use vibecheck::debug::DebugConfig;
use vibecheck::{Analyzer, AnalyzerConfig, DetectorState, EarphoneDetector, Response};

#[derive(Parser)]
#[command(name = "vibecheck", version)]
#[command(about = "Score a camera frame for aesthetic props and suggest what is missing")]
struct Cli {
    /// Image file, or a text file holding a data URL / base64 payload with --data-url
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Treat INPUT as a data-URL (or bare base64) text payload
    #[arg(long)]
    data_url: bool,

    /// Detection model in .rten format (overrides config and VIBECHECK_MODEL_PATH)
    #[arg(long, value_name = "PATH")]
    model: Option<PathBuf>,

    /// TOML config file
    #[arg(long, value_name = "PATH", env = "VIBECHECK_CONFIG")]
    config: Option<PathBuf>,

    /// Save heuristic debug images to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Pretty-print the JSON response
    #[arg(long)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut config = AnalyzerConfig::load(args.config.as_deref())?;
    if let Some(model) = args.model {
        config.model_path = Some(model);
    }
    if let Some(dir) = args.debug_out {
        config.debug_dir = Some(dir);
    }
    config.validate()?;

    // Load model once
    let state = DetectorState::load(&config);
    info!("Detection ready: {}", state.is_ready());

    let mut earphones = EarphoneDetector::new();
    if let Some(dir) = &config.debug_dir {
        earphones = earphones.with_debug(DebugConfig::new(dir)?);
    }
    let analyzer = Analyzer::new(state).with_earphone_detector(earphones);

    let input = std::fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let result = if args.data_url {
        analyzer.analyze_payload(&input)
    } else {
        analyzer.analyze_image_bytes(&input)
    };

    let (response, ok) = match result {
        Ok(record) => (Response::success(record), true),
        Err(e) => {
            log::error!("Detection error: {}", e);
            (Response::failure(&e, analyzer.is_ready()), false)
        }
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{}", json);

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
