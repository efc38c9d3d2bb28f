use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use declmap::config::{ConfigError, LoggingSettings, Settings};
use declmap::driver::{collect_inputs, map_ast_json, map_file};
use declmap::export::{ModelSnapshot, snapshots_to_json};

#[derive(Parser, Debug)]
#[command(name = "declmap", version, about)]
struct Args {
    /// Header or source files, or directories to scan for them.
    #[arg(required_unless_present = "ast_json")]
    inputs: Vec<PathBuf>,

    /// Explicit settings file instead of searching for `declmap.toml`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra include directory (repeatable).
    #[arg(long = "include", short = 'I', value_name = "DIR")]
    include: Vec<String>,

    /// Clang executable.
    #[arg(long)]
    clang: Option<String>,

    /// Map a pre-generated `clang -Xclang -ast-dump=json` output instead of running clang.
    #[arg(long, value_name = "FILE")]
    ast_json: Option<PathBuf>,

    /// Write the JSON model here instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,

    #[arg(long)]
    max_alias_depth: Option<usize>,

    /// Record methods and their parameters.
    #[arg(long)]
    model_methods: bool,

    #[arg(long, short)]
    verbose: bool,

    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn load_settings(args: &Args) -> Result<(Settings, Option<PathBuf>), ConfigError> {
    let (mut settings, path) = match &args.config {
        Some(path) => (Settings::load(path)?, Some(path.clone())),
        None => {
            let start = args.inputs.first().or(args.ast_json.as_ref()).cloned().unwrap_or_else(|| PathBuf::from("."));
            Settings::discover(&start)?
        },
    };

    settings.compiler.include_paths.extend(args.include.iter().cloned());
    if let Some(clang) = &args.clang {
        settings.compiler.clang.clone_from(clang);
    }
    if let Some(depth) = args.max_alias_depth {
        settings.mapper.max_alias_depth = depth;
    }
    if args.model_methods {
        settings.mapper.model_methods = true;
    }
    settings.normalize();
    Ok((settings, path))
}

fn init_logging(
    args: &Args,
    logging: &LoggingSettings,
) {
    let directive = if args.verbose {
        "declmap=debug".to_string()
    } else {
        logging.level.filter_directive()
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_filter(EnvFilter::new(&directive));

    let file_layer = args.log_file.as_ref().map(|log_path| {
        let file_appender = tracing_appender::rolling::never(
            log_path.parent().unwrap_or(Path::new(".")),
            log_path.file_name().unwrap_or(std::ffi::OsStr::new("declmap.log")),
        );
        fmt::layer()
            .with_writer(file_appender)
            .with_ansi(false)
            .with_target(false)
            .with_filter(EnvFilter::new(&directive))
    });

    tracing_subscriber::registry().with(file_layer).with(stderr_layer).init();
}

async fn run(
    args: &Args,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut snapshots: Vec<ModelSnapshot> = Vec::new();

    if let Some(dump) = &args.ast_json {
        let input = args.inputs.first().map_or(dump.as_path(), PathBuf::as_path);
        snapshots.push(map_ast_json(dump, input, settings).await?);
    } else {
        let files = collect_inputs(&args.inputs);
        if files.is_empty() {
            warn!("no C/C++ inputs found");
        }
        for file in &files {
            snapshots.push(map_file(file, settings).await?);
        }
    }

    let json = snapshots_to_json(&snapshots)?;
    match &args.output {
        Some(path) => {
            tokio::fs::write(path, json + "\n").await?;
            info!("model written to {}", path.display());
        },
        None => println!("{json}"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let (settings, config_path) = match load_settings(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("declmap: {e}");
            return ExitCode::FAILURE;
        },
    };

    init_logging(&args, &settings.logging);
    info!("declmap v{}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = config_path {
        info!("settings loaded from {}", path.display());
    }

    match run(&args, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        },
    }
}
