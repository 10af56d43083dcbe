//! Noteism - Markdown preview renderer
//!
//! Entry point for the command line tool. Handles CLI argument parsing,
//! logging initialization, and rendering a document to standalone HTML,
//! optionally re-rendering whenever the file changes.

use anyhow::{bail, Context};
use noteism::config::Config;
use noteism::file_handler::{FileWatcher, WatchEvent};
use noteism::markdown::{self, PreviewCoordinator, PreviewStatus, StyleCatalog};
use noteism::state::{SessionId, SessionRegistry};
use noteism::utils;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Application name for logging
const APP_NAME: &str = "noteism";

/// How often watch mode checks for file and preview work
const WATCH_TICK_MS: u64 = 50;

/// Parsed command line
#[derive(Debug, Default)]
struct CliArgs {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    style: Option<String>,
    watch: bool,
    list_styles: bool,
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let args = parse_args();

    if args.list_styles {
        for name in StyleCatalog::names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let Some(input) = args.input else {
        eprintln!("Error: no input file given");
        eprintln!("Use --help for usage information");
        std::process::exit(1);
    };

    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Could not load configuration, using defaults: {}", e);
        Config::default()
    });

    if !utils::path::is_markdown(&input) {
        log::warn!("{} does not have a markdown extension", input.display());
    }

    let output = args
        .output
        .unwrap_or_else(|| markdown::suggest_output_path(&input));
    let style = args.style.unwrap_or_else(|| config.preview.style.clone());

    let mut registry = SessionRegistry::from_config(&config.files, Instant::now());
    let placeholder = registry.active_id();
    let id = registry
        .open(&input)
        .map_err(|e| anyhow::anyhow!(e.user_message()))
        .with_context(|| format!("Failed to open {}", input.display()))?
        .id;
    registry.close(placeholder, None)?;

    let mut preview = PreviewCoordinator::from_config(&config);
    preview.attach(&mut registry);

    if let PreviewStatus::Failed(e) = preview.set_active_style(style, &registry) {
        bail!("Failed to render {}: {}", input.display(), e);
    }
    write_output(&preview, &output)?;

    if args.watch {
        run_watch(registry, preview, id, &output, config.preview.debounce_ms)?;
    }

    Ok(())
}

/// Initialize the logging system
fn init_logging() {
    // Set default log level if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info,noteism=debug");
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();
}

/// Write the current preview document to `output`
fn write_output(preview: &PreviewCoordinator, output: &Path) -> anyhow::Result<()> {
    let Some(document) = preview.current() else {
        bail!("Nothing has been rendered yet");
    };

    if document.style_substituted {
        log::warn!(
            "Style '{}' is unknown; rendered with {}",
            preview.active_style_name(),
            document.style_name
        );
    }

    markdown::export_html_file(document, output)
        .with_context(|| format!("Failed to write {}", output.display()))
}

/// Keep the output in sync with the input file until interrupted
fn run_watch(
    mut registry: SessionRegistry,
    mut preview: PreviewCoordinator,
    id: SessionId,
    output: &Path,
    debounce_ms: u64,
) -> anyhow::Result<()> {
    let input = registry
        .get(id)
        .and_then(|s| s.path())
        .map(Path::to_path_buf)
        .context("Watched session has no file")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    runtime.block_on(async move {
        let mut watcher = FileWatcher::new(debounce_ms)?;
        watcher.watch(&input)?;
        log::info!("Watching {} (Ctrl+C to stop)", input.display());

        let mut ticker = tokio::time::interval(Duration::from_millis(WATCH_TICK_MS));
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    log::info!("Stopping watch");
                    break;
                }
                _ = ticker.tick() => {
                    for event in watcher.poll() {
                        match event {
                            WatchEvent::FileModified(_) => {
                                if let Err(e) = registry.reload_from_disk(id) {
                                    log::warn!("Reload failed: {}", e.user_message());
                                }
                            }
                            WatchEvent::FileDeleted(path) => {
                                log::warn!("{} was deleted; keeping last render", path.display());
                            }
                            WatchEvent::Error(message) => {
                                log::warn!("Watcher error: {}", message);
                            }
                        }
                    }

                    match preview.poll(&registry, Instant::now()) {
                        PreviewStatus::Rendered => {
                            if let Err(e) = write_output(&preview, output) {
                                log::error!("{:#}", e);
                            }
                        }
                        PreviewStatus::Failed(e) => log::warn!("Keeping last render: {}", e),
                        PreviewStatus::Idle => {}
                    }
                }
            }
        }

        Ok::<(), anyhow::Error>(())
    })
}

/// Parse command line arguments
fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-s" | "--style" => {
                if i + 1 < args.len() {
                    cli.style = Some(args[i + 1].clone());
                    i += 1;
                } else {
                    eprintln!("Error: --style requires a style name");
                    std::process::exit(1);
                }
            }
            "-o" | "--output" => {
                if i + 1 < args.len() {
                    cli.output = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --output requires a path argument");
                    std::process::exit(1);
                }
            }
            "-w" | "--watch" => cli.watch = true,
            "--list-styles" => cli.list_styles = true,
            arg if arg.starts_with('-') => {
                eprintln!("Unknown option: {}", arg);
                eprintln!("Use --help for usage information");
                std::process::exit(1);
            }
            _ => {
                if cli.input.is_some() {
                    eprintln!("Error: only one input file is supported");
                    std::process::exit(1);
                }
                cli.input = Some(PathBuf::from(&args[i]));
            }
        }
        i += 1;
    }

    cli
}

/// Print help message
fn print_help() {
    println!(
        r#"Noteism - Markdown preview renderer

USAGE:
    noteism [OPTIONS] FILE

OPTIONS:
    -h, --help          Show this help message
    -v, --version       Show version information
    -s, --style NAME    Preview style (see --list-styles)
    -o, --output PATH   Output file (default: FILE with .html extension)
    -w, --watch         Re-render whenever FILE changes
        --list-styles   List available preview styles

EXAMPLES:
    noteism README.md                       Write README.html
    noteism -s Academic paper.md            Render with the Academic style
    noteism -w notes.md -o /tmp/notes.html  Keep /tmp/notes.html up to date
"#
    );
}

/// Print version information
fn print_version() {
    println!("{} {}", APP_NAME, env!("CARGO_PKG_VERSION"));
}
