//! Screen Navigator
//!
//! Command-line front end: inspect the screen catalog, plan paths, and on
//! Windows detect the current screen or drive the game to a target screen.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use screen_navigator::config::{load_config, NavigatorConfig};
use screen_navigator::navigator::{find_path, load_or_default, ScreenGraph};
use screen_navigator::perception::DetectionRules;
use screen_navigator::{log, paths};

#[derive(Parser)]
#[command(name = "screen-navigator", about = "Drive a game client between its UI screens")]
struct Cli {
    /// Path to config.json (defaults to the one next to the executable)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List screens and their transitions
    Screens,
    /// Print the planned path between two screens
    Path { from: String, to: String },
    /// Capture the game window once and print the detected screen
    Detect,
    /// Navigate the game to TARGET
    Goto { target: String },
}

fn main() {
    install_panic_hook();

    if let Err(e) = run() {
        log(&format!("Error: {:#}", e));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    paths::ensure_directories().context("Failed to create output directories")?;
    let config = load_config(cli.config.as_deref());
    let catalog = load_or_default(config.catalog_path.as_deref(), &config.bot_name)?;
    let (graph, rules) = catalog.build()?;

    match cli.command {
        Commands::Screens => {
            print_screens(&graph);
            Ok(())
        }
        Commands::Path { from, to } => print_path(&graph, &from, &to),
        Commands::Detect => detect(&config, rules),
        Commands::Goto { target } => goto(&config, graph, rules, &target),
    }
}

fn print_screens(graph: &ScreenGraph) {
    for id in graph.ids() {
        println!("{}", graph.name(id));
        for t in graph.transitions(id) {
            println!("  {} -> {}: {}", t.trigger, graph.name(t.target), t.action);
        }
    }
}

fn print_path(graph: &ScreenGraph, from: &str, to: &str) -> Result<()> {
    let source = graph
        .lookup(from)
        .ok_or_else(|| anyhow!("unknown screen '{}'", from))?;
    let target = graph
        .lookup(to)
        .ok_or_else(|| anyhow!("unknown screen '{}'", to))?;

    let path = find_path(graph, source, target)
        .ok_or_else(|| anyhow!("no path from {} to {}", from, to))?;
    println!("{}", graph.describe_path(&path));
    Ok(())
}

#[cfg(windows)]
mod live {
    use anyhow::Result;
    use std::time::Duration;

    use screen_navigator::capture::{GameWindow, WindowCapture};
    use screen_navigator::config::NavigatorConfig;
    use screen_navigator::input::SendInputDriver;
    use screen_navigator::ocr::{find_tesseract, TesseractRecognizer};
    use screen_navigator::paths;
    use screen_navigator::perception::Perception;

    pub fn init() -> Result<()> {
        unsafe {
            windows::Win32::System::WinRT::RoInitialize(
                windows::Win32::System::WinRT::RO_INIT_MULTITHREADED,
            )?
        };
        Ok(())
    }

    pub fn window(config: &NavigatorConfig) -> GameWindow {
        GameWindow::new(
            config.window_title.as_str(),
            Duration::from_millis(config.focus_settle_ms),
        )
    }

    pub fn perception(config: &NavigatorConfig) -> Result<Perception> {
        let tesseract = find_tesseract(config.ocr.tesseract_path.as_deref())?;
        let recognizer = TesseractRecognizer::new(tesseract, config.ocr.clone());
        let perception = Perception::new(
            Box::new(WindowCapture::new(window(config))),
            Box::new(recognizer),
        );
        Ok(if config.debug_snapshots || config.save_every_frame {
            perception.with_snapshots(paths::get_debug_dir(), config.save_every_frame)
        } else {
            perception
        })
    }

    pub fn input() -> SendInputDriver {
        SendInputDriver::new()
    }
}

#[cfg(windows)]
fn detect(config: &NavigatorConfig, rules: DetectionRules) -> Result<()> {
    live::init()?;
    let mut perception = live::perception(config)?;
    match perception.detect_current(&rules)? {
        Some(screen) => println!("{}", screen),
        None => {
            perception.save_snapshot("detect");
            return Err(anyhow!("no known screen detected"));
        }
    }
    Ok(())
}

#[cfg(windows)]
fn goto(
    config: &NavigatorConfig,
    graph: ScreenGraph,
    rules: DetectionRules,
    target: &str,
) -> Result<()> {
    use screen_navigator::navigator::{Navigator, NavigatorSettings};

    live::init()?;
    let mut navigator = Navigator::new(
        graph,
        rules,
        live::perception(config)?,
        Box::new(live::input()),
        Box::new(live::window(config)),
        NavigatorSettings::from(config),
    )?;

    let result = navigator.detect_and_transition(target);
    log(&format!("Now believed to be at {}", navigator.belief_name()));
    result?;
    println!("{}", navigator.belief_name());
    Ok(())
}

#[cfg(not(windows))]
fn detect(_config: &NavigatorConfig, _rules: DetectionRules) -> Result<()> {
    Err(anyhow!("detect needs the Windows capture and input providers"))
}

#[cfg(not(windows))]
fn goto(
    _config: &NavigatorConfig,
    _graph: ScreenGraph,
    _rules: DetectionRules,
    _target: &str,
) -> Result<()> {
    Err(anyhow!("goto needs the Windows capture and input providers"))
}

/// Logs panics to the log file as well as stderr.
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = match panic_info.location() {
            Some(loc) => format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column()),
            None => String::new(),
        };
        log(&format!("[PANIC]{} {}", location, msg));
    }));
}
