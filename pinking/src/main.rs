//! pinking - interactive GPIO pin inspector
//!
//! Shows the board's pin header in the terminal. Pins can be selected,
//! switched between input and output, and driven High or Low, while input
//! levels update live from edge detection and periodic polling.
//!
//! # Startup
//!
//! 1. Parse flags and load `pinking.toml` (flags win)
//! 2. Open the GPIO backend (real or simulated) inside a cleanup session
//! 3. Resolve the board revision and its pin layout
//! 4. Run the terminal UI, or the non-interactive exercise
//!
//! GPIO cleanup runs when the session drops, on every exit path.

#![deny(unsafe_code)]

mod cli;
mod config;
mod exercise;
mod logger;
mod tasks;
mod terminal;

use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use log::{info, LevelFilter};

use pinking_core::{
    events, layout, AppCommands, BoardControl, BoardError, Dispatcher, PinCommands, PinController,
};
use pinking_display::Screen;
use pinking_hal::{Gpio, Level, Session};
use pinking_hal_sim::SimGpio;

use crate::cli::{Args, USAGE};
use crate::config::Config;
use crate::logger::RecentLogs;
use crate::terminal::TerminalGuard;

/// Where unknown revisions should be reported
const ISSUES_URL: &str = "https://github.com/mbr/pinking";

/// How long each level is held in exercise mode
const EXERCISE_DWELL_MS: u64 = 100;

type Board = PinController<Session<Box<dyn Gpio>>>;

fn main() -> ExitCode {
    let args = match Args::parse(env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            return ExitCode::from(2);
        }
    };
    if args.help {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    // Installed early so config loading is logged; the level follows later
    logger::init(LevelFilter::Info).context("cannot install logger")?;

    let mut config = config::load(args.config.as_deref()).context("cannot load configuration")?;
    config.apply(args);
    log::set_max_level(config.level()?);

    let gpio = open_gpio(&config)?;
    let info = gpio.board_info();
    let revision = match (&config.revision, &info) {
        (Some(rev), _) => rev.clone(),
        (None, Some(info)) => info.revision.clone(),
        (None, None) => bail!("cannot detect the board revision; pass one with --rev"),
    };
    let model = info.map(|info| info.model).unwrap_or_else(|| "unknown".into());

    println!("Using GPIO: {}", gpio.name());
    println!("Model [{}]: {}", revision, model);

    let mut board = match PinController::with_pull(Session::new(gpio), &revision, config.pull) {
        Ok(board) => board,
        Err(BoardError::LayoutNotFound(rev)) => {
            let known: Vec<&str> = layout::known_revisions().collect();
            info!("Known revisions: {}", known.join(", "));
            bail!(
                "No pin layout known for {}.\nPlease report this issue to {}",
                rev,
                ISSUES_URL
            )
        }
        Err(e) => return Err(e).context("board start-up failed"),
    };

    if args.exercise {
        let summary = exercise::run(&mut board, Duration::from_millis(EXERCISE_DWELL_MS))
            .context("exercise halted")?;
        println!("{}", summary);
    } else {
        run_ui(&mut board, &config)?;
    }

    // Report cleanup failures instead of only logging them on drop
    board
        .into_inner()
        .release()
        .context("GPIO cleanup failed")?;
    Ok(())
}

/// Open the configured GPIO backend
fn open_gpio(config: &Config) -> anyhow::Result<Box<dyn Gpio>> {
    if config.fake_gpio {
        let sim = SimGpio::new();
        for &channel in &config.simulation.high_channels {
            sim.set_input_level(channel, Level::High);
        }
        return Ok(Box::new(sim));
    }
    open_hardware()
}

#[cfg(feature = "hardware")]
fn open_hardware() -> anyhow::Result<Box<dyn Gpio>> {
    let gpio = pinking_hal_rppal::RppalGpio::new().context(
        "Raspberry Pi GPIO is not available; use --fake-gpio to run against a simulated board",
    )?;
    Ok(Box::new(gpio))
}

#[cfg(not(feature = "hardware"))]
fn open_hardware() -> anyhow::Result<Box<dyn Gpio>> {
    bail!("built without Raspberry Pi support; use --fake-gpio to run against a simulated board")
}

/// Run the interactive UI until the operator quits
fn run_ui(board: &mut Board, config: &Config) -> anyhow::Result<()> {
    let (guard, terminal) = TerminalGuard::start().context("cannot start the terminal UI")?;

    let screen = Screen::new(terminal, board.notifier()).with_logs(Arc::new(RecentLogs));
    let dirty = screen.dirty_flag();
    logger::notify(dirty.clone());

    let (tx, rx) = events::queue();
    events::wake_on_input_change(board.notifier(), tx.clone());
    tasks::spawn_input(tx.clone(), dirty)?;
    tasks::spawn_tick(tx, config.poll_interval_ms)?;

    let mut dispatcher = Dispatcher::new(rx)
        .with_handler(AppCommands)
        .with_handler(PinCommands)
        .with_widget(screen);
    let result = dispatcher.run(board);

    // Restore the terminal before anything is printed
    drop(dispatcher);
    drop(guard);

    let shutdown = result.context("pinking halted")?;
    info!("Stopped ({:?})", shutdown);
    Ok(())
}
