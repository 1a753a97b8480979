//! Desktop simulator for the ratedeck currency display.
//!
//! Renders ratedeck-core pages as text in the terminal and reads gestures
//! from the keyboard. A mock feed stands in for the broker so the detail
//! pages show changing quotes without any hardware or network.
//!
//! # Key bindings
//!
//! Type a key and press Enter.
//!
//! | Key | Gesture |
//! |-----|---------|
//! | w   | UP      |
//! | s   | DOWN    |
//! | a   | LEFT    |
//! | d   | RIGHT   |
//! | q   | Quit    |

use std::convert::Infallible;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use embedded_hal_async::delay::DelayNs;
use log::{info, warn};

use ratedeck_core::app_state::SharedState;
use ratedeck_core::gesture::{Gesture, GestureSource};
use ratedeck_core::ingest::ingest;
use ratedeck_core::pages::PageManager;
use ratedeck_core::publisher::{PUBLISH_INTERVAL_MS, selection_message};
use ratedeck_core::ui::{SCREEN_COLUMNS, Screen, TextDisplay};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Interval between mock rate messages.
const MOCK_FEED_INTERVAL: Duration = Duration::from_secs(5);

static STATE: SharedState = SharedState::new();

// ---------------------------------------------------------------------------
// Keyboard gestures
// ---------------------------------------------------------------------------

fn key_to_gesture(key: char) -> Option<Gesture> {
    match key.to_ascii_lowercase() {
        'w' => Some(Gesture::Up),
        's' => Some(Gesture::Down),
        'a' => Some(Gesture::Left),
        'd' => Some(Gesture::Right),
        _ => None,
    }
}

/// Gestures typed on stdin, forwarded by a reader thread.
struct ChannelGestures {
    rx: Receiver<Gesture>,
}

impl GestureSource for ChannelGestures {
    type Error = TryRecvError;

    async fn read_gesture(&mut self) -> Result<Option<Gesture>, Self::Error> {
        match self.rx.try_recv() {
            Ok(gesture) => Ok(Some(gesture)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn spawn_keyboard_reader() -> ChannelGestures {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            for key in line.chars() {
                if key.eq_ignore_ascii_case(&'q') {
                    info!("Quit requested");
                    std::process::exit(0);
                }
                match key_to_gesture(key) {
                    Some(gesture) => {
                        if tx.send(gesture).is_err() {
                            return;
                        }
                    }
                    None => warn!("Unmapped key {:?}", key),
                }
            }
        }
        info!("stdin closed");
        std::process::exit(0);
    });
    ChannelGestures { rx }
}

// ---------------------------------------------------------------------------
// Terminal display
// ---------------------------------------------------------------------------

/// Draws each frame as a bordered block of text; inverse rows use reverse
/// video.
struct TerminalDisplay;

impl TextDisplay for TerminalDisplay {
    type Error = io::Error;

    fn show(&mut self, screen: &Screen) -> Result<(), Self::Error> {
        let mut out = io::stdout().lock();
        let border = "-".repeat(SCREEN_COLUMNS);

        write!(out, "\x1b[2J\x1b[H")?;
        writeln!(out, "+{}+", border)?;
        for row in screen.rows() {
            let padded = format!("{:<width$}", row.text.as_str(), width = SCREEN_COLUMNS);
            if row.inverse {
                writeln!(out, "|\x1b[7m{}\x1b[0m|", padded)?;
            } else {
                writeln!(out, "|{}|", padded)?;
            }
        }
        writeln!(out, "+{}+", border)?;
        writeln!(out, "w/s/a/d + Enter: gesture, q: quit")?;
        out.flush()
    }
}

// ---------------------------------------------------------------------------
// Mock feed and publisher
// ---------------------------------------------------------------------------

/// Build a rate message in the broker's format, nudging the quotes with
/// the sequence number so updates are visible.
fn mock_message(seq: u32) -> String {
    let wobble = seq % 10;
    format!(
        "[DATA] {seq},0.01{wobble}USD,1.09USD,0.044USD,42'155.8{wobble}USD,2'247.8{wobble}USD"
    )
}

fn spawn_mock_feed(state: &'static SharedState) {
    thread::spawn(move || {
        let mut seq: u32 = 0;
        loop {
            let message = mock_message(seq);
            if !ingest(state, message.as_bytes()) {
                warn!("Mock message rejected: {}", message);
            }
            seq = seq.wrapping_add(1);
            thread::sleep(MOCK_FEED_INTERVAL);
        }
    });
}

/// Logs what the device would publish on each tick.
fn spawn_publisher_log(state: &'static SharedState) {
    thread::spawn(move || {
        loop {
            info!("Publish {}", selection_message(state.selected()));
            thread::sleep(Duration::from_millis(PUBLISH_INTERVAL_MS.into()));
        }
    });
}

// ---------------------------------------------------------------------------
// Delay
// ---------------------------------------------------------------------------

struct StdDelay;

impl DelayNs for StdDelay {
    async fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(ns.into()));
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting ratedeck simulator");

    spawn_mock_feed(&STATE);
    spawn_publisher_log(&STATE);
    let mut gestures = spawn_keyboard_reader();

    let mut manager = PageManager::new(&STATE);
    let result: Result<Infallible, io::Error> = embassy_futures::block_on(manager.run(
        &mut gestures,
        &mut TerminalDisplay,
        &mut StdDelay,
    ));

    if let Err(e) = result {
        eprintln!("Display error: {}", e);
        std::process::exit(1);
    }
}
