//! Lets the user abandon a running scan with `q` or Ctrl-C.
//!
//! Raw mode swallows the terminal's own Ctrl-C handling, so both keys are read
//! from crossterm's event stream. Without a terminal the handle falls back to
//! the process signal.

use std::io::IsTerminal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tokio::sync::oneshot;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct InputHandle {
    rx: Option<oneshot::Receiver<()>>,
    stop: Arc<AtomicBool>,
}

impl InputHandle {
    pub fn new() -> Self {
        Self {
            rx: None,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Starts watching the keyboard when stdin is a terminal.
    pub fn start(&mut self) {
        if self.rx.is_some() || !std::io::stdin().is_terminal() {
            return;
        }
        if enable_raw_mode().is_err() {
            return;
        }

        let (tx, rx) = oneshot::channel();
        let stop = Arc::clone(&self.stop);
        self.rx = Some(rx);

        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                if !event::poll(POLL_INTERVAL).unwrap_or(false) {
                    continue;
                }
                if let Ok(Event::Key(key)) = event::read() {
                    if key.kind == KeyEventKind::Press && is_interrupt(key.code, key.modifiers) {
                        let _ = tx.send(());
                        break;
                    }
                }
            }
            let _ = disable_raw_mode();
        });
    }

    /// Resolves once the user asked to stop.
    pub async fn interrupted(&mut self) {
        match self.rx.as_mut() {
            Some(rx) => {
                if rx.await.is_err() {
                    std::future::pending::<()>().await;
                }
            }
            None => {
                if tokio::signal::ctrl_c().await.is_err() {
                    std::future::pending::<()>().await;
                }
            }
        }
    }
}

impl Drop for InputHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        let _ = disable_raw_mode();
    }
}

fn is_interrupt(code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Char('q') => true,
        KeyCode::Char('c') => modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
