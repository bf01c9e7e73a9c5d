use std::io::Stdout;
use std::io::stdout;

use color_eyre::eyre::Result;
use crossterm::event::EventStream;
use crossterm::execute;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::error;

/// Owns the terminal for the lifetime of the session and restores it on
/// drop, including on unwinds, so a panic never leaves raw mode behind.
pub(crate) struct Tui {
    pub(crate) terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui {
    pub(crate) fn new() -> Result<Self> {
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        Ok(Self { terminal })
    }

    pub(crate) fn event_stream(&self) -> EventStream {
        EventStream::new()
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(err) = disable_raw_mode() {
            error!("failed to disable raw mode: {err}");
        }
        if let Err(err) = execute!(stdout(), LeaveAlternateScreen) {
            error!("failed to leave alternate screen: {err}");
        }
    }
}
