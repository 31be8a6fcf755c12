use std::io::{self, Stdout};

use anyhow::Result;
use crossterm::event::{self, Event};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use tui::backend::CrosstermBackend;
use tui::layout::{Constraint, Direction, Layout, Rect};
use tui::widgets::{Block, Borders, Paragraph};
use tui::Terminal;

use nonel::display;
use nonel::machine::Machine;

/// Owns the raw-mode/alternate-screen terminal session. Dropping it (or
/// calling `teardown` explicitly) always restores the user's terminal,
/// whether the VM halted cleanly or a fatal error cut the run short.
pub struct Session {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Session {
    pub fn start() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Session { terminal })
    }

    pub fn teardown(&mut self) -> Result<()> {
        disable_raw_mode()?;
        self.terminal.backend_mut().execute(LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    /// Renders the character screen in a single pane, or — in debug mode —
    /// splits the viewport (vertically if wide enough, else horizontally,
    /// else drops the debug pane entirely) between the screen and the
    /// annotated memory dump.
    pub fn refresh(&mut self, machine: &Machine, debug: bool) -> Result<()> {
        let rows = display::framebuffer_rows(machine.memory());
        let screen_text: String = rows
            .iter()
            .map(|row| String::from_utf8_lossy(row).into_owned())
            .collect::<Vec<_>>()
            .join("\n");

        let dump_text = if debug {
            Some(nonel::debug::dump(machine.memory()).join("\n"))
        } else {
            None
        };

        self.terminal.draw(|f| {
            let area = f.size();
            let panes = split(area, dump_text.is_some());

            let screen = Paragraph::new(screen_text.clone()).block(Block::default().borders(Borders::ALL).title("screen"));
            f.render_widget(screen, panes[0]);

            if let (Some(text), Some(&pane)) = (dump_text.as_ref(), panes.get(1)) {
                let debug_pane = Paragraph::new(text.clone()).block(Block::default().borders(Borders::ALL).title("debug"));
                f.render_widget(debug_pane, pane);
            }
        })?;
        Ok(())
    }

    /// Blocks until the user presses a key, mirroring the reference
    /// implementation's habit of holding the final frame on screen before
    /// tearing the terminal down.
    pub fn await_keypress(&mut self) -> Result<()> {
        loop {
            if let Event::Key(_) = event::read()? {
                return Ok(());
            }
        }
    }
}

/// Vertical split if the terminal is wide enough for two side-by-side
/// panes, else horizontal if it's tall enough, else just the one pane.
fn split(area: Rect, want_debug: bool) -> Vec<Rect> {
    if !want_debug {
        return vec![area];
    }
    if area.width >= 80 {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area)
            .to_vec()
    } else if area.height >= 25 {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area)
            .to_vec()
    } else {
        vec![area]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_narrow_short_terminal_drops_the_debug_pane() {
        let area = Rect::new(0, 0, 40, 10);
        assert_eq!(split(area, true).len(), 1);
    }

    #[test]
    fn a_wide_terminal_splits_side_by_side() {
        let area = Rect::new(0, 0, 160, 40);
        assert_eq!(split(area, true).len(), 2);
    }

    #[test]
    fn without_debug_mode_there_is_only_one_pane() {
        let area = Rect::new(0, 0, 160, 40);
        assert_eq!(split(area, false).len(), 1);
    }
}
