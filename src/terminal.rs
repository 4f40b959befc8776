use crate::state::StatusLine;
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};
use std::io::{self, Write};

/// Width assumed when the terminal cannot report its columns.
pub const FALLBACK_WIDTH: u16 = 80;

/// The output device a status block draws on.
///
/// Geometry is queried on every call; implementations must not cache it.
pub trait Terminal: Write + Send {
    fn columns(&self) -> Option<u16>;
    fn rows(&self) -> io::Result<u16>;
}

/// [Terminal] over the process's standard output.
pub struct StdoutTerminal {
    stdout: io::Stdout,
}

impl StdoutTerminal {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }
}

impl Default for StdoutTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for StdoutTerminal {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stdout.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
}

impl Terminal for StdoutTerminal {
    fn columns(&self) -> Option<u16> {
        terminal::size().ok().map(|(columns, _)| columns)
    }

    fn rows(&self) -> io::Result<u16> {
        terminal::size().map(|(_, rows)| rows)
    }
}

/// Where the cursor is, as far as the renderer knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    /// Someone else wrote last. The cursor sits at column 0 of the block's top row.
    Detached,
    /// At the bottom row, column 0, with `reserved` bottom rows belonging to the block.
    Parked { reserved: usize },
}

/// Translates block-relative lines into escape sequences on a [Terminal].
pub struct Renderer<T> {
    terminal: T,
    cursor: Cursor,
}

impl<T: Terminal> Renderer<T> {
    pub fn new(terminal: T) -> Self {
        Self {
            terminal,
            cursor: Cursor::Detached,
        }
    }

    /// Forget everything known about the cursor; the next redraw starts from
    /// whatever row the cursor is on.
    pub fn detach(&mut self) {
        self.cursor = Cursor::Detached;
    }

    fn width(&self) -> u16 {
        self.terminal.columns().unwrap_or(FALLBACK_WIDTH)
    }

    /// Absolute 0-based terminal row of `screen_line`.
    pub fn row_of(&self, screen_line: usize) -> io::Result<u16> {
        let offset = u16::try_from(screen_line).unwrap_or(u16::MAX);
        Ok(self
            .terminal
            .rows()?
            .saturating_sub(offset)
            .saturating_sub(1))
    }

    pub fn move_to(&mut self, screen_line: usize, column: usize) -> io::Result<()> {
        let row = self.row_of(screen_line)?;
        let column = u16::try_from(column).unwrap_or(u16::MAX);
        queue!(self.terminal, MoveTo(column, row))
    }

    pub fn clear_current_line(&mut self) -> io::Result<()> {
        queue!(self.terminal, Clear(ClearType::CurrentLine))
    }

    /// Writes `line` from `column` on, truncated to one less than the terminal width.
    /// A non-zero column only rewrites the tail and erases what is left after it.
    pub fn write_line(&mut self, line: &StatusLine, column: usize) -> io::Result<()> {
        let limit = usize::from(self.width()).saturating_sub(1);
        self.move_to(line.screen_line, column)?;
        if column == 0 {
            self.clear_current_line()?;
        }
        let visible: String = line
            .content
            .chars()
            .skip(column)
            .take(limit.saturating_sub(column))
            .collect();
        queue!(self.terminal, Print(visible))?;
        if column > 0 {
            queue!(self.terminal, Clear(ClearType::UntilNewLine))?;
        }
        Ok(())
    }

    /// Single-line update, leaving the cursor parked.
    pub fn patch(&mut self, line: &StatusLine, column: usize) -> io::Result<()> {
        self.write_line(line, column)?;
        self.park()
    }

    /// Reserves room for every line, rewrites all of them in screen-line order and
    /// parks the cursor at the bottom of the block.
    pub fn redraw_all(&mut self, lines: &[StatusLine]) -> io::Result<()> {
        let newlines = match self.cursor {
            Cursor::Detached => lines.len().saturating_sub(1),
            Cursor::Parked { reserved } => {
                let grown = lines.len().saturating_sub(reserved);
                if grown > 0 {
                    self.move_to(0, 0)?;
                }
                grown
            }
        };
        queue!(self.terminal, Print("\n".repeat(newlines)))?;

        for line in lines {
            self.write_line(line, 0)?;
        }
        self.cursor = Cursor::Parked {
            reserved: lines.len(),
        };
        self.park()
    }

    /// Blanks every row of a block of `count` lines, top to bottom, and leaves the
    /// cursor at the start of the block's top row for foreign output.
    pub fn clear_block(&mut self, count: usize) -> io::Result<()> {
        for screen_line in (0..count).rev() {
            self.move_to(screen_line, 0)?;
            self.clear_current_line()?;
        }
        if count > 0 {
            self.move_to(count - 1, 0)?;
        }
        self.cursor = Cursor::Detached;
        self.terminal.flush()
    }

    /// Moves the cursor to the bottom row, column 0, and flushes.
    pub fn park(&mut self) -> io::Result<()> {
        let row = self.terminal.rows()?.saturating_sub(1);
        queue!(self.terminal, MoveTo(0, row))?;
        if self.cursor == Cursor::Detached {
            self.cursor = Cursor::Parked { reserved: 0 };
        }
        self.terminal.flush()
    }
}
