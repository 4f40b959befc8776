use crate::terminal::Terminal;
use crate::vte_actions::{VteAction, VteActionParser};
use log::{Level, Log, Record};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// A terminal that records everything written to it. Clones share the recording,
/// so the same instance can back a block and the logger behind its console.
#[derive(Clone)]
pub struct TestTerminal {
    bytes: Arc<Mutex<Vec<u8>>>,
    size: Arc<Mutex<(Option<u16>, u16)>>,
}

impl TestTerminal {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            bytes: Arc::new(Mutex::new(Vec::new())),
            size: Arc::new(Mutex::new((Some(columns), rows))),
        }
    }

    pub fn resize(&self, columns: Option<u16>, rows: u16) {
        *self.size.lock().unwrap() = (columns, rows);
    }

    /// Number of bytes written so far.
    pub fn mark(&self) -> usize {
        self.bytes.lock().unwrap().len()
    }

    pub fn actions(&self) -> Vec<VteAction> {
        self.actions_since(0)
    }

    pub fn actions_since(&self, mark: usize) -> Vec<VteAction> {
        VteActionParser::new().parse_bytes(&self.bytes.lock().unwrap()[mark..])
    }

    /// Replays the recording on top of a screen whose last line was a shell prompt.
    /// Line feeds also return the carriage, as a tty's output processing does.
    fn screen(&self) -> vt100::Parser {
        let (columns, rows) = *self.size.lock().unwrap();
        let mut parser = vt100::Parser::new(rows, columns.unwrap_or(80), 0);
        parser.process(format!("\x1b[{rows};1H$ demo\r\n").as_bytes());
        let mut cooked = Vec::new();
        for byte in self.bytes.lock().unwrap().iter() {
            if *byte == b'\n' {
                cooked.push(b'\r');
            }
            cooked.push(*byte);
        }
        parser.process(&cooked);
        parser
    }

    pub fn screen_rows(&self) -> Vec<String> {
        let parser = self.screen();
        let columns = parser.screen().size().1;
        parser
            .screen()
            .rows(0, columns)
            .map(|row| row.trim_end().to_string())
            .collect()
    }

    /// Numbered screen rows, one per line.
    pub fn screen_text(&self) -> String {
        self.screen_rows()
            .iter()
            .enumerate()
            .map(|(index, row)| format!("{index}|{row}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn cursor(&self) -> (u16, u16) {
        self.screen().screen().cursor_position()
    }

    /// A logger that prints bare messages onto this terminal.
    pub fn logger(&self) -> Box<dyn Log> {
        let config = ConfigBuilder::new()
            .set_max_level(LevelFilter::Off)
            .set_time_level(LevelFilter::Off)
            .set_thread_level(LevelFilter::Off)
            .set_target_level(LevelFilter::Off)
            .set_location_level(LevelFilter::Off)
            .build();
        WriteLogger::new(LevelFilter::Info, config, self.clone())
    }
}

impl Write for TestTerminal {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Terminal for TestTerminal {
    fn columns(&self) -> Option<u16> {
        self.size.lock().unwrap().0
    }

    fn rows(&self) -> io::Result<u16> {
        Ok(self.size.lock().unwrap().1)
    }
}

pub fn emit(logger: &dyn Log, level: Level, message: &str) {
    logger.log(
        &Record::builder()
            .args(format_args!("{message}"))
            .level(level)
            .target("test")
            .build(),
    );
}
