/*
A block of status lines pinned to the bottom of the terminal, with ordinary log
output scrolling above it.

    Console (log::Log) --before each record--> ConsoleHook --> StatusBlock session
                                                                   |
    caller: start / update / stop ---------------------------------+
                                                                   v
                                                    Store (lines, dirty) -> Renderer -> Terminal

Screen line 0 is the bottom row; line n sits n rows above it.
Clean block: an update patches one line (only the suffix after the common prefix).
A log record clears the block once and marks it dirty; the next update redraws
every line below the log text.
*/
mod block;
mod console;
mod error;
mod state;
mod terminal;

#[cfg(test)]
mod testing;

pub use block::StatusBlock;
pub use console::{Console, ConsoleHook, Interceptor};
pub use error::{Error, Result};
pub use state::{common_prefix_len, Layout, LineKey};
pub use terminal::{StdoutTerminal, Terminal, FALLBACK_WIDTH};
