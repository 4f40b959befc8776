use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The key names no slot of a fixed-size block.
    #[error("status line {key} is outside the block's {lines} lines")]
    LineOutOfRange { key: String, lines: usize },

    #[error("status block has not been started")]
    NotStarted,

    #[error("status block is already started")]
    AlreadyStarted,

    /// Another block is already installed in the console hook.
    #[error("console is already intercepted by another status block")]
    ConsoleBusy,

    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
}
