use std::io;
use thiserror::Error;

/// Everything that can stop the interpreter from the outside. Program content
/// never produces one of these; a misbehaving program just keeps running.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("device i/o failed: {0}")]
    Io(#[from] io::Error),

    #[error("program is {size} bytes but only {max_size} fit above 0x{addr:03x}")]
    ProgramTooLarge {
        size: usize,
        max_size: usize,
        addr: u16,
    },

    #[error("interrupted by operator")]
    Interrupted,
}
