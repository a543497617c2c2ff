use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while loading or running a CHIP-8 program
#[derive(Error, Debug)]
pub enum Chip8Error {
    #[error("can't open ROM {}: {source}", .path.display())]
    RomOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("unsupported opcode {opcode:04X} at {addr:03X}")]
    UnsupportedOpcode { opcode: u16, addr: u16 },

    #[error("stack overflow calling from {addr:03X}")]
    StackOverflow { addr: u16 },

    #[error("stack underflow returning from {addr:03X}")]
    StackUnderflow { addr: u16 },

    #[error("key index {0:#x} is outside 0x0-0xf")]
    InvalidKey(u8),

    #[error("pixel buffer holds {actual} entries, needs {expected}")]
    PixelBufferSize { expected: usize, actual: usize },
}

impl Chip8Error {
    /// faults raised by the program itself; the machine has already moved
    /// past the offending instruction and can keep running
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Chip8Error::UnsupportedOpcode { .. }
                | Chip8Error::StackOverflow { .. }
                | Chip8Error::StackUnderflow { .. }
        )
    }
}
