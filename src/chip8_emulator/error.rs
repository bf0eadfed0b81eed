use std::fmt::{Display, Formatter};
use std::path::PathBuf;

#[derive(Debug)]
pub enum Chip8Error {
    RomNotFound(PathBuf),
    RomEmpty(PathBuf),
    RomTooLarge { size: usize, max: usize },
    RomRead(std::io::Error),
    StackOverflow,
    StackUnderflow,
    ProgramCounterOutOfBounds(usize),
    MemoryOutOfBounds(usize),
    InvalidArgument(&'static str),
}

impl Chip8Error {
    /// True for failures raised while reading or placing a ROM, before any cycle runs.
    pub fn is_rom_error(&self) -> bool {
        matches!(
            self,
            Self::RomNotFound(_) | Self::RomEmpty(_) | Self::RomTooLarge { .. } | Self::RomRead(_)
        )
    }

    /// Prefix the binary prints in front of a fatal error.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "usage error",
            _ if self.is_rom_error() => "rom error",
            _ => "vm fault",
        }
    }
}

impl Display for Chip8Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RomNotFound(path) => write!(f, "ROM not found: {}", path.display()),
            Self::RomEmpty(path) => write!(f, "ROM is empty: {}", path.display()),
            Self::RomTooLarge { size, max } => {
                write!(f, "ROM too large: {size} bytes (max {max})")
            }
            Self::RomRead(error) => write!(f, "failed to read ROM: {error}"),
            Self::StackOverflow => write!(f, "subroutine call with full stack"),
            Self::StackUnderflow => write!(f, "return instruction with empty stack"),
            Self::ProgramCounterOutOfBounds(pc) => {
                write!(f, "program counter exceeded program memory: 0x{pc:03x}")
            }
            Self::MemoryOutOfBounds(address) => {
                write!(f, "memory access out of bounds: 0x{address:04x}")
            }
            Self::InvalidArgument(argument) => write!(f, "invalid argument: {argument}"),
        }
    }
}

impl std::error::Error for Chip8Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RomRead(error) => Some(error),
            _ => None,
        }
    }
}
