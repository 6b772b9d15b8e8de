use std::io;
use thiserror::Error;

/// Everything that can stop the interpreter. None of these are retried; the
/// machine is left in its last valid state for inspection.
#[derive(Error, Debug)]
pub enum Chip8Error {
    #[error("program is {size} bytes but only {max} bytes are available")]
    CapacityExceeded { size: usize, max: usize },

    #[error("memory access out of range at {addr:#06x}")]
    OutOfRange { addr: usize },

    #[error("call stack overflow at {pc:#06x}")]
    StackOverflow { pc: u16 },

    #[error("return with empty call stack at {pc:#06x}")]
    StackUnderflow { pc: u16 },

    #[error("illegal opcode {opcode:#06x} at {pc:#06x}")]
    IllegalOpcode { opcode: u16, pc: u16 },

    #[error("host error: {0}")]
    Host(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Chip8Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_illegal_opcode_message() {
        let e = Chip8Error::IllegalOpcode {
            opcode: 0x5121,
            pc: 0x0204,
        };
        assert_eq!(e.to_string(), "illegal opcode 0x5121 at 0x0204");
    }

    #[test]
    fn test_io_error_converts() {
        let e: Chip8Error = io::Error::new(io::ErrorKind::Interrupted, "quit").into();
        assert!(matches!(e, Chip8Error::Host(_)));
    }
}
