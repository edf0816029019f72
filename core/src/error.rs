use thiserror::Error;

/// Errors reported by the interpreter.
///
/// All of them end the current run: the machine stays inspectable through the
/// debug accessors but stepping again hits the same fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Chip8Error {
    #[error("program is too large ({size} bytes), at most {max} bytes fit in memory")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("illegal instruction 0x{opcode:04x} at 0x{address:03x}")]
    IllegalInstruction { opcode: u16, address: u16 },

    #[error("stack overflow: call at 0x{address:03x} with a full call stack")]
    StackOverflow { address: u16 },

    #[error("stack underflow: return at 0x{address:03x} with an empty call stack")]
    StackUnderflow { address: u16 },
}
