//! CHIP-8 interpreter core.
//!
//! The host owns a [`Chip8`], calls [`Chip8::step`] with the keypad state and
//! its 60Hz tick counter, and reads back the beeper state and the
//! [`Framebuffer`]. The core does no I/O of its own.

mod chip8;
mod color;
mod display;
mod error;
mod instruction;
mod keypad;
mod quirks;
mod timer;

pub use chip8::{
    Chip8, Chip8Builder, DEFAULT_FONT, FONT_ADDRESS, MAX_PROGRAM_SIZE, MEMORY_SIZE,
    PROGRAM_START, STACK_SIZE,
};
pub use color::{
    Chip8Color, Chip8ColorParseError, DEFAULT_BACKGROUND_COLOR, DEFAULT_FOREGROUND_COLOR,
};
pub use display::{Framebuffer, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use error::Chip8Error;
pub use instruction::Instruction;
pub use quirks::Quirks;
