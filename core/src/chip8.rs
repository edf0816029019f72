// CHIP-8 interpreter
//
// Useful links:
// * [Guide to making a CHIP-8 emulator](https://tobiasvl.github.io/blog/write-a-chip-8-emulator/)
// * [Building a CHIP-8 Emulator](https://austinmorlan.com/posts/chip8_emulator/)
// * [Cowgod's Chip-8 Technical Reference](http://devernay.free.fr/hacks/chip8/C8TECH10.HTM)
//

use log::{debug, trace, warn};
use rand::{rngs::StdRng, RngCore, SeedableRng};

use crate::display::Framebuffer;
use crate::error::Chip8Error;
use crate::instruction::Instruction;
use crate::keypad::Keypad;
use crate::quirks::Quirks;
use crate::timer::Timers;

pub const MEMORY_SIZE: usize = 0x1000;
pub const PROGRAM_START: u16 = 0x200;
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;
pub const STACK_SIZE: usize = 16;
pub const REGISTER_COUNT: usize = 16;
pub const FONT_ADDRESS: u16 = 0x000;
pub const FONT_CHAR_SIZE: u16 = 5;

const ADDRESS_MASK: u16 = 0x0FFF;
const FLAG: usize = 0xF;

pub static DEFAULT_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[derive(Debug, Default)]
pub struct Chip8Builder {
    /// ROM
    rom: Option<Vec<u8>>,
    /// Font sprite
    font: Option<[u8; 80]>,
    // PRNG Seed
    rng_seed: Option<u64>,
    /// Quirks
    quirks: Quirks,
}

pub struct Chip8 {
    /// General purpose registers
    regs: [u8; REGISTER_COUNT],
    /// Index register
    index: u16,
    /// Program counter
    pc: u16,
    /// Call stack
    stack: [u16; STACK_SIZE],
    /// Stack pointer
    sp: u8,
    /// Delay and sound timers
    timers: Timers,
    /// Memory
    memory: Box<[u8; MEMORY_SIZE]>,
    /// Display: 64x32 pixels 1 bit monochrome
    display: Framebuffer,
    /// Keypad latch
    keypad: Keypad,
    /// Target register of a pending FX0A
    wait: Option<u8>,
    /// Font installed on every load
    font: [u8; 80],
    /// Quirks
    quirks: Quirks,
    /// PRNG Generator
    rng: StdRng,
}

impl Chip8Builder {
    pub fn new() -> Chip8Builder {
        Chip8Builder::default()
    }

    pub fn with_rom(mut self, rom: Vec<u8>) -> Self {
        self.rom = Some(rom);
        self
    }

    pub fn with_font(mut self, font: [u8; 80]) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_quirks(mut self, quirks: Quirks) -> Self {
        self.quirks = quirks;
        self
    }

    /// Create the machine and load the ROM, if one was given.
    pub fn build(&self) -> Result<Chip8, Chip8Error> {
        // Pseudo random number generator
        let rng = match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut chip = Chip8 {
            regs: [0u8; REGISTER_COUNT],
            index: 0,
            pc: PROGRAM_START,
            stack: [0u16; STACK_SIZE],
            sp: 0,
            timers: Timers::new(),
            memory: Box::new([0u8; MEMORY_SIZE]),
            display: Framebuffer::new(),
            keypad: Keypad::default(),
            wait: None,
            font: self.font.unwrap_or(DEFAULT_FONT),
            quirks: self.quirks,
            rng,
        };

        let rom = self.rom.as_deref().unwrap_or(&[]);
        chip.load(rom)?;
        Ok(chip)
    }
}

impl Chip8 {
    /// Reset the machine and install the font and `program`.
    ///
    /// Nothing is modified when the program does not fit above 0x200.
    pub fn load(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(Chip8Error::ProgramTooLarge {
                size: program.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }

        // Copy font and program to memory
        self.memory.fill(0);
        let font = FONT_ADDRESS as usize;
        self.memory[font..font + self.font.len()].copy_from_slice(&self.font);
        let start = PROGRAM_START as usize;
        self.memory[start..start + program.len()].copy_from_slice(program);

        self.regs = [0u8; REGISTER_COUNT];
        self.index = 0;
        self.pc = PROGRAM_START;
        self.stack = [0u16; STACK_SIZE];
        self.sp = 0;
        self.timers.reset();
        self.keypad.reset();
        self.wait = None;
        self.display.clear();

        debug!("loaded {} byte program at 0x{:03x}", program.len(), PROGRAM_START);
        Ok(())
    }

    /// Execute one instruction.
    ///
    /// `keys` is the keypad state (bit n set = key n down) and `tick` the
    /// host's 60Hz counter. Returns whether the beeper should be on.
    ///
    /// The timers and the key latch advance even when the instruction
    /// faults; registers, memory, stack and PC are left as they were.
    pub fn step(&mut self, keys: u16, tick: u64) -> Result<bool, Chip8Error> {
        self.timers.advance(tick);
        self.keypad.latch(keys);

        match self.wait {
            Some(x) => self.poll_key(x),
            None => {
                if let Err(err) = self.execute_next() {
                    warn!("{}", err);
                    return Err(err);
                }
            }
        }

        Ok(self.timers.sound_on())
    }

    fn poll_key(&mut self, x: u8) {
        if let Some(key) = self.keypad.newly_pressed() {
            debug!("key {:x} pressed, stored in V{:x}", key, x);
            self.regs[x as usize] = key;
            self.wait = None;
            self.pc = self.pc.wrapping_add(2) & ADDRESS_MASK;
        }
    }

    fn execute_next(&mut self) -> Result<(), Chip8Error> {
        let addr = self.pc;
        let word = self.read_u16_be(addr);
        let inst = Instruction::decode(word).ok_or(Chip8Error::IllegalInstruction {
            opcode: word,
            address: addr,
        })?;

        trace!("0x{:03x}: 0x{:04x} {}", addr, word, self.as_executed(inst));

        let next = self.execute(inst)?;
        self.pc = next & ADDRESS_MASK;
        Ok(())
    }

    /// Apply `inst` and return the address of the next instruction. Errors
    /// are raised before anything is modified.
    fn execute(&mut self, inst: Instruction) -> Result<u16, Chip8Error> {
        let pc = self.pc;
        let mut next = pc.wrapping_add(2);

        match inst {
            Instruction::ClearScreen => {
                self.display.clear();
            }
            Instruction::Return => {
                if self.sp == 0 {
                    return Err(Chip8Error::StackUnderflow { address: pc });
                }
                next = self.branch_target(self.stack[self.sp as usize - 1])?;
                self.sp -= 1;
            }
            Instruction::Jump { nnn } => {
                next = self.branch_target(nnn)?;
            }
            Instruction::Call { nnn } => {
                if self.sp as usize >= STACK_SIZE {
                    return Err(Chip8Error::StackOverflow { address: pc });
                }
                self.branch_target(nnn)?;
                self.stack[self.sp as usize] = next & ADDRESS_MASK;
                self.sp += 1;
                next = nnn;
            }
            Instruction::SkipEqImmediate { x, nn } => {
                if self.reg(x) == nn {
                    next += 2;
                }
            }
            Instruction::SkipNeqImmediate { x, nn } => {
                if self.reg(x) != nn {
                    next += 2;
                }
            }
            Instruction::SkipEqReg { x, y } => {
                if self.reg(x) == self.reg(y) {
                    next += 2;
                }
            }
            Instruction::SkipNeqReg { x, y } => {
                if self.reg(x) != self.reg(y) {
                    next += 2;
                }
            }
            Instruction::SetImmediate { x, nn } => {
                self.set_reg(x, nn);
            }
            Instruction::AddImmediate { x, nn } => {
                self.set_reg(x, self.reg(x).wrapping_add(nn));
            }
            Instruction::Copy { x, y } => {
                self.set_reg(x, self.reg(y));
                self.reset_flag_after_logic();
            }
            Instruction::Or { x, y } => {
                self.set_reg(x, self.reg(x) | self.reg(y));
                self.reset_flag_after_logic();
            }
            Instruction::And { x, y } => {
                self.set_reg(x, self.reg(x) & self.reg(y));
                self.reset_flag_after_logic();
            }
            Instruction::Xor { x, y } => {
                self.set_reg(x, self.reg(x) ^ self.reg(y));
                self.reset_flag_after_logic();
            }
            Instruction::AddReg { x, y } => {
                let (res, carry) = self.reg(x).overflowing_add(self.reg(y));
                self.set_reg(x, res);
                self.regs[FLAG] = carry as u8;
            }
            Instruction::SubXY { x, y } => {
                let (res, borrow) = self.reg(x).overflowing_sub(self.reg(y));
                self.set_reg(x, res);
                self.regs[FLAG] = (!borrow) as u8;
            }
            Instruction::SubYX { x, y } => {
                let (res, borrow) = self.reg(y).overflowing_sub(self.reg(x));
                self.set_reg(x, res);
                self.regs[FLAG] = (!borrow) as u8;
            }
            Instruction::ShiftRight { x, y } => {
                let src = self.shift_source(x, y);
                self.set_reg(x, src >> 1);
                self.regs[FLAG] = src & 0x01;
            }
            Instruction::ShiftLeft { x, y } => {
                let src = self.shift_source(x, y);
                self.set_reg(x, src << 1);
                self.regs[FLAG] = (src & 0x80) >> 7;
            }
            Instruction::SetIndex { nnn } => {
                self.index = nnn;
            }
            Instruction::JumpWithOffset { x, nnn } => {
                let offset = self.reg(self.offset_register(x));
                next = self.branch_target(nnn + offset as u16)?;
            }
            Instruction::Random { x, nn } => {
                let n = self.rng.next_u32() as u8;
                self.set_reg(x, n & nn);
            }
            Instruction::Draw { x, y, n } => {
                // Read N rows (8-bit each) of sprite data from memory
                let mut sprite = [0u8; 15];
                let rows = &mut sprite[..n as usize];
                for (row, data) in rows.iter_mut().enumerate() {
                    *data = self.read_u8(self.index.wrapping_add(row as u16));
                }

                let (vx, vy) = (self.reg(x), self.reg(y));
                let wrap = self.quirks.wrap_vertical;
                let collision = self.display.draw_sprite(vx, vy, rows, wrap);
                self.regs[FLAG] = collision as u8;
            }
            Instruction::SkipKeyDown { x } => {
                if self.keypad.is_down(self.reg(x)) {
                    next += 2;
                }
            }
            Instruction::SkipKeyUp { x } => {
                if !self.keypad.is_down(self.reg(x)) {
                    next += 2;
                }
            }
            Instruction::ReadDelay { x } => {
                self.set_reg(x, self.timers.delay());
            }
            Instruction::WaitKey { x } => match self.keypad.newly_pressed() {
                // Key went down on this very step
                Some(key) => {
                    debug!("key {:x} pressed, stored in V{:x}", key, x);
                    self.set_reg(x, key);
                }
                // Stay on this instruction until a key goes down
                None => {
                    debug!("waiting for key into V{:x}", x);
                    self.wait = Some(x);
                    next = pc;
                }
            },
            Instruction::SetDelay { x } => {
                self.timers.set_delay(self.reg(x));
            }
            Instruction::SetSound { x } => {
                self.timers.set_sound(self.reg(x));
            }
            Instruction::AddIndex { x } => {
                self.index = self.index.wrapping_add(self.reg(x) as u16) & ADDRESS_MASK;
            }
            Instruction::FontChar { x } => {
                let digit = (self.reg(x) & 0x0F) as u16;
                self.index = FONT_ADDRESS + digit * FONT_CHAR_SIZE;
            }
            Instruction::Bcd { x } => {
                let value = self.reg(x);
                self.write_u8(self.index, value / 100);
                self.write_u8(self.index.wrapping_add(1), (value / 10) % 10);
                self.write_u8(self.index.wrapping_add(2), value % 10);
            }
            Instruction::Store { x } => {
                for i in 0..=x {
                    let addr = self.index.wrapping_add(i as u16);
                    self.write_u8(addr, self.reg(i));
                }
                self.advance_index_after_transfer(x);
            }
            Instruction::Load { x } => {
                for i in 0..=x {
                    let addr = self.index.wrapping_add(i as u16);
                    let data = self.read_u8(addr);
                    self.set_reg(i, data);
                }
                self.advance_index_after_transfer(x);
            }
        }

        Ok(next)
    }

    /// Register BXNN adds to its target.
    fn offset_register(&self, x: u8) -> u8 {
        if self.quirks.jump_with_vx {
            x
        } else {
            0
        }
    }

    /// `inst` with the operands the current quirks actually use, for tracing.
    fn as_executed(&self, inst: Instruction) -> Instruction {
        match inst {
            Instruction::JumpWithOffset { x, nnn } => Instruction::JumpWithOffset {
                x: self.offset_register(x),
                nnn,
            },
            other => other,
        }
    }

    /// Jump, call and return targets must sit on an instruction boundary.
    fn branch_target(&self, target: u16) -> Result<u16, Chip8Error> {
        if target % 2 != 0 {
            return Err(Chip8Error::IllegalInstruction {
                opcode: self.read_u16_be(self.pc),
                address: self.pc,
            });
        }
        Ok(target)
    }

    fn reg(&self, x: u8) -> u8 {
        self.regs[(x & 0xF) as usize]
    }

    fn set_reg(&mut self, x: u8, value: u8) {
        self.regs[(x & 0xF) as usize] = value;
    }

    fn reset_flag_after_logic(&mut self) {
        if self.quirks.logic_resets_flag {
            self.regs[FLAG] = 0;
        }
    }

    fn shift_source(&self, x: u8, y: u8) -> u8 {
        if self.quirks.shift_in_place {
            self.reg(x)
        } else {
            self.reg(y)
        }
    }

    fn advance_index_after_transfer(&mut self, x: u8) {
        if self.quirks.load_store_increments_index {
            self.index = self.index.wrapping_add(x as u16 + 1) & ADDRESS_MASK;
        }
    }

    fn read_u8(&self, addr: u16) -> u8 {
        self.memory[(addr & ADDRESS_MASK) as usize]
    }

    fn read_u16_be(&self, addr: u16) -> u16 {
        u16::from_be_bytes([self.read_u8(addr), self.read_u8(addr.wrapping_add(1))])
    }

    fn write_u8(&mut self, addr: u16, data: u8) {
        self.memory[(addr & ADDRESS_MASK) as usize] = data;
    }
}

/// Debug accessors for hosts and tests. Out of range reads return 0 and out
/// of range writes are ignored.
impl Chip8 {
    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.pc = pc & ADDRESS_MASK;
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn set_index(&mut self, index: u16) {
        self.index = index & ADDRESS_MASK;
    }

    pub fn register(&self, index: usize) -> u8 {
        self.regs.get(index).copied().unwrap_or(0)
    }

    pub fn set_register(&mut self, index: usize, value: u8) {
        if let Some(reg) = self.regs.get_mut(index) {
            *reg = value;
        }
    }

    pub fn memory_byte(&self, addr: u16) -> u8 {
        self.memory.get(addr as usize).copied().unwrap_or(0)
    }

    pub fn set_memory_byte(&mut self, addr: u16, value: u8) {
        if let Some(byte) = self.memory.get_mut(addr as usize) {
            *byte = value;
        }
    }

    pub fn stack_pointer(&self) -> usize {
        self.sp as usize
    }

    /// Return addresses currently on the call stack, oldest first.
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.sp as usize]
    }

    pub fn delay_timer(&self) -> u8 {
        self.timers.delay()
    }

    pub fn sound_timer(&self) -> u8 {
        self.timers.sound()
    }

    /// Register a pending FX0A will store the key in.
    pub fn waiting_for_key(&self) -> Option<u8> {
        self.wait
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.display
    }

    /// The framebuffer, if it changed since the last call.
    pub fn take_frame(&mut self) -> Option<&Framebuffer> {
        if self.display.dirty() {
            self.display.mark_clean();
            Some(&self.display)
        } else {
            None
        }
    }
}
