use std::fmt;

/// A decoded CHIP-8 instruction.
///
/// `x`/`y` are register indices (0x0-0xF), `nn` is an immediate byte and
/// `nnn` a 12-bit address.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Instruction {
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1NNN
    Jump { nnn: u16 },
    /// 2NNN
    Call { nnn: u16 },
    /// 3XNN
    SkipEqImmediate { x: u8, nn: u8 },
    /// 4XNN
    SkipNeqImmediate { x: u8, nn: u8 },
    /// 5XY0
    SkipEqReg { x: u8, y: u8 },
    /// 6XNN
    SetImmediate { x: u8, nn: u8 },
    /// 7XNN
    AddImmediate { x: u8, nn: u8 },
    /// 8XY0
    Copy { x: u8, y: u8 },
    /// 8XY1
    Or { x: u8, y: u8 },
    /// 8XY2
    And { x: u8, y: u8 },
    /// 8XY3
    Xor { x: u8, y: u8 },
    /// 8XY4
    AddReg { x: u8, y: u8 },
    /// 8XY5
    SubXY { x: u8, y: u8 },
    /// 8XY6
    ShiftRight { x: u8, y: u8 },
    /// 8XY7
    SubYX { x: u8, y: u8 },
    /// 8XYE
    ShiftLeft { x: u8, y: u8 },
    /// 9XY0
    SkipNeqReg { x: u8, y: u8 },
    /// ANNN
    SetIndex { nnn: u16 },
    /// BNNN
    JumpWithOffset { x: u8, nnn: u16 },
    /// CXNN
    Random { x: u8, nn: u8 },
    /// DXYN
    Draw { x: u8, y: u8, n: u8 },
    /// EX9E
    SkipKeyDown { x: u8 },
    /// EXA1
    SkipKeyUp { x: u8 },
    /// FX07
    ReadDelay { x: u8 },
    /// FX0A
    WaitKey { x: u8 },
    /// FX15
    SetDelay { x: u8 },
    /// FX18
    SetSound { x: u8 },
    /// FX1E
    AddIndex { x: u8 },
    /// FX29
    FontChar { x: u8 },
    /// FX33
    Bcd { x: u8 },
    /// FX55
    Store { x: u8 },
    /// FX65
    Load { x: u8 },
}

impl Instruction {
    /// Decode a big-endian instruction word. Returns `None` for words outside
    /// the supported opcode table, including 0NNN machine code calls.
    pub fn decode(word: u16) -> Option<Instruction> {
        let n1 = ((word >> 12) & 0xF) as u8;
        let x = ((word >> 8) & 0xF) as u8;
        let y = ((word >> 4) & 0xF) as u8;
        let n = (word & 0xF) as u8;
        let nn = (word & 0xFF) as u8;
        let nnn = word & 0x0FFF;

        let inst = match (n1, x, y, n) {
            (0x0, 0x0, 0xE, 0x0) => Instruction::ClearScreen,
            (0x0, 0x0, 0xE, 0xE) => Instruction::Return,
            (0x1, _, _, _) => Instruction::Jump { nnn },
            (0x2, _, _, _) => Instruction::Call { nnn },
            (0x3, _, _, _) => Instruction::SkipEqImmediate { x, nn },
            (0x4, _, _, _) => Instruction::SkipNeqImmediate { x, nn },
            (0x5, _, _, 0x0) => Instruction::SkipEqReg { x, y },
            (0x6, _, _, _) => Instruction::SetImmediate { x, nn },
            (0x7, _, _, _) => Instruction::AddImmediate { x, nn },
            (0x8, _, _, 0x0) => Instruction::Copy { x, y },
            (0x8, _, _, 0x1) => Instruction::Or { x, y },
            (0x8, _, _, 0x2) => Instruction::And { x, y },
            (0x8, _, _, 0x3) => Instruction::Xor { x, y },
            (0x8, _, _, 0x4) => Instruction::AddReg { x, y },
            (0x8, _, _, 0x5) => Instruction::SubXY { x, y },
            (0x8, _, _, 0x6) => Instruction::ShiftRight { x, y },
            (0x8, _, _, 0x7) => Instruction::SubYX { x, y },
            (0x8, _, _, 0xE) => Instruction::ShiftLeft { x, y },
            (0x9, _, _, 0x0) => Instruction::SkipNeqReg { x, y },
            (0xA, _, _, _) => Instruction::SetIndex { nnn },
            (0xB, _, _, _) => Instruction::JumpWithOffset { x, nnn },
            (0xC, _, _, _) => Instruction::Random { x, nn },
            (0xD, _, _, _) => Instruction::Draw { x, y, n },
            (0xE, _, 0x9, 0xE) => Instruction::SkipKeyDown { x },
            (0xE, _, 0xA, 0x1) => Instruction::SkipKeyUp { x },
            (0xF, _, 0x0, 0x7) => Instruction::ReadDelay { x },
            (0xF, _, 0x0, 0xA) => Instruction::WaitKey { x },
            (0xF, _, 0x1, 0x5) => Instruction::SetDelay { x },
            (0xF, _, 0x1, 0x8) => Instruction::SetSound { x },
            (0xF, _, 0x1, 0xE) => Instruction::AddIndex { x },
            (0xF, _, 0x2, 0x9) => Instruction::FontChar { x },
            (0xF, _, 0x3, 0x3) => Instruction::Bcd { x },
            (0xF, _, 0x5, 0x5) => Instruction::Store { x },
            (0xF, _, 0x6, 0x5) => Instruction::Load { x },
            _ => return None,
        };
        Some(inst)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::ClearScreen => write!(f, "CLEAR"),
            Instruction::Return => write!(f, "RET"),
            Instruction::Jump { nnn } => write!(f, "JMP 0x{:03x}", nnn),
            Instruction::Call { nnn } => write!(f, "CALL 0x{:03x}", nnn),
            Instruction::SkipEqImmediate { x, nn } => write!(f, "SKIP V{:x}=={:02x}", x, nn),
            Instruction::SkipNeqImmediate { x, nn } => write!(f, "SKIP V{:x}!={:02x}", x, nn),
            Instruction::SkipEqReg { x, y } => write!(f, "SKIP V{:x}==V{:x}", x, y),
            Instruction::SetImmediate { x, nn } => write!(f, "SET V{:x} {:02x}", x, nn),
            Instruction::AddImmediate { x, nn } => write!(f, "ADD V{:x} {:02x}", x, nn),
            Instruction::Copy { x, y } => write!(f, "SET V{:x} V{:x}", x, y),
            Instruction::Or { x, y } => write!(f, "OR V{:x} V{:x}", x, y),
            Instruction::And { x, y } => write!(f, "AND V{:x} V{:x}", x, y),
            Instruction::Xor { x, y } => write!(f, "XOR V{:x} V{:x}", x, y),
            Instruction::AddReg { x, y } => write!(f, "ADD V{:x} V{:x}", x, y),
            Instruction::SubXY { x, y } => write!(f, "SUB V{:x} V{:x}", x, y),
            Instruction::ShiftRight { x, y } => write!(f, "SHR V{:x} V{:x}", x, y),
            Instruction::SubYX { x, y } => write!(f, "SUB2 V{:x} V{:x}", x, y),
            Instruction::ShiftLeft { x, y } => write!(f, "SHL V{:x} V{:x}", x, y),
            Instruction::SkipNeqReg { x, y } => write!(f, "SKIP V{:x}!=V{:x}", x, y),
            Instruction::SetIndex { nnn } => write!(f, "SET I 0x{:03x}", nnn),
            Instruction::JumpWithOffset { x, nnn } => write!(f, "JMP 0x{:03x} V{:x}", nnn, x),
            Instruction::Random { x, nn } => write!(f, "RNG V{:x} 0x{:02x}", x, nn),
            Instruction::Draw { x, y, n } => write!(f, "DRAW V{:x} V{:x} {:x}", x, y, n),
            Instruction::SkipKeyDown { x } => write!(f, "SKIP KEY V{:x}", x),
            Instruction::SkipKeyUp { x } => write!(f, "SKIP !KEY V{:x}", x),
            Instruction::ReadDelay { x } => write!(f, "SET V{:x} DT", x),
            Instruction::WaitKey { x } => write!(f, "WAIT KEY V{:x}", x),
            Instruction::SetDelay { x } => write!(f, "SET DT V{:x}", x),
            Instruction::SetSound { x } => write!(f, "SET ST V{:x}", x),
            Instruction::AddIndex { x } => write!(f, "ADD I V{:x}", x),
            Instruction::FontChar { x } => write!(f, "FONT V{:x}", x),
            Instruction::Bcd { x } => write!(f, "BCD V{:x}", x),
            Instruction::Store { x } => write!(f, "STORE V{:x}", x),
            Instruction::Load { x } => write!(f, "LOAD V{:x}", x),
        }
    }
}
