//! # instruction set
//!
//! every instruction is two bytes, big-endian. the top nibble picks the
//! family; the rest splits into some of:
//!
//! ```text
//!   _nnn  12-bit address
//!   _x__  register index
//!   __y_  register index
//!   __kk  8-bit immediate
//!   ___n  4-bit immediate
//! ```
use crate::error::Chip8Error;
use std::fmt;

/// a decoded CHIP-8 instruction. x and y are register indices (0x0-0xf)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1nnn
    Jump(u16),
    /// 2nnn
    Call(u16),
    /// 3xkk
    SkipIfEqual { x: usize, byte: u8 },
    /// 4xkk
    SkipIfNotEqual { x: usize, byte: u8 },
    /// 5xy0
    SkipIfRegistersEqual { x: usize, y: usize },
    /// 6xkk
    Load { x: usize, byte: u8 },
    /// 7xkk
    AddByte { x: usize, byte: u8 },
    /// 8xy0
    Move { x: usize, y: usize },
    /// 8xy1
    Or { x: usize, y: usize },
    /// 8xy2
    And { x: usize, y: usize },
    /// 8xy3
    Xor { x: usize, y: usize },
    /// 8xy4
    AddCarry { x: usize, y: usize },
    /// 8xy5
    Sub { x: usize, y: usize },
    /// 8xy6
    ShiftRight { x: usize },
    /// 8xy7
    SubReverse { x: usize, y: usize },
    /// 8xyE
    ShiftLeft { x: usize },
    /// 9xy0
    SkipIfRegistersNotEqual { x: usize, y: usize },
    /// Annn
    LoadIndex(u16),
    /// Bnnn
    JumpOffset(u16),
    /// Cxkk
    Random { x: usize, mask: u8 },
    /// Dxyn
    Draw { x: usize, y: usize, height: u8 },
    /// Ex9E
    SkipIfKey { x: usize },
    /// ExA1
    SkipIfNotKey { x: usize },
    /// Fx07
    ReadDelay { x: usize },
    /// Fx0A
    WaitKey { x: usize },
    /// Fx15
    SetDelay { x: usize },
    /// Fx18
    SetSound { x: usize },
    /// Fx1E
    AddIndex { x: usize },
    /// Fx29
    LoadGlyph { x: usize },
    /// Fx33
    StoreBcd { x: usize },
    /// Fx55
    StoreRegisters { x: usize },
    /// Fx65
    LoadRegisters { x: usize },
}

impl Instruction {
    /// decode a raw instruction word. addr is only used to report where an
    /// unsupported opcode was found
    pub fn decode(opcode: u16, addr: u16) -> Result<Instruction, Chip8Error> {
        use Instruction::*;

        let x = ((opcode & 0x0f00) >> 8) as usize;
        let y = ((opcode & 0x00f0) >> 4) as usize;
        let n = (opcode & 0x000f) as u8;
        let kk = (opcode & 0x00ff) as u8;
        let nnn = opcode & 0x0fff;

        let instruction = match (opcode & 0xf000) >> 12 {
            0x0 => match opcode {
                0x00e0 => ClearScreen,
                0x00ee => Return,
                _ => return Err(Chip8Error::UnsupportedOpcode { opcode, addr }),
            },
            0x1 => Jump(nnn),
            0x2 => Call(nnn),
            0x3 => SkipIfEqual { x, byte: kk },
            0x4 => SkipIfNotEqual { x, byte: kk },
            0x5 if n == 0 => SkipIfRegistersEqual { x, y },
            0x6 => Load { x, byte: kk },
            0x7 => AddByte { x, byte: kk },
            0x8 => match n {
                0x0 => Move { x, y },
                0x1 => Or { x, y },
                0x2 => And { x, y },
                0x3 => Xor { x, y },
                0x4 => AddCarry { x, y },
                0x5 => Sub { x, y },
                0x6 => ShiftRight { x },
                0x7 => SubReverse { x, y },
                0xe => ShiftLeft { x },
                _ => return Err(Chip8Error::UnsupportedOpcode { opcode, addr }),
            },
            0x9 if n == 0 => SkipIfRegistersNotEqual { x, y },
            0xa => LoadIndex(nnn),
            0xb => JumpOffset(nnn),
            0xc => Random { x, mask: kk },
            0xd => Draw { x, y, height: n },
            0xe => match kk {
                0x9e => SkipIfKey { x },
                0xa1 => SkipIfNotKey { x },
                _ => return Err(Chip8Error::UnsupportedOpcode { opcode, addr }),
            },
            0xf => match kk {
                0x07 => ReadDelay { x },
                0x0a => WaitKey { x },
                0x15 => SetDelay { x },
                0x18 => SetSound { x },
                0x1e => AddIndex { x },
                0x29 => LoadGlyph { x },
                0x33 => StoreBcd { x },
                0x55 => StoreRegisters { x },
                0x65 => LoadRegisters { x },
                _ => return Err(Chip8Error::UnsupportedOpcode { opcode, addr }),
            },
            _ => return Err(Chip8Error::UnsupportedOpcode { opcode, addr }),
        };
        Ok(instruction)
    }

    /// does executing this change what's on screen?
    pub fn affects_display(&self) -> bool {
        matches!(self, Instruction::ClearScreen | Instruction::Draw { .. })
    }
}

/// assembler-ish mnemonics, for traces
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(nnn) => write!(f, "JP {:03X}", nnn),
            Call(nnn) => write!(f, "CALL {:03X}", nnn),
            SkipIfEqual { x, byte } => write!(f, "SE V{:X}, {:02X}", x, byte),
            SkipIfNotEqual { x, byte } => write!(f, "SNE V{:X}, {:02X}", x, byte),
            SkipIfRegistersEqual { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            Load { x, byte } => write!(f, "LD V{:X}, {:02X}", x, byte),
            AddByte { x, byte } => write!(f, "ADD V{:X}, {:02X}", x, byte),
            Move { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddCarry { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight { x } => write!(f, "SHR V{:X}", x),
            SubReverse { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft { x } => write!(f, "SHL V{:X}", x),
            SkipIfRegistersNotEqual { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            LoadIndex(nnn) => write!(f, "LD I, {:03X}", nnn),
            JumpOffset(nnn) => write!(f, "JP V0, {:03X}", nnn),
            Random { x, mask } => write!(f, "RND V{:X}, {:02X}", x, mask),
            Draw { x, y, height } => write!(f, "DRW V{:X}, V{:X}, {:X}", x, y, height),
            SkipIfKey { x } => write!(f, "SKP V{:X}", x),
            SkipIfNotKey { x } => write!(f, "SKNP V{:X}", x),
            ReadDelay { x } => write!(f, "LD V{:X}, DT", x),
            WaitKey { x } => write!(f, "LD V{:X}, K", x),
            SetDelay { x } => write!(f, "LD DT, V{:X}", x),
            SetSound { x } => write!(f, "LD ST, V{:X}", x),
            AddIndex { x } => write!(f, "ADD I, V{:X}", x),
            LoadGlyph { x } => write!(f, "LD F, V{:X}", x),
            StoreBcd { x } => write!(f, "LD B, V{:X}", x),
            StoreRegisters { x } => write!(f, "LD [I], V{:X}", x),
            LoadRegisters { x } => write!(f, "LD V{:X}, [I]", x),
        }
    }
}
