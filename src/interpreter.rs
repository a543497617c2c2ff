/// # interpreter
///
/// machine state and the fetch/decode/execute cycle. the interpreter knows
/// nothing about terminals, keyboards or speakers: the host feeds it keys,
/// calls `step` and `tick`, and pulls pixels out when `step` reports a draw.
///
///  V0-VF  8-bit registers; VF doubles as carry/borrow/collision flag
///  I      16-bit index register, base for sprite and bulk memory access
///  PC     16-bit program counter, starts at 0x200
///  stack  16 return addresses, outside addressable memory
///  DT/ST  delay and sound timers, counted down by `tick`
use crate::config::Quirks;
use crate::display::Framebuffer;
use crate::error::Chip8Error;
use crate::input::KeyLatch;
use crate::instruction::Instruction;
use crate::memory::{self, MemoryMap};
use crate::timer::Timers;
use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io;
use std::path::Path;

pub const CHIP8_REGISTER_COUNT: usize = 16;
pub const CHIP8_STACK_DEPTH: usize = 16;
/// the flag register
pub const VF: usize = 0xf;

/// where the program counter goes after an instruction
enum Flow {
    Next,
    Skip,
    Jump(u16),
    /// re-execute this instruction next step
    Stay,
}

pub struct Chip8Interpreter {
    memory: memory::Chip8MemoryMap,
    framebuffer: Framebuffer,
    keys: KeyLatch,
    timers: Timers,
    quirks: Quirks,
    rng: StdRng,
    registers: [u8; CHIP8_REGISTER_COUNT],
    i: u16,
    program_counter: u16,
    stack: [u16; CHIP8_STACK_DEPTH],
    /// number of live entries in stack
    stack_pointer: usize,
}

impl Chip8Interpreter {
    pub fn new() -> Chip8Interpreter {
        Chip8Interpreter::with_rng(Quirks::default(), StdRng::from_entropy())
    }

    /// an interpreter whose Cxkk results repeat from run to run
    pub fn with_seed(quirks: Quirks, seed: u64) -> Chip8Interpreter {
        Chip8Interpreter::with_rng(quirks, StdRng::seed_from_u64(seed))
    }

    pub fn with_quirks(quirks: Quirks) -> Chip8Interpreter {
        Chip8Interpreter::with_rng(quirks, StdRng::from_entropy())
    }

    fn with_rng(quirks: Quirks, rng: StdRng) -> Chip8Interpreter {
        let memory = memory::Chip8MemoryMap::new();
        let program_counter = memory.program_addr;
        Chip8Interpreter {
            memory,
            framebuffer: Framebuffer::new(),
            keys: KeyLatch::new(),
            timers: Timers::new(),
            quirks,
            rng,
            registers: [0; CHIP8_REGISTER_COUNT],
            i: 0,
            program_counter,
            stack: [0; CHIP8_STACK_DEPTH],
            stack_pointer: 0,
        }
    }

    /// back to power-on state: memory wiped apart from the font, pc at 0x200.
    /// quirks and the random source are kept
    pub fn reset(&mut self) {
        self.memory = memory::Chip8MemoryMap::new();
        self.framebuffer.clear();
        self.keys = KeyLatch::new();
        self.timers = Timers::new();
        self.registers = [0; CHIP8_REGISTER_COUNT];
        self.i = 0;
        self.program_counter = self.memory.program_addr;
        self.stack = [0; CHIP8_STACK_DEPTH];
        self.stack_pointer = 0;
    }

    /// load a chip8 program at 0x200 and point the program counter at it.
    /// returns how many bytes were loaded
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, io::Error> {
        let len = self.memory.load_program(reader)?;
        self.program_counter = self.memory.program_addr;
        Ok(len)
    }

    /// load a chip8 program from a file. if the file can't be read nothing
    /// about the machine changes
    pub fn load_rom(&mut self, path: impl AsRef<Path>) -> Result<usize, Chip8Error> {
        let path = path.as_ref();
        let rom_open = |source| Chip8Error::RomOpen {
            path: path.to_path_buf(),
            source,
        };
        let mut f = File::open(path).map_err(rom_open)?;
        let len = self.load_program(&mut f).map_err(rom_open)?;
        debug!("loaded {} from {}", len, path.display());
        Ok(len)
    }

    /// replace the keypad state with the set of keys the host sees held
    pub fn set_keys(&mut self, pressed: &[u8]) -> Result<(), Chip8Error> {
        self.keys.set(pressed)
    }

    /// 60Hz timer interrupt. returns true when the sound timer has just run
    /// out and the host should sound its tone
    pub fn tick(&mut self) -> bool {
        self.timers.tick()
    }

    /// current screen, one bool per pixel
    pub fn pixels(&self) -> Vec<bool> {
        self.framebuffer.pixels()
    }

    /// current screen, unpacked into a caller-owned buffer
    pub fn unpack_pixels(&self, out: &mut [bool]) -> Result<(), Chip8Error> {
        self.framebuffer.unpack_into(out)
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn register(&self, x: usize) -> u8 {
        self.registers[x & 0xf]
    }

    pub fn set_register(&mut self, x: usize, value: u8) {
        self.registers[x & 0xf] = value;
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn stack_pointer(&self) -> usize {
        self.stack_pointer
    }

    pub fn timers(&self) -> Timers {
        self.timers
    }

    pub fn memory(&self) -> &memory::Chip8MemoryMap {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut memory::Chip8MemoryMap {
        &mut self.memory
    }

    /// fetch, decode and execute one instruction. Ok(true) means the screen
    /// changed.
    ///
    /// unsupported opcodes and stack faults come back as errors, but only
    /// once the program counter has moved past the offending instruction, so
    /// the host can log them and carry on stepping
    pub fn step(&mut self) -> Result<bool, Chip8Error> {
        let addr = self.program_counter;
        let opcode = self.memory.get_word(addr);

        let instruction = match Instruction::decode(opcode, addr) {
            Ok(instruction) => instruction,
            Err(e) => {
                warn!("{}", e);
                self.program_counter = addr.wrapping_add(2);
                return Err(e);
            }
        };
        trace!("{:03X}  {:04X}  {}", addr, opcode, instruction);

        match self.execute(instruction) {
            Ok(flow) => {
                self.program_counter = match flow {
                    Flow::Next => addr.wrapping_add(2),
                    Flow::Skip => addr.wrapping_add(4),
                    Flow::Jump(target) => target,
                    Flow::Stay => addr,
                };
                Ok(instruction.affects_display())
            }
            Err(e) => {
                warn!("{}", e);
                self.program_counter = addr.wrapping_add(2);
                Err(e)
            }
        }
    }

    fn skip_if(condition: bool) -> Flow {
        if condition {
            Flow::Skip
        } else {
            Flow::Next
        }
    }

    fn execute(&mut self, instruction: Instruction) -> Result<Flow, Chip8Error> {
        use Instruction::*;
        let v = &mut self.registers;

        let flow = match instruction {
            ClearScreen => {
                self.framebuffer.clear();
                Flow::Next
            }
            Return => {
                if self.stack_pointer == 0 {
                    return Err(Chip8Error::StackUnderflow {
                        addr: self.program_counter,
                    });
                }
                self.stack_pointer -= 1;
                // lands back on the call, so step past it
                Flow::Jump(self.stack[self.stack_pointer].wrapping_add(2))
            }
            Jump(nnn) => Flow::Jump(nnn),
            Call(nnn) => {
                if self.stack_pointer == CHIP8_STACK_DEPTH {
                    return Err(Chip8Error::StackOverflow {
                        addr: self.program_counter,
                    });
                }
                self.stack[self.stack_pointer] = self.program_counter;
                self.stack_pointer += 1;
                Flow::Jump(nnn)
            }
            SkipIfEqual { x, byte } => Self::skip_if(v[x] == byte),
            SkipIfNotEqual { x, byte } => Self::skip_if(v[x] != byte),
            SkipIfRegistersEqual { x, y } => Self::skip_if(v[x] == v[y]),
            SkipIfRegistersNotEqual { x, y } => Self::skip_if(v[x] != v[y]),
            Load { x, byte } => {
                v[x] = byte;
                Flow::Next
            }
            AddByte { x, byte } => {
                v[x] = v[x].wrapping_add(byte);
                Flow::Next
            }
            Move { x, y } => {
                v[x] = v[y];
                Flow::Next
            }
            Or { x, y } => {
                v[x] |= v[y];
                Flow::Next
            }
            And { x, y } => {
                v[x] &= v[y];
                Flow::Next
            }
            Xor { x, y } => {
                v[x] ^= v[y];
                Flow::Next
            }
            // flag is written last so it survives x == F
            AddCarry { x, y } => {
                let (sum, carry) = v[x].overflowing_add(v[y]);
                v[x] = sum;
                v[VF] = carry as u8;
                Flow::Next
            }
            Sub { x, y } => {
                let (a, b) = (v[x], v[y]);
                v[x] = a.wrapping_sub(b);
                v[VF] = (a > b) as u8;
                Flow::Next
            }
            SubReverse { x, y } => {
                let (a, b) = (v[x], v[y]);
                v[x] = b.wrapping_sub(a);
                v[VF] = (b > a) as u8;
                Flow::Next
            }
            ShiftRight { x } => {
                let a = v[x];
                v[x] = a >> 1;
                v[VF] = a & 0x01;
                Flow::Next
            }
            ShiftLeft { x } => {
                let a = v[x];
                v[x] = a << 1;
                v[VF] = a >> 7;
                Flow::Next
            }
            LoadIndex(nnn) => {
                self.i = nnn;
                Flow::Next
            }
            JumpOffset(nnn) => Flow::Jump(nnn.wrapping_add(v[0] as u16) & 0x0fff),
            Random { x, mask } => {
                v[x] = self.rng.gen::<u8>() & mask;
                Flow::Next
            }
            Draw { x, y, height } => {
                let (px, py) = (v[x], v[y]);
                let sprite = self.memory.read_wrapping(self.i, height as usize);
                v[VF] = 0;
                if self.framebuffer.blit(px, py, &sprite, &self.quirks) {
                    v[VF] = 1;
                }
                Flow::Next
            }
            SkipIfKey { x } => Self::skip_if(self.keys.is_pressed(v[x])),
            SkipIfNotKey { x } => Self::skip_if(!self.keys.is_pressed(v[x])),
            ReadDelay { x } => {
                v[x] = self.timers.delay;
                Flow::Next
            }
            WaitKey { x } => match self.keys.first_pressed() {
                Some(key) => {
                    v[x] = key;
                    Flow::Next
                }
                None => Flow::Stay,
            },
            SetDelay { x } => {
                self.timers.delay = v[x];
                Flow::Next
            }
            SetSound { x } => {
                self.timers.sound = v[x];
                Flow::Next
            }
            AddIndex { x } => {
                self.i = self.i.wrapping_add(v[x] as u16);
                Flow::Next
            }
            LoadGlyph { x } => {
                self.i = memory::Chip8MemoryMap::glyph_addr(v[x]);
                Flow::Next
            }
            StoreBcd { x } => {
                let value = v[x];
                self.memory.set_byte(self.i, value / 100);
                self.memory.set_byte(self.i.wrapping_add(1), (value / 10) % 10);
                self.memory.set_byte(self.i.wrapping_add(2), value % 10);
                Flow::Next
            }
            StoreRegisters { x } => {
                for (n, value) in v.iter().enumerate().take(x + 1) {
                    self.memory.set_byte(self.i.wrapping_add(n as u16), *value);
                }
                Flow::Next
            }
            LoadRegisters { x } => {
                for (n, value) in v.iter_mut().enumerate().take(x + 1) {
                    *value = self.memory.get_byte(self.i.wrapping_add(n as u16));
                }
                Flow::Next
            }
        };
        Ok(flow)
    }
}

impl Default for Chip8Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
