///
/// ## Design
///
/// * a CHIP-8 interpreter that is a pure, single-threaded state machine: the
///   host decides when to step it, when to tick its timers and when to look
///   at its screen
/// * memory, registers, stack and timers are fixed-size arrays; every address
///   the program computes is masked to 12 bits before it touches memory, and
///   the call stack refuses to overflow or underflow rather than corrupt
///   anything
/// * abstract display so can plug alternatives; starting with TUI in-console
/// * interpreter-specific behaviour (sprite collision, screen edges) is
///   configured through `Quirks`
///
/// Model
///
/// Environment
///  |-- display, input, audio, config
///  |-- interpreter(memory, framebuffer, key latch, timers, quirks)
///  |    |-- instruction set
///  |    `-- machine state
///  `-- main loop, once per 1/60s
///       |-- interpreter.set_keys(input.pressed_keys())
///       |-- interpreter.step() x cycles_per_frame
///       |-- interpreter.tick(); beep if the sound timer ran out
///       |-- if drawn: display.draw(interpreter.pixels())
///       `-- sleep out the rest of the frame
pub mod cli;
pub mod config;
pub mod display;
pub mod environment;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod sound;
pub mod timer;

pub use config::{CollisionPolicy, EdgePolicy, Quirks, RunConfig};
pub use error::Chip8Error;
pub use interpreter::Chip8Interpreter;
