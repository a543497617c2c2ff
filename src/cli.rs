use crate::config::{CollisionPolicy, EdgePolicy, Quirks, RunConfig};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "chip8vm",
    about = "CHIP-8 interpreter for the terminal",
    long_about = "chip8vm - CHIP-8 interpreter\n\nRuns a CHIP-8 ROM in the terminal. Keys 1234/qwer/asdf/zxcv map onto the hex keypad; Esc quits.",
    version
)]
pub struct Cli {
    /// ROM to run
    #[arg(value_name = "ROM")]
    pub rom: PathBuf,

    /// Instructions executed per frame
    #[arg(short, long, default_value = "10")]
    pub cycles: u32,

    /// Frames (timer ticks) per second
    #[arg(long, default_value = "60", value_parser = parse_hz)]
    pub hz: f64,

    /// Stop after this many frames
    #[arg(short, long)]
    pub frames: Option<u64>,

    /// Seed for the random number instruction, for repeatable runs
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Don't beep
    #[arg(short, long)]
    pub mute: bool,

    /// How sprite collisions are detected
    #[arg(long, value_enum, default_value_t = CollisionPolicy::ByteGroup)]
    pub collision: CollisionPolicy,

    /// What happens to sprites drawn past the screen edge
    #[arg(long, value_enum, default_value_t = EdgePolicy::Clip)]
    pub edges: EdgePolicy,
}

/// a frame rate has to be a positive, finite number of Hz
fn parse_hz(s: &str) -> Result<f64, String> {
    let hz: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if hz.is_finite() && hz > 0.0 {
        Ok(hz)
    } else {
        Err(format!("{} is not a usable frame rate", s))
    }
}

impl Cli {
    pub fn quirks(&self) -> Quirks {
        Quirks {
            collision: self.collision,
            edges: self.edges,
        }
    }

    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            cycles_per_frame: self.cycles,
            frame_rate: self.hz,
            max_frames: self.frames,
        }
    }
}
