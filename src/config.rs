use clap::ValueEnum;

/// how Dxyn decides that a sprite erased a lit pixel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum CollisionPolicy {
    /// VF is set when a framebuffer byte compares smaller after the XOR than
    /// before it. coarse: a byte that loses one pixel but gains a higher one
    /// won't register
    #[default]
    ByteGroup,
    /// VF is set when any sprite bit lands on a lit pixel
    Exact,
}

/// what happens to the parts of a sprite that run off the screen
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum EdgePolicy {
    #[default]
    Clip,
    Wrap,
}

/// behaviour that differs between CHIP-8 interpreters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Quirks {
    pub collision: CollisionPolicy,
    pub edges: EdgePolicy,
}

/// log level when RUST_LOG isn't set. the terminal display owns the screen,
/// so per-instruction warnings would scribble over it
pub const DEFAULT_LOG_FILTER: &str = "error";

/// host loop pacing
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    /// instructions executed between timer ticks
    pub cycles_per_frame: u32,
    /// timer and display refresh rate, Hz
    pub frame_rate: f64,
    /// stop after this many frames; None runs until the user quits
    pub max_frames: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            cycles_per_frame: 10,
            frame_rate: 60.0,
            max_frames: None,
        }
    }
}
