/// the two countdown registers. both count down at 60Hz, driven by the host
/// rather than by instructions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
}

impl Timers {
    pub fn new() -> Self {
        Timers::default()
    }

    /// count both timers down by one, stopping at zero. returns true exactly
    /// once per sound countdown: on the tick that takes it from 1 to 0
    pub fn tick(&mut self) -> bool {
        if self.delay > 0 {
            self.delay -= 1;
        }
        if self.sound > 0 {
            self.sound -= 1;
            return self.sound == 0;
        }
        false
    }
}
