/// # environment
///
/// sets everything up and runs the main loop. per frame:
///
///  |-- poll input; hand the held keys to the interpreter
///  |-- interpreter.step() x cycles_per_frame
///  |-- interpreter.tick() once; sound the tone if it ran out
///  |-- if anything was drawn, unpack pixels and hand them to the display
///  `-- sleep off the rest of the frame
use crate::config::RunConfig;
use crate::display::{Display, SCREEN_HEIGHT, SCREEN_PIXELS, SCREEN_WIDTH};
use crate::input::Input;
use crate::interpreter::Chip8Interpreter;
use crate::sound::Sound;
use log::debug;
use std::error::Error;
use spin_sleep::LoopHelper;
use std::io;

pub struct Environment<'a> {
    interpreter: Chip8Interpreter,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    config: RunConfig,
    pixels: Vec<bool>,
}

impl<'a> Environment<'a> {
    pub fn new(
        interpreter: Chip8Interpreter,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
        config: RunConfig,
    ) -> Result<Environment<'a>, io::Error> {
        // TODO: scale the framebuffer for displays that aren't 64x32
        if display.resolution() != (SCREEN_WIDTH, SCREEN_HEIGHT) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("display must be {}x{}", SCREEN_WIDTH, SCREEN_HEIGHT),
            ));
        }
        if !(config.frame_rate.is_finite() && config.frame_rate > 0.0) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("frame rate must be a positive number of Hz, not {}", config.frame_rate),
            ));
        }
        Ok(Environment {
            interpreter,
            display,
            input,
            sound,
            config,
            pixels: vec![false; SCREEN_PIXELS],
        })
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    /// run frames until the user quits or config.max_frames is reached.
    /// returns the number of frames run
    pub fn main_loop(&mut self) -> Result<u64, Box<dyn Error>> {
        let mut loop_helper = LoopHelper::builder()
            .report_interval_s(1.0)
            .build_with_target_rate(self.config.frame_rate);
        let mut frames = 0u64;

        while self.config.max_frames.map_or(true, |max| frames < max) {
            loop_helper.loop_start();
            if !self.frame()? {
                debug!("quit after {} frames", frames);
                break;
            }
            frames += 1;

            if let Some(fps) = loop_helper.report_rate() {
                debug!("{:.1} frames/s", fps);
            }
            loop_helper.loop_sleep();
        }
        Ok(frames)
    }

    /// one 60Hz frame's worth of work. returns false if the user asked to quit
    pub fn frame(&mut self) -> Result<bool, Box<dyn Error>> {
        let keys = self.input.pressed_keys()?;
        self.interpreter.set_keys(keys)?;
        if self.input.quit_requested() {
            return Ok(false);
        }

        let mut drew = false;
        for _ in 0..self.config.cycles_per_frame {
            match self.interpreter.step() {
                Ok(d) => drew |= d,
                // already logged by the interpreter, which has moved on
                Err(e) if e.is_recoverable() => {}
                Err(e) => return Err(e.into()),
            }
        }

        // tones last one frame
        if self.sound.is_beeping() {
            self.sound.stop()?;
        }
        if self.interpreter.tick() {
            self.sound.beep()?;
        }

        if drew {
            self.interpreter.unpack_pixels(&mut self.pixels)?;
            self.display.draw(&self.pixels)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DummyDisplay;
    use crate::input::DummyInput;
    use crate::sound::Mute;

    fn interpreter(prog: &[u8]) -> Chip8Interpreter {
        let mut i = Chip8Interpreter::with_seed(Default::default(), 1);
        let mut p: &[u8] = prog;
        i.load_program(&mut p).unwrap();
        i
    }

    fn config(frames: u64) -> RunConfig {
        RunConfig {
            cycles_per_frame: 10,
            frame_rate: 1000.0,
            max_frames: Some(frames),
        }
    }

    #[test]
    fn test_draws_when_screen_changes() -> Result<(), Box<dyn Error>> {
        // LD F,V0 ; DRW V0,V0,5 ; JP 204
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        {
            let mut env = Environment::new(
                interpreter(&[0xf0, 0x29, 0xd0, 0x05, 0x12, 0x04]),
                &mut display,
                &mut input,
                &mut sound,
                config(3),
            )?;
            assert_eq!(env.main_loop()?, 3);
        }
        // nothing new drawn after the first frame
        assert_eq!(display.frames, 1);
        assert!(display.last[0] && display.last[3] && !display.last[4]);
        Ok(())
    }

    #[test]
    fn test_keys_reach_the_interpreter() -> Result<(), Box<dyn Error>> {
        // LD V3,K ; JP 202
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::with_frames(vec![vec![], vec![], vec![0x5]]);
        let mut sound = Mute::new();
        let mut env = Environment::new(
            interpreter(&[0xf3, 0x0a, 0x12, 0x02]),
            &mut display,
            &mut input,
            &mut sound,
            config(2),
        )?;
        env.main_loop()?;
        assert_eq!(env.interpreter().program_counter(), 0x200);
        assert!(env.frame()?);
        assert_eq!(env.interpreter().register(3), 0x5);
        assert_eq!(env.interpreter().program_counter(), 0x202);
        Ok(())
    }

    #[test]
    fn test_tone_beeps_for_one_frame() -> Result<(), Box<dyn Error>> {
        // V0 = 2 ; ST = V0 ; JP 204
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        {
            let mut env = Environment::new(
                interpreter(&[0x60, 0x02, 0xf0, 0x18, 0x12, 0x04]),
                &mut display,
                &mut input,
                &mut sound,
                config(4),
            )?;
            env.main_loop()?;
        }
        assert_eq!(sound.beeps, 1);
        assert!(!sound.is_beeping());
        Ok(())
    }

    #[test]
    fn test_bad_opcode_does_not_stop_the_loop() -> Result<(), Box<dyn Error>> {
        // ??? ; V0 = 7 ; JP 204
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        let mut env = Environment::new(
            interpreter(&[0xff, 0xff, 0x60, 0x07, 0x12, 0x04]),
            &mut display,
            &mut input,
            &mut sound,
            config(1),
        )?;
        assert_eq!(env.main_loop()?, 1);
        assert_eq!(env.interpreter().register(0), 7);
        Ok(())
    }

    #[test]
    fn test_rejects_unusable_frame_rate() {
        for hz in [0.0, -60.0, f64::NAN, f64::INFINITY] {
            let mut display = DummyDisplay::new();
            let mut input = DummyInput::new(&[]);
            let mut sound = Mute::new();
            let config = RunConfig {
                frame_rate: hz,
                ..config(1)
            };
            match Environment::new(interpreter(&[0x12, 0x00]), &mut display, &mut input, &mut sound, config) {
                Err(e) => assert_eq!(e.kind(), io::ErrorKind::InvalidInput),
                Ok(_) => panic!("frame rate {} was accepted", hz),
            }
        }
    }

    #[test]
    fn test_bad_key_from_host_is_fatal() -> Result<(), Box<dyn Error>> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[0x10]);
        let mut sound = Mute::new();
        let mut env = Environment::new(
            interpreter(&[0x12, 0x00]),
            &mut display,
            &mut input,
            &mut sound,
            config(1),
        )?;
        assert!(env.main_loop().is_err());
        Ok(())
    }
}
