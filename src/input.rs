use crate::error::Chip8Error;
use crossterm::event::{poll, read, Event, KeyCode};
use crossterm::terminal;
use log::{debug, warn};
use std::collections::HashMap;
use std::io;
use std::time::Duration;

/// how many keys the hex keypad has
pub const CHIP8_KEY_COUNT: usize = 16;

/// the keypad as the interpreter sees it: which keys are down right now
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyLatch {
    keys: [bool; CHIP8_KEY_COUNT],
}

impl KeyLatch {
    pub fn new() -> Self {
        KeyLatch::default()
    }

    /// replace the whole latch with the given set of held keys. an index
    /// outside 0x0-0xf is rejected and leaves the latch as it was
    pub fn set(&mut self, pressed: &[u8]) -> Result<(), Chip8Error> {
        if let Some(bad) = pressed.iter().find(|k| **k as usize >= CHIP8_KEY_COUNT) {
            return Err(Chip8Error::InvalidKey(*bad));
        }
        self.keys = [false; CHIP8_KEY_COUNT];
        for key in pressed {
            self.keys[*key as usize] = true;
        }
        Ok(())
    }

    /// keys past 0xf can't be pressed
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }

    /// lowest-numbered held key, if any
    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|k| *k).map(|k| k as u8)
    }
}

/// map of async bytes read from the keyboard to what the chip8 might expect,
/// using left-hand side of qwerty keyboard
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// terminals only report key presses (and autorepeat), never releases, so a
/// key counts as held for this many polls after it was last seen
const STDIN_HOLD_POLLS: u8 = 6;

/// reads keypresses
pub trait Input {
    /// the key indices (0x0-0xf) currently held down
    fn pressed_keys(&mut self) -> Result<&[u8], io::Error>;

    /// has the user asked to stop?
    fn quit_requested(&self) -> bool;
}

/// simple implementation of Input, using STDIN
pub struct StdinInput {
    buffer: Vec<u8>,
    held: [u8; CHIP8_KEY_COUNT],
    keymap: HashMap<char, u8>,
    quit: bool,
}

impl StdinInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(StdinInput {
            buffer: Vec::new(),
            held: [0; CHIP8_KEY_COUNT],
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            quit: false,
        })
    }

    fn read_stdin(&mut self) -> Result<(), io::Error> {
        for h in self.held.iter_mut() {
            *h = h.saturating_sub(1);
        }
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => match evt.code {
                    KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                        Some(mapped_key) => self.held[*mapped_key as usize] = STDIN_HOLD_POLLS,
                        None => debug!("can't map {:?} to a CHIP-8 key", key),
                    },
                    KeyCode::Esc => self.quit = true,
                    _ => debug!("ignoring key event {:?}", evt),
                },
                Event::Resize(..) => {}
                other => warn!("unexpected terminal event {:?}", other),
            }
        }
        Ok(())
    }
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for StdinInput {
    fn pressed_keys(&mut self) -> Result<&[u8], io::Error> {
        self.read_stdin()?;
        self.buffer.clear();
        for (key, h) in self.held.iter().enumerate() {
            if *h > 0 {
                self.buffer.push(key as u8);
            }
        }
        Ok(self.buffer.as_slice())
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }
}

/// dummy Input implementation for testing: plays back one set of held keys
/// per poll, then nothing
pub struct DummyInput {
    frames: Vec<Vec<u8>>,
    current: Vec<u8>,
    polls: usize,
}

impl DummyInput {
    pub fn new(keys: &[u8]) -> Self {
        DummyInput::with_frames(vec![Vec::from(keys)])
    }

    pub fn with_frames(frames: Vec<Vec<u8>>) -> Self {
        DummyInput {
            frames,
            current: Vec::new(),
            polls: 0,
        }
    }
}

impl Input for DummyInput {
    fn pressed_keys(&mut self) -> Result<&[u8], io::Error> {
        self.current = self.frames.get(self.polls).cloned().unwrap_or_default();
        self.polls += 1;
        Ok(self.current.as_slice())
    }

    fn quit_requested(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_starts_released() {
        let l = KeyLatch::new();
        assert!((0..16).all(|k| !l.is_pressed(k)));
        assert_eq!(l.first_pressed(), None);
    }

    #[test]
    fn test_latch_set_overwrites() -> Result<(), Chip8Error> {
        let mut l = KeyLatch::new();
        l.set(&[0x3, 0xf])?;
        assert!(l.is_pressed(0x3) && l.is_pressed(0xf));
        l.set(&[0x7])?;
        assert!(!l.is_pressed(0x3) && !l.is_pressed(0xf));
        assert_eq!(l.first_pressed(), Some(0x7));
        l.set(&[])?;
        assert_eq!(l.first_pressed(), None);
        Ok(())
    }

    #[test]
    fn test_latch_rejects_bad_key() -> Result<(), Chip8Error> {
        let mut l = KeyLatch::new();
        l.set(&[0x1])?;
        assert!(matches!(l.set(&[0x2, 0x10]), Err(Chip8Error::InvalidKey(0x10))));
        // untouched
        assert!(l.is_pressed(0x1));
        assert!(!l.is_pressed(0x2));
        Ok(())
    }

    #[test]
    fn test_out_of_range_key_not_pressed() {
        let l = KeyLatch::new();
        assert!(!l.is_pressed(0x10));
        assert!(!l.is_pressed(0xff));
    }

    #[test]
    fn test_first_pressed_is_lowest() -> Result<(), Chip8Error> {
        let mut l = KeyLatch::new();
        l.set(&[0xc, 0x4, 0x9])?;
        assert_eq!(l.first_pressed(), Some(0x4));
        Ok(())
    }

    #[test]
    fn test_dummy_input_plays_back() -> Result<(), io::Error> {
        let mut i = DummyInput::with_frames(vec![vec![1], vec![], vec![2, 3]]);
        assert_eq!(i.pressed_keys()?, &[1]);
        assert_eq!(i.pressed_keys()?, &[] as &[u8]);
        assert_eq!(i.pressed_keys()?, &[2, 3]);
        assert_eq!(i.pressed_keys()?, &[] as &[u8]);
        assert!(!i.quit_requested());
        Ok(())
    }

    #[test]
    fn test_keymap_covers_keypad() {
        let m: HashMap<char, u8> = HashMap::from(CHIP8_CONVENTIONAL_KEYMAP);
        let mut keys = m.values().copied().collect::<Vec<_>>();
        keys.sort();
        assert_eq!(keys, (0..16).collect::<Vec<u8>>());
    }
}
