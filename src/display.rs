use crate::config::{CollisionPolicy, EdgePolicy, Quirks};
use crate::error::Chip8Error;
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;
/// bytes per framebuffer row
pub const SCREEN_STRIDE: usize = SCREEN_WIDTH / 8;
pub const SCREEN_BYTES: usize = SCREEN_STRIDE * SCREEN_HEIGHT;
pub const SCREEN_PIXELS: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

/// packed monochrome framebuffer: one bit per pixel, row-major, most
/// significant bit leftmost
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    bytes: [u8; SCREEN_BYTES],
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            bytes: [0; SCREEN_BYTES],
        }
    }

    pub fn clear(&mut self) {
        self.bytes = [0; SCREEN_BYTES];
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// is the pixel at (x, y) lit? coordinates wrap
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        let (x, y) = (x % SCREEN_WIDTH, y % SCREEN_HEIGHT);
        self.bytes[y * SCREEN_STRIDE + x / 8] & (0x80 >> (x % 8)) != 0
    }

    /// XOR a sprite onto the screen with its top-left corner at (x, y), one
    /// byte per row. returns true if the collision policy says a lit pixel
    /// was erased
    pub fn blit(&mut self, x: u8, y: u8, sprite: &[u8], quirks: &Quirks) -> bool {
        let x = x as usize % SCREEN_WIDTH;
        let y = y as usize % SCREEN_HEIGHT;
        let column = x / 8;
        let shift = x % 8;
        let mut collided = false;

        for (row, bits) in sprite.iter().enumerate() {
            let mut ty = y + row;
            if ty >= SCREEN_HEIGHT {
                match quirks.edges {
                    EdgePolicy::Clip => break,
                    EdgePolicy::Wrap => ty %= SCREEN_HEIGHT,
                }
            }

            // a row straddles two bytes unless x is byte-aligned
            let window = ((*bits as u16) << 8) >> shift;
            for (i, group) in window.to_be_bytes().into_iter().enumerate() {
                if group == 0 {
                    continue;
                }
                let mut tx = column + i;
                if tx >= SCREEN_STRIDE {
                    match quirks.edges {
                        EdgePolicy::Clip => continue,
                        EdgePolicy::Wrap => tx %= SCREEN_STRIDE,
                    }
                }
                let idx = ty * SCREEN_STRIDE + tx;
                let before = self.bytes[idx];
                let after = before ^ group;
                self.bytes[idx] = after;
                collided |= match quirks.collision {
                    CollisionPolicy::ByteGroup => after < before,
                    CollisionPolicy::Exact => before & group != 0,
                };
            }
        }
        collided
    }

    /// unpack into one bool per pixel, row-major. out must hold exactly
    /// SCREEN_PIXELS entries
    pub fn unpack_into(&self, out: &mut [bool]) -> Result<(), Chip8Error> {
        if out.len() != SCREEN_PIXELS {
            return Err(Chip8Error::PixelBufferSize {
                expected: SCREEN_PIXELS,
                actual: out.len(),
            });
        }
        self.fill(out);
        Ok(())
    }

    /// unpack into a fresh pixel array
    pub fn pixels(&self) -> Vec<bool> {
        let mut out = vec![false; SCREEN_PIXELS];
        self.fill(&mut out);
        out
    }

    // out.len() must be SCREEN_PIXELS
    fn fill(&self, out: &mut [bool]) {
        for (i, px) in out.iter_mut().enumerate() {
            *px = self.bytes[i / 8] & (0x80 >> (i % 8)) != 0;
        }
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Display is used by the host loop to draw things on the screen. It should
/// abstract the implementation details, so a variety of kinds of screen would
/// work.
pub trait Display {
    /// draw unpacked pixels, row-major, one bool per pixel
    fn draw(&mut self, pixels: &[bool]) -> Result<(), io::Error>;

    /// width and height in pixels
    fn resolution(&self) -> (usize, usize);
}

// store useful metadata about the terminal
struct Resolution(usize, usize);

impl Resolution {
    fn pixel_count(&self) -> usize {
        self.0 * self.1
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// canvas coordinates of every pixel that is (or isn't) lit
    fn points<'a>(
        &self,
        pixels: &'a [bool],
        lit: bool,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let w = self.0;
        pixels
            .iter()
            .enumerate()
            .filter(move |(_, px)| **px == lit)
            .map(move |(i, _)| {
                (
                    (i % w) as f64,        // x
                    -1.0 * (i / w) as f64, // y
                )
            })
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
}

impl MonoTermDisplay {
    pub fn new(x: usize, y: usize) -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(x, y),
        })
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, pixels: &[bool]) -> Result<(), io::Error> {
        // make sure we're given exactly the right amount of data to draw
        if pixels.len() != self.resolution.pixel_count() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "MonoTermDisplay needs {} pixels, got {}",
                    self.resolution.pixel_count(),
                    pixels.len()
                ),
            ));
        }

        let dark = self.resolution.points(pixels, false).collect::<Vec<_>>();
        let lit = self.resolution.points(pixels, true).collect::<Vec<_>>();
        let x_bounds = self.resolution.x_bounds();
        let y_bounds = self.resolution.y_bounds();
        let (w, h) = (self.resolution.0 as u16, self.resolution.1 as u16);

        // for now this assumes a 1:1 ratio between terminal, chip8 and the
        // internal TUI canvas
        self.terminal.draw(|f| {
            let size = f.size().intersection(Rect::new(0, 0, 2 + w, 2 + h));

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(x_bounds)
                .y_bounds(y_bounds)
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &dark,
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &lit,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }

    fn resolution(&self) -> (usize, usize) {
        (self.resolution.0, self.resolution.1)
    }
}

/// useful for testing non-display routines; remembers the last frame
pub struct DummyDisplay {
    pub frames: usize,
    pub last: Vec<bool>,
}

impl DummyDisplay {
    pub fn new() -> Self {
        DummyDisplay {
            frames: 0,
            last: Vec::new(),
        }
    }
}

impl Default for DummyDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, pixels: &[bool]) -> Result<(), io::Error> {
        self.frames += 1;
        self.last = pixels.to_vec();
        Ok(())
    }

    fn resolution(&self) -> (usize, usize) {
        (SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}
