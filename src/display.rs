use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// one bit per pixel, rows packed MSB-first
pub const DISPLAY_SIZE_BYTES: usize = DISPLAY_WIDTH * DISPLAY_HEIGHT / 8;

/// The 64x32 monochrome pixel grid sprites are composited onto
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    bytes: [u8; DISPLAY_SIZE_BYTES],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        FrameBuffer {
            bytes: [0; DISPLAY_SIZE_BYTES],
        }
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.bytes = [0; DISPLAY_SIZE_BYTES];
    }

    /// XOR a sprite onto the grid at (x, y), wrapping at the edges; returns
    /// true if any lit pixel was turned off
    pub fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let mut collided = false;
        for (row, &bits) in sprite.iter().enumerate() {
            let py = (y as usize + row) % DISPLAY_HEIGHT;
            for col in 0..8 {
                if bits & (0x80 >> col) == 0 {
                    continue;
                }
                let px = (x as usize + col) % DISPLAY_WIDTH;
                let (idx, mask) = Self::locate(px, py);
                collided |= self.bytes[idx] & mask != 0;
                self.bytes[idx] ^= mask;
            }
        }
        collided
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        let (idx, mask) = Self::locate(x % DISPLAY_WIDTH, y % DISPLAY_HEIGHT);
        self.bytes[idx] & mask != 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn locate(x: usize, y: usize) -> (usize, u8) {
        (y * DISPLAY_WIDTH / 8 + x / 8, 0x80 >> (x % 8))
    }
}

/// Display is used to put the frame buffer on a screen. It should abstract the
/// implementation details, so a variety of kinds of screen would work.
pub trait Display {
    /// draw a packed frame, `DISPLAY_SIZE_BYTES` long
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error>;
}

/// the grid expressed in canvas coordinates; y grows downwards on screen, so
/// rows are mapped onto negative canvas y
struct Resolution(usize, usize);

impl Resolution {
    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// canvas coordinates of every lit pixel
    fn lit_points(&self, data: &[u8]) -> Vec<(f64, f64)> {
        let w = self.0;
        (0..self.0 * self.1)
            .filter(|count| 1 & (data[count / 8] >> (7 - count % 8)) == 1)
            .map(|count| ((count % w) as f64, -1.0 * (count / w) as f64))
            .collect()
    }
}

fn canvas_area(w: u16, h: u16, screen: Rect) -> Rect {
    Rect::new(0, 0, 2 + w, 2 + h).intersection(screen)
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
}

impl MonoTermDisplay {
    pub fn new() -> Result<MonoTermDisplay, io::Error> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(DISPLAY_WIDTH, DISPLAY_HEIGHT),
        })
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error> {
        if data.len() != DISPLAY_SIZE_BYTES {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("frame is {} bytes, expected {}", data.len(), DISPLAY_SIZE_BYTES),
            ));
        }
        let lit = self.resolution.lit_points(data);
        let (w, h) = (self.resolution.0 as u16, self.resolution.1 as u16);
        let x_bounds = self.resolution.x_bounds();
        let y_bounds = self.resolution.y_bounds();

        // 1:1 between terminal cells, chip8 pixels and the TUI canvas, plus a
        // border; clipped to the terminal so a small window doesn't panic tui
        self.terminal.draw(|f| {
            let size = canvas_area(w, h, f.size());
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
                        coords: &lit,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// useful for testing non-display routines; remembers the last frame drawn
#[derive(Default)]
pub struct DummyDisplay {
    pub frames_drawn: usize,
    pub last_frame: Vec<u8>,
}

impl DummyDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, data: &[u8]) -> Result<(), io::Error> {
        self.frames_drawn += 1;
        self.last_frame = data.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_size() {
        assert_eq!(FrameBuffer::new().as_bytes().len(), 256);
    }

    #[test]
    fn test_x_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.x_bounds(), [0.0, 63.0]);
        assert_eq!(r.y_bounds(), [-31.0, 0.0]);
    }

    #[test]
    fn test_lit_points() {
        let r = Resolution(64, 32);
        let mut data = [0u8; 256];
        data[0] = 0x80; // (0, 0)
        data[9] = 0x01; // (15, 1)
        assert_eq!(r.lit_points(&data), vec![(0.0, 0.0), (15.0, -1.0)]);
    }

    #[test]
    fn test_canvas_area_clipped_to_terminal() {
        assert_eq!(canvas_area(64, 32, Rect::new(0, 0, 80, 40)), Rect::new(0, 0, 66, 34));
        assert_eq!(canvas_area(64, 32, Rect::new(0, 0, 40, 20)), Rect::new(0, 0, 40, 20));
    }

    #[test]
    fn test_draw_sets_pixels() {
        let mut fb = FrameBuffer::new();
        assert!(!fb.draw_sprite(2, 3, &[0b1010_0000]));
        assert!(fb.pixel(2, 3));
        assert!(!fb.pixel(3, 3));
        assert!(fb.pixel(4, 3));
    }

    #[test]
    fn test_redraw_erases_and_collides() {
        let mut fb = FrameBuffer::new();
        let glyph = [0xF0, 0x90, 0x90, 0x90, 0xF0];
        assert!(!fb.draw_sprite(10, 10, &glyph));
        assert!(fb.draw_sprite(10, 10, &glyph));
        assert_eq!(fb, FrameBuffer::new());
    }

    #[test]
    fn test_partial_overlap_collides() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(0, 0, &[0x01]);
        assert!(fb.draw_sprite(7, 0, &[0x80]));
        assert!(!fb.pixel(7, 0));
    }

    #[test]
    fn test_draw_wraps() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(62, 31, &[0xF0, 0xF0]);
        for (x, y) in [(62, 31), (63, 31), (0, 31), (1, 31), (62, 0), (1, 0)] {
            assert!(fb.pixel(x, y), "({}, {})", x, y);
        }
        assert!(!fb.pixel(2, 0));
    }

    #[test]
    fn test_clear() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(0, 0, &[0xff; 15]);
        fb.clear();
        assert_eq!(fb.as_bytes(), &[0u8; 256][..]);
    }

    #[test]
    fn test_dummy_records_frames() -> Result<(), io::Error> {
        let mut d = DummyDisplay::new();
        d.draw(&[0xaa; 256])?;
        assert_eq!(d.frames_drawn, 1);
        assert_eq!(d.last_frame[0], 0xaa);
        Ok(())
    }
}
