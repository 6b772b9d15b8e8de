//! The engine's window onto the outside world.
//!
//! The interpreter never owns a screen or a keyboard: it is handed something
//! implementing [`Host`] for each step. The audio gate is the odd one out; it
//! follows the sound timer rather than any instruction, so it is a
//! [`crate::sound::Sound`] driven by the timer clock instead.
use crate::display::{Display, FrameBuffer};
use crate::input::Input;
use std::io;

pub trait Host {
    fn clear_display(&mut self) -> Result<(), io::Error>;

    /// XOR `sprite` onto the screen at (x, y); true if a lit pixel went out
    fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8]) -> Result<bool, io::Error>;

    fn is_key_down(&mut self, key: u8) -> Result<bool, io::Error>;

    /// suspend until a key is pressed
    fn wait_for_key(&mut self) -> Result<u8, io::Error>;

    /// put the latest frame in front of the user, if it changed
    fn present(&mut self) -> Result<(), io::Error> {
        Ok(())
    }

    fn quit_requested(&mut self) -> Result<bool, io::Error> {
        Ok(false)
    }
}

/// A Host built from a display and a keypad, compositing onto its own
/// frame buffer
pub struct Console<D: Display, I: Input> {
    frame: FrameBuffer,
    dirty: bool,
    display: D,
    input: I,
}

impl<D: Display, I: Input> Console<D, I> {
    pub fn new(display: D, input: I) -> Self {
        Console {
            frame: FrameBuffer::new(),
            // so the first present() draws a blank screen
            dirty: true,
            display,
            input,
        }
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn display(&self) -> &D {
        &self.display
    }
}

impl<D: Display, I: Input> Host for Console<D, I> {
    fn clear_display(&mut self) -> Result<(), io::Error> {
        self.frame.clear();
        self.dirty = true;
        Ok(())
    }

    fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8]) -> Result<bool, io::Error> {
        self.dirty = true;
        Ok(self.frame.draw_sprite(x, y, sprite))
    }

    fn is_key_down(&mut self, key: u8) -> Result<bool, io::Error> {
        self.input.is_pressed(key)
    }

    fn wait_for_key(&mut self) -> Result<u8, io::Error> {
        // whatever was drawn before the wait should be on screen during it
        self.present()?;
        self.input.next_key()
    }

    fn present(&mut self) -> Result<(), io::Error> {
        if self.dirty {
            self.display.draw(self.frame.as_bytes())?;
            self.dirty = false;
        }
        Ok(())
    }

    fn quit_requested(&mut self) -> Result<bool, io::Error> {
        self.input.quit_requested()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DummyDisplay;
    use crate::input::DummyInput;

    #[test]
    fn test_present_only_when_dirty() -> Result<(), io::Error> {
        let mut c = Console::new(DummyDisplay::new(), DummyInput::default());
        c.present()?;
        c.present()?;
        assert_eq!(c.display().frames_drawn, 1);
        c.draw_sprite(0, 0, &[0x80])?;
        c.present()?;
        assert_eq!(c.display().frames_drawn, 2);
        assert_eq!(c.display().last_frame[0], 0x80);
        Ok(())
    }

    #[test]
    fn test_collision_reported() -> Result<(), io::Error> {
        let mut c = Console::new(DummyDisplay::new(), DummyInput::default());
        assert!(!c.draw_sprite(5, 5, &[0xff])?);
        assert!(c.draw_sprite(12, 5, &[0x80])?);
        c.clear_display()?;
        assert_eq!(c.frame(), &FrameBuffer::new());
        Ok(())
    }

    #[test]
    fn test_wait_for_key_presents_first() -> Result<(), io::Error> {
        let mut c = Console::new(DummyDisplay::new(), DummyInput::new(&[], &[0xb]));
        c.draw_sprite(0, 0, &[0x80])?;
        assert_eq!(c.wait_for_key()?, 0xb);
        assert_eq!(c.display().frames_drawn, 1);
        Ok(())
    }
}
