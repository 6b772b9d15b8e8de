use beep::beep;
use std::error::Error;

/// The audio gate. Driven by the timer clock whenever the sound timer moves
/// between zero and non-zero, so it must be movable onto that thread.
pub trait Sound: Send {
    fn set_sound_active(&mut self, active: bool) -> Result<(), Box<dyn Error>>;
}

const SIMPLEBEEP_PITCH: u16 = 2093; // C

/// console bell tone via the `beep` crate
pub struct SimpleBeep {
    is_beeping: bool,
}

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep { is_beeping: false }
    }
}

impl Default for SimpleBeep {
    fn default() -> Self {
        Self::new()
    }
}

impl Sound for SimpleBeep {
    fn set_sound_active(&mut self, active: bool) -> Result<(), Box<dyn Error>> {
        if active == self.is_beeping {
            return Ok(());
        }
        beep(if active { SIMPLEBEEP_PITCH } else { 0 })?;
        self.is_beeping = active;
        Ok(())
    }
}

#[derive(Default)]
pub struct Mute {}

impl Mute {
    pub fn new() -> Self {
        Mute {}
    }
}

impl Sound for Mute {
    fn set_sound_active(&mut self, _active: bool) -> Result<(), Box<dyn Error>> {
        Ok(())
    }
}
