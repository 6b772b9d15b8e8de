use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use crossterm::terminal;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::{Duration, Instant};
use tracing::warn;

/// the CHIP-8 hex keypad laid over the left-hand side of a qwerty keyboard
///
/// ```text
/// 1 2 3 C      1 2 3 4
/// 4 5 6 D      q w e r
/// 7 8 9 E      a s d f
/// A 0 B F      z x c v
/// ```
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

/// terminals only report presses (and auto-repeats), so a key counts as held
/// for this long after the last one
const KEY_HOLD: Duration = Duration::from_millis(150);

/// presses kept for the next key wait; older ones are dropped
const MAX_QUEUED_PRESSES: usize = 4;

/// how long a blocking key wait sleeps between checks
const WAIT_POLL: Duration = Duration::from_millis(10);

/// reads the 16-key keypad
pub trait Input {
    /// whether `key` (0x0..=0xF) is currently held
    fn is_pressed(&mut self, key: u8) -> Result<bool, io::Error>;

    /// block until a key is pressed and return it
    fn next_key(&mut self) -> Result<u8, io::Error>;

    /// whether the user asked to leave the emulator
    fn quit_requested(&mut self) -> Result<bool, io::Error> {
        Ok(false)
    }
}

/// Input from the terminal, using crossterm in raw mode
pub struct StdinInput {
    held: [Option<Instant>; 16],
    presses: VecDeque<u8>,
    keymap: HashMap<char, u8>,
    quit: bool,
}

impl StdinInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(StdinInput {
            held: [None; 16],
            presses: VecDeque::new(),
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            quit: false,
        })
    }

    /// drain every pending terminal event, waiting up to `timeout` for the first
    fn read_stdin(&mut self, timeout: Duration) -> Result<(), io::Error> {
        let mut wait = timeout;
        while poll(wait)? {
            wait = Duration::ZERO;
            match read()? {
                Event::Key(evt) => match evt.code {
                    KeyCode::Esc => self.quit = true,
                    KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                        self.quit = true
                    }
                    KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                        Some(&mapped) => self.record_press(mapped),
                        None => warn!("can't map {:?} to a CHIP-8 key", key),
                    },
                    other => warn!("unmapped key event {:?}", other),
                },
                Event::Resize(..) => {}
                _ => warn!("unknown event received"),
            }
        }
        Ok(())
    }

    fn record_press(&mut self, key: u8) {
        self.held[key as usize] = Some(Instant::now());
        if self.presses.len() == MAX_QUEUED_PRESSES {
            self.presses.pop_front();
        }
        self.presses.push_back(key);
    }
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for StdinInput {
    fn is_pressed(&mut self, key: u8) -> Result<bool, io::Error> {
        self.read_stdin(Duration::ZERO)?;
        Ok(matches!(self.held[(key & 0xf) as usize], Some(at) if at.elapsed() < KEY_HOLD))
    }

    fn next_key(&mut self) -> Result<u8, io::Error> {
        // only a press made after the wait started counts
        self.read_stdin(Duration::ZERO)?;
        self.presses.clear();
        loop {
            self.read_stdin(WAIT_POLL)?;
            if self.quit {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "quit requested"));
            }
            if let Some(key) = self.presses.pop_front() {
                return Ok(key);
            }
        }
    }

    fn quit_requested(&mut self) -> Result<bool, io::Error> {
        self.read_stdin(Duration::ZERO)?;
        Ok(self.quit)
    }
}

/// scripted Input implementation for testing
#[derive(Default)]
pub struct DummyInput {
    held: Vec<u8>,
    presses: VecDeque<u8>,
    pub quit: bool,
}

impl DummyInput {
    /// `held` are reported as down; `presses` are handed out by `next_key`
    pub fn new(held: &[u8], presses: &[u8]) -> Self {
        DummyInput {
            held: Vec::from(held),
            presses: presses.iter().copied().collect(),
            quit: false,
        }
    }
}

impl Input for DummyInput {
    fn is_pressed(&mut self, key: u8) -> Result<bool, io::Error> {
        Ok(self.held.contains(&key))
    }

    fn next_key(&mut self) -> Result<u8, io::Error> {
        self.presses
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more key presses"))
    }

    fn quit_requested(&mut self) -> Result<bool, io::Error> {
        Ok(self.quit)
    }
}
