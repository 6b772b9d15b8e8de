//! A CHIP-8 interpreter.
//!
//! ## Design
//!
//! * the interpreter owns all machine state and is stepped one instruction
//!   at a time; nothing is global, so any number of machines can coexist
//! * instructions decode into a closed enum, so the 35 operations are
//!   matched exhaustively
//! * abstract display, input and sound so alternatives can be plugged in;
//!   the terminal versions use TUI and crossterm
//! * two clocks: instructions run at a configurable rate, the delay and
//!   sound timers at a fixed 60 Hz on their own thread
//!
//! Model
//!
//! Environment
//!  |-- config
//!  |-- host (display + input)
//!  |-- interpreter(memory, registers, stack, timers)
//!  |    `-- instruction set
//!  |-- timer clock(timers, sound)
//!  `-- main loop
//!
//! ```no_run
//! use chip8::display::DummyDisplay;
//! use chip8::environment::{Config, Environment};
//! use chip8::host::Console;
//! use chip8::input::DummyInput;
//!
//! let host = Console::new(DummyDisplay::new(), DummyInput::default());
//! let config = Config {
//!     max_instructions: Some(1_000),
//!     mute: true,
//!     ..Config::default()
//! };
//! let mut env = Environment::new(config, host);
//! let mut rom: &[u8] = &[0x12, 0x00];
//! env.load_program(&mut rom)?;
//! env.run()?;
//! # Ok::<(), chip8::error::Chip8Error>(())
//! ```
pub mod display;
pub mod environment;
pub mod error;
pub mod host;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod registers;
pub mod sound;
pub mod stack;
pub mod timer;
