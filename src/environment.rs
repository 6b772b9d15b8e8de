//! # environment
//!
//! Sets everything up and runs the main loop. Two clocks run side by side:
//!
//! Environment
//!  |-- timer clock thread: fixed 60 Hz, decrements DT/ST, gates the audio
//!  `-- main loop, at the configured instruction rate
//!       |-- every 1/60 s: stop if asked to, present the frame if it changed
//!       |-- interpreter.step(host)
//!       `-- sleep until the next instruction slot
//!
//! Neither clock counts the other's work, so timer behaviour is the same at
//! 300 or 3000 instructions per second.
use crate::error::{Chip8Error, Result};
use crate::host::Host;
use crate::interpreter::Chip8Interpreter;
use crate::sound::{Mute, SimpleBeep, Sound};
use crate::timer::{loop_helper, TimerClock, TIMER_HZ};
use std::io;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

pub const DEFAULT_INSTRUCTIONS_PER_SECOND: u32 = 700;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// target instruction rate; timers run at 60 Hz regardless
    pub instructions_per_second: u32,
    /// stop after this many instructions
    pub max_instructions: Option<u64>,
    pub mute: bool,
    /// seed for `Cxkk`; taken from entropy when unset
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            instructions_per_second: DEFAULT_INSTRUCTIONS_PER_SECOND,
            max_instructions: None,
            mute: false,
            seed: None,
        }
    }
}

impl Config {
    fn sound_device(&self) -> Box<dyn Sound> {
        if self.mute {
            Box::new(Mute::new())
        } else {
            Box::new(SimpleBeep::new())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// the host asked to leave
    Quit,
    /// `max_instructions` were executed
    InstructionBudget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub instructions: u64,
    pub timer_ticks: u64,
    pub stop: StopReason,
}

pub struct Environment<H: Host> {
    interpreter: Chip8Interpreter,
    host: H,
    config: Config,
}

impl<H: Host> Environment<H> {
    pub fn new(config: Config, host: H) -> Self {
        let interpreter = match config.seed {
            Some(seed) => Chip8Interpreter::with_seed(seed),
            None => Chip8Interpreter::new(),
        };
        Environment {
            interpreter,
            host,
            config,
        }
    }

    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<()> {
        self.interpreter.load_program(reader)
    }

    /// the machine, e.g. to inspect the state a fatal error left behind
    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// run until the host asks to quit, the instruction budget runs out or
    /// the program faults
    pub fn run(&mut self) -> Result<RunSummary> {
        let clock = TimerClock::spawn(self.interpreter.timers(), self.config.sound_device())?;
        info!(
            ips = self.config.instructions_per_second,
            "running program"
        );
        let mut instructions = 0;
        let outcome = self.main_loop(&mut instructions);
        let timer_ticks = clock.stop();

        match outcome {
            Ok(stop) => {
                // leave the last frame up
                self.host.present()?;
                info!(instructions, timer_ticks, ?stop, "stopped");
                Ok(RunSummary {
                    instructions,
                    timer_ticks,
                    stop,
                })
            }
            Err(e) => {
                error!(
                    instructions,
                    pc = format_args!("{:#06x}", self.interpreter.pc()),
                    "halted: {}",
                    e
                );
                Err(e)
            }
        }
    }

    fn main_loop(&mut self, executed: &mut u64) -> Result<StopReason> {
        let mut limiter = loop_helper(self.config.instructions_per_second.max(1) as f64);
        let frame = Duration::from_secs_f64(1.0 / TIMER_HZ);
        let mut next_frame = Instant::now();

        loop {
            limiter.loop_start();
            if let Some(ips) = limiter.report_rate() {
                debug!("{:.0} instructions per second", ips);
            }
            if self.config.max_instructions.map_or(false, |max| *executed >= max) {
                return Ok(StopReason::InstructionBudget);
            }
            if Instant::now() >= next_frame {
                if self.host.quit_requested()? {
                    return Ok(StopReason::Quit);
                }
                self.host.present()?;
                next_frame = Instant::now() + frame;
            }
            match self.interpreter.step(&mut self.host) {
                Ok(_) => *executed += 1,
                // quitting while parked on Fx0A
                Err(Chip8Error::Host(e)) if e.kind() == io::ErrorKind::Interrupted => {
                    return Ok(StopReason::Quit)
                }
                Err(e) => return Err(e),
            }
            limiter.loop_sleep();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DummyDisplay;
    use crate::host::Console;
    use crate::input::DummyInput;
    use std::thread;

    type TestConsole = Console<DummyDisplay, DummyInput>;

    fn environment(program: &[u8], config: Config, input: DummyInput) -> Environment<TestConsole> {
        let mut env = Environment::new(config, Console::new(DummyDisplay::new(), input));
        let mut reader = program;
        env.load_program(&mut reader).unwrap();
        env
    }

    fn config(ips: u32, max: u64) -> Config {
        Config {
            instructions_per_second: ips,
            max_instructions: Some(max),
            mute: true,
            seed: Some(1),
        }
    }

    #[test]
    fn test_defaults() {
        let c = Config::default();
        assert_eq!(c.instructions_per_second, 700);
        assert_eq!(c.max_instructions, None);
    }

    #[test]
    fn test_stops_on_budget() -> Result<()> {
        // 0x200: jump to self
        let mut env = environment(&[0x12, 0x00], config(20_000, 200), DummyInput::default());
        let summary = env.run()?;
        assert_eq!(summary.instructions, 200);
        assert_eq!(summary.stop, StopReason::InstructionBudget);
        assert_eq!(env.interpreter().pc(), 0x200);
        // the blank screen at start, nothing else changed
        assert_eq!(env.host().display().frames_drawn, 1);
        Ok(())
    }

    #[test]
    fn test_stops_on_quit() -> Result<()> {
        let mut input = DummyInput::default();
        input.quit = true;
        let mut env = environment(&[0x12, 0x00], config(1_000, 1_000), input);
        let summary = env.run()?;
        assert_eq!(summary.instructions, 0);
        assert_eq!(summary.stop, StopReason::Quit);
        Ok(())
    }

    #[test]
    fn test_fault_leaves_state_inspectable() {
        // V3 = 7, then an undefined 0x8 family op
        let mut env = environment(
            &[0x63, 0x07, 0x80, 0x0F],
            config(20_000, 100),
            DummyInput::default(),
        );
        let err = env.run().unwrap_err();
        assert!(matches!(
            err,
            Chip8Error::IllegalOpcode {
                opcode: 0x800F,
                pc: 0x202
            }
        ));
        assert_eq!(env.interpreter().pc(), 0x202);
        assert_eq!(env.interpreter().registers().v(3), 7);
    }

    #[test]
    fn test_timers_follow_wall_clock_not_instructions() -> Result<()> {
        // V0 = 0xFF; DT = V0; loop
        let mut env = environment(
            &[0x60, 0xFF, 0xF0, 0x15, 0x12, 0x04],
            config(6_000, 600),
            DummyInput::default(),
        );
        let summary = env.run()?;
        let elapsed_ticks = 255 - env.interpreter().timers().delay() as u64;
        // ~100ms of running is ~6 ticks; nowhere near 600
        assert!(elapsed_ticks <= summary.timer_ticks);
        assert!(summary.timer_ticks < 60, "ticks = {}", summary.timer_ticks);
        Ok(())
    }

    #[test]
    fn test_draws_are_presented() -> Result<()> {
        // draw the font "0" at (0, 0) then loop
        let mut env = environment(
            &[0xD0, 0x05, 0x12, 0x02],
            config(20_000, 50),
            DummyInput::default(),
        );
        env.run()?;
        let display = env.host().display();
        assert!(display.frames_drawn >= 1);
        assert_eq!(display.last_frame[0], 0xF0);
        Ok(())
    }

    /// a host whose key wait takes a while, like a player thinking
    struct SlowKeypad {
        think: Duration,
        key: u8,
    }

    impl Host for SlowKeypad {
        fn clear_display(&mut self) -> io::Result<()> {
            Ok(())
        }

        fn draw_sprite(&mut self, _x: u8, _y: u8, _sprite: &[u8]) -> io::Result<bool> {
            Ok(false)
        }

        fn is_key_down(&mut self, _key: u8) -> io::Result<bool> {
            Ok(false)
        }

        fn wait_for_key(&mut self) -> io::Result<u8> {
            thread::sleep(self.think);
            Ok(self.key)
        }
    }

    #[test]
    fn test_timers_run_while_waiting_for_key() -> Result<()> {
        // V0 = 0xFF; DT = V0; V1 = key; loop
        let host = SlowKeypad {
            think: Duration::from_millis(300),
            key: 0xB,
        };
        let mut env = Environment::new(config(20_000, 3), host);
        let mut reader: &[u8] = &[0x60, 0xFF, 0xF0, 0x15, 0xF1, 0x0A, 0x12, 0x06];
        env.load_program(&mut reader)?;
        let summary = env.run()?;
        assert_eq!(summary.instructions, 3);
        assert_eq!(env.interpreter().registers().v(1), 0xB);
        // ~18 ticks in 300ms
        let delay = env.interpreter().timers().delay();
        assert!(delay <= 255 - 10, "delay = {}", delay);
        assert!(summary.timer_ticks >= 10, "ticks = {}", summary.timer_ticks);
        Ok(())
    }
}
