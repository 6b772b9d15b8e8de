//! # interpreter
//!
//! The execution engine. A [`Chip8Interpreter`] owns the whole machine state:
//!  - 4K of memory, font at 0x000 and the program from 0x200
//!  - V0..VF and the index register I
//!  - the 16-deep call stack and its pointer
//!  - the program counter, starting at 0x200
//!  - the delay/sound timer cells, shared with the timer clock
//!
//! Each call to [`Chip8Interpreter::step`] fetches, decodes and executes one
//! instruction. A step either applies all of its effects or fails before any
//! of them, so the machine is always left between two instructions.
use crate::error::{Chip8Error, Result};
use crate::host::Host;
use crate::instruction::Instruction;
use crate::memory::{
    Chip8MemoryMap, MemoryMap, CHIP8_FONT_ADDR, CHIP8_FONT_GLYPH_BYTES, CHIP8_PROGRAM_ADDR,
};
use crate::registers::Registers;
use crate::stack::CallStack;
use crate::timer::Timers;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;
use std::sync::Arc;
use tracing::{debug, trace};

pub struct Chip8Interpreter {
    memory: Chip8MemoryMap,
    registers: Registers,
    stack: CallStack,
    program_counter: u16,
    timers: Arc<Timers>,
    rng: StdRng,
}

impl Default for Chip8Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip8Interpreter {
    pub fn new() -> Chip8Interpreter {
        Self::with_rng(StdRng::from_entropy())
    }

    /// a machine whose `Cxkk` results are reproducible
    pub fn with_seed(seed: u64) -> Chip8Interpreter {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Chip8Interpreter {
        Chip8Interpreter {
            memory: Chip8MemoryMap::new(),
            registers: Registers::new(),
            stack: CallStack::new(),
            program_counter: CHIP8_PROGRAM_ADDR,
            timers: Arc::new(Timers::new()),
            rng,
        }
    }

    /// load a chip8 program from bytes
    pub fn load(&mut self, program: &[u8]) -> Result<()> {
        self.memory.load(program)
    }

    /// load a chip8 program from a reader
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<()> {
        self.memory.load_program(reader)
    }

    /// back to power-on state; the program has to be loaded again
    pub fn reset(&mut self) {
        self.memory.clear();
        self.registers = Registers::new();
        self.stack.clear();
        self.program_counter = CHIP8_PROGRAM_ADDR;
        self.timers.reset();
        debug!("interpreter reset");
    }

    pub fn pc(&self) -> u16 {
        self.program_counter
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn memory(&self) -> &Chip8MemoryMap {
        &self.memory
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.depth()
    }

    /// the timer cells, to hand to a [`crate::timer::TimerClock`]
    pub fn timers(&self) -> Arc<Timers> {
        Arc::clone(&self.timers)
    }

    /// fetch, decode and execute one instruction
    pub fn step<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<Instruction> {
        let pc = self.program_counter;
        let opcode = self.memory.get_word(pc)?;
        let instruction =
            Instruction::decode(opcode).ok_or(Chip8Error::IllegalOpcode { opcode, pc })?;
        trace!("{:#06x}: {:04x} {:?}", pc, opcode, instruction);
        self.program_counter = self.execute(instruction, host)?;
        Ok(instruction)
    }

    /// apply an instruction's effects and return the next program counter
    fn execute<H: Host + ?Sized>(&mut self, instruction: Instruction, host: &mut H) -> Result<u16> {
        use Instruction::*;
        let pc = self.program_counter;
        let next = pc.wrapping_add(2);
        let skip = pc.wrapping_add(4);
        let r = &mut self.registers;

        match instruction {
            Sys { nnn } => debug!("ignoring machine code call to {:#05x}", nnn),
            Cls => host.clear_display()?,
            Ret => {
                let from = self.stack.pop().ok_or(Chip8Error::StackUnderflow { pc })?;
                return Ok(from.wrapping_add(2));
            }
            Jp { nnn } => return Ok(nnn),
            Call { nnn } => {
                if !self.stack.push(pc) {
                    return Err(Chip8Error::StackOverflow { pc });
                }
                return Ok(nnn);
            }
            SeImm { x, kk } => return Ok(if r.v(x) == kk { skip } else { next }),
            SneImm { x, kk } => return Ok(if r.v(x) != kk { skip } else { next }),
            SeReg { x, y } => return Ok(if r.v(x) == r.v(y) { skip } else { next }),
            SneReg { x, y } => return Ok(if r.v(x) != r.v(y) { skip } else { next }),
            LdImm { x, kk } => r.set_v(x, kk),
            // no carry out of the immediate add
            AddImm { x, kk } => r.set_v(x, r.v(x).wrapping_add(kk)),
            Ld { x, y } => r.set_v(x, r.v(y)),
            Or { x, y } => r.set_v(x, r.v(x) | r.v(y)),
            And { x, y } => r.set_v(x, r.v(x) & r.v(y)),
            Xor { x, y } => r.set_v(x, r.v(x) ^ r.v(y)),
            Add { x, y } => {
                let (sum, carry) = r.v(x).overflowing_add(r.v(y));
                r.set_v(x, sum);
                r.set_flag(carry);
            }
            Sub { x, y } => {
                let (vx, vy) = (r.v(x), r.v(y));
                r.set_v(x, vx.wrapping_sub(vy));
                r.set_flag(vx >= vy);
            }
            Subn { x, y } => {
                let (vx, vy) = (r.v(x), r.v(y));
                r.set_v(x, vy.wrapping_sub(vx));
                r.set_flag(vy >= vx);
            }
            Shr { x } => {
                let vx = r.v(x);
                r.set_v(x, vx >> 1);
                r.set_flag(vx & 0x01 != 0);
            }
            Shl { x } => {
                let vx = r.v(x);
                r.set_v(x, vx << 1);
                r.set_flag(vx & 0x80 != 0);
            }
            LdI { nnn } => r.i = nnn,
            JpV0 { nnn } => return Ok(nnn + r.v(0) as u16),
            Rnd { x, kk } => r.set_v(x, self.rng.gen::<u8>() & kk),
            Drw { x, y, n } => {
                let sprite = self.memory.get_ro_slice(r.i, n as usize)?;
                let collided = host.draw_sprite(r.v(x), r.v(y), sprite)?;
                r.set_flag(collided);
            }
            Skp { x } => {
                return Ok(if host.is_key_down(r.v(x) & 0xf)? { skip } else { next });
            }
            Sknp { x } => {
                return Ok(if host.is_key_down(r.v(x) & 0xf)? { next } else { skip });
            }
            LdFromDelay { x } => r.set_v(x, self.timers.delay()),
            // the one place the instruction stream suspends; the timer clock
            // keeps ticking on its own thread meanwhile
            LdKey { x } => {
                let key = host.wait_for_key()?;
                r.set_v(x, key & 0xf);
            }
            LdDelay { x } => self.timers.set_delay(r.v(x)),
            LdSound { x } => self.timers.set_sound(r.v(x)),
            AddI { x } => r.i = r.i.wrapping_add(r.v(x) as u16),
            LdFont { x } => {
                r.i = CHIP8_FONT_ADDR + CHIP8_FONT_GLYPH_BYTES * (r.v(x) & 0xf) as u16;
            }
            Bcd { x } => {
                let vx = r.v(x);
                self.memory
                    .get_program_rw_slice(r.i, 3)?
                    .copy_from_slice(&[vx / 100, vx / 10 % 10, vx % 10]);
            }
            Store { x } => {
                self.memory
                    .get_program_rw_slice(r.i, x as usize + 1)?
                    .copy_from_slice(r.range(x));
            }
            Restore { x } => {
                let bytes = self.memory.get_ro_slice(r.i, x as usize + 1)?;
                r.range_mut(x).copy_from_slice(bytes);
            }
        }
        Ok(next)
    }
}
