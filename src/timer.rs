//! The two 60 Hz countdown timers and the clock that drives them.
//!
//! The instruction loop and the timer clock run on separate threads and share
//! only the two counter cells. Each cell is an atomic: the clock is the only
//! decrementer and uses a compare-and-swap so a concurrent `Fx15`/`Fx18`
//! store is never lost or clobbered.
use crate::sound::Sound;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
#[allow(deprecated)]
use spin_sleep::LoopHelper;
use tracing::{debug, warn};

/// hardware-mandated timer cadence
pub const TIMER_HZ: f64 = 60.0;

#[derive(Debug, Default)]
pub struct Timers {
    delay: AtomicU8,
    sound: AtomicU8,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delay(&self) -> u8 {
        self.delay.load(Ordering::Acquire)
    }

    pub fn set_delay(&self, value: u8) {
        self.delay.store(value, Ordering::Release);
    }

    pub fn sound(&self) -> u8 {
        self.sound.load(Ordering::Acquire)
    }

    pub fn set_sound(&self, value: u8) {
        self.sound.store(value, Ordering::Release);
    }

    pub fn sound_active(&self) -> bool {
        self.sound() != 0
    }

    /// one 60 Hz tick: count both timers down, stopping at zero
    pub fn tick(&self) {
        for cell in [&self.delay, &self.sound] {
            // Err just means the cell was already at zero
            let _ = cell.fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| v.checked_sub(1));
        }
    }

    pub fn reset(&self) {
        self.set_delay(0);
        self.set_sound(0);
    }
}

/// a loop limiter at `rate_hz`, built on spin_sleep for sub-millisecond
/// accuracy
#[allow(deprecated)]
pub fn loop_helper(rate_hz: f64) -> LoopHelper {
    LoopHelper::builder()
        .report_interval_s(1.0)
        .build_with_target_rate(rate_hz)
}

/// The 60 Hz tick activity, on its own thread so it keeps running while the
/// interpreter is parked on `Fx0A`
pub struct TimerClock {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<u64>>,
}

impl TimerClock {
    pub fn spawn(timers: Arc<Timers>, mut sound: Box<dyn Sound>) -> std::io::Result<TimerClock> {
        let stop = Arc::new(AtomicBool::new(false));
        let stopping = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("chip8-timers".into())
            .spawn(move || {
                let mut limiter = loop_helper(TIMER_HZ);
                let mut sounding = false;
                let mut ticks = 0;
                while !stopping.load(Ordering::Acquire) {
                    // sleep out the rest of this interval, then start the next
                    limiter.loop_sleep();
                    limiter.loop_start();
                    // the gate follows the value the timer holds for this interval
                    let active = timers.sound_active();
                    if active != sounding {
                        if let Err(e) = sound.set_sound_active(active) {
                            warn!("audio gate failed: {}", e);
                        }
                        sounding = active;
                    }
                    timers.tick();
                    ticks += 1;
                }
                if sounding {
                    let _ = sound.set_sound_active(false);
                }
                ticks
            })?;
        debug!("timer clock started");
        Ok(TimerClock {
            stop,
            handle: Some(handle),
        })
    }

    /// stop the clock and return how many ticks it fired
    pub fn stop(mut self) -> u64 {
        self.halt()
    }

    fn halt(&mut self) -> u64 {
        self.stop.store(true, Ordering::Release);
        let ticks = match self.handle.take() {
            Some(h) => h.join().unwrap_or(0),
            None => 0,
        };
        debug!(ticks, "timer clock stopped");
        ticks
    }
}

impl Drop for TimerClock {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.halt();
        }
    }
}
