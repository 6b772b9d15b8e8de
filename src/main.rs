use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::exit;

use anyhow::Context;
use chip8::display::MonoTermDisplay;
use chip8::environment::{Config, Environment, DEFAULT_INSTRUCTIONS_PER_SECOND};
use chip8::host::Console;
use chip8::input::StdinInput;
use clap::{ArgAction, Parser, ValueHint};
use tracing::{error, info};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::prelude::*;

/// Run a CHIP-8 program in the terminal. Esc quits.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Opt {
    /// ROM to run
    #[arg(value_hint = ValueHint::FilePath)]
    rom: PathBuf,

    /// Instructions executed per second; timers always run at 60 Hz
    #[arg(long, default_value_t = DEFAULT_INSTRUCTIONS_PER_SECOND)]
    ips: u32,

    /// Stop after this many instructions
    #[arg(long)]
    max_instructions: Option<u64>,

    /// Don't beep while the sound timer runs
    #[arg(long, action = ArgAction::SetTrue)]
    mute: bool,

    /// Seed the random number generator, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Increase the level of verbosity. Can be used multiple times.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Opt {
    const fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "chip8=info,warn",
            2 => "chip8=debug,info",
            3..=u8::MAX => "chip8=trace,debug",
        }
    }

    fn filter_layer(&self) -> EnvFilter {
        // Parse log level from env, or infer from args
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.log_filter()))
    }

    fn config(&self) -> Config {
        Config {
            instructions_per_second: self.ips,
            max_instructions: self.max_instructions,
            mute: self.mute,
            seed: self.seed,
        }
    }
}

fn run(opt: &Opt) -> anyhow::Result<()> {
    let file = File::open(&opt.rom).with_context(|| format!("opening {}", opt.rom.display()))?;
    let mut reader = BufReader::new(file);

    // initialise; raw mode before the alternate screen, torn down in reverse
    let input = StdinInput::new().context("enabling raw mode")?;
    let display = MonoTermDisplay::new().context("setting up the terminal")?;
    let mut env = Environment::new(opt.config(), Console::new(display, input));

    // load a program
    env.load_program(&mut reader)
        .with_context(|| format!("loading {}", opt.rom.display()))?;
    info!(rom = %opt.rom.display(), "loaded");

    let summary = env.run()?;
    info!(?summary, "done");
    Ok(())
}

fn main() {
    let opt = Opt::parse();

    // logs go to stderr so they don't fight the display for stdout
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    tracing_subscriber::registry()
        .with(opt.filter_layer())
        .with(fmt_layer)
        .init();

    if let Err(e) = run(&opt) {
        error!("{:#}", e);
        exit(1);
    }
}
