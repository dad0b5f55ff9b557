use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use chip8vm::demo::Demo;
use chip8vm::display::MonoTermDisplay;
use chip8vm::input::TerminalInput;
use chip8vm::{Chip8Error, Chip8Interpreter, Config};

/// Run a CHIP-8 program in the terminal. Keys 0-9 and a-f are the keypad;
/// Esc or Ctrl-C quits.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// raw program image, loaded at 0x200
    rom: Option<PathBuf>,

    /// run a built-in program instead of a file (default: keypress)
    #[arg(long, value_enum, conflicts_with = "rom")]
    demo: Option<Demo>,

    /// write the built-in program to this file before running it
    #[arg(long, conflicts_with = "rom")]
    save: Option<PathBuf>,

    /// stop after this many instructions even if the program hasn't halted
    #[arg(long)]
    max_instructions: Option<u64>,

    /// pause after each instruction, in microseconds
    #[arg(long, default_value_t = 2000)]
    interval_us: u64,

    /// redraw and tick timers every this many instructions
    #[arg(long, default_value_t = 8)]
    tick_every: u32,

    /// how long Ex9E/ExA1 wait for a key, in milliseconds
    #[arg(long, default_value_t = 3500)]
    poll_ms: u64,

    /// seed for the random number instruction
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            instruction_interval: Duration::from_micros(self.interval_us),
            key_poll_timeout: Duration::from_millis(self.poll_ms),
            seed: self.seed,
            ..Config::default()
        }
        .with_tick_every(self.tick_every)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Off)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let config = args.config();

    // initialise; input first so raw mode is undone even if the display fails
    let mut input = TerminalInput::new(config.key_poll_timeout)?;
    let mut display = MonoTermDisplay::new()?;
    let mut interpreter = Chip8Interpreter::new(&mut display, &mut input, config);

    // load or author a program
    match &args.rom {
        Some(path) => {
            let mut f =
                File::open(path).with_context(|| format!("opening {}", path.display()))?;
            interpreter
                .load_program(&mut f)
                .with_context(|| format!("loading {}", path.display()))?;
        }
        None => {
            args.demo.unwrap_or(Demo::Keypress).author(&mut interpreter);
            if let Some(path) = &args.save {
                let mut f =
                    File::create(path).with_context(|| format!("creating {}", path.display()))?;
                interpreter.save_program(&mut f)?;
            }
        }
    }

    let outcome = interpreter.main_loop(args.max_instructions);
    drop(interpreter);
    drop(input);

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..2 {
        println!();
    }
    match outcome {
        Ok(state) => {
            log::info!("finished: {:?}", state);
            Ok(())
        }
        Err(Chip8Error::Interrupted) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
