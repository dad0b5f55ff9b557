//! A CHIP-8 virtual machine for the terminal.
//!
//! ## Design
//!
//! * one owned machine: memory map + register file, driven by the interpreter
//! * the display is a region of memory (0xf00..0x1000); anything that writes
//!   there is drawing, and flags the frame for redraw
//! * display and input sit behind traits, so the terminal can be swapped for
//!   fakes in tests
//! * CHIP-8 instructions run, then sleep a fixed 2ms; so ~500/s, not
//!   cycle-accurate to anything
//! * every 8 instructions: redraw if needed, tick both timers (~60Hz)
//! * opcode 0x0000 halts; it isn't a real instruction so it is free to mean stop
//!
//! Model
//!
//! main
//!  |-- config, display, input
//!  |-- interpreter(display, input, config)
//!  |    |-- memory map (font, program, stack, display)
//!  |    |-- registers
//!  |    `-- instruction decode
//!  `-- main loop
//!       |-- fetch word at pc; pc += 2; 0x0000 => halt
//!       |-- execute
//!       |-- every 8th: redraw, tick timers
//!       `-- sleep(2ms)
pub mod config;
pub mod demo;
pub mod display;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod registers;

pub use config::Config;
pub use error::Chip8Error;
pub use interpreter::{Chip8Interpreter, MachineState};
