/// # interpreter
///
/// Owns the memory map and register file and drives them with the fetch,
/// decode, execute loop. Devices are borrowed for the life of the interpreter:
///
///  * display -- handed the framebuffer whenever it has changed, at most once
///    every `tick_every` instructions
///  * input   -- polled by Ex9E/ExA1, blocked on by Fx0A, and checked for
///    an operator interrupt on every tick
///
/// The machine moves Reset -> Running -> Halted. Fetching the opcode 0x0000
/// halts it; nothing a program does is otherwise fatal. While a key wait
/// blocks, timers and redraws are frozen along with everything else.
use crate::config::Config;
use crate::display::{Display, DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::error::Chip8Error;
use crate::input::Input;
use crate::instruction::Instruction;
use crate::memory::{Chip8MemoryMap, MemoryMap, CHIP8_GLYPH_BYTES};
use crate::registers::Registers;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;

const DISPLAY_ROW_BYTES: usize = DISPLAY_WIDTH / 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    Reset,
    Running,
    Halted,
}

pub struct Chip8Interpreter<'a> {
    memory: Chip8MemoryMap,
    registers: Registers,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    config: Config,
    rng: StdRng,
    screen_changed: bool,
    state: MachineState,
    executed: u64,
}

impl<'a> Chip8Interpreter<'a> {
    pub fn new(display: &'a mut dyn Display, input: &'a mut dyn Input, config: Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Chip8Interpreter {
            memory: Chip8MemoryMap::new(),
            registers: Registers::new(),
            display,
            input,
            config,
            rng,
            screen_changed: true,
            state: MachineState::Reset,
            executed: 0,
        }
    }

    /// load a chip8 program
    pub fn load_program(&mut self, reader: &mut dyn io::Read) -> Result<(), Chip8Error> {
        self.memory.load_program(reader)?;
        log::debug!("program loaded at 0x{:03x}", self.memory.program_addr);
        Ok(())
    }

    /// append an opcode at `pc` and step past it; for authoring programs in place
    pub fn emit(&mut self, opcode: u16) {
        let [hi, lo] = opcode.to_be_bytes();
        let pc = self.registers.pc;
        self.store(pc, hi);
        self.store(pc.wrapping_add(1), lo);
        self.registers.pc = pc.wrapping_add(2);
    }

    /// write out everything from the load address up to `pc`
    pub fn save_program(&self, writer: &mut dyn io::Write) -> Result<usize, Chip8Error> {
        let len = self.memory.save_program(writer, self.registers.pc)?;
        log::debug!("saved {} program bytes", len);
        Ok(len)
    }

    /// back to power-on registers; memory (and so any program) is kept
    pub fn reset(&mut self) {
        self.registers.reset();
        self.screen_changed = true;
        self.state = MachineState::Reset;
        self.executed = 0;
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }

    pub fn memory(&self) -> &Chip8MemoryMap {
        &self.memory
    }

    pub fn state(&self) -> MachineState {
        self.state
    }

    pub fn screen_changed(&self) -> bool {
        self.screen_changed
    }

    /// instructions executed since the last reset
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// hand the framebuffer to the display, if anything changed since last time
    pub fn redraw(&mut self) -> Result<bool, Chip8Error> {
        if !self.screen_changed {
            return Ok(false);
        }
        self.display.draw(self.memory.display_slice())?;
        self.screen_changed = false;
        Ok(true)
    }

    /// reset, then run until the halt opcode or until `limit` instructions
    /// have executed
    pub fn main_loop(&mut self, limit: Option<u64>) -> Result<MachineState, Chip8Error> {
        self.reset();
        self.redraw()?;
        self.state = MachineState::Running;
        log::debug!("running from 0x{:03x}", self.registers.pc);

        while self.state == MachineState::Running {
            if limit.map_or(false, |l| self.executed >= l) {
                break;
            }
            self.step()?;
        }
        log::debug!(
            "stopped {:?} after {} instructions at 0x{:03x}",
            self.state,
            self.executed,
            self.registers.pc
        );
        Ok(self.state)
    }

    /// run until halted
    pub fn run(&mut self) -> Result<MachineState, Chip8Error> {
        self.main_loop(None)
    }

    /// one fetch/execute, plus the periodic tick and pacing
    pub fn step(&mut self) -> Result<MachineState, Chip8Error> {
        let pc = self.registers.pc;
        let opcode = self.memory.get_word(pc);
        self.registers.pc = pc.wrapping_add(2);

        let instruction = Instruction::decode(opcode);
        log::trace!("0x{:03x}: {:04x} {:?}", pc, opcode, instruction);
        if instruction == Instruction::Halt {
            self.state = MachineState::Halted;
            return Ok(self.state);
        }

        self.execute_instruction(instruction)?;
        self.executed += 1;

        if self.executed % u64::from(self.config.tick_every.max(1)) == 0 {
            // raw mode swallows SIGINT, so look for Esc/Ctrl-C even when the
            // program never reads a key
            self.input.check_interrupt()?;
            self.redraw()?;
            self.registers.tick_timers();
        }

        // fixed sleep regardless of how long execution took
        if !self.config.instruction_interval.is_zero() {
            spin_sleep::sleep(self.config.instruction_interval);
        }
        Ok(self.state)
    }

    /// execute one opcode against the current state, without fetching it.
    /// `pc` should already point past the instruction
    pub fn execute(&mut self, opcode: u16) -> Result<(), Chip8Error> {
        self.execute_instruction(Instruction::decode(opcode))
    }

    fn execute_instruction(&mut self, instruction: Instruction) -> Result<(), Chip8Error> {
        let v = self.registers.v;
        match instruction {
            Instruction::Halt => self.state = MachineState::Halted,
            Instruction::ClearScreen => {
                self.memory.clear_display();
                self.screen_changed = true;
            }
            Instruction::Return => self.ret(),
            Instruction::Jump(addr) => self.registers.pc = addr,
            Instruction::Call(addr) => {
                let [hi, lo] = self.registers.pc.to_be_bytes();
                let sp = self.registers.sp;
                self.store(sp, hi);
                self.store(sp.wrapping_add(1), lo);
                self.registers.sp = sp.wrapping_add(2);
                self.registers.pc = addr;
            }
            Instruction::SkipEqImm { x, kk } => self.skip_if(v[x as usize] == kk),
            Instruction::SkipNeImm { x, kk } => self.skip_if(v[x as usize] != kk),
            Instruction::SkipEqReg { x, y } => self.skip_if(v[x as usize] == v[y as usize]),
            Instruction::SkipNeReg { x, y } => self.skip_if(v[x as usize] != v[y as usize]),
            Instruction::LoadImm { x, kk } => self.registers.v[x as usize] = kk,
            Instruction::AddImm { x, kk } => {
                self.registers.v[x as usize] = v[x as usize].wrapping_add(kk);
            }
            Instruction::Alu { op, x, y } => {
                self.registers.v[x as usize] = op.apply(v[x as usize], v[y as usize]);
            }
            Instruction::LoadIndex(addr) => self.registers.i = addr,
            Instruction::JumpOffset(addr) => self.registers.pc = addr + u16::from(v[0]),
            Instruction::Random { x, kk } => {
                let byte: u8 = self.rng.gen();
                self.registers.v[x as usize] = byte & kk;
            }
            Instruction::Draw { x, y, n } => self.draw_sprite(v[x as usize], v[y as usize], n),
            Instruction::SkipKeyEq { x } => {
                let key = self.input.poll_key()?;
                self.skip_if(key == Some(v[x as usize]));
            }
            Instruction::SkipKeyNe { x } => {
                // no key at all never skips
                let key = self.input.poll_key()?;
                self.skip_if(key.map_or(false, |k| k != v[x as usize]));
            }
            Instruction::ReadDelay { x } => self.registers.v[x as usize] = self.registers.delay_timer,
            Instruction::WaitKey { x } => self.registers.v[x as usize] = self.input.wait_key()?,
            Instruction::SetDelay { x } => self.registers.delay_timer = v[x as usize],
            Instruction::SetSound { x } => self.registers.sound_timer = v[x as usize],
            Instruction::AddIndex { x } => {
                self.registers.i = self.registers.i.wrapping_add(u16::from(v[x as usize]));
            }
            Instruction::LoadGlyph { x } => {
                self.registers.i = u16::from(v[x as usize]) * CHIP8_GLYPH_BYTES;
            }
            Instruction::Bcd { x } => self.registers.i = packed_bcd(v[x as usize]),
            Instruction::StoreRegs { x } => {
                let base = self.registers.i;
                for (n, value) in v.iter().enumerate().take(x as usize + 1) {
                    // addresses past 0xffff don't exist; don't wrap onto the glyphs
                    match base.checked_add(n as u16) {
                        Some(addr) => self.store(addr, *value),
                        None => break,
                    }
                }
            }
            Instruction::LoadRegs { x } => {
                let base = self.registers.i;
                for n in 0..=x as usize {
                    self.registers.v[n] = base
                        .checked_add(n as u16)
                        .map_or(0, |addr| self.memory.read_byte(addr));
                }
            }
            Instruction::Nop(opcode) => log::trace!("ignoring {:04x}", opcode),
        }
        Ok(())
    }

    fn skip_if(&mut self, cond: bool) {
        if cond {
            self.registers.pc = self.registers.pc.wrapping_add(2);
        }
    }

    fn ret(&mut self) {
        let sp = self.registers.sp.wrapping_sub(2);
        self.registers.sp = sp;
        self.registers.pc = self.memory.get_word(sp);
        if sp < self.memory.stack_addr {
            log::warn!("stack underflow, returning to 0x{:04x}", self.registers.pc);
        }
    }

    /// every memory write from a program goes through here so display writes
    /// are noticed; writes past the end are dropped
    fn store(&mut self, addr: u16, value: u8) {
        if self.memory.write_byte(addr, value) && self.memory.is_display(addr) {
            self.screen_changed = true;
        }
    }

    /// xor `bits` into the byte at `addr`; true if a lit pixel went dark
    fn xor_byte(&mut self, addr: u16, bits: u8) -> bool {
        let old = self.memory.read_byte(addr);
        self.memory.write_byte(addr, old ^ bits);
        old & bits != 0
    }

    /// Dxyn: xor an 8-wide, `height`-tall sprite from I onto the screen at
    /// (x, y). origin wraps, the sprite itself is clipped at the right and
    /// bottom edges: a sprite straddling the right edge loses its overhang
    /// rather than spilling into the start of the next row. Sprite rows read
    /// from past the end of memory are blank. VF ends up 1 if any pixel was
    /// switched off.
    fn draw_sprite(&mut self, x: u8, y: u8, height: u8) {
        let x = x as usize % DISPLAY_WIDTH;
        let y = y as usize % DISPLAY_HEIGHT;
        let x_byte = x / 8;
        let offset = x % 8;
        let end = self.memory.size();

        let mut collision = false;
        for row in 0..height as usize {
            let dest = self.memory.display_addr as usize + (y + row) * DISPLAY_ROW_BYTES + x_byte;
            if dest >= end {
                break;
            }
            let sprite = self
                .registers
                .i
                .checked_add(row as u16)
                .map_or(0, |addr| self.memory.read_byte(addr));
            collision |= self.xor_byte(dest as u16, sprite >> offset);
            if offset > 0 && x_byte + 1 < DISPLAY_ROW_BYTES {
                collision |= self.xor_byte(dest as u16 + 1, sprite << (8 - offset));
            }
        }
        self.registers.v[0xf] = collision as u8;
        self.screen_changed = true;
    }
}

/// hundreds, tens and ones as nibbles in the low 12 bits
fn packed_bcd(value: u8) -> u16 {
    let value = u16::from(value);
    (value / 100 % 10) << 8 | (value / 10 % 10) << 4 | (value % 10)
}
