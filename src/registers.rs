use crate::memory::{CHIP8_PROGRAM_ADDR, CHIP8_STACK_ADDR};

/// The register file.
///
/// `v[0xf]` doubles as the flags register, but here only sprite collision sets
/// it; the ALU leaves it alone. The stack lives in memory, so `sp` is an
/// address not an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: u16,
    pub delay_timer: u8,
    pub sound_timer: u8,
}

impl Registers {
    pub fn new() -> Self {
        Registers {
            v: [0; 16],
            i: 0,
            pc: CHIP8_PROGRAM_ADDR,
            sp: CHIP8_STACK_ADDR,
            delay_timer: 0,
            sound_timer: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Registers::new();
    }

    /// one 60Hz-ish tick; both timers stop at zero
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}
