/// # Opcodes
///
/// Opcodes are 16 bits, fetched big-endian. They are cased on:
/// - `(n, _, _, _)` the family; applies to all opcodes
/// - `(_, _, _, n)` or `(_, _, n, n)` the operation within a family
///
/// Nibbles not used to pick the operation carry operands:
/// - `(_, n, n, n)` a 12-bit address
/// - `(_, _, n, n)` an immediate byte
/// - `(_, n, _, _)` register Vx, or the range V0..=Vx
/// - `(_, _, n, _)` register Vy
pub trait Opcode {
    fn nibbles(&self) -> (u8, u8, u8, u8);
    /// `[_x__]`
    fn x(&self) -> u8;
    /// `[__y_]`
    fn y(&self) -> u8;
    /// `[___n]`
    fn n(&self) -> u8;
    /// `[__kk]`
    fn kk(&self) -> u8;
    /// `[_adr]`
    fn addr(&self) -> u16;
}

impl Opcode for u16 {
    fn nibbles(&self) -> (u8, u8, u8, u8) {
        (((self & 0xF000) >> 12) as u8, self.x(), self.y(), self.n())
    }

    fn x(&self) -> u8 {
        ((self & 0x0F00) >> 8) as u8
    }

    fn y(&self) -> u8 {
        ((self & 0x00F0) >> 4) as u8
    }

    fn n(&self) -> u8 {
        (self & 0x000F) as u8
    }

    fn kk(&self) -> u8 {
        (self & 0x00FF) as u8
    }

    fn addr(&self) -> u16 {
        self & 0x0FFF
    }
}

/// Register-to-register ALU operations (`8xy_`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Assign,
    Or,
    And,
    Xor,
    Add,
    Sub,
    ShiftRight,
    SubReversed,
    ShiftLeft,
}

impl AluOp {
    /// plain 8-bit arithmetic; VF is never touched by this machine's ALU
    pub fn apply(self, vx: u8, vy: u8) -> u8 {
        match self {
            AluOp::Assign => vy,
            AluOp::Or => vx | vy,
            AluOp::And => vx & vy,
            AluOp::Xor => vx ^ vy,
            AluOp::Add => vx.wrapping_add(vy),
            AluOp::Sub => vx.wrapping_sub(vy),
            // shift distance comes from Vy; 8 or more empties the register
            AluOp::ShiftRight => vx.checked_shr(vy as u32).unwrap_or(0),
            AluOp::SubReversed => vy.wrapping_sub(vx),
            AluOp::ShiftLeft => vx.checked_shl(vy as u32).unwrap_or(0),
        }
    }
}

/// Every instruction the machine understands, with typed operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `0000` stop the run loop
    Halt,
    /// `00E0`
    ClearScreen,
    /// `00EE`
    Return,
    /// `1nnn`
    Jump(u16),
    /// `2nnn`
    Call(u16),
    /// `3xkk`
    SkipEqImm { x: u8, kk: u8 },
    /// `4xkk`
    SkipNeImm { x: u8, kk: u8 },
    /// `5xy0`
    SkipEqReg { x: u8, y: u8 },
    /// `6xkk`
    LoadImm { x: u8, kk: u8 },
    /// `7xkk` wraps, no carry
    AddImm { x: u8, kk: u8 },
    /// `8xy_`
    Alu { op: AluOp, x: u8, y: u8 },
    /// `9xy0`
    SkipNeReg { x: u8, y: u8 },
    /// `Annn`
    LoadIndex(u16),
    /// `Bnnn` jump to nnn + V0
    JumpOffset(u16),
    /// `Cxkk`
    Random { x: u8, kk: u8 },
    /// `Dxyn`
    Draw { x: u8, y: u8, n: u8 },
    /// `Ex9E`
    SkipKeyEq { x: u8 },
    /// `ExA1`
    SkipKeyNe { x: u8 },
    /// `Fx07`
    ReadDelay { x: u8 },
    /// `Fx0A`
    WaitKey { x: u8 },
    /// `Fx15`
    SetDelay { x: u8 },
    /// `Fx18`
    SetSound { x: u8 },
    /// `Fx1E`
    AddIndex { x: u8 },
    /// `Fx29`
    LoadGlyph { x: u8 },
    /// `Fx33` packs three BCD digits into I
    Bcd { x: u8 },
    /// `Fx55`
    StoreRegs { x: u8 },
    /// `Fx65`
    LoadRegs { x: u8 },
    /// anything else: ignored
    Nop(u16),
}

impl Instruction {
    pub fn decode(op: u16) -> Instruction {
        let x = op.x();
        let y = op.y();
        let kk = op.kk();
        match op.nibbles() {
            (0x0, 0x0, 0x0, 0x0) => Instruction::Halt,
            (0x0, 0x0, 0xE, 0x0) => Instruction::ClearScreen,
            (0x0, 0x0, 0xE, 0xE) => Instruction::Return,
            (0x1, ..) => Instruction::Jump(op.addr()),
            (0x2, ..) => Instruction::Call(op.addr()),
            (0x3, ..) => Instruction::SkipEqImm { x, kk },
            (0x4, ..) => Instruction::SkipNeImm { x, kk },
            (0x5, ..) => Instruction::SkipEqReg { x, y },
            (0x6, ..) => Instruction::LoadImm { x, kk },
            (0x7, ..) => Instruction::AddImm { x, kk },
            (0x8, .., n) => match alu_op(n) {
                Some(alu) => Instruction::Alu { op: alu, x, y },
                None => Instruction::Nop(op),
            },
            (0x9, ..) => Instruction::SkipNeReg { x, y },
            (0xA, ..) => Instruction::LoadIndex(op.addr()),
            (0xB, ..) => Instruction::JumpOffset(op.addr()),
            (0xC, ..) => Instruction::Random { x, kk },
            (0xD, .., n) => Instruction::Draw { x, y, n },
            (0xE, _, 0x9, 0xE) => Instruction::SkipKeyEq { x },
            (0xE, _, 0xA, 0x1) => Instruction::SkipKeyNe { x },
            (0xF, _, 0x0, 0x7) => Instruction::ReadDelay { x },
            (0xF, _, 0x0, 0xA) => Instruction::WaitKey { x },
            (0xF, _, 0x1, 0x5) => Instruction::SetDelay { x },
            (0xF, _, 0x1, 0x8) => Instruction::SetSound { x },
            (0xF, _, 0x1, 0xE) => Instruction::AddIndex { x },
            (0xF, _, 0x2, 0x9) => Instruction::LoadGlyph { x },
            (0xF, _, 0x3, 0x3) => Instruction::Bcd { x },
            (0xF, _, 0x5, 0x5) => Instruction::StoreRegs { x },
            (0xF, _, 0x6, 0x5) => Instruction::LoadRegs { x },
            _ => Instruction::Nop(op),
        }
    }
}

fn alu_op(n: u8) -> Option<AluOp> {
    match n {
        0x0 => Some(AluOp::Assign),
        0x1 => Some(AluOp::Or),
        0x2 => Some(AluOp::And),
        0x3 => Some(AluOp::Xor),
        0x4 => Some(AluOp::Add),
        0x5 => Some(AluOp::Sub),
        0x6 => Some(AluOp::ShiftRight),
        0x7 => Some(AluOp::SubReversed),
        0xE => Some(AluOp::ShiftLeft),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nibbles() {
        let op: u16 = 0xABCD;
        assert_eq!(op.nibbles(), (0xA, 0xB, 0xC, 0xD));
        assert_eq!(op.kk(), 0xCD);
        assert_eq!(op.addr(), 0x0BCD);
    }

    #[test]
    fn test_decode_system() {
        assert_eq!(Instruction::decode(0x0000), Instruction::Halt);
        assert_eq!(Instruction::decode(0x00E0), Instruction::ClearScreen);
        assert_eq!(Instruction::decode(0x00EE), Instruction::Return);
        // machine code calls are not supported
        assert_eq!(Instruction::decode(0x0123), Instruction::Nop(0x0123));
    }

    #[test]
    fn test_decode_flow() {
        assert_eq!(Instruction::decode(0x1ABC), Instruction::Jump(0xABC));
        assert_eq!(Instruction::decode(0x2ABC), Instruction::Call(0xABC));
        assert_eq!(Instruction::decode(0xB300), Instruction::JumpOffset(0x300));
        assert_eq!(
            Instruction::decode(0x3A42),
            Instruction::SkipEqImm { x: 0xA, kk: 0x42 }
        );
        // the low nibble of 5xy_ is not checked
        assert_eq!(
            Instruction::decode(0x5127),
            Instruction::SkipEqReg { x: 1, y: 2 }
        );
        assert_eq!(
            Instruction::decode(0x9120),
            Instruction::SkipNeReg { x: 1, y: 2 }
        );
    }

    #[test]
    fn test_decode_alu() {
        assert_eq!(
            Instruction::decode(0x8124),
            Instruction::Alu {
                op: AluOp::Add,
                x: 1,
                y: 2
            }
        );
        assert_eq!(
            Instruction::decode(0x812E),
            Instruction::Alu {
                op: AluOp::ShiftLeft,
                x: 1,
                y: 2
            }
        );
        for undefined in [0x8128u16, 0x8129, 0x812A, 0x812B, 0x812C, 0x812D, 0x812F] {
            assert_eq!(Instruction::decode(undefined), Instruction::Nop(undefined));
        }
    }

    #[test]
    fn test_decode_keys_and_misc() {
        assert_eq!(Instruction::decode(0xE39E), Instruction::SkipKeyEq { x: 3 });
        assert_eq!(Instruction::decode(0xE3A1), Instruction::SkipKeyNe { x: 3 });
        assert_eq!(Instruction::decode(0xE3A2), Instruction::Nop(0xE3A2));
        assert_eq!(Instruction::decode(0xF10A), Instruction::WaitKey { x: 1 });
        assert_eq!(Instruction::decode(0xF233), Instruction::Bcd { x: 2 });
        assert_eq!(Instruction::decode(0xF555), Instruction::StoreRegs { x: 5 });
        assert_eq!(Instruction::decode(0xF565), Instruction::LoadRegs { x: 5 });
        assert_eq!(Instruction::decode(0xF1FF), Instruction::Nop(0xF1FF));
        assert_eq!(
            Instruction::decode(0xD125),
            Instruction::Draw { x: 1, y: 2, n: 5 }
        );
    }

    #[test]
    fn test_alu_wraps_without_flags() {
        for a in [0u8, 1, 0x7f, 0x80, 0xfe, 0xff] {
            for b in [0u8, 1, 0x7f, 0x80, 0xff] {
                assert_eq!(AluOp::Add.apply(a, b), ((a as u16 + b as u16) % 256) as u8);
                assert_eq!(
                    AluOp::Sub.apply(a, b),
                    ((a as i16 - b as i16).rem_euclid(256)) as u8
                );
                assert_eq!(AluOp::SubReversed.apply(a, b), b.wrapping_sub(a));
            }
        }
    }

    #[test]
    fn test_alu_shifts_by_vy() {
        assert_eq!(AluOp::ShiftRight.apply(0b1000_0000, 3), 0b0001_0000);
        assert_eq!(AluOp::ShiftLeft.apply(0b0000_0011, 7), 0b1000_0000);
        assert_eq!(AluOp::ShiftRight.apply(0xff, 8), 0);
        assert_eq!(AluOp::ShiftLeft.apply(0xff, 200), 0);
        assert_eq!(AluOp::ShiftLeft.apply(0x81, 0), 0x81);
    }
}
