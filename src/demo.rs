use crate::interpreter::Chip8Interpreter;

/// Programs authored in place, starting from the load address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Demo {
    /// wait for a key and show its glyph in the top left corner
    Keypress,
    /// sweep the sixteen hex glyphs across the screen five times
    Glyphs,
}

impl Demo {
    /// Write the program at `pc` onwards. Nothing past the last instruction is
    /// written, so fresh (zeroed) memory supplies the halt.
    pub fn author(self, m: &mut Chip8Interpreter) {
        match self {
            Demo::Keypress => {
                m.emit(0xf10a); // wait for a key into v1
                m.emit(0xf129); // I = glyph for v1
                m.emit(0x6000); // v0 = 0
                m.emit(0xd005); // draw 5 rows at (v0, v0)
            }
            Demo::Glyphs => {
                m.emit(0x6400); // v4 counts passes
                let pass = m.registers().pc;
                m.emit(0x00e0);
                for digit in 0..16u16 {
                    m.emit(0x6300 | digit);
                    m.emit(0xf329);
                    m.emit(0x6100 | digit * 8); // x
                    m.emit(0x8144); // nudged by the pass count
                    m.emit(0x6200 | (digit / 8) * 6); // y
                    m.emit(0x8244);
                    m.emit(0xd125);
                }
                m.emit(0x633c); // a second's worth of timer ticks
                m.emit(0xf315);
                let wait = m.registers().pc;
                m.emit(0xf307);
                m.emit(0x3300);
                m.emit(0x1000 | wait);
                m.emit(0x7401);
                m.emit(0x3405);
                m.emit(0x1000 | pass);
            }
        }
    }
}
