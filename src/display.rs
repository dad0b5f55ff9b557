use crate::error::Chip8Error;
use std::io;
use tui::backend::{Backend, CrosstermBackend};
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Display is used by the interpreter to draw things on the screen. It should
/// abstract the implementation details, so a variety of kinds of screen would
/// work. The interpreter only calls `draw` when the framebuffer has changed.
pub trait Display {
    /// draw a whole frame: row-major, one bit per pixel, msb leftmost
    fn draw(&mut self, data: &[u8]) -> Result<(), Chip8Error>;
}

// store useful metadata about the screen: width, height, bits per pixel
struct Resolution(usize, usize, usize);

impl Resolution {
    fn pixel_count(&self) -> usize {
        self.0 * self.1
    }

    fn byte_count(&self) -> usize {
        self.0 * self.1 * self.2 / 8
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// coordinates of every pixel whose bit equals `bitplane`; y grows downward
    /// on screen so it is negated for the canvas
    fn bitplane_from_data<'a>(
        &self,
        data: &'a [u8],
        bitplane: u8,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let mut count = self.pixel_count();
        let w = self.0;
        std::iter::from_fn(move || {
            while count > 0 {
                count -= 1;
                let bit = 1 & (data[count / 8] >> (7 - count % 8));
                if bit == bitplane {
                    return Some((
                        (count % w) as f64,        // x
                        -1.0 * (count / w) as f64, // y
                    ));
                }
            }
            None
        })
    }
}

/// monochrome display in a terminal, rendered with TUI; crossterm on stdout
/// unless told otherwise
pub struct MonoTermDisplay<B: Backend = CrosstermBackend<io::Stdout>> {
    terminal: Terminal<B>,
    resolution: Resolution,
}

impl MonoTermDisplay {
    pub fn new() -> Result<Self, Chip8Error> {
        Self::with_backend(CrosstermBackend::new(io::stdout()))
    }
}

impl<B: Backend> MonoTermDisplay<B> {
    pub fn with_backend(backend: B) -> Result<Self, Chip8Error> {
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(DISPLAY_WIDTH, DISPLAY_HEIGHT, 1),
        })
    }
}

impl<B: Backend> Display for MonoTermDisplay<B> {
    fn draw(&mut self, data: &[u8]) -> Result<(), Chip8Error> {
        // make sure we're given exactly the right amount of data to draw
        if data.len() != self.resolution.byte_count() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "expected {} bytes of frame, got {}",
                    self.resolution.byte_count(),
                    data.len()
                ),
            )
            .into());
        }

        let unlit: Vec<_> = self.resolution.bitplane_from_data(data, 0).collect();
        let lit: Vec<_> = self.resolution.bitplane_from_data(data, 1).collect();
        let size = Rect::new(
            0,
            0,
            2 + self.resolution.0 as u16,
            2 + self.resolution.1 as u16,
        );
        let x_bounds = self.resolution.x_bounds();
        let y_bounds = self.resolution.y_bounds();

        // 1:1 cells to pixels when the terminal is big enough. tui doesn't clip
        // widgets to the frame, so a smaller terminal gets a squashed canvas
        self.terminal.draw(|f| {
            let area = size.intersection(f.size());
            if area.width <= 2 || area.height <= 2 {
                // no room inside the border
                return;
            }
            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(x_bounds)
                .y_bounds(y_bounds)
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &unlit,
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &lit,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, area);
        })?;
        Ok(())
    }
}

/// useful for testing non-display routines: keeps every frame it is handed
#[derive(Default)]
pub struct DummyDisplay {
    pub frames: Vec<Vec<u8>>,
}

impl DummyDisplay {
    pub fn new() -> Self {
        DummyDisplay { frames: Vec::new() }
    }

    pub fn last_frame(&self) -> Option<&[u8]> {
        self.frames.last().map(Vec::as_slice)
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, data: &[u8]) -> Result<(), Chip8Error> {
        self.frames.push(data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui::backend::TestBackend;

    #[test]
    fn test_pixel_count() {
        let r = Resolution(64, 32, 1);
        assert_eq!(r.pixel_count(), 2048)
    }

    #[test]
    fn test_byte_count() {
        let r = Resolution(64, 32, 1);
        assert_eq!(r.byte_count(), 256)
    }

    #[test]
    fn test_bounds() {
        let r = Resolution(64, 32, 1);
        assert_eq!(r.x_bounds(), [0.0, 63.0]);
        assert_eq!(r.y_bounds(), [-31.0, 0.0]);
    }

    #[test]
    fn test_blank_frame_has_no_lit_pixels() {
        let r = Resolution(64, 32, 1);
        let frame = [0u8; 256];
        assert_eq!(r.bitplane_from_data(&frame, 1).count(), 0);
        assert_eq!(r.bitplane_from_data(&frame, 0).count(), 2048);
    }

    #[test]
    fn test_bit_order() {
        let r = Resolution(64, 32, 1);
        let mut frame = [0u8; 256];
        frame[0] = 0x80; // top left
        frame[8 + 7] = 0x01; // row 1, rightmost
        let mut lit: Vec<_> = r.bitplane_from_data(&frame, 1).collect();
        lit.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(lit, vec![(0.0, 0.0), (63.0, -1.0)]);
    }

    fn test_frame() -> Vec<u8> {
        let mut frame = vec![0u8; 256];
        frame[0] = 0x80;
        frame[255] = 0x01;
        frame
    }

    #[test]
    fn test_draw_fits_small_terminal() -> Result<(), Chip8Error> {
        let mut d = MonoTermDisplay::with_backend(TestBackend::new(80, 24))?;
        d.draw(&test_frame())?;
        let buf = d.terminal.backend().buffer();
        assert_eq!(buf.get(0, 0).symbol, "┌");
        // bottom border lands on the last row rather than off the end
        assert_eq!(buf.get(0, 23).symbol, "└");
        Ok(())
    }

    #[test]
    fn test_draw_full_size() -> Result<(), Chip8Error> {
        let mut d = MonoTermDisplay::with_backend(TestBackend::new(100, 40))?;
        d.draw(&test_frame())?;
        let buf = d.terminal.backend().buffer();
        assert_eq!(buf.get(65, 33).symbol, "┘");
        Ok(())
    }

    #[test]
    fn test_draw_tiny_terminal_is_skipped() -> Result<(), Chip8Error> {
        let mut d = MonoTermDisplay::with_backend(TestBackend::new(2, 1))?;
        d.draw(&test_frame())?;
        Ok(())
    }

    #[test]
    fn test_draw_rejects_short_frame() -> Result<(), Chip8Error> {
        let mut d = MonoTermDisplay::with_backend(TestBackend::new(80, 24))?;
        assert!(matches!(d.draw(&[0; 10]), Err(Chip8Error::Io(_))));
        Ok(())
    }

    #[test]
    fn test_dummy_records_frames() -> Result<(), Chip8Error> {
        let mut d = DummyDisplay::new();
        assert_eq!(d.last_frame(), None);
        d.draw(&[1, 2, 3])?;
        d.draw(&[4])?;
        assert_eq!(d.frames.len(), 2);
        assert_eq!(d.last_frame(), Some(&[4u8][..]));
        Ok(())
    }
}
