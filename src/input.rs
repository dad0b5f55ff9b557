use crate::error::Chip8Error;
use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use std::collections::VecDeque;
use std::time::Duration;

/// map a typed character to a keypad value: '0'-'9', 'a'-'f' and 'A'-'F'
/// are the keys; everything else is inert
pub fn decode_key(c: char) -> Option<u8> {
    c.to_digit(16).map(|d| d as u8)
}

/// reads keypresses
pub trait Input {
    /// a key if one turns up within the poll window, else `None`
    fn poll_key(&mut self) -> Result<Option<u8>, Chip8Error>;

    /// block until a mapped key is pressed
    fn wait_key(&mut self) -> Result<u8, Chip8Error>;

    /// look at whatever is already pending without blocking. `Interrupted`
    /// if the operator asked to quit; keys seen on the way are kept for the
    /// next `poll_key`/`wait_key`
    fn check_interrupt(&mut self) -> Result<(), Chip8Error>;
}

/// keys typed between reads; older ones are dropped past this
const PENDING_KEYS_MAX: usize = 16;

/// Input from the controlling terminal, in raw mode for as long as this lives
pub struct TerminalInput {
    poll_timeout: Duration,
    pending: VecDeque<u8>,
}

impl TerminalInput {
    pub fn new(poll_timeout: Duration) -> Result<Self, Chip8Error> {
        terminal::enable_raw_mode()?;
        Ok(TerminalInput {
            poll_timeout,
            pending: VecDeque::new(),
        })
    }

    /// what a single terminal event means to the keypad
    fn key_from_event(event: Event) -> Result<Option<u8>, Chip8Error> {
        match event {
            Event::Key(KeyEvent {
                code, modifiers, ..
            }) => match code {
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    Err(Chip8Error::Interrupted)
                }
                KeyCode::Esc => Err(Chip8Error::Interrupted),
                KeyCode::Char(c) => Ok(decode_key(c)),
                _ => Ok(None),
            },
            _ => Ok(None),
        }
    }

    fn buffer_key(&mut self, key: u8) {
        if self.pending.len() >= PENDING_KEYS_MAX {
            self.pending.pop_front();
        }
        self.pending.push_back(key);
    }
}

impl Drop for TerminalInput {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            log::warn!("could not restore terminal mode: {}", e);
        }
    }
}

impl Input for TerminalInput {
    fn poll_key(&mut self) -> Result<Option<u8>, Chip8Error> {
        if let Some(key) = self.pending.pop_front() {
            return Ok(Some(key));
        }
        if !poll(self.poll_timeout)? {
            return Ok(None);
        }
        Self::key_from_event(read()?)
    }

    fn wait_key(&mut self) -> Result<u8, Chip8Error> {
        if let Some(key) = self.pending.pop_front() {
            return Ok(key);
        }
        loop {
            if let Some(key) = Self::key_from_event(read()?)? {
                return Ok(key);
            }
        }
    }

    fn check_interrupt(&mut self) -> Result<(), Chip8Error> {
        while poll(Duration::ZERO)? {
            if let Some(key) = Self::key_from_event(read()?)? {
                self.buffer_key(key);
            }
        }
        Ok(())
    }
}


/// dummy Input implementation for testing: hands out scripted keys in order
pub struct DummyInput {
    keys: VecDeque<Option<u8>>,
    checks: usize,
    interrupt_at: Option<usize>,
}

impl DummyInput {
    /// `None` entries make a poll come back empty
    pub fn new(keys: &[Option<u8>]) -> Self {
        DummyInput {
            keys: keys.iter().copied().collect(),
            checks: 0,
            interrupt_at: None,
        }
    }

    /// the operator "presses Esc" on the `n`th interrupt check (counting from 1)
    pub fn interrupt_on_check(mut self, n: usize) -> Self {
        self.interrupt_at = Some(n);
        self
    }

    pub fn remaining(&self) -> usize {
        self.keys.len()
    }

    /// how many times the interrupt check has run
    pub fn checks(&self) -> usize {
        self.checks
    }
}

impl Input for DummyInput {
    fn poll_key(&mut self) -> Result<Option<u8>, Chip8Error> {
        Ok(self.keys.pop_front().flatten())
    }

    fn wait_key(&mut self) -> Result<u8, Chip8Error> {
        // skip over the "nothing pressed" slots; running dry would block forever
        while let Some(next) = self.keys.pop_front() {
            if let Some(key) = next {
                return Ok(key);
            }
        }
        Err(Chip8Error::Interrupted)
    }

    fn check_interrupt(&mut self) -> Result<(), Chip8Error> {
        self.checks += 1;
        match self.interrupt_at {
            Some(n) if self.checks >= n => Err(Chip8Error::Interrupted),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_key() {
        assert_eq!(decode_key('0'), Some(0x0));
        assert_eq!(decode_key('9'), Some(0x9));
        assert_eq!(decode_key('a'), Some(0xa));
        assert_eq!(decode_key('F'), Some(0xf));
        assert_eq!(decode_key('g'), None);
        assert_eq!(decode_key(' '), None);
        assert_eq!(decode_key('\n'), None);
    }

    #[test]
    fn test_key_events() -> Result<(), Chip8Error> {
        let press = |code| Event::Key(KeyEvent::new(code, KeyModifiers::NONE));
        assert_eq!(TerminalInput::key_from_event(press(KeyCode::Char('b')))?, Some(0xb));
        assert_eq!(TerminalInput::key_from_event(press(KeyCode::Char('z')))?, None);
        assert_eq!(TerminalInput::key_from_event(press(KeyCode::Enter))?, None);
        assert!(matches!(
            TerminalInput::key_from_event(press(KeyCode::Esc)),
            Err(Chip8Error::Interrupted)
        ));
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(matches!(
            TerminalInput::key_from_event(ctrl_c),
            Err(Chip8Error::Interrupted)
        ));
        Ok(())
    }

    #[test]
    fn test_buffered_keys_come_first() -> Result<(), Chip8Error> {
        // never enabled raw mode, so nothing to undo on drop but a warning
        let mut t = TerminalInput {
            poll_timeout: Duration::ZERO,
            pending: VecDeque::new(),
        };
        for key in 0..20u8 {
            t.buffer_key(key % 16);
        }
        assert_eq!(t.pending.len(), PENDING_KEYS_MAX);
        // the oldest four were dropped
        assert_eq!(t.poll_key()?, Some(4));
        assert_eq!(t.wait_key()?, 5);
        Ok(())
    }

    #[test]
    fn test_dummy_poll() -> Result<(), Chip8Error> {
        let mut i = DummyInput::new(&[Some(3), None]);
        assert_eq!(i.poll_key()?, Some(3));
        assert_eq!(i.poll_key()?, None);
        // exhausted behaves like nothing pressed
        assert_eq!(i.poll_key()?, None);
        Ok(())
    }

    #[test]
    fn test_dummy_wait_skips_empty_slots() -> Result<(), Chip8Error> {
        let mut i = DummyInput::new(&[None, None, Some(0xc)]);
        assert_eq!(i.wait_key()?, 0xc);
        assert_eq!(i.remaining(), 0);
        assert!(i.wait_key().is_err());
        Ok(())
    }

    #[test]
    fn test_dummy_scripted_interrupt() -> Result<(), Chip8Error> {
        let mut i = DummyInput::new(&[Some(1)]).interrupt_on_check(2);
        i.check_interrupt()?;
        assert!(matches!(i.check_interrupt(), Err(Chip8Error::Interrupted)));
        assert_eq!(i.checks(), 2);
        // keys are untouched by the check
        assert_eq!(i.poll_key()?, Some(1));

        let mut quiet = DummyInput::new(&[]);
        for _ in 0..100 {
            quiet.check_interrupt()?;
        }
        Ok(())
    }
}
