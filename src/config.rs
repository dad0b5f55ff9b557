use std::time::Duration;

/// sleep after every instruction, regardless of how long it took: ~500/s
pub const DEFAULT_INSTRUCTION_INTERVAL: Duration = Duration::from_millis(2);

/// redraw and decrement timers every this many instructions: ~62.5Hz
pub const DEFAULT_TICK_EVERY: u32 = 8;

/// how long the non-blocking key checks (Ex9E/ExA1) wait for a key
pub const DEFAULT_KEY_POLL_TIMEOUT: Duration = Duration::from_millis(3500);

/// Knobs for the run loop and the devices attached to it
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub instruction_interval: Duration,
    pub tick_every: u32,
    pub key_poll_timeout: Duration,
    /// fixed seed for Cxkk; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            instruction_interval: DEFAULT_INSTRUCTION_INTERVAL,
            tick_every: DEFAULT_TICK_EVERY,
            key_poll_timeout: DEFAULT_KEY_POLL_TIMEOUT,
            seed: None,
        }
    }
}

impl Config {
    /// no pacing and a fixed seed; what the tests run with
    pub fn unpaced(seed: u64) -> Self {
        Config {
            instruction_interval: Duration::ZERO,
            seed: Some(seed),
            ..Config::default()
        }
    }

    pub fn with_tick_every(mut self, tick_every: u32) -> Self {
        self.tick_every = tick_every.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_engine_timing() {
        let c = Config::default();
        assert_eq!(c.instruction_interval, Duration::from_millis(2));
        assert_eq!(c.tick_every, 8);
        assert_eq!(c.key_poll_timeout, Duration::from_millis(3500));
        assert_eq!(c.seed, None);
    }

    #[test]
    fn test_zero_tick_is_clamped() {
        let c = Config::default().with_tick_every(0);
        assert_eq!(c.tick_every, 1);
    }

    #[test]
    fn test_unpaced() {
        let c = Config::unpaced(7);
        assert_eq!(c.instruction_interval, Duration::ZERO);
        assert_eq!(c.seed, Some(7));
        assert_eq!(c.tick_every, DEFAULT_TICK_EVERY);
    }
}
