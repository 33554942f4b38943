//! # CPU Configuration
//!
//! Runtime switches for the execution engine: the emulated clock speed, the
//! stack push ordering, classic (NMOS) mode and the stack tops.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Errors produced while parsing configuration values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown clock speed '{0}' (expected 90Hz, 200Hz, 500Hz, 1MHz-8MHz or unthrottled)")]
    UnknownClockSpeed(String),
}

/// Emulated clock speed used by the timing throttle.
///
/// # Examples
///
/// ```
/// use lib65el02::ClockSpeed;
///
/// let speed: ClockSpeed = "2MHz".parse().unwrap();
/// assert_eq!(speed, ClockSpeed::Mhz2);
/// assert_eq!(speed.cycle_duration().as_nanos(), 500);
/// assert_eq!(speed.to_string(), "2MHz");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClockSpeed {
    Hz90,
    Hz200,
    Hz500,
    #[default]
    Mhz1,
    Mhz2,
    Mhz3,
    Mhz4,
    Mhz5,
    Mhz6,
    Mhz7,
    Mhz8,
    /// No throttling: instructions run as fast as the host allows.
    Unthrottled,
}

impl ClockSpeed {
    /// All presets, slowest first.
    pub const ALL: [ClockSpeed; 12] = [
        ClockSpeed::Hz90,
        ClockSpeed::Hz200,
        ClockSpeed::Hz500,
        ClockSpeed::Mhz1,
        ClockSpeed::Mhz2,
        ClockSpeed::Mhz3,
        ClockSpeed::Mhz4,
        ClockSpeed::Mhz5,
        ClockSpeed::Mhz6,
        ClockSpeed::Mhz7,
        ClockSpeed::Mhz8,
        ClockSpeed::Unthrottled,
    ];

    /// Clock frequency in hertz, `None` when unthrottled.
    pub fn hertz(self) -> Option<u64> {
        match self {
            ClockSpeed::Hz90 => Some(90),
            ClockSpeed::Hz200 => Some(200),
            ClockSpeed::Hz500 => Some(500),
            ClockSpeed::Mhz1 => Some(1_000_000),
            ClockSpeed::Mhz2 => Some(2_000_000),
            ClockSpeed::Mhz3 => Some(3_000_000),
            ClockSpeed::Mhz4 => Some(4_000_000),
            ClockSpeed::Mhz5 => Some(5_000_000),
            ClockSpeed::Mhz6 => Some(6_000_000),
            ClockSpeed::Mhz7 => Some(7_000_000),
            ClockSpeed::Mhz8 => Some(8_000_000),
            ClockSpeed::Unthrottled => None,
        }
    }

    /// Duration of one clock cycle; zero when unthrottled.
    pub fn cycle_duration(self) -> Duration {
        match self.hertz() {
            Some(hz) => Duration::from_nanos(1_000_000_000 / hz),
            None => Duration::ZERO,
        }
    }

    pub fn is_throttled(self) -> bool {
        self.hertz().is_some()
    }

    fn name(self) -> &'static str {
        match self {
            ClockSpeed::Hz90 => "90Hz",
            ClockSpeed::Hz200 => "200Hz",
            ClockSpeed::Hz500 => "500Hz",
            ClockSpeed::Mhz1 => "1MHz",
            ClockSpeed::Mhz2 => "2MHz",
            ClockSpeed::Mhz3 => "3MHz",
            ClockSpeed::Mhz4 => "4MHz",
            ClockSpeed::Mhz5 => "5MHz",
            ClockSpeed::Mhz6 => "6MHz",
            ClockSpeed::Mhz7 => "7MHz",
            ClockSpeed::Mhz8 => "8MHz",
            ClockSpeed::Unthrottled => "unthrottled",
        }
    }
}

impl fmt::Display for ClockSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ClockSpeed {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ClockSpeed::ALL
            .iter()
            .copied()
            .find(|speed| speed.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownClockSpeed(s.to_string()))
    }
}

/// Execution engine configuration.
///
/// # Examples
///
/// ```
/// use lib65el02::{ClockSpeed, CpuConfig};
///
/// let config = CpuConfig::default()
///     .with_clock_speed(ClockSpeed::Mhz4)
///     .with_classic_mode(true);
/// assert!(config.stack_bug);
/// assert_eq!(config.system_stack_top, 0x0200);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuConfig {
    /// Emulated clock speed.
    pub clock_speed: ClockSpeed,
    /// Push ordering: `true` moves the pointer before writing.
    pub stack_bug: bool,
    /// Restrict execution to the NMOS 6502 instruction set and timing.
    pub classic_mode: bool,
    /// Top of the system stack.
    pub system_stack_top: u16,
    /// Top of the register stack.
    pub register_stack_top: u16,
    /// Maximum devices on a [`Bus`](crate::Bus) built by [`Machine`](crate::Machine).
    pub bus_capacity: usize,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            clock_speed: ClockSpeed::default(),
            stack_bug: true,
            classic_mode: false,
            system_stack_top: 0x0200,
            register_stack_top: 0x0300,
            bus_capacity: crate::devices::DEFAULT_BUS_CAPACITY,
        }
    }
}

impl CpuConfig {
    pub fn with_clock_speed(mut self, clock_speed: ClockSpeed) -> Self {
        self.clock_speed = clock_speed;
        self
    }

    /// Shorthand for `with_clock_speed(ClockSpeed::Unthrottled)`.
    pub fn unthrottled(self) -> Self {
        self.with_clock_speed(ClockSpeed::Unthrottled)
    }

    pub fn with_stack_bug(mut self, stack_bug: bool) -> Self {
        self.stack_bug = stack_bug;
        self
    }

    pub fn with_classic_mode(mut self, classic_mode: bool) -> Self {
        self.classic_mode = classic_mode;
        self
    }

    pub fn with_system_stack_top(mut self, top: u16) -> Self {
        self.system_stack_top = top;
        self
    }

    pub fn with_register_stack_top(mut self, top: u16) -> Self {
        self.register_stack_top = top;
        self
    }

    pub fn with_bus_capacity(mut self, capacity: usize) -> Self {
        self.bus_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_presets() {
        assert_eq!("90Hz".parse::<ClockSpeed>(), Ok(ClockSpeed::Hz90));
        assert_eq!("8mhz".parse::<ClockSpeed>(), Ok(ClockSpeed::Mhz8));
        assert_eq!(
            "Unthrottled".parse::<ClockSpeed>(),
            Ok(ClockSpeed::Unthrottled)
        );
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            "9MHz".parse::<ClockSpeed>(),
            Err(ConfigError::UnknownClockSpeed("9MHz".to_string()))
        );
    }

    #[test]
    fn test_display_parses_back() {
        for speed in ClockSpeed::ALL {
            assert_eq!(speed.to_string().parse::<ClockSpeed>(), Ok(speed));
        }
    }

    #[test]
    fn test_cycle_durations() {
        assert_eq!(ClockSpeed::Mhz1.cycle_duration(), Duration::from_micros(1));
        assert_eq!(ClockSpeed::Hz500.cycle_duration(), Duration::from_millis(2));
        assert_eq!(ClockSpeed::Unthrottled.cycle_duration(), Duration::ZERO);
        assert!(!ClockSpeed::Unthrottled.is_throttled());
    }

    #[test]
    fn test_default_config() {
        let config = CpuConfig::default();
        assert_eq!(config.clock_speed, ClockSpeed::Mhz1);
        assert!(config.stack_bug);
        assert!(!config.classic_mode);
        assert_eq!(config.register_stack_top, 0x0300);
        assert_eq!(config.bus_capacity, 16);
    }
}
