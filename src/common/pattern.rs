// src/common/pattern.rs

//! Mark/space pulse patterns and the safety bounds every emission obeys.
//!
//! A pattern alternates carrier-on and carrier-off durations in microseconds,
//! starting with a mark. Bounds are checked while the pattern is built, so a
//! `PulsePattern` that exists is always safe to hand to an emitter.

use heapless::Vec;

/// Maximum number of entries in one pattern.
pub const MAX_PULSES: usize = 512;
/// Ceiling on the summed duration of one pattern.
pub const MAX_TOTAL_US: u32 = 2_000_000;
/// Largest single entry. Emitters take 16-bit durations.
pub const MAX_PULSE_US: u32 = u16::MAX as u32;
/// Tick length used by legacy `RAW` byte values and by capture buffers.
pub const TICK_US: u32 = 50;
/// Carrier used until a `TX` command sets another one.
pub const DEFAULT_CARRIER_HZ: u32 = 38_000;

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("pattern is empty")]
    Empty,
    #[error("entry {index} has zero duration")]
    ZeroDuration { index: usize },
    #[error("entry {index} exceeds {max} us", max = MAX_PULSE_US)]
    OutOfRange { index: usize },
    #[error("more than {max} entries")]
    TooMany { max: usize },
    #[error("total duration exceeds {max_us} us")]
    TooLong { max_us: u32 },
    #[error("entry {index} is not a number")]
    InvalidNumber { index: usize },
}

/// A bounded, validated pulse pattern.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PulsePattern {
    pulses: Vec<u16, MAX_PULSES>,
    total_us: u32,
}

impl PulsePattern {
    pub const fn new() -> Self {
        PulsePattern {
            pulses: Vec::new(),
            total_us: 0,
        }
    }

    /// Parses a comma-separated list of decimal microsecond durations.
    pub fn from_list(list: &str) -> Result<Self, PatternError> {
        let mut pattern = PulsePattern::new();
        pattern.extend_from_list(list)?;
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }
        Ok(pattern)
    }

    /// Builds a pattern from legacy `RAW` values: decimal or `0x` hex, each
    /// clamped to 255 and scaled by [`TICK_US`].
    pub fn from_legacy_values<'a, I>(values: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut pattern = PulsePattern::new();
        for (index, token) in values.into_iter().enumerate() {
            let value = parse_number(token).ok_or(PatternError::InvalidNumber { index })?;
            pattern.push(value.min(255) * TICK_US)?;
        }
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }
        Ok(pattern)
    }

    /// Appends one entry after checking every bound.
    pub fn push(&mut self, us: u32) -> Result<(), PatternError> {
        let index = self.pulses.len();
        if us == 0 {
            return Err(PatternError::ZeroDuration { index });
        }
        if us > MAX_PULSE_US {
            return Err(PatternError::OutOfRange { index });
        }
        let total = self.total_us.saturating_add(us);
        if total > MAX_TOTAL_US {
            return Err(PatternError::TooLong { max_us: MAX_TOTAL_US });
        }
        self.pulses
            .push(us as u16)
            .map_err(|_| PatternError::TooMany { max: MAX_PULSES })?;
        self.total_us = total;
        Ok(())
    }

    /// Appends every entry of a comma-separated list. On error the pattern is
    /// left exactly as it was. Returns the number of entries added.
    pub fn extend_from_list(&mut self, list: &str) -> Result<usize, PatternError> {
        let mut staged = self.clone();
        let start = staged.len();
        for token in list.trim().split(',') {
            let index = staged.len();
            let token = token.trim();
            if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
                return Err(PatternError::InvalidNumber { index });
            }
            // Digits only, so a parse failure means the value overflowed u32.
            let us: u32 = token.parse().map_err(|_| PatternError::OutOfRange { index })?;
            staged.push(us)?;
        }
        let added = staged.len() - start;
        *self = staged;
        Ok(added)
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.pulses
    }

    pub fn len(&self) -> usize {
        self.pulses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }

    pub fn total_us(&self) -> u32 {
        self.total_us
    }

    pub fn clear(&mut self) {
        self.pulses.clear();
        self.total_us = 0;
    }
}

/// Carrier frequency in whole kHz, rounded and clamped to what emitters accept.
pub fn carrier_khz(freq_hz: u32) -> u8 {
    (freq_hz.saturating_add(500) / 1000).clamp(1, 255) as u8
}

/// Parses a decimal or `0x`-prefixed hexadecimal value.
pub fn parse_number(token: &str) -> Option<u32> {
    let token = token.trim();
    match token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        Some(hex) if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
            u32::from_str_radix(hex, 16).ok()
        }
        Some(_) => None,
        None if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) => {
            token.parse().ok()
        }
        None => None,
    }
}
