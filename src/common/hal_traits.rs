// src/common/hal_traits.rs

use core::fmt::Debug;
use core::ops::{Add, Sub};
use core::time::Duration;

/// A point in time from the link's clock.
pub trait IrInstant:
    Copy + Ord + Add<Duration, Output = Self> + Sub<Self, Output = Duration>
{
}

impl<T> IrInstant for T where
    T: Copy + Ord + Add<Duration, Output = T> + Sub<T, Output = Duration>
{
}

/// Abstraction for the clock and delay operations the controller needs.
pub trait IrTimer {
    type Instant: IrInstant;

    /// Delay for at least the specified number of microseconds.
    fn delay_us(&mut self, us: u32);

    /// Delay for at least the specified number of milliseconds.
    fn delay_ms(&mut self, ms: u32);

    /// Current time.
    fn now(&self) -> Self::Instant;
}

/// Abstraction for the duplex byte channel to the device.
///
/// Both primitives are non-blocking: `WouldBlock` means "nothing yet", and the
/// controller turns repeated `WouldBlock` into a timeout once its deadline passes.
pub trait IrChannel {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Reads whatever is available into `buf`.
    ///
    /// `Ok(0)` is a legal empty read (a zero-length bulk transfer, for example).
    fn read(&mut self, buf: &mut [u8]) -> nb::Result<usize, Self::Error>;

    /// Writes a prefix of `bytes`, returning how many were accepted.
    fn write(&mut self, bytes: &[u8]) -> nb::Result<usize, Self::Error>;

    /// Completes any buffered transmission.
    fn flush(&mut self) -> nb::Result<(), Self::Error>;
}

/// Microseconds since an arbitrary epoch, for clocks that only expose a counter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Micros(pub u64);

impl Add<Duration> for Micros {
    type Output = Self;
    fn add(self, rhs: Duration) -> Self {
        Micros(self.0.saturating_add(rhs.as_micros() as u64))
    }
}

impl Sub<Micros> for Micros {
    type Output = Duration;
    fn sub(self, rhs: Micros) -> Duration {
        Duration::from_micros(self.0.saturating_sub(rhs.0))
    }
}

/// Wall-clock timer backed by `std::thread::sleep` and `std::time::Instant`.
#[cfg(feature = "std")]
#[derive(Debug, Default, Clone, Copy)]
pub struct StdTimer;

#[cfg(feature = "std")]
impl IrTimer for StdTimer {
    type Instant = std::time::Instant;

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(us as u64));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(ms as u64));
    }

    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }
}

/// Adapts an embedded-hal delay provider plus a microsecond counter into an
/// [`IrTimer`].
#[cfg(feature = "impl-native")]
pub struct NativeTimer<D, C>
where
    D: embedded_hal::delay::DelayNs,
    C: Fn() -> u64,
{
    delay: D,
    clock: C,
}

#[cfg(feature = "impl-native")]
impl<D, C> NativeTimer<D, C>
where
    D: embedded_hal::delay::DelayNs,
    C: Fn() -> u64,
{
    /// `clock` must return a monotonically increasing microsecond count.
    pub fn new(delay: D, clock: C) -> Self {
        NativeTimer { delay, clock }
    }
}

#[cfg(feature = "impl-native")]
impl<D, C> IrTimer for NativeTimer<D, C>
where
    D: embedded_hal::delay::DelayNs,
    C: Fn() -> u64,
{
    type Instant = Micros;

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    fn now(&self) -> Self::Instant {
        Micros((self.clock)())
    }
}
