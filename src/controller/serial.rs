// src/controller/serial.rs

//! [`IrChannel`] over a host serial port (the USB/UART bridge in front of the
//! device).

use crate::common::hal_traits::{IrChannel, IrTimer, StdTimer};
use crate::common::timing;
use serialport as sp;
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

/// Options for configuring and opening the serial port.
///
/// ```no_run
/// # use irlink::controller::SerialOptions;
/// # use std::time::Duration;
/// # fn wrapper() -> Result<(), serialport::Error> {
/// let channel = SerialOptions::new()
///     .poll_timeout(Duration::from_millis(5))
///     .open("/dev/ttyUSB0")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SerialOptions {
    baud_rate: u32,
    poll_timeout: Duration,
}

impl Default for SerialOptions {
    fn default() -> Self {
        SerialOptions::new()
    }
}

impl SerialOptions {
    /// 115,200 baud and a 10 ms port timeout.
    pub fn new() -> Self {
        SerialOptions {
            baud_rate: timing::BAUD_RATE,
            poll_timeout: Duration::from_millis(10),
        }
    }

    pub fn baud_rate(&mut self, baud_rate: u32) -> &mut Self {
        self.baud_rate = baud_rate;
        self
    }

    /// How long one port read or write may block before it reports
    /// `WouldBlock`. Keep it well under the per-attempt timeout.
    pub fn poll_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.poll_timeout = timeout;
        self
    }

    /// Opens `path` as 8N1 without flow control.
    pub fn open(&self, path: &str) -> Result<SerialChannel, sp::Error> {
        let port = sp::new(path, self.baud_rate)
            .data_bits(sp::DataBits::Eight)
            .parity(sp::Parity::None)
            .flow_control(sp::FlowControl::None)
            .stop_bits(sp::StopBits::One)
            .timeout(self.poll_timeout)
            .open()?;
        log::info!("opened {} at {} baud", path, self.baud_rate);
        Ok(SerialChannel {
            port,
            timer: StdTimer,
        })
    }
}

/// A serial port plus the wall clock, ready to hand to a controller.
pub struct SerialChannel {
    port: Box<dyn sp::SerialPort>,
    timer: StdTimer,
}

impl core::fmt::Debug for SerialChannel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SerialChannel")
            .field("port", &self.port.name())
            .finish()
    }
}

fn nb_from_io(e: io::Error) -> nb::Error<io::Error> {
    match e.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => {
            nb::Error::WouldBlock
        }
        _ => nb::Error::Other(e),
    }
}

impl IrChannel for SerialChannel {
    type Error = io::Error;

    fn read(&mut self, buf: &mut [u8]) -> nb::Result<usize, Self::Error> {
        self.port.read(buf).map_err(nb_from_io)
    }

    fn write(&mut self, bytes: &[u8]) -> nb::Result<usize, Self::Error> {
        self.port.write(bytes).map_err(nb_from_io)
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        self.port.flush().map_err(nb_from_io)
    }
}

impl IrTimer for SerialChannel {
    type Instant = Instant;

    fn delay_us(&mut self, us: u32) {
        self.timer.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.timer.delay_ms(ms);
    }

    fn now(&self) -> Self::Instant {
        self.timer.now()
    }
}
