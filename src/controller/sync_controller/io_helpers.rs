// src/controller/sync_controller/io_helpers.rs

use super::SyncController;
use crate::common::{
    error::IrError,
    hal_traits::{IrChannel, IrTimer},
    timing,
};
use core::time::Duration;
use log::error;
use nb::Result as NbResult;

impl<IF> SyncController<IF>
where
    IF: IrChannel + IrTimer,
{
    /// Executes a non-blocking I/O operation (`f`) repeatedly until it stops
    /// returning `WouldBlock`.
    ///
    /// Returns `Ok(None)` once `timeout` has elapsed without a result; the
    /// caller decides what a missed deadline means.
    pub(super) fn execute_blocking_io_with_timeout<FN, T>(
        &mut self,
        timeout: Duration,
        mut f: FN,
    ) -> Result<Option<T>, IrError<IF::Error>>
    where
        FN: FnMut(&mut IF) -> NbResult<T, IF::Error>,
    {
        let deadline = self.interface.now() + timeout;

        loop {
            match f(&mut self.interface) {
                Ok(result) => return Ok(Some(result)),
                Err(nb::Error::WouldBlock) => {
                    if self.interface.now() >= deadline {
                        return Ok(None);
                    }
                    self.pause(timing::POLL_INTERVAL);
                }
                Err(nb::Error::Other(e)) => {
                    error!("channel error: {:?}", e);
                    return Err(IrError::Io(e));
                }
            }
        }
    }

    /// Writes all of `bytes` and flushes, within the configured write timeout.
    pub(super) fn send_line(&mut self, bytes: &[u8]) -> Result<(), IrError<IF::Error>> {
        let deadline = self.interface.now() + self.config.write_timeout;
        let mut written = 0;

        while written < bytes.len() {
            let remaining = deadline - self.interface.now();
            let accepted = self
                .execute_blocking_io_with_timeout(remaining, |iface| {
                    iface.write(&bytes[written..])
                })?
                .ok_or(IrError::WriteTimeout)?;
            if accepted == 0 {
                if self.interface.now() >= deadline {
                    return Err(IrError::WriteTimeout);
                }
                self.pause(timing::POLL_INTERVAL);
            }
            written += accepted;
        }

        let remaining = deadline - self.interface.now();
        self.execute_blocking_io_with_timeout(remaining, |iface| iface.flush())?
            .ok_or(IrError::WriteTimeout)
    }

    /// One bounded read. `Ok(None)` means the attempt timed out.
    pub(super) fn read_chunk(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<Option<usize>, IrError<IF::Error>> {
        self.execute_blocking_io_with_timeout(timeout, |iface| iface.read(buf))
    }

    pub(super) fn pause(&mut self, duration: Duration) {
        let us = duration.as_micros().min(u32::MAX as u128) as u32;
        if us > 0 {
            self.interface.delay_us(us);
        }
    }
}
