// src/controller/sync_controller/transaction.rs

use super::SyncController;
use crate::common::{
    command::{Command, MAX_TX_PAYLOAD},
    error::{IrError, ValidationError},
    hal_traits::{IrChannel, IrTimer},
    response::{Classified, ResponseLine},
    timing::LINE_CAPACITY,
};
use crate::controller::config::RetryPolicy;
use log::{debug, warn};

/// Terminal outcome of one request/response exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TransactionOutcome {
    Success(ResponseLine),
    Failure(ResponseLine),
    Timeout { attempts: u32 },
}

impl<IF> SyncController<IF>
where
    IF: IrChannel + IrTimer,
{
    /// Writes `command` as one line, then reads until a terminal line for its
    /// kind arrives or `policy.max_attempts` reads have been spent.
    ///
    /// Transport faults and framing overflow abort with `Err`. Everything the
    /// device can say, and silence, is an `Ok` outcome.
    pub(super) fn execute_transaction(
        &mut self,
        command: &Command,
        policy: RetryPolicy,
    ) -> Result<TransactionOutcome, IrError<IF::Error>> {
        let kind = command.response_kind();
        let line = command.format_into().map_err(|_| {
            IrError::Validation(ValidationError::TooLong {
                max: MAX_TX_PAYLOAD,
            })
        })?;

        // Leftovers from an earlier transaction are never a reply to this one.
        self.classifier.reset();

        debug!("-> {}", command);
        self.send_line(line.as_bytes())?;
        self.pause(self.config.settle_delay);

        let mut buffer = [0u8; LINE_CAPACITY];
        let chunk_len = self.config.read_chunk.clamp(1, LINE_CAPACITY);

        for attempt in 1..=policy.max_attempts {
            let read = self.read_chunk(&mut buffer[..chunk_len], policy.attempt_timeout)?;
            match read {
                Some(n) if n > 0 => {
                    debug!("<- {} bytes (attempt {}/{})", n, attempt, policy.max_attempts);
                    match self.classifier.classify(&buffer[..n], kind)? {
                        Some(Classified::Success(echo)) => {
                            debug!("<- {}", echo);
                            return Ok(TransactionOutcome::Success(echo));
                        }
                        Some(Classified::Failure(reason)) => {
                            debug!("<- {}", reason);
                            return Ok(TransactionOutcome::Failure(reason));
                        }
                        None => {}
                    }
                }
                _ => {
                    debug!("no data (attempt {}/{})", attempt, policy.max_attempts);
                    self.pause(self.config.backoff);
                }
            }
        }

        warn!(
            "no {:?} reply after {} attempts of {:?}",
            kind, policy.max_attempts, policy.attempt_timeout
        );
        Ok(TransactionOutcome::Timeout {
            attempts: policy.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::mock::{Idle, MockCommError, MockLink};
    use core::time::Duration;

    fn controller(link: MockLink) -> SyncController<MockLink> {
        SyncController::new(link)
    }

    #[test]
    fn test_split_reply_is_reassembled() {
        let mut link = MockLink::new(Idle::Empty);
        link.stage(b"[OK] T");
        link.stage_empty();
        link.stage(b"X f=38000 Hz, n=6\r\n");
        let mut ctl = controller(link);

        let command = Command::tx("38000 9000,4500,560,560,560,1690").unwrap();
        let outcome = ctl.execute_transaction(&command, RetryPolicy::transmit()).unwrap();
        assert_eq!(
            outcome,
            TransactionOutcome::Success(
                ResponseLine::from_bytes(b"[OK] TX f=38000 Hz, n=6").unwrap()
            )
        );
        assert_eq!(ctl.interface.read_calls, 3);
        assert_eq!(ctl.interface.written(), b"TX 38000 9000,4500,560,560,560,1690\n");
    }

    #[test]
    fn test_silent_device_uses_exactly_max_attempts_reads() {
        let mut ctl = controller(MockLink::new(Idle::Empty));
        let policy = RetryPolicy::new(7, Duration::from_millis(200));
        let outcome = ctl.execute_transaction(&Command::LastRecv, policy).unwrap();
        assert_eq!(outcome, TransactionOutcome::Timeout { attempts: 7 });
        assert_eq!(ctl.interface.read_calls, 7);
    }

    #[test]
    fn test_blocked_device_elapsed_time() {
        let mut ctl = controller(MockLink::new(Idle::Block));
        let outcome = ctl
            .execute_transaction(&Command::nec("20DF10EF").unwrap(), RetryPolicy::transmit())
            .unwrap();
        assert_eq!(outcome, TransactionOutcome::Timeout { attempts: 10 });

        // settle + attempts * (timeout + backoff)
        let expected_us = 50_000 + 10 * (200_000 + 10_000);
        let elapsed = ctl.interface.now_us;
        assert!(
            elapsed >= expected_us && elapsed <= expected_us + 10_000,
            "elapsed {} us",
            elapsed
        );
    }

    #[test]
    fn test_failure_line_ends_transaction() {
        let mut link = MockLink::new(Idle::Empty);
        link.stage(b"[DBG] rawlen=0\r\n[ERR] bad hex\r\n");
        let mut ctl = controller(link);
        let outcome = ctl
            .execute_transaction(&Command::nec("20DF10EF").unwrap(), RetryPolicy::transmit())
            .unwrap();
        assert_eq!(
            outcome,
            TransactionOutcome::Failure(ResponseLine::from_bytes(b"[ERR] bad hex").unwrap())
        );
        assert_eq!(ctl.interface.read_calls, 1);
    }

    #[test]
    fn test_io_error_is_fatal() {
        let mut link = MockLink::new(Idle::Empty);
        link.stage_empty();
        link.stage_error();
        link.stage(b"[OK] NEC 0x20DF10EF\r\n");
        let mut ctl = controller(link);
        let result =
            ctl.execute_transaction(&Command::nec("20DF10EF").unwrap(), RetryPolicy::transmit());
        assert!(matches!(result, Err(IrError::Io(MockCommError))));
        assert_eq!(ctl.interface.read_calls, 2);
    }

    #[test]
    fn test_stale_bytes_do_not_leak_into_next_transaction() {
        let mut link = MockLink::new(Idle::Empty);
        link.stage(b"[OK] NEC 0x11111111\r\n[OK] NEC 0x22");
        let mut ctl = controller(link);
        let command = Command::nec("11111111").unwrap();
        ctl.execute_transaction(&command, RetryPolicy::transmit()).unwrap();

        ctl.interface.stage(b"[OK] NEC 0x33333333\r\n");
        let outcome = ctl
            .execute_transaction(&Command::nec("33333333").unwrap(), RetryPolicy::transmit())
            .unwrap();
        assert_eq!(
            outcome,
            TransactionOutcome::Success(ResponseLine::from_bytes(b"[OK] NEC 0x33333333").unwrap())
        );
    }

    #[test]
    fn test_write_timeout() {
        let mut link = MockLink::new(Idle::Empty);
        link.write_stalled = true;
        let mut ctl = controller(link);
        let result = ctl.execute_transaction(&Command::LastRecv, RetryPolicy::query());
        assert!(matches!(result, Err(IrError::WriteTimeout)));
        assert_eq!(ctl.interface.read_calls, 0);
    }
}
