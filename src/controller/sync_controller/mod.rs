// src/controller/sync_controller/mod.rs

mod io_helpers;
mod transaction;

use crate::common::{
    command::Command,
    error::IrError,
    hal_traits::{IrChannel, IrTimer},
    response::{ResponseClassifier, ResponseLine},
};
use crate::controller::{
    cache::PersistentCache,
    config::{LinkConfig, TimeoutPolicy},
    request::TransmitRequest,
};
use log::{info, warn};
use transaction::TransactionOutcome;

/// Result of a transmit that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransmitReport {
    /// The device echoed a success line.
    Confirmed(ResponseLine),
    /// The device stayed silent and the link is configured to assume delivery.
    Unconfirmed { attempts: u32 },
}

impl TransmitReport {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, TransmitReport::Confirmed(_))
    }
}

/// Host side of the link, for SYNCHRONOUS operation.
///
/// Owns the channel, the response buffers and the cache, so holding `&mut`
/// to it is what makes a transaction exclusive.
#[derive(Debug)]
pub struct SyncController<IF>
where
    IF: IrChannel + IrTimer,
{
    interface: IF,
    config: LinkConfig,
    classifier: ResponseClassifier,
    cache: PersistentCache,
}

impl<IF> SyncController<IF>
where
    IF: IrChannel + IrTimer,
{
    pub fn new(interface: IF) -> Self {
        SyncController::with_config(interface, LinkConfig::default())
    }

    pub fn with_config(interface: IF, config: LinkConfig) -> Self {
        SyncController {
            interface,
            config,
            classifier: ResponseClassifier::new(),
            cache: PersistentCache::new(),
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut LinkConfig {
        &mut self.config
    }

    pub fn cache(&self) -> &PersistentCache {
        &self.cache
    }

    pub fn interface(&self) -> &IF {
        &self.interface
    }

    pub fn interface_mut(&mut self) -> &mut IF {
        &mut self.interface
    }

    /// Gives the channel back.
    pub fn release(self) -> IF {
        self.interface
    }

    // --- Public Blocking Methods ---

    /// Sends a validated transmit request and waits for the device's echo.
    ///
    /// The cache is updated only on a confirmed success.
    pub fn transmit(
        &mut self,
        request: &TransmitRequest,
    ) -> Result<TransmitReport, IrError<IF::Error>> {
        match self.execute_transaction(request.command(), self.config.transmit)? {
            TransactionOutcome::Success(echo) => {
                info!("transmit confirmed: {}", echo);
                self.cache.record_transmit(request.text());
                Ok(TransmitReport::Confirmed(echo))
            }
            TransactionOutcome::Failure(reason) => {
                warn!("transmit rejected: {}", reason);
                Err(IrError::DeviceFailure(reason))
            }
            TransactionOutcome::Timeout { attempts } => match self.config.timeout_policy {
                TimeoutPolicy::Fail => Err(IrError::Timeout { attempts }),
                TimeoutPolicy::AssumeDelivered => {
                    warn!("transmit unconfirmed, assuming delivered");
                    Ok(TransmitReport::Unconfirmed { attempts })
                }
            },
        }
    }

    /// Asks the device for its last capture and caches the `REC ...` line.
    pub fn query_last_capture(&mut self) -> Result<ResponseLine, IrError<IF::Error>> {
        match self.execute_transaction(&Command::LastRecv, self.config.query)? {
            TransactionOutcome::Success(line) => {
                info!("capture received ({} bytes)", line.len());
                self.cache.record_capture(line.as_str());
                Ok(line)
            }
            TransactionOutcome::Failure(reason) => {
                warn!("capture query rejected: {}", reason);
                Err(IrError::DeviceFailure(reason))
            }
            TransactionOutcome::Timeout { attempts } => Err(IrError::Timeout { attempts }),
        }
    }

    /// Last confirmed transmit request, or the sentinel.
    pub fn last_transmitted(&self) -> &str {
        self.cache.last_transmitted()
    }

    /// Last capture line, or the sentinel.
    pub fn last_captured(&self) -> &str {
        self.cache.last_captured()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::cache::{NO_CAPTURE_SENTINEL, NO_TRANSMIT_SENTINEL};
    use crate::controller::mock::{Idle, MockLink};
    use crate::controller::request::parse_transmit_request;

    #[test]
    fn test_transmit_confirmed_updates_cache() {
        let mut link = MockLink::new(Idle::Empty);
        link.stage(b"[OK] TX f=38000 Hz, n=6\r\n");
        let mut ctl = SyncController::new(link);

        let req = parse_transmit_request(b"TX 38000 9000,4500,560,560,560,1690\n").unwrap();
        let report = ctl.transmit(&req).unwrap();
        assert!(report.is_confirmed());
        assert_eq!(ctl.last_transmitted(), "TX 38000 9000,4500,560,560,560,1690");
    }

    #[test]
    fn test_repeated_transmits_are_idempotent() {
        let mut ctl = SyncController::new(MockLink::replying());
        let req = parse_transmit_request(b"NEC 20DF10EF\n").unwrap();
        for _ in 0..5 {
            ctl.transmit(&req).unwrap();
            assert_eq!(ctl.last_transmitted(), "NEC 20DF10EF");
        }
        assert_eq!(ctl.interface().written().len(), 5 * "NEC 20DF10EF\n".len());
    }

    #[test]
    fn test_device_failure_leaves_cache() {
        let mut link = MockLink::new(Idle::Empty);
        link.stage(b"[ERR] pattern too long\r\n");
        let mut ctl = SyncController::new(link);

        let req = parse_transmit_request(b"38000 9000,4500\n").unwrap();
        match ctl.transmit(&req) {
            Err(IrError::DeviceFailure(line)) => {
                assert_eq!(line.as_str(), "[ERR] pattern too long")
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(ctl.last_transmitted(), NO_TRANSMIT_SENTINEL);
    }

    #[test]
    fn test_timeout_policies() {
        let req = parse_transmit_request(b"NEC 20DF10EF\n").unwrap();

        let mut ctl = SyncController::new(MockLink::new(Idle::Empty));
        assert!(matches!(ctl.transmit(&req), Err(IrError::Timeout { attempts: 10 })));

        let mut ctl = SyncController::new(MockLink::new(Idle::Empty));
        ctl.config_mut().timeout_policy(TimeoutPolicy::AssumeDelivered);
        assert_eq!(
            ctl.transmit(&req).unwrap(),
            TransmitReport::Unconfirmed { attempts: 10 }
        );
        assert_eq!(ctl.last_transmitted(), NO_TRANSMIT_SENTINEL);

        // Queries never assume anything.
        assert!(matches!(
            ctl.query_last_capture(),
            Err(IrError::Timeout { attempts: 100 })
        ));
        assert_eq!(ctl.last_captured(), NO_CAPTURE_SENTINEL);
    }

    #[test]
    fn test_query_skips_capture_notices() {
        let mut link = MockLink::new(Idle::Empty);
        link.stage(b"[DBG] rawlen=4\r\n[OK] REC stored. Use LAST_RECV to view.\r\n");
        link.stage(b"REC 38000 9000,");
        link.stage(b"4500,560\r\n");
        let mut ctl = SyncController::new(link);

        let line = ctl.query_last_capture().unwrap();
        assert_eq!(line.as_str(), "REC 38000 9000,4500,560");
        assert_eq!(ctl.last_captured(), "REC 38000 9000,4500,560");
        assert_eq!(ctl.interface().written(), b"LAST_RECV\n");
    }

    #[test]
    fn test_partial_writes() {
        let mut link = MockLink::replying();
        link.write_chunk = 3;
        let mut ctl = SyncController::new(link);
        let req = parse_transmit_request(b"NEC 20DF10EF\n").unwrap();
        ctl.transmit(&req).unwrap();
        assert_eq!(ctl.interface().write_calls, 5);
        assert_eq!(ctl.interface().written(), b"NEC 20DF10EF\n");
    }
}
