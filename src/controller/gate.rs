// src/controller/gate.rs

//! Thread-safe front door for a controller.
//!
//! [`IrLink`] serializes every transaction on one channel behind a mutex and
//! exposes the two control points: transmit and receive, each with a write
//! (store) side and a read (show) side.

use super::request::{parse_receive_trigger, parse_transmit_request};
use super::sync_controller::{SyncController, TransmitReport};
use crate::common::{
    error::IrError,
    hal_traits::{IrChannel, IrTimer},
    response::ResponseLine,
};
use log::debug;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Prefix of the transmit control point's read-back.
pub const LAST_TX_PREFIX: &str = "Last TX sent: ";

/// A controller shared between threads.
#[derive(Debug)]
pub struct IrLink<IF>
where
    IF: IrChannel + IrTimer,
{
    controller: Mutex<SyncController<IF>>,
}

impl<IF> IrLink<IF>
where
    IF: IrChannel + IrTimer,
{
    pub fn new(controller: SyncController<IF>) -> Self {
        IrLink {
            controller: Mutex::new(controller),
        }
    }

    /// Blocks until no other transaction is in flight.
    ///
    /// A panic in another holder does not wedge the link: every transaction
    /// starts from clean buffers, so the inner state is still usable.
    pub fn lock(&self) -> MutexGuard<'_, SyncController<IF>> {
        self.controller.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn into_inner(self) -> SyncController<IF> {
        self.controller
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Validates and sends one transmit request line.
    pub fn transmit(&self, input: &[u8]) -> Result<TransmitReport, IrError<IF::Error>> {
        let request = parse_transmit_request(input)?;
        debug!("transmit request: {}", request.text());
        self.lock().transmit(&request)
    }

    /// Validates the trigger and runs a capture query.
    pub fn query(&self, input: &[u8]) -> Result<ResponseLine, IrError<IF::Error>> {
        parse_receive_trigger(input)?;
        self.lock().query_last_capture()
    }

    /// Transmit control point, write side. Returns the accepted byte count.
    pub fn store_transmit(&self, input: &[u8]) -> Result<usize, IrError<IF::Error>> {
        self.transmit(input).map(|_| input.len())
    }

    /// Transmit control point, read side.
    pub fn show_transmit(&self) -> String {
        let controller = self.lock();
        let mut out = String::from(LAST_TX_PREFIX);
        out.push_str(controller.last_transmitted());
        out.push('\n');
        out
    }

    /// Receive control point, write side. Returns the accepted byte count.
    pub fn store_receive(&self, input: &[u8]) -> Result<usize, IrError<IF::Error>> {
        self.query(input).map(|_| input.len())
    }

    /// Receive control point, read side.
    pub fn show_receive(&self) -> String {
        let controller = self.lock();
        let mut out = String::from(controller.last_captured());
        out.push('\n');
        out
    }
}
