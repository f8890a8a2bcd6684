// src/controller/mod.rs

pub mod cache;
pub mod config;
pub mod request;
pub mod sync_controller;

#[cfg(feature = "std")]
pub mod gate;
#[cfg(feature = "serialport")]
pub mod serial;

#[cfg(test)]
pub(crate) mod mock;

pub use cache::{PersistentCache, NO_CAPTURE_SENTINEL, NO_TRANSMIT_SENTINEL};
pub use config::{LinkConfig, RetryPolicy, TimeoutPolicy};
pub use request::{parse_receive_trigger, parse_transmit_request, TransmitRequest};
pub use sync_controller::{SyncController, TransmitReport};

#[cfg(feature = "std")]
pub use gate::IrLink;
#[cfg(feature = "serialport")]
pub use serial::{SerialChannel, SerialOptions};
