// src/lib.rs

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod common;
pub mod controller;
pub mod device;

// Re-export key types for convenience
pub use common::IrError;
pub use common::ValidationError;
pub use controller::SyncController;
#[cfg(feature = "std")]
pub use controller::IrLink;
pub use device::DeviceResponder;
