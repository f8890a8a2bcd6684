// src/common/mod.rs

// --- Wire vocabulary shared by the controller and the device ---
pub mod command;
pub mod error;
pub mod frame;
pub mod hal_traits;
pub mod pattern;
pub mod response;
pub mod timing;

// --- Re-export key types/traits for easier access ---

pub use command::Command;
pub use error::{IrError, ValidationError};
pub use frame::{FramingError, LineFramer, Message};
pub use hal_traits::{IrChannel, IrInstant, IrTimer, Micros};
pub use pattern::{PatternError, PulsePattern};
pub use response::{Classified, ResponseClassifier, ResponseKind, ResponseLine};

#[cfg(feature = "std")]
pub use hal_traits::StdTimer;

#[cfg(feature = "impl-native")]
pub use hal_traits::NativeTimer;
