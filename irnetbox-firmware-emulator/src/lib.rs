#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! A software model of a RedRat irNetBox unit.
//!
//! The emulator consumes request frames and produces the reply frames a real
//! device would send, including the acknowledgement/completion pair of the
//! asynchronous protocol. It records every message it receives and every
//! signal it fires, and can inject the fault modes the driver has to handle,
//! so driver behavior can be asserted without hardware.

mod device;
mod params;
pub mod server;

pub use device::{FiredSignal, IrNetBoxEmulator};
pub use params::{ERR_NOT_READY, ERR_UNSUPPORTED_MESSAGE, ERR_WRONG_PROTOCOL};
