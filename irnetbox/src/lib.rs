#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! Control RedRat irNetBox infrared transmitters.
//!
//! # Example
//!
//! ```no_run
//! use irnetbox::prelude::*;
//!
//! # fn main() -> Result<(), IrNetBoxError> {
//! let signal: Vec<u8> = std::fs::read("power_button.sig").unwrap();
//!
//! let device = IrNetBox::connect(
//!     "192.168.1.40:10001".parse().unwrap(),
//!     IrNetBoxOption::default(),
//! )?;
//! println!("connected to {}", device.device_info()?);
//!
//! match device.send(3, 75, &signal)? {
//!     Completion::Confirmed => println!("sent"),
//!     Completion::Unconfirmed => println!("sent, completion unconfirmed"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod error;
pub mod link;
pub mod prelude;

pub use irnetbox_driver as driver;

pub use controller::{IrNetBox, IrNetBoxOption};
pub use error::IrNetBoxError;
