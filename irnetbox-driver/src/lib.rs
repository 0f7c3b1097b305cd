#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! Wire protocol driver for RedRat irNetBox infrared transmitters.
//!
//! An irNetBox is controlled over a single TCP connection carrying `#`-framed
//! binary messages. This crate implements the framing, the blocking link, the
//! hardware model negotiation, and the two transmission protocols (the
//! multi-step handshake spoken by MK1/MK2 hardware and the single-message
//! asynchronous protocol spoken by MK3 and later).

pub mod error;
pub mod frame;
pub mod link;
pub mod model;
pub mod negotiation;
pub mod params;
pub mod power;
pub mod transmission;
