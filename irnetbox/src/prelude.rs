//! Commonly used items.

pub use crate::{
    controller::{IrNetBox, IrNetBoxOption},
    error::IrNetBoxError,
    link::{Link, Tcp, TcpOption},
};

pub use irnetbox_driver::{
    error::{ConnectError, LinkError, NegotiationError, ProtocolError, TransmitError},
    model::{DeviceInfo, HardwareModel, ProtocolGeneration},
    transmission::{Completion, TransmitOption},
};
