//! Top-level error type.

use thiserror::Error;

use irnetbox_driver::error::{ConnectError, LinkError, NegotiationError, TransmitError};

/// An error from an [`IrNetBox`](crate::IrNetBox) operation.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum IrNetBoxError {
    /// The TCP connection could not be established.
    #[error(transparent)]
    Connect(#[from] ConnectError),
    /// Device capability negotiation failed.
    #[error(transparent)]
    Negotiation(#[from] NegotiationError),
    /// A transmission or utility command failed.
    #[error(transparent)]
    Transmit(#[from] TransmitError),
    /// The link failed outside a command.
    #[error(transparent)]
    Link(LinkError),
}

impl From<LinkError> for IrNetBoxError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::Connect(err) => Self::Connect(err),
            other => Self::Link(other),
        }
    }
}

impl IrNetBoxError {
    /// Whether this failure forced the cached connection to be discarded.
    ///
    /// When `true`, the next operation reconnects and renegotiates from
    /// scratch. A [`TransmitError::DeviceRejected`] leaves the connection
    /// cached: the device answered cleanly, only the command failed.
    #[must_use]
    pub fn requires_reconnect(&self) -> bool {
        match self {
            Self::Connect(_) => false,
            Self::Negotiation(_) | Self::Link(_) => true,
            Self::Transmit(err) => err.poisons_link(),
        }
    }
}
