//! Error taxonomy for the driver.
//!
//! The distinction that matters to callers is whether the link's byte stream
//! is still well-defined after a failure. A [`TransmitError::DeviceRejected`]
//! leaves the link usable; everything routed through [`LinkError`] (and any
//! reply the driver could not interpret) does not, and the connection must be
//! discarded before the next command.

use std::{io, net::SocketAddr};

use thiserror::Error;

/// Framing-level corruption.
///
/// There is no way to resynchronize a corrupt stream; the connection carrying
/// it must be discarded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The stream did not start a frame with the `'#'` sentinel.
    #[error("bad frame sentinel {0:#04x} (expected '#')")]
    BadSentinel(u8),
    /// The stream ended inside a frame.
    #[error("truncated frame: {expected} byte(s) missing")]
    Truncated {
        /// Bytes still owed when the stream ended.
        expected: usize,
    },
}

/// TCP connection establishment failure.
#[derive(Error, Debug)]
#[error("failed to connect to {addr}")]
pub struct ConnectError {
    /// Address of the device that could not be reached.
    pub addr: SocketAddr,
    /// Underlying socket error.
    #[source]
    pub source: io::Error,
}

/// I/O failure on an open link.
#[derive(Error, Debug)]
pub enum LinkError {
    /// The TCP connection could not be established.
    #[error(transparent)]
    Connect(#[from] ConnectError),
    /// No reply frame arrived within the timeout. The read position within
    /// the byte stream is now undefined.
    #[error("timed out waiting for a frame from the device")]
    Timeout,
    /// The device closed the connection.
    #[error("connection closed by the device")]
    Closed,
    /// The reply stream was not a valid frame.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    /// Any other socket error.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Device capability negotiation failure.
///
/// A link that failed negotiation must never be cached; the model cannot be
/// guessed.
#[derive(Error, Debug)]
pub enum NegotiationError {
    /// The version query was answered with an unrelated message type.
    #[error("device version query answered with message type {0:#04x}")]
    UnexpectedReply(u8),
    /// The version reply payload is shorter than the fixed header.
    #[error("device version payload too short ({0} byte(s))")]
    ShortPayload(usize),
    /// The device reported zero output ports.
    #[error("device reported no IR output ports")]
    NoPorts,
    /// The device rejected the version query.
    #[error("device rejected the version query with error code {0}")]
    Rejected(u8),
    /// The link failed during negotiation.
    #[error(transparent)]
    Link(#[from] LinkError),
}

/// Transmission failure.
#[derive(Error, Debug)]
pub enum TransmitError {
    /// The requested port does not exist on this device.
    #[error("IR port {port} is out of range (this device has {port_count} ports)")]
    InvalidPort {
        /// Requested 1-based port number.
        port: u8,
        /// Ports present on the device.
        port_count: u8,
    },
    /// The requested power level is out of range.
    #[error("power level {0} is out of range (0..=100)")]
    InvalidPower(u8),
    /// The signal does not fit in a single frame.
    #[error("signal of {len} byte(s) exceeds the maximum of {max}")]
    SignalTooLong {
        /// Signal length supplied by the caller.
        len: usize,
        /// Largest signal this device and protocol can carry.
        max: usize,
    },
    /// The device returned a non-zero error code for one of the protocol
    /// steps. The link is still usable.
    #[error("device rejected the command with error code {0}")]
    DeviceRejected(u8),
    /// The device answered the asynchronous transmission without setting the
    /// ack flag.
    #[error("device did not acknowledge the transmission")]
    NotAcknowledged,
    /// A reply arrived with a message type the current step cannot interpret.
    #[error("unexpected reply message type {0:#04x}")]
    UnexpectedReply(u8),
    /// The acknowledgement payload did not have the documented layout.
    #[error("malformed acknowledgement payload ({0} byte(s))")]
    MalformedAck(usize),
    /// The acknowledgement echoed a sequence number this call never sent.
    #[error("acknowledgement for sequence {echoed} while waiting for {sent}")]
    AckSequenceMismatch {
        /// Sequence number of the in-flight transmission.
        sent: u16,
        /// Sequence number the device echoed.
        echoed: u16,
    },
    /// The link failed mid-protocol.
    #[error(transparent)]
    Link(#[from] LinkError),
}

impl TransmitError {
    /// Whether the link's read position is undefined after this error.
    ///
    /// When this returns `true` the connection must be discarded: a stale
    /// byte sequence could otherwise be misread as the header of a later,
    /// unrelated frame.
    #[must_use]
    pub const fn poisons_link(&self) -> bool {
        matches!(
            self,
            Self::Link(_)
                | Self::UnexpectedReply(_)
                | Self::MalformedAck(_)
                | Self::AckSequenceMismatch { .. }
        )
    }
}

impl From<ProtocolError> for TransmitError {
    fn from(err: ProtocolError) -> Self {
        Self::Link(LinkError::Protocol(err))
    }
}
