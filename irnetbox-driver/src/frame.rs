//! The `# <len> <type> <payload>` message envelope.

use std::io::{self, Read};

use crate::{
    error::{LinkError, ProtocolError},
    params::{FRAME_HEADER_LEN, FRAME_SENTINEL, MAX_PAYLOAD_LEN},
};

/// One protocol message, without its wire envelope.
///
/// Frames are ephemeral: constructed per call, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Message type code (see [`params`](crate::params)).
    pub message_type: u8,
    /// Raw payload bytes. The driver frames signal payloads verbatim and
    /// never interprets their contents.
    pub payload: Vec<u8>,
}

impl Frame {
    /// Creates a frame.
    pub fn new(message_type: u8, payload: impl Into<Vec<u8>>) -> Self {
        let payload = payload.into();
        debug_assert!(payload.len() <= MAX_PAYLOAD_LEN);
        Self {
            message_type,
            payload,
        }
    }

    /// Serializes the frame into its wire envelope:
    /// `b'#' ++ u16_be(len) ++ u8(type) ++ payload`.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(FRAME_HEADER_LEN + self.payload.len());
        buf.push(FRAME_SENTINEL);
        buf.extend_from_slice(&(self.payload.len() as u16).to_be_bytes());
        buf.push(self.message_type);
        buf.extend_from_slice(&self.payload);
        buf
    }

    /// Reads exactly one frame from `reader`.
    ///
    /// Blocks until a full frame is available or the reader's timeout fires;
    /// no partial frame is ever returned. A stream that ends before the first
    /// header byte is [`LinkError::Closed`]; one that ends inside a frame is
    /// [`ProtocolError::Truncated`]. There is no resynchronization after a
    /// bad sentinel.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, LinkError> {
        let mut header = [0u8; FRAME_HEADER_LEN];
        read_exact(reader, &mut header[..1], true)?;
        read_exact(reader, &mut header[1..], false)?;
        if header[0] != FRAME_SENTINEL {
            return Err(ProtocolError::BadSentinel(header[0]).into());
        }
        let len = u16::from_be_bytes([header[1], header[2]]) as usize;
        let message_type = header[3];
        let mut payload = vec![0u8; len];
        read_exact(reader, &mut payload, false)?;
        Ok(Self {
            message_type,
            payload,
        })
    }
}

// `at_boundary`: an EOF before the first header byte is a clean close, not a
// truncated frame.
fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8], at_boundary: bool) -> Result<(), LinkError> {
    if buf.is_empty() {
        return Ok(());
    }
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => LinkError::Timeout,
        io::ErrorKind::UnexpectedEof if at_boundary => LinkError::Closed,
        io::ErrorKind::UnexpectedEof => ProtocolError::Truncated {
            expected: buf.len(),
        }
        .into(),
        _ => LinkError::Io(e),
    })
}
