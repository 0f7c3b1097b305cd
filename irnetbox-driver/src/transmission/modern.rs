//! Single-message asynchronous protocol for MK3 class and newer hardware.
//!
//! The transmission parameters and the signal travel in one frame, tagged
//! with a 16-bit sequence number. The device answers twice: an immediate
//! acknowledgement, then a completion notification once the IR pulse has
//! actually finished. The sequence number correlates the completion with the
//! request that triggered it.
//!
//! Wire quirk: the request carries the sequence number big-endian, while the
//! acknowledgement and completion payloads carry it little-endian. The real
//! device behaves this way; both sides of this driver preserve it.

use std::time::Instant;

use rand::Rng;
use tracing::{debug, trace, warn};

use super::{Completion, Transmitter};
use crate::{
    error::TransmitError,
    frame::Frame,
    link::Link,
    params::{
        ACK_FLAG, ASYNC_ACK_LEN, ASYNC_COMPLETE_LEN, ASYNC_HEADER_LEN, COMPLETE_FLAG,
        MAX_PAYLOAD_LEN, MSG_ERROR, MSG_IR_ASYNC_COMPLETE, MSG_OUTPUT_IR_ASYNC, NO_ERR,
    },
    power::PortPowerMap,
};

/// Per-link counter for asynchronous transmission sequence numbers.
///
/// Seeded randomly on creation, then incremented per transmission.
#[derive(Debug)]
pub struct SequenceCounter(u16);

impl SequenceCounter {
    /// Creates a counter with a random starting point.
    #[must_use]
    pub fn new() -> Self {
        Self(rand::rng().random())
    }

    /// Creates a counter with a fixed starting point, for deterministic
    /// tests and emulation.
    #[must_use]
    pub const fn from_seed(seed: u16) -> Self {
        Self(seed)
    }

    fn next(&mut self) -> u16 {
        let value = self.0;
        self.0 = self.0.wrapping_add(1);
        value
    }
}

impl Default for SequenceCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Link> Transmitter<'_, L> {
    pub(super) fn transmit_modern(
        &mut self,
        map: &PortPowerMap,
        signal: &[u8],
    ) -> Result<Completion, TransmitError> {
        let max = MAX_PAYLOAD_LEN - ASYNC_HEADER_LEN - map.len();
        if signal.len() > max {
            return Err(TransmitError::SignalTooLong {
                len: signal.len(),
                max,
            });
        }

        let sequence = self.sequence.next();
        let mut payload =
            Vec::with_capacity(ASYNC_HEADER_LEN + map.len() + signal.len());
        payload.extend_from_slice(&sequence.to_be_bytes());
        payload.extend_from_slice(&self.option.delay_ms.to_be_bytes());
        payload.extend_from_slice(map.as_bytes());
        payload.extend_from_slice(signal);

        let ack = self
            .link
            .request(MSG_OUTPUT_IR_ASYNC, &payload, self.option.timeout)?;
        check_ack(sequence, &ack)?;
        debug!(sequence, "transmission accepted");
        self.wait_completion(sequence)
    }

    fn wait_completion(&mut self, sequence: u16) -> Result<Completion, TransmitError> {
        let deadline = Instant::now() + self.option.completion_timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                warn!(sequence, "no completion notification; the pulse may still have fired");
                return Ok(Completion::Unconfirmed);
            }
            match self.link.recv_frame(remaining) {
                Ok(frame) if is_completion(sequence, &frame) => {
                    debug!(sequence, "transmission complete");
                    return Ok(Completion::Confirmed);
                }
                Ok(frame) => {
                    trace!(
                        message_type = frame.message_type,
                        "ignoring frame while waiting for completion"
                    );
                }
                Err(crate::error::LinkError::Timeout) => {
                    warn!(sequence, "no completion notification; the pulse may still have fired");
                    return Ok(Completion::Unconfirmed);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

fn check_ack(sequence: u16, reply: &Frame) -> Result<(), TransmitError> {
    match reply.message_type {
        MSG_OUTPUT_IR_ASYNC => {
            if reply.payload.len() < ASYNC_ACK_LEN {
                return Err(TransmitError::MalformedAck(reply.payload.len()));
            }
            let echoed = u16::from_le_bytes([reply.payload[0], reply.payload[1]]);
            if echoed != sequence {
                return Err(TransmitError::AckSequenceMismatch {
                    sent: sequence,
                    echoed,
                });
            }
            let error_code = reply.payload[2];
            if error_code != NO_ERR {
                return Err(TransmitError::DeviceRejected(error_code));
            }
            if reply.payload[3] != ACK_FLAG {
                return Err(TransmitError::NotAcknowledged);
            }
            Ok(())
        }
        MSG_ERROR => {
            let code = reply.payload.first().copied().unwrap_or(NO_ERR);
            Err(TransmitError::DeviceRejected(code))
        }
        other => Err(TransmitError::UnexpectedReply(other)),
    }
}

fn is_completion(sequence: u16, frame: &Frame) -> bool {
    frame.message_type == MSG_IR_ASYNC_COMPLETE
        && frame.payload.len() >= ASYNC_COMPLETE_LEN
        && u16::from_le_bytes([frame.payload[0], frame.payload[1]]) == sequence
        && frame.payload[2] == COMPLETE_FLAG
}
