use std::time::Duration;

use crate::params::DEFAULT_TIMEOUT;

/// The options used by [`Transmitter`].
///
/// [`Transmitter`]: super::Transmitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransmitOption {
    /// Timeout for each request/reply round trip.
    pub timeout: Duration,
    /// How long to wait for the asynchronous completion notification after a
    /// successful acknowledgement. Expiry is a soft outcome
    /// ([`Completion::Unconfirmed`]), not an error.
    ///
    /// [`Completion::Unconfirmed`]: super::Completion::Unconfirmed
    pub completion_timeout: Duration,
    /// Delay in milliseconds the device should insert before firing
    /// (asynchronous protocol only).
    pub delay_ms: u16,
}

impl Default for TransmitOption {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            completion_timeout: DEFAULT_TIMEOUT,
            delay_ms: 0,
        }
    }
}
