//! Per-port power levels.

use crate::{error::TransmitError, params::MAX_POWER};

/// Power levels for every output port of one device, as serialized inside an
/// asynchronous transmission payload.
///
/// The wire format transmits one byte per port (index 0 = port 1), not a bare
/// port index. Exactly one entry is non-zero per transmission: the target
/// port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortPowerMap {
    levels: Vec<u8>,
}

impl PortPowerMap {
    /// Builds a map with `power` on `port` (1-based) and zero everywhere
    /// else.
    pub fn single(port: u8, power: u8, port_count: u8) -> Result<Self, TransmitError> {
        if port == 0 || port > port_count {
            return Err(TransmitError::InvalidPort { port, port_count });
        }
        if power > MAX_POWER {
            return Err(TransmitError::InvalidPower(power));
        }
        let mut levels = vec![0u8; port_count as usize];
        levels[usize::from(port) - 1] = power;
        Ok(Self { levels })
    }

    /// The serialized form: `port_count` consecutive power bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.levels
    }

    /// Number of ports covered by the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether the map covers no ports.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
