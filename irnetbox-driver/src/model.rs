//! Hardware model classification.

use std::fmt;

use derive_more::Display;

use crate::params::{
    MODEL_MK1, MODEL_MK2, MODEL_MK3, MODEL_MK4, MODEL_RRX, MODERN_PROTOCOL_THRESHOLD,
};

/// Hardware revision reported by the device version query.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HardwareModel {
    /// First generation hardware.
    #[display("MK1")]
    Mk1,
    /// Second generation hardware.
    #[display("MK2")]
    Mk2,
    /// Third generation hardware; first to speak the asynchronous protocol.
    #[display("MK3")]
    Mk3,
    /// Fourth generation hardware.
    #[display("MK4")]
    Mk4,
    /// Rack-mounted RRX hardware.
    #[display("RRX")]
    Rrx,
    /// A model code this driver does not recognize. Still classified into a
    /// protocol generation by [`generation`](Self::generation).
    #[display("unknown model ({_0})")]
    Unknown(u8),
}

/// Protocol family a hardware revision speaks.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolGeneration {
    /// Multi-step SYNC-by-parts handshake (MK1/MK2 class).
    #[display("legacy")]
    Legacy,
    /// Single combined asynchronous message (MK3 class and newer).
    #[display("modern")]
    Modern,
}

impl HardwareModel {
    /// Classifies a model code from the device version reply.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            MODEL_MK1 => Self::Mk1,
            MODEL_MK2 => Self::Mk2,
            MODEL_MK3 => Self::Mk3,
            MODEL_MK4 => Self::Mk4,
            MODEL_RRX => Self::Rrx,
            other => Self::Unknown(other),
        }
    }

    /// The numeric model code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Mk1 => MODEL_MK1,
            Self::Mk2 => MODEL_MK2,
            Self::Mk3 => MODEL_MK3,
            Self::Mk4 => MODEL_MK4,
            Self::Rrx => MODEL_RRX,
            Self::Unknown(code) => code,
        }
    }

    /// Protocol generation implied by the model code.
    ///
    /// The threshold, not the exact code, decides: unrecognized codes at or
    /// above [`MODERN_PROTOCOL_THRESHOLD`] are treated as modern hardware.
    #[must_use]
    pub const fn generation(self) -> ProtocolGeneration {
        if self.code() < MODERN_PROTOCOL_THRESHOLD {
            ProtocolGeneration::Legacy
        } else {
            ProtocolGeneration::Modern
        }
    }
}

/// Capabilities negotiated from a device immediately after connect.
///
/// Produced once per link by [`negotiate`](crate::negotiation::negotiate) and
/// immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Hardware revision.
    pub model: HardwareModel,
    /// Number of IR output ports.
    pub port_count: u8,
    /// Firmware major version.
    pub firmware_major: u8,
    /// Firmware minor version.
    pub firmware_minor: u8,
}

impl DeviceInfo {
    /// Protocol generation of the negotiated hardware.
    #[must_use]
    pub const fn generation(&self) -> ProtocolGeneration {
        self.model.generation()
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (fw {}.{}, {} ports)",
            self.model, self.firmware_major, self.firmware_minor, self.port_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[test]
    #[case(HardwareModel::Mk1, 2)]
    #[case(HardwareModel::Mk2, 7)]
    #[case(HardwareModel::Mk3, 8)]
    #[case(HardwareModel::Mk4, 12)]
    #[case(HardwareModel::Rrx, 13)]
    #[case(HardwareModel::Unknown(0), 0)]
    #[case(HardwareModel::Unknown(9), 9)]
    #[case(HardwareModel::Unknown(200), 200)]
    fn code_round_trip(#[case] expected: HardwareModel, #[case] code: u8) {
        assert_eq!(expected, HardwareModel::from_code(code));
        assert_eq!(code, HardwareModel::from_code(code).code());
    }

    #[test]
    fn threshold_monotonicity() {
        for code in u8::MIN..=u8::MAX {
            let generation = HardwareModel::from_code(code).generation();
            if code < MODERN_PROTOCOL_THRESHOLD {
                assert_eq!(ProtocolGeneration::Legacy, generation, "code {code}");
            } else {
                assert_eq!(ProtocolGeneration::Modern, generation, "code {code}");
            }
        }
    }

    #[rstest::rstest]
    #[test]
    #[case("MK1", HardwareModel::Mk1)]
    #[case("RRX", HardwareModel::Rrx)]
    #[case("unknown model (42)", HardwareModel::Unknown(42))]
    fn display(#[case] expected: &str, #[case] model: HardwareModel) {
        assert_eq!(expected, model.to_string());
    }

    #[test]
    fn device_info_display() {
        let info = DeviceInfo {
            model: HardwareModel::Mk4,
            port_count: 16,
            firmware_major: 3,
            firmware_minor: 1,
        };
        assert_eq!("MK4 (fw 3.1, 16 ports)", info.to_string());
    }
}
