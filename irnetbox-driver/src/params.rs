//! Device-defined protocol constants.
//!
//! The message type codes and model codes are fixed by the irNetBox firmware
//! and are not negotiable. The error code meanings and the exact
//! legacy/modern model threshold are only partially documented by the vendor;
//! treat them as values to confirm against real hardware.

use std::time::Duration;

/// First byte of every frame on the wire (`'#'`).
pub const FRAME_SENTINEL: u8 = 0x23;
/// Sentinel + payload length (u16 BE) + message type.
pub const FRAME_HEADER_LEN: usize = 4;
/// The payload length field is 16 bits.
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize;

/// Device-reported failure; payload carries the error code.
pub const MSG_ERROR: u8 = 0x01;
/// Enable the IR output stage.
pub const MSG_POWER_ON: u8 = 0x05;
/// Disable the IR output stage.
pub const MSG_POWER_OFF: u8 = 0x06;
/// Low-level CPLD configuration command (legacy protocol).
pub const MSG_CPLD_INSTRUCTION: u8 = 0x07;
/// Clear any half-finished transmission state.
pub const MSG_RESET: u8 = 0x08;
/// Device capability query; the reply payload is described by
/// [`DEVICE_INFO_LEN`].
pub const MSG_DEVICE_VERSION: u8 = 0x09;
/// Front-panel indicator LEDs on.
pub const MSG_INDICATORS_ON: u8 = 0x0A;
/// Front-panel indicator LEDs off.
pub const MSG_INDICATORS_OFF: u8 = 0x0B;
/// Prepare the device's signal buffer (legacy protocol).
pub const MSG_SET_MEMORY: u8 = 0x10;
/// Download signal data into the prepared buffer (legacy protocol).
pub const MSG_DOWNLOAD_SIGNAL: u8 = 0x11;
/// Fire the previously downloaded signal (legacy protocol).
pub const MSG_OUTPUT_IR: u8 = 0x12;
/// Combined asynchronous transmission; the acknowledgement reply shares this
/// type code.
pub const MSG_OUTPUT_IR_ASYNC: u8 = 0x30;
/// Completion notification for an asynchronous transmission.
pub const MSG_IR_ASYNC_COMPLETE: u8 = 0x31;

/// Model code reported by MK1 hardware.
pub const MODEL_MK1: u8 = 2;
/// Model code reported by MK2 hardware.
pub const MODEL_MK2: u8 = 7;
/// Model code reported by MK3 hardware.
pub const MODEL_MK3: u8 = 8;
/// Model code reported by MK4 hardware.
pub const MODEL_MK4: u8 = 12;
/// Model code reported by RRX hardware.
pub const MODEL_RRX: u8 = 13;
/// Model codes at or above this value speak the single-message asynchronous
/// protocol. Classification is by threshold, not by exact code, so hardware
/// revisions newer than RRX keep working.
pub const MODERN_PROTOCOL_THRESHOLD: u8 = MODEL_MK3;

/// Success status in command replies and acknowledgements.
pub const NO_ERR: u8 = 0x00;
/// Observed on MK3 hardware when the signal data fails the device's internal
/// consistency check. Not in the vendor documentation.
pub const ERR_MALFORMED_SIGNAL: u8 = 51;

/// `fw_major, fw_minor, model_code, port_count`; real hardware appends
/// reserved bytes after these four.
pub const DEVICE_INFO_LEN: usize = 4;
/// Sequence number (u16 BE) + delay (u16 BE) preceding the port power map in
/// an asynchronous transmission payload.
pub const ASYNC_HEADER_LEN: usize = 4;
/// Sequence number (u16 LE) + error code + ack flag.
pub const ASYNC_ACK_LEN: usize = 4;
/// Sequence number (u16 LE) + completion flag.
pub const ASYNC_COMPLETE_LEN: usize = 3;
/// Value of the ack flag when the device accepted an async transmission.
pub const ACK_FLAG: u8 = 0x01;
/// Value of the completion flag when the IR pulse has finished.
pub const COMPLETE_FLAG: u8 = 0x01;

/// CPLD instruction selecting the signal bank (legacy protocol step).
pub const CPLD_SELECT_BANK: u8 = 0x00;
/// Low bits of a CPLD port/power byte carry the port number.
pub const CPLD_PORT_MASK: u8 = 0x3F;
/// Power class flag for medium output power.
pub const CPLD_POWER_MEDIUM: u8 = 0x40;
/// Power class flag for high output power.
pub const CPLD_POWER_HIGH: u8 = 0x80;
/// Requested power at or below this maps to the low power class.
pub const LEGACY_POWER_LOW_MAX: u8 = 33;
/// Requested power at or below this (and above the low bound) maps to the
/// medium power class.
pub const LEGACY_POWER_MEDIUM_MAX: u8 = 66;

/// Maximum power level accepted by [`PortPowerMap`](crate::power::PortPowerMap).
pub const MAX_POWER: u8 = 100;
/// Port count of every irNetBox model shipped to date.
pub const DEFAULT_PORT_COUNT: u8 = 16;

/// TCP port an irNetBox listens on.
pub const DEFAULT_TCP_PORT: u16 = 10001;
/// Default per-request reply timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);
/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
