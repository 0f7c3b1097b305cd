//! Error codes the emulated firmware reports.

/// A message type the firmware does not implement.
pub const ERR_UNSUPPORTED_MESSAGE: u8 = 2;
/// A legacy step arrived before its prerequisites (set-memory before
/// download, download before output).
pub const ERR_NOT_READY: u8 = 3;
/// The asynchronous protocol was used against legacy hardware.
pub const ERR_WRONG_PROTOCOL: u8 = 4;

/// Firmware version the emulator reports by default.
pub(crate) const FIRMWARE_VERSION: (u8, u8) = (3, 1);
/// Reserved bytes real hardware appends to the version payload.
pub(crate) const VERSION_RESERVED: [u8; 2] = [0x00, 0x00];
