//! Device model negotiation.

use std::time::Duration;

use tracing::debug;

use crate::{
    error::NegotiationError,
    frame::Frame,
    link::Link,
    model::{DeviceInfo, HardwareModel},
    params::{DEVICE_INFO_LEN, MSG_DEVICE_VERSION, MSG_ERROR, NO_ERR},
};

/// Queries the device version and classifies the hardware.
///
/// Must run once on every fresh connection, before any other command; the
/// transmission protocol cannot be chosen without the model. On failure the
/// link must be discarded, never cached — the model is not guessed.
pub fn negotiate<L: Link>(link: &mut L, timeout: Duration) -> Result<DeviceInfo, NegotiationError> {
    let reply = link.request(MSG_DEVICE_VERSION, &[], timeout)?;
    let info = parse_device_info(&reply)?;
    debug!(device = %info, "negotiated");
    Ok(info)
}

fn parse_device_info(reply: &Frame) -> Result<DeviceInfo, NegotiationError> {
    match reply.message_type {
        MSG_DEVICE_VERSION => {}
        MSG_ERROR => {
            let code = reply.payload.first().copied().unwrap_or(NO_ERR);
            return Err(NegotiationError::Rejected(code));
        }
        other => return Err(NegotiationError::UnexpectedReply(other)),
    }
    // Real hardware appends reserved bytes after the fixed header; tolerate
    // them.
    if reply.payload.len() < DEVICE_INFO_LEN {
        return Err(NegotiationError::ShortPayload(reply.payload.len()));
    }
    let info = DeviceInfo {
        firmware_major: reply.payload[0],
        firmware_minor: reply.payload[1],
        model: HardwareModel::from_code(reply.payload[2]),
        port_count: reply.payload[3],
    };
    if info.port_count == 0 {
        return Err(NegotiationError::NoPorts);
    }
    Ok(info)
}
