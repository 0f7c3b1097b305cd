//! The two transmission protocols and the dispatch between them.

mod legacy;
mod modern;
mod option;

pub use modern::SequenceCounter;
pub use option::TransmitOption;

use tracing::debug;

use crate::{
    error::TransmitError,
    frame::Frame,
    link::Link,
    model::{DeviceInfo, ProtocolGeneration},
    params::{
        MSG_ERROR, MSG_INDICATORS_OFF, MSG_INDICATORS_ON, MSG_POWER_OFF, MSG_POWER_ON, MSG_RESET,
        NO_ERR,
    },
    power::PortPowerMap,
};

/// Outcome of a transmission whose frames were all accepted by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Completion {
    /// The device confirmed that the IR pulse finished transmitting.
    Confirmed,
    /// The acknowledgement succeeded but the completion notification never
    /// arrived. The pulse may still have fired; callers may treat this as a
    /// soft success.
    Unconfirmed,
}

impl Completion {
    /// Whether the device confirmed the pulse.
    #[must_use]
    pub const fn is_confirmed(self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

/// Drives protocol commands over one open, negotiated link.
///
/// The strategy is derived from the negotiated model once per call and never
/// mixed mid-call: legacy hardware gets the multi-step handshake, modern
/// hardware the single asynchronous message.
pub struct Transmitter<'a, L: Link> {
    link: &'a mut L,
    info: &'a DeviceInfo,
    sequence: &'a mut SequenceCounter,
    option: TransmitOption,
}

impl<'a, L: Link> Transmitter<'a, L> {
    /// Creates a transmitter borrowing the link and the per-link sequence
    /// counter.
    pub fn new(
        link: &'a mut L,
        info: &'a DeviceInfo,
        sequence: &'a mut SequenceCounter,
        option: TransmitOption,
    ) -> Self {
        Self {
            link,
            info,
            sequence,
            option,
        }
    }

    /// Transmits `signal` on `port` at `power`.
    pub fn transmit(
        &mut self,
        port: u8,
        power: u8,
        signal: &[u8],
    ) -> Result<Completion, TransmitError> {
        // Validates port and power for both strategies; only the modern one
        // serializes the map.
        let map = PortPowerMap::single(port, power, self.info.port_count)?;
        let generation = self.info.generation();
        debug!(
            port,
            power,
            len = signal.len(),
            %generation,
            "transmitting"
        );
        match generation {
            ProtocolGeneration::Legacy => self.transmit_legacy(port, power, signal),
            ProtocolGeneration::Modern => self.transmit_modern(&map, signal),
        }
    }

    /// Enables the IR output stage. Idempotent and cheap.
    pub fn power_on(&mut self) -> Result<(), TransmitError> {
        self.step(MSG_POWER_ON, &[])?;
        Ok(())
    }

    /// Disables the IR output stage.
    pub fn power_off(&mut self) -> Result<(), TransmitError> {
        self.step(MSG_POWER_OFF, &[])?;
        Ok(())
    }

    /// Turns the front-panel indicator LEDs on.
    pub fn indicators_on(&mut self) -> Result<(), TransmitError> {
        self.step(MSG_INDICATORS_ON, &[])?;
        Ok(())
    }

    /// Turns the front-panel indicator LEDs off.
    pub fn indicators_off(&mut self) -> Result<(), TransmitError> {
        self.step(MSG_INDICATORS_OFF, &[])?;
        Ok(())
    }

    /// Clears any half-finished transmission state on the device.
    pub fn reset(&mut self) -> Result<(), TransmitError> {
        self.step(MSG_RESET, &[])?;
        Ok(())
    }

    // One gated request/reply round trip: the reply must echo the request
    // type with a zero status, or the command failed.
    fn step(&mut self, message_type: u8, payload: &[u8]) -> Result<Frame, TransmitError> {
        let reply = self.link.request(message_type, payload, self.option.timeout)?;
        check_reply(message_type, &reply)?;
        Ok(reply)
    }
}

fn check_reply(expected: u8, reply: &Frame) -> Result<(), TransmitError> {
    match reply.message_type {
        t if t == expected => match reply.payload.first() {
            Some(&code) if code != NO_ERR => Err(TransmitError::DeviceRejected(code)),
            _ => Ok(()),
        },
        MSG_ERROR => {
            let code = reply.payload.first().copied().unwrap_or(NO_ERR);
            Err(TransmitError::DeviceRejected(code))
        }
        other => Err(TransmitError::UnexpectedReply(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        link::scripted::ScriptedLink,
        model::HardwareModel,
        params::{MODEL_MK2, MODEL_MK4, MSG_OUTPUT_IR_ASYNC},
    };

    pub(super) fn device(model_code: u8) -> DeviceInfo {
        DeviceInfo {
            model: HardwareModel::from_code(model_code),
            port_count: 16,
            firmware_major: 1,
            firmware_minor: 0,
        }
    }

    pub(super) fn ok_reply(message_type: u8) -> Frame {
        Frame::new(message_type, vec![NO_ERR])
    }

    #[test]
    fn power_on_gates_on_status() {
        let mut link = ScriptedLink::new();
        link.reply(ok_reply(MSG_POWER_ON));
        let info = device(MODEL_MK4);
        let mut sequence = SequenceCounter::from_seed(0);
        let mut tx = Transmitter::new(&mut link, &info, &mut sequence, TransmitOption::default());
        tx.power_on().unwrap();

        let mut link = ScriptedLink::new();
        link.reply(Frame::new(MSG_POWER_ON, vec![4]));
        let mut tx = Transmitter::new(&mut link, &info, &mut sequence, TransmitOption::default());
        assert!(matches!(
            tx.power_on(),
            Err(TransmitError::DeviceRejected(4))
        ));
    }

    #[test]
    fn invalid_port_is_rejected_before_any_frame() {
        let mut link = ScriptedLink::new();
        let info = device(MODEL_MK4);
        let mut sequence = SequenceCounter::from_seed(0);
        let mut tx = Transmitter::new(&mut link, &info, &mut sequence, TransmitOption::default());
        assert!(matches!(
            tx.transmit(17, 50, &[0x01]),
            Err(TransmitError::InvalidPort { port: 17, .. })
        ));
        assert!(link.sent.is_empty());
    }

    #[rstest::rstest]
    #[test]
    #[case(MODEL_MK2, MSG_RESET)]
    #[case(MODEL_MK4, MSG_OUTPUT_IR_ASYNC)]
    fn strategy_selection_is_deterministic(#[case] model_code: u8, #[case] first_frame: u8) {
        // Same model, same first wire message, every time.
        let info = device(model_code);
        for _ in 0..3 {
            let mut link = ScriptedLink::new();
            let mut sequence = SequenceCounter::from_seed(1);
            let mut tx =
                Transmitter::new(&mut link, &info, &mut sequence, TransmitOption::default());
            let _ = tx.transmit(1, 50, &[0xAA]);
            assert_eq!(Some(&first_frame), link.sent_types().first());
        }
    }

    #[test]
    fn error_reply_without_code_defaults_to_zero() {
        let mut link = ScriptedLink::new();
        link.reply(Frame::new(MSG_ERROR, vec![]));
        let info = device(MODEL_MK4);
        let mut sequence = SequenceCounter::from_seed(0);
        let mut tx = Transmitter::new(&mut link, &info, &mut sequence, TransmitOption::default());
        assert!(matches!(
            tx.reset(),
            Err(TransmitError::DeviceRejected(0))
        ));
    }

    #[test]
    fn unexpected_reply_type_poisons_link() {
        let mut link = ScriptedLink::new();
        link.reply(ok_reply(MSG_POWER_OFF));
        let info = device(MODEL_MK4);
        let mut sequence = SequenceCounter::from_seed(0);
        let mut tx = Transmitter::new(&mut link, &info, &mut sequence, TransmitOption::default());
        let err = tx.power_on().unwrap_err();
        assert!(matches!(err, TransmitError::UnexpectedReply(t) if t == MSG_POWER_OFF));
        assert!(err.poisons_link());
    }
}
