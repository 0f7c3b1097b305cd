//! Multi-step handshake for MK1/MK2 class hardware.
//!
//! Early firmware cannot buffer the full transmission parameters in one
//! message, so the signal is staged through a strict sequence of independent
//! round trips. Ordering is the correctness contract: each step's
//! acknowledgement is a hard gate, and any rejection aborts the remaining
//! steps.

use tracing::warn;

use super::{Completion, Transmitter};
use crate::{
    error::TransmitError,
    link::Link,
    params::{
        CPLD_PORT_MASK, CPLD_POWER_HIGH, CPLD_POWER_MEDIUM, CPLD_SELECT_BANK,
        LEGACY_POWER_LOW_MAX, LEGACY_POWER_MEDIUM_MAX, MAX_PAYLOAD_LEN, MSG_CPLD_INSTRUCTION,
        MSG_DOWNLOAD_SIGNAL, MSG_OUTPUT_IR, MSG_SET_MEMORY,
    },
};

impl<L: Link> Transmitter<'_, L> {
    pub(super) fn transmit_legacy(
        &mut self,
        port: u8,
        power: u8,
        signal: &[u8],
    ) -> Result<Completion, TransmitError> {
        if signal.len() > MAX_PAYLOAD_LEN {
            return Err(TransmitError::SignalTooLong {
                len: signal.len(),
                max: MAX_PAYLOAD_LEN,
            });
        }

        self.reset()?;
        // Indicator control is cosmetic; a device-side rejection here does
        // not abort the transmission.
        match self.indicators_on() {
            Err(TransmitError::DeviceRejected(code)) => {
                warn!(code, "device rejected indicators-on");
            }
            other => other?,
        }
        self.step(MSG_SET_MEMORY, &[])?;
        self.step(MSG_CPLD_INSTRUCTION, &[CPLD_SELECT_BANK])?;
        self.step(MSG_CPLD_INSTRUCTION, &[cpld_port_power(port, power)])?;
        self.step(MSG_DOWNLOAD_SIGNAL, signal)?;
        self.step(MSG_OUTPUT_IR, &[])?;
        self.reset()?;
        // The output-IR acknowledgement is the firing confirmation on this
        // hardware class.
        Ok(Completion::Confirmed)
    }
}

/// Packs the target port and coarse power class into one CPLD instruction
/// byte. This hardware class does not support fine-grained power.
pub(super) const fn cpld_port_power(port: u8, power: u8) -> u8 {
    let class = if power <= LEGACY_POWER_LOW_MAX {
        0x00
    } else if power <= LEGACY_POWER_MEDIUM_MAX {
        CPLD_POWER_MEDIUM
    } else {
        CPLD_POWER_HIGH
    };
    (port & CPLD_PORT_MASK) | class
}

#[cfg(test)]
mod tests {
    use super::super::tests::{device, ok_reply};
    use super::*;
    use crate::{
        frame::Frame,
        link::scripted::ScriptedLink,
        model::DeviceInfo,
        params::{MODEL_MK2, MSG_ERROR, MSG_INDICATORS_ON, MSG_RESET},
        transmission::{SequenceCounter, TransmitOption},
    };

    const STEPS: [u8; 8] = [
        MSG_RESET,
        MSG_INDICATORS_ON,
        MSG_SET_MEMORY,
        MSG_CPLD_INSTRUCTION,
        MSG_CPLD_INSTRUCTION,
        MSG_DOWNLOAD_SIGNAL,
        MSG_OUTPUT_IR,
        MSG_RESET,
    ];

    fn transmit(
        link: &mut ScriptedLink,
        info: &DeviceInfo,
        port: u8,
        power: u8,
        signal: &[u8],
    ) -> Result<Completion, TransmitError> {
        let mut sequence = SequenceCounter::from_seed(0);
        Transmitter::new(link, info, &mut sequence, TransmitOption::default())
            .transmit(port, power, signal)
    }

    #[test]
    fn full_step_sequence_in_order() {
        let mut link = ScriptedLink::new();
        for step in STEPS {
            link.reply(ok_reply(step));
        }
        let info = device(MODEL_MK2);

        let completion = transmit(&mut link, &info, 2, 80, &[0x10, 0x20]).unwrap();
        assert_eq!(Completion::Confirmed, completion);
        assert_eq!(STEPS.to_vec(), link.sent_types());
        assert_eq!(vec![CPLD_SELECT_BANK], link.sent[3].payload);
        assert_eq!(vec![2 | CPLD_POWER_HIGH], link.sent[4].payload);
        assert_eq!(vec![0x10, 0x20], link.sent[5].payload);
        assert!(link.sent[6].payload.is_empty());
    }

    #[test]
    fn rejection_aborts_remaining_steps() {
        let mut link = ScriptedLink::new();
        for step in &STEPS[..4] {
            link.reply(ok_reply(*step));
        }
        // Port/power CPLD instruction rejected with code 5.
        link.reply(Frame::new(MSG_ERROR, vec![5, MSG_CPLD_INSTRUCTION]));
        let info = device(MODEL_MK2);

        assert!(matches!(
            transmit(&mut link, &info, 1, 10, &[0xAA]),
            Err(TransmitError::DeviceRejected(5))
        ));
        // No download-signal or output-IR after the rejected step.
        assert_eq!(STEPS[..5].to_vec(), link.sent_types());
    }

    #[test]
    fn indicators_rejection_is_soft() {
        let mut link = ScriptedLink::new();
        link.reply(ok_reply(MSG_RESET));
        link.reply(Frame::new(MSG_INDICATORS_ON, vec![7]));
        for step in &STEPS[2..] {
            link.reply(ok_reply(*step));
        }
        let info = device(MODEL_MK2);

        let completion = transmit(&mut link, &info, 1, 10, &[0xAA]).unwrap();
        assert_eq!(Completion::Confirmed, completion);
        assert_eq!(STEPS.to_vec(), link.sent_types());
    }

    #[test]
    fn indicators_link_failure_is_hard() {
        let mut link = ScriptedLink::new();
        link.reply(ok_reply(MSG_RESET));
        // Queue nothing more: the indicators step times out.
        let info = device(MODEL_MK2);

        assert!(matches!(
            transmit(&mut link, &info, 1, 10, &[0xAA]),
            Err(TransmitError::Link(crate::error::LinkError::Timeout))
        ));
        assert_eq!(STEPS[..2].to_vec(), link.sent_types());
    }

    #[rstest::rstest]
    #[test]
    #[case(1, 0, 0x01)]
    #[case(1, 33, 0x01)]
    #[case(1, 34, 0x41)]
    #[case(5, 66, 0x45)]
    #[case(5, 67, 0x85)]
    #[case(16, 100, 0x90)]
    fn cpld_byte(#[case] port: u8, #[case] power: u8, #[case] expected: u8) {
        assert_eq!(expected, cpld_port_power(port, power));
    }
}
