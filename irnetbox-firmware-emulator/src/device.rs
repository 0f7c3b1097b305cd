use tracing::trace;

use irnetbox_driver::{
    frame::Frame,
    params::{
        ACK_FLAG, ASYNC_HEADER_LEN, COMPLETE_FLAG, CPLD_PORT_MASK, CPLD_SELECT_BANK,
        ERR_MALFORMED_SIGNAL, MODERN_PROTOCOL_THRESHOLD, MSG_CPLD_INSTRUCTION,
        MSG_DEVICE_VERSION, MSG_DOWNLOAD_SIGNAL, MSG_ERROR, MSG_INDICATORS_OFF,
        MSG_INDICATORS_ON, MSG_IR_ASYNC_COMPLETE, MSG_OUTPUT_IR, MSG_OUTPUT_IR_ASYNC,
        MSG_POWER_OFF, MSG_POWER_ON, MSG_RESET, MSG_SET_MEMORY, NO_ERR,
    },
};

use crate::params::{
    ERR_NOT_READY, ERR_UNSUPPORTED_MESSAGE, ERR_WRONG_PROTOCOL, FIRMWARE_VERSION,
    VERSION_RESERVED,
};

/// One IR output recorded by the emulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredSignal {
    /// Port the signal fired on (1-based).
    pub port: u8,
    /// Power level for asynchronous transmissions, or the CPLD power-class
    /// bits for legacy ones.
    pub power: u8,
    /// Raw signal bytes, exactly as framed by the driver.
    pub data: Vec<u8>,
    /// Sequence number for asynchronous transmissions.
    pub sequence: Option<u16>,
}

/// A software model of one irNetBox unit.
#[derive(Debug)]
pub struct IrNetBoxEmulator {
    model_code: u8,
    port_count: u8,
    powered: bool,
    indicators: bool,
    memory_prepared: bool,
    bank_selected: bool,
    cpld_port_power: Option<u8>,
    signal: Vec<u8>,
    fired: Vec<FiredSignal>,
    log: Vec<u8>,
    // Fault injection.
    reject: Option<(u8, u8)>,
    swallow: Option<u8>,
    drop_completion: bool,
    stray_completion: bool,
    version_payload: Option<Vec<u8>>,
}

impl IrNetBoxEmulator {
    /// Creates an emulated device reporting `model_code` and `port_count`.
    #[must_use]
    pub fn new(model_code: u8, port_count: u8) -> Self {
        Self {
            model_code,
            port_count,
            powered: false,
            indicators: false,
            memory_prepared: false,
            bank_selected: false,
            cpld_port_power: None,
            signal: Vec::new(),
            fired: Vec::new(),
            log: Vec::new(),
            reject: None,
            swallow: None,
            drop_completion: false,
            stray_completion: false,
            version_payload: None,
        }
    }

    /// Whether this device speaks the asynchronous protocol.
    #[must_use]
    pub const fn is_modern(&self) -> bool {
        self.model_code >= MODERN_PROTOCOL_THRESHOLD
    }

    /// Whether the IR output stage is on.
    #[must_use]
    pub const fn powered(&self) -> bool {
        self.powered
    }

    /// Whether the front-panel indicators are on.
    #[must_use]
    pub const fn indicators(&self) -> bool {
        self.indicators
    }

    /// Every signal fired so far, in order.
    #[must_use]
    pub fn fired(&self) -> &[FiredSignal] {
        &self.fired
    }

    /// Message type of every request received so far, in order.
    #[must_use]
    pub fn log(&self) -> &[u8] {
        &self.log
    }

    /// Rejects every `message_type` request with `error_code` until cleared.
    pub fn set_reject(&mut self, message_type: u8, error_code: u8) {
        self.reject = Some((message_type, error_code));
    }

    /// Clears a rejection installed by [`set_reject`](Self::set_reject).
    pub fn clear_reject(&mut self) {
        self.reject = None;
    }

    /// Leaves the next `message_type` request unanswered (one-shot).
    pub fn set_swallow(&mut self, message_type: u8) {
        self.swallow = Some(message_type);
    }

    /// Never sends completion notifications.
    pub fn set_drop_completion(&mut self, drop: bool) {
        self.drop_completion = drop;
    }

    /// Emits a completion with an unrelated sequence number before the real
    /// one.
    pub fn set_stray_completion(&mut self, stray: bool) {
        self.stray_completion = stray;
    }

    /// Overrides the device version reply payload.
    pub fn set_version_payload(&mut self, payload: Vec<u8>) {
        self.version_payload = Some(payload);
    }

    /// Handles one request frame, returning the device's replies in order.
    pub fn handle(&mut self, frame: &Frame) -> Vec<Frame> {
        self.log.push(frame.message_type);
        if self.swallow.take_if(|t| *t == frame.message_type).is_some() {
            trace!(message_type = frame.message_type, "swallowing request");
            return Vec::new();
        }
        if let Some((message_type, error_code)) = self.reject {
            if message_type == frame.message_type {
                return vec![error_frame(error_code, message_type)];
            }
        }
        match frame.message_type {
            MSG_DEVICE_VERSION => self.device_version(),
            MSG_POWER_ON => {
                self.powered = true;
                vec![ok_frame(MSG_POWER_ON)]
            }
            MSG_POWER_OFF => {
                self.powered = false;
                vec![ok_frame(MSG_POWER_OFF)]
            }
            MSG_INDICATORS_ON => {
                self.indicators = true;
                vec![ok_frame(MSG_INDICATORS_ON)]
            }
            MSG_INDICATORS_OFF => {
                self.indicators = false;
                vec![ok_frame(MSG_INDICATORS_OFF)]
            }
            MSG_RESET => {
                self.clear_transmission_state();
                vec![ok_frame(MSG_RESET)]
            }
            MSG_SET_MEMORY => {
                self.memory_prepared = true;
                vec![ok_frame(MSG_SET_MEMORY)]
            }
            MSG_CPLD_INSTRUCTION => self.cpld_instruction(frame),
            MSG_DOWNLOAD_SIGNAL => self.download_signal(frame),
            MSG_OUTPUT_IR => self.output_ir(),
            MSG_OUTPUT_IR_ASYNC => self.output_ir_async(frame),
            other => vec![error_frame(ERR_UNSUPPORTED_MESSAGE, other)],
        }
    }

    fn clear_transmission_state(&mut self) {
        self.memory_prepared = false;
        self.bank_selected = false;
        self.cpld_port_power = None;
        self.signal.clear();
    }

    fn device_version(&self) -> Vec<Frame> {
        let payload = self.version_payload.clone().unwrap_or_else(|| {
            let mut payload = vec![
                FIRMWARE_VERSION.0,
                FIRMWARE_VERSION.1,
                self.model_code,
                self.port_count,
            ];
            payload.extend_from_slice(&VERSION_RESERVED);
            payload
        });
        vec![Frame::new(MSG_DEVICE_VERSION, payload)]
    }

    fn cpld_instruction(&mut self, frame: &Frame) -> Vec<Frame> {
        let Some(&instruction) = frame.payload.first() else {
            return vec![error_frame(ERR_NOT_READY, MSG_CPLD_INSTRUCTION)];
        };
        if instruction == CPLD_SELECT_BANK {
            self.bank_selected = true;
        } else {
            self.cpld_port_power = Some(instruction);
        }
        vec![ok_frame(MSG_CPLD_INSTRUCTION)]
    }

    fn download_signal(&mut self, frame: &Frame) -> Vec<Frame> {
        if !self.memory_prepared {
            return vec![error_frame(ERR_NOT_READY, MSG_DOWNLOAD_SIGNAL)];
        }
        if frame.payload.is_empty() {
            return vec![error_frame(ERR_MALFORMED_SIGNAL, MSG_DOWNLOAD_SIGNAL)];
        }
        self.signal = frame.payload.clone();
        vec![ok_frame(MSG_DOWNLOAD_SIGNAL)]
    }

    fn output_ir(&mut self) -> Vec<Frame> {
        let Some(port_power) = self.cpld_port_power else {
            return vec![error_frame(ERR_NOT_READY, MSG_OUTPUT_IR)];
        };
        if !self.bank_selected || self.signal.is_empty() {
            return vec![error_frame(ERR_NOT_READY, MSG_OUTPUT_IR)];
        }
        self.fired.push(FiredSignal {
            port: port_power & CPLD_PORT_MASK,
            power: port_power & !CPLD_PORT_MASK,
            data: self.signal.clone(),
            sequence: None,
        });
        vec![ok_frame(MSG_OUTPUT_IR)]
    }

    fn output_ir_async(&mut self, frame: &Frame) -> Vec<Frame> {
        if !self.is_modern() {
            return vec![error_frame(ERR_WRONG_PROTOCOL, MSG_OUTPUT_IR_ASYNC)];
        }
        if frame.payload.len() < 2 {
            return vec![error_frame(ERR_MALFORMED_SIGNAL, MSG_OUTPUT_IR_ASYNC)];
        }
        // Sequence number is big-endian in the request, little-endian in the
        // replies.
        let sequence = u16::from_be_bytes([frame.payload[0], frame.payload[1]]);
        let map_end = ASYNC_HEADER_LEN + usize::from(self.port_count);
        if frame.payload.len() <= map_end {
            return vec![ack_frame(sequence, ERR_MALFORMED_SIGNAL, 0x00)];
        }
        let map = &frame.payload[ASYNC_HEADER_LEN..map_end];
        let signal = &frame.payload[map_end..];
        for (index, &power) in map.iter().enumerate() {
            if power != 0 {
                self.fired.push(FiredSignal {
                    port: index as u8 + 1,
                    power,
                    data: signal.to_vec(),
                    sequence: Some(sequence),
                });
            }
        }

        let mut replies = vec![ack_frame(sequence, NO_ERR, ACK_FLAG)];
        if self.stray_completion {
            replies.push(complete_frame(sequence.wrapping_add(0x55)));
        }
        if !self.drop_completion {
            replies.push(complete_frame(sequence));
        }
        replies
    }
}

fn ok_frame(message_type: u8) -> Frame {
    Frame::new(message_type, vec![NO_ERR])
}

fn error_frame(error_code: u8, original_type: u8) -> Frame {
    Frame::new(MSG_ERROR, vec![error_code, original_type])
}

fn ack_frame(sequence: u16, error_code: u8, flag: u8) -> Frame {
    let mut payload = sequence.to_le_bytes().to_vec();
    payload.push(error_code);
    payload.push(flag);
    Frame::new(MSG_OUTPUT_IR_ASYNC, payload)
}

fn complete_frame(sequence: u16) -> Frame {
    let mut payload = sequence.to_le_bytes().to_vec();
    payload.push(COMPLETE_FLAG);
    Frame::new(MSG_IR_ASYNC_COMPLETE, payload)
}
