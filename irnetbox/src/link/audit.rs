use std::{collections::VecDeque, time::Duration};

use irnetbox_driver::{
    error::LinkError,
    frame::Frame,
    link::Link,
    params::{DEFAULT_PORT_COUNT, MODEL_MK4},
};
use irnetbox_firmware_emulator::IrNetBoxEmulator;

/// The option used by [`Audit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditOption {
    /// Model code the emulated device reports.
    pub model_code: u8,
    /// Port count the emulated device reports.
    pub port_count: u8,
    /// Starts with the link broken.
    pub broken: bool,
}

impl Default for AuditOption {
    fn default() -> Self {
        Self {
            model_code: MODEL_MK4,
            port_count: DEFAULT_PORT_COUNT,
            broken: false,
        }
    }
}

/// A [`Link`] backed by an [`IrNetBoxEmulator`], for tests.
///
/// Frames written to the link are handed to the emulator; its replies are
/// queued and returned by [`recv_frame`](Link::recv_frame). An empty reply
/// queue reads as a receive timeout. The emulator (message log, fired
/// signals, fault knobs) is reachable through `Deref`.
#[derive(Debug)]
pub struct Audit {
    emulator: IrNetBoxEmulator,
    replies: VecDeque<Frame>,
    is_open: bool,
    broken: bool,
}

impl std::ops::Deref for Audit {
    type Target = IrNetBoxEmulator;

    fn deref(&self) -> &Self::Target {
        &self.emulator
    }
}

impl std::ops::DerefMut for Audit {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.emulator
    }
}

impl Audit {
    /// Creates a new [`Audit`].
    #[must_use]
    pub fn new(option: AuditOption) -> Self {
        Self {
            emulator: IrNetBoxEmulator::new(option.model_code, option.port_count),
            replies: VecDeque::new(),
            is_open: false,
            broken: option.broken,
        }
    }

    /// Makes every subsequent I/O call fail until [`repair`](Self::repair).
    pub fn break_down(&mut self) {
        self.broken = true;
    }

    /// Undoes [`break_down`](Self::break_down).
    pub fn repair(&mut self) {
        self.broken = false;
    }

    /// Queues a frame ahead of the emulator's own replies.
    pub fn inject_reply(&mut self, frame: Frame) {
        self.replies.push_front(frame);
    }
}

impl Link for Audit {
    fn open(&mut self) -> Result<(), LinkError> {
        self.is_open = true;
        // Device state survives a reconnect; undelivered replies do not.
        self.replies.clear();
        Ok(())
    }

    fn close(&mut self) -> Result<(), LinkError> {
        self.is_open = false;
        Ok(())
    }

    fn send_frame(&mut self, frame: &Frame) -> Result<(), LinkError> {
        self.ensure_is_open()?;
        if self.broken {
            return Err(LinkError::Closed);
        }
        self.replies.extend(self.emulator.handle(frame));
        Ok(())
    }

    fn recv_frame(&mut self, _timeout: Duration) -> Result<Frame, LinkError> {
        self.ensure_is_open()?;
        if self.broken {
            return Err(LinkError::Closed);
        }
        self.replies.pop_front().ok_or(LinkError::Timeout)
    }

    fn is_open(&self) -> bool {
        self.is_open
    }
}
