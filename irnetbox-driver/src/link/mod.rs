//! The interface to one device.

mod tcp;

pub use tcp::{Tcp, TcpOption};

use std::time::Duration;

use crate::{error::LinkError, frame::Frame};

/// A transport carrying protocol frames to and from one device.
///
/// The hardware cannot pipeline: exactly one outstanding request is permitted
/// at a time, which `&mut self` enforces for a single owner. Concurrent
/// callers must serialize through a mutex held for the duration of the
/// exchange.
pub trait Link: Send {
    /// Opens the transport.
    fn open(&mut self) -> Result<(), LinkError>;

    /// Closes the transport. Closing an already-closed link is a no-op.
    fn close(&mut self) -> Result<(), LinkError>;

    /// Writes one frame.
    fn send_frame(&mut self, frame: &Frame) -> Result<(), LinkError>;

    /// Blocks for one full frame, up to `timeout`.
    ///
    /// After a [`LinkError::Timeout`] the read position within the byte
    /// stream is undefined and the link must be discarded.
    fn recv_frame(&mut self, timeout: Duration) -> Result<Frame, LinkError>;

    /// Checks if the link is open.
    #[must_use]
    fn is_open(&self) -> bool;

    /// Writes one request frame and blocks for exactly one reply frame.
    fn request(
        &mut self,
        message_type: u8,
        payload: &[u8],
        timeout: Duration,
    ) -> Result<Frame, LinkError> {
        self.send_frame(&Frame::new(message_type, payload))?;
        self.recv_frame(timeout)
    }

    #[doc(hidden)]
    fn ensure_is_open(&self) -> Result<(), LinkError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(LinkError::Closed)
        }
    }
}

impl Link for Box<dyn Link> {
    fn open(&mut self) -> Result<(), LinkError> {
        self.as_mut().open()
    }

    fn close(&mut self) -> Result<(), LinkError> {
        self.as_mut().close()
    }

    fn send_frame(&mut self, frame: &Frame) -> Result<(), LinkError> {
        self.as_mut().send_frame(frame)
    }

    fn recv_frame(&mut self, timeout: Duration) -> Result<Frame, LinkError> {
        self.as_mut().recv_frame(timeout)
    }

    fn is_open(&self) -> bool {
        self.as_ref().is_open()
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    use std::collections::VecDeque;

    use super::*;

    /// Test link that records outgoing frames and replays a scripted reply
    /// queue.
    pub(crate) struct ScriptedLink {
        pub sent: Vec<Frame>,
        pub replies: VecDeque<Result<Frame, LinkError>>,
        pub open: bool,
    }

    impl ScriptedLink {
        pub fn new() -> Self {
            Self {
                sent: Vec::new(),
                replies: VecDeque::new(),
                open: true,
            }
        }

        pub fn reply(&mut self, frame: Frame) {
            self.replies.push_back(Ok(frame));
        }

        pub fn fail(&mut self, err: LinkError) {
            self.replies.push_back(Err(err));
        }

        pub fn sent_types(&self) -> Vec<u8> {
            self.sent.iter().map(|f| f.message_type).collect()
        }
    }

    impl Link for ScriptedLink {
        fn open(&mut self) -> Result<(), LinkError> {
            self.open = true;
            Ok(())
        }

        fn close(&mut self) -> Result<(), LinkError> {
            self.open = false;
            Ok(())
        }

        fn send_frame(&mut self, frame: &Frame) -> Result<(), LinkError> {
            self.ensure_is_open()?;
            self.sent.push(frame.clone());
            Ok(())
        }

        fn recv_frame(&mut self, _timeout: Duration) -> Result<Frame, LinkError> {
            self.ensure_is_open()?;
            self.replies.pop_front().unwrap_or(Err(LinkError::Timeout))
        }

        fn is_open(&self) -> bool {
            self.open
        }
    }
}
