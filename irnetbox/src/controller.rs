//! The public interface to one irNetBox unit.

use std::{
    net::SocketAddr,
    sync::{Mutex, PoisonError},
    time::Duration,
};

use tracing::{debug, warn};

use irnetbox_driver::{
    error::{LinkError, TransmitError},
    link::{Link, Tcp, TcpOption},
    model::DeviceInfo,
    negotiation,
    params::DEFAULT_TIMEOUT,
    transmission::{Completion, SequenceCounter, TransmitOption, Transmitter},
};

use crate::error::IrNetBoxError;

/// The option used by [`IrNetBox`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrNetBoxOption {
    /// Options for each transmission.
    pub transmit: TransmitOption,
    /// Timeout for the device version query after (re)connecting.
    pub negotiation_timeout: Duration,
}

impl Default for IrNetBoxOption {
    fn default() -> Self {
        Self {
            transmit: TransmitOption::default(),
            negotiation_timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug)]
struct Negotiated {
    info: DeviceInfo,
    sequence: SequenceCounter,
}

#[derive(Debug)]
struct Inner<L> {
    link: L,
    negotiated: Option<Negotiated>,
}

/// A controller for one irNetBox unit.
///
/// All operations to the device go through this struct. The connection and
/// the negotiated capabilities are cached across calls; after any failure
/// that leaves the byte stream undefined the cache is dropped and the next
/// call reconnects and renegotiates from scratch. No operation retries on
/// its own — retry policy belongs to the caller.
///
/// The hardware processes one command at a time, so concurrent callers are
/// serialized by an internal mutex held for the whole exchange.
#[derive(Debug)]
pub struct IrNetBox<L: Link> {
    inner: Mutex<Inner<L>>,
    option: IrNetBoxOption,
}

impl IrNetBox<Tcp> {
    /// Connects to a device over TCP and negotiates its capabilities.
    pub fn connect(addr: SocketAddr, option: IrNetBoxOption) -> Result<Self, IrNetBoxError> {
        Self::open(Tcp::new(addr, TcpOption::default()), option)
    }
}

impl<L: Link> IrNetBox<L> {
    /// Opens `link` and negotiates the device's capabilities.
    pub fn open(mut link: L, option: IrNetBoxOption) -> Result<Self, IrNetBoxError> {
        link.open()?;
        let mut inner = Inner {
            link,
            negotiated: None,
        };
        Self::ensure_negotiated(&mut inner, &option)?;
        Ok(Self {
            inner: Mutex::new(inner),
            option,
        })
    }

    /// Transmits `signal` on `ir_port` (1-based) at `power` (0–100).
    ///
    /// [`Completion::Unconfirmed`] means the device accepted the
    /// transmission but the completion notification never arrived; the pulse
    /// may still have fired. Callers may treat it as a soft success.
    pub fn send(
        &self,
        ir_port: u8,
        power: u8,
        signal: &[u8],
    ) -> Result<Completion, IrNetBoxError> {
        self.run(
            |tx| {
                tx.power_on()?;
                tx.transmit(ir_port, power, signal)
            },
            // A completion arriving after the deadline would be misread as
            // the reply to the next request.
            |completion| !completion.is_confirmed(),
        )
    }

    /// The negotiated capabilities of the device.
    pub fn device_info(&self) -> Result<DeviceInfo, IrNetBoxError> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        Self::ensure_negotiated(inner, &self.option)?;
        match inner.negotiated.as_ref() {
            Some(negotiated) => Ok(negotiated.info),
            None => Err(LinkError::Closed.into()),
        }
    }

    /// Enables the IR output stage. Idempotent; [`send`](Self::send) does
    /// this on every call.
    pub fn power_on(&self) -> Result<(), IrNetBoxError> {
        self.run(|tx| tx.power_on(), |_| false)
    }

    /// Disables the IR output stage.
    pub fn power_off(&self) -> Result<(), IrNetBoxError> {
        self.run(|tx| tx.power_off(), |_| false)
    }

    /// Turns the front-panel indicator LEDs on.
    pub fn indicators_on(&self) -> Result<(), IrNetBoxError> {
        self.run(|tx| tx.indicators_on(), |_| false)
    }

    /// Turns the front-panel indicator LEDs off.
    pub fn indicators_off(&self) -> Result<(), IrNetBoxError> {
        self.run(|tx| tx.indicators_off(), |_| false)
    }

    /// Powers the outputs off and closes the connection.
    pub fn close(self) -> Result<(), IrNetBoxError> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if !inner.link.is_open() {
            return Ok(());
        }
        let result = match inner.negotiated.as_mut() {
            Some(negotiated) => {
                let mut transmitter = Transmitter::new(
                    &mut inner.link,
                    &negotiated.info,
                    &mut negotiated.sequence,
                    self.option.transmit,
                );
                match transmitter.power_off() {
                    Ok(()) | Err(TransmitError::DeviceRejected(_)) => Ok(()),
                    Err(err) => Err(err),
                }
            }
            None => Ok(()),
        };
        let _ = inner.link.close();
        inner.negotiated = None;
        result.map_err(Into::into)
    }

    #[doc(hidden)]
    pub fn with_link<R>(&self, f: impl FnOnce(&mut L) -> R) -> R {
        f(&mut self.lock().link)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<L>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_negotiated(inner: &mut Inner<L>, option: &IrNetBoxOption) -> Result<(), IrNetBoxError> {
        if !inner.link.is_open() {
            inner.negotiated = None;
            debug!("reconnecting");
            inner.link.open()?;
        }
        if inner.negotiated.is_none() {
            match negotiation::negotiate(&mut inner.link, option.negotiation_timeout) {
                Ok(info) => {
                    inner.negotiated = Some(Negotiated {
                        info,
                        sequence: SequenceCounter::new(),
                    });
                }
                Err(err) => {
                    let _ = inner.link.close();
                    return Err(err.into());
                }
            }
        }
        Ok(())
    }

    fn run<T>(
        &self,
        f: impl FnOnce(&mut Transmitter<'_, L>) -> Result<T, TransmitError>,
        discard_after: impl FnOnce(&T) -> bool,
    ) -> Result<T, IrNetBoxError> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        Self::ensure_negotiated(inner, &self.option)?;
        let Some(negotiated) = inner.negotiated.as_mut() else {
            return Err(LinkError::Closed.into());
        };
        let mut transmitter = Transmitter::new(
            &mut inner.link,
            &negotiated.info,
            &mut negotiated.sequence,
            self.option.transmit,
        );
        match f(&mut transmitter) {
            Ok(value) => {
                if discard_after(&value) {
                    debug!("discarding connection");
                    let _ = inner.link.close();
                    inner.negotiated = None;
                }
                Ok(value)
            }
            Err(err) => {
                if err.poisons_link() {
                    warn!(error = %err, "link state undefined; discarding connection");
                    let _ = inner.link.close();
                    inner.negotiated = None;
                }
                Err(err.into())
            }
        }
    }
}

impl<L: Link> Drop for IrNetBox<L> {
    fn drop(&mut self) {
        let _ = self.lock().link.close();
    }
}
