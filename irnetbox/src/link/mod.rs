//! Link implementations.
//!
//! The production TCP link lives in [`irnetbox_driver::link`]; this module
//! re-exports it and adds the emulator-backed [`Audit`] link for tests.

pub use irnetbox_driver::link::{Link, Tcp, TcpOption};

#[cfg(feature = "link-audit")]
#[cfg_attr(docsrs, doc(cfg(feature = "link-audit")))]
mod audit;
#[cfg(feature = "link-audit")]
pub use audit::{Audit, AuditOption};
