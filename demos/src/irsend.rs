//! Fire one IR signal on a real irNetBox:
//!
//! ```text
//! irsend <host[:port]> <ir-port> <power> <signal-file>
//! ```
//!
//! The signal file holds the raw device-encoded signal bytes, e.g. captured
//! from the RedRat signal database tooling.

use std::net::{SocketAddr, ToSocketAddrs};

use anyhow::Context;

use irnetbox::prelude::*;
use irnetbox_driver::params::DEFAULT_TCP_PORT;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let usage = "usage: irsend <host[:port]> <ir-port> <power> <signal-file>";
    let host = args.next().context(usage)?;
    let ir_port: u8 = args.next().context(usage)?.parse()?;
    let power: u8 = args.next().context(usage)?.parse()?;
    let signal = std::fs::read(args.next().context(usage)?)?;

    let addr = resolve(&host)?;
    let device = IrNetBox::connect(addr, IrNetBoxOption::default())?;
    println!("connected to {}", device.device_info()?);

    match device.send(ir_port, power, &signal)? {
        Completion::Confirmed => println!("signal sent"),
        Completion::Unconfirmed => println!("signal sent, completion unconfirmed"),
    }

    device.close()?;
    Ok(())
}

fn resolve(host: &str) -> anyhow::Result<SocketAddr> {
    let candidate = if host.contains(':') {
        host.to_string()
    } else {
        format!("{host}:{DEFAULT_TCP_PORT}")
    };
    candidate
        .to_socket_addrs()?
        .next()
        .with_context(|| format!("could not resolve {host}"))
}
