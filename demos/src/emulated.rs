//! Drive the full stack against emulated firmware, no hardware required.

use irnetbox::prelude::*;
use irnetbox_driver::params::MODEL_MK4;
use irnetbox_firmware_emulator::{server::EmulatorServer, IrNetBoxEmulator};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let server = EmulatorServer::spawn(IrNetBoxEmulator::new(MODEL_MK4, 16))?;
    println!("emulated irNetBox on {}", server.addr());

    let device = IrNetBox::connect(server.addr(), IrNetBoxOption::default())?;
    println!("negotiated: {}", device.device_info()?);

    let signal = [0x42u8; 40];
    match device.send(3, 75, &signal)? {
        Completion::Confirmed => println!("signal sent"),
        Completion::Unconfirmed => println!("signal sent, completion unconfirmed"),
    }
    device.close()?;

    if let Some(emulator) = server.shutdown() {
        for fired in emulator.fired() {
            println!(
                "emulator fired {} byte(s) on port {} at power {}",
                fired.data.len(),
                fired.port,
                fired.power
            );
        }
    }
    Ok(())
}
