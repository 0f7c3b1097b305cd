//! Serves an emulator on a local TCP socket.
//!
//! Lets the real [`Tcp`] link in `irnetbox-driver` be exercised end-to-end
//! against emulated firmware.
//!
//! [`Tcp`]: irnetbox_driver::link::Tcp

use std::{
    io::{self, Write},
    net::{SocketAddr, TcpListener, TcpStream},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::JoinHandle,
};

use tracing::debug;

use irnetbox_driver::frame::Frame;

use crate::IrNetBoxEmulator;

/// A background thread serving one [`IrNetBoxEmulator`], one connection at a
/// time.
pub struct EmulatorServer {
    addr: SocketAddr,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<IrNetBoxEmulator>>,
}

impl EmulatorServer {
    /// Binds an ephemeral local port and serves `emulator` until
    /// [`shutdown`](Self::shutdown).
    pub fn spawn(emulator: IrNetBoxEmulator) -> io::Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0))?;
        let addr = listener.local_addr()?;
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let handle = std::thread::spawn(move || serve(&listener, emulator, &thread_stop));
        Ok(Self {
            addr,
            stop,
            handle: Some(handle),
        })
    }

    /// The address the emulated device listens on.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stops the server and returns the emulator for state assertions, or
    /// [`None`] if the serving thread panicked.
    #[must_use]
    pub fn shutdown(mut self) -> Option<IrNetBoxEmulator> {
        self.stop.store(true, Ordering::Relaxed);
        // Unblock accept.
        let _ = TcpStream::connect(self.addr);
        self.handle.take().and_then(|handle| handle.join().ok())
    }
}

impl Drop for EmulatorServer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        let _ = TcpStream::connect(self.addr);
    }
}

fn serve(
    listener: &TcpListener,
    mut emulator: IrNetBoxEmulator,
    stop: &AtomicBool,
) -> IrNetBoxEmulator {
    loop {
        match listener.accept() {
            Ok((stream, peer)) => {
                if stop.load(Ordering::Relaxed) {
                    return emulator;
                }
                debug!(%peer, "connection");
                let _ = handle_client(&mut emulator, stream);
            }
            Err(_) => return emulator,
        }
    }
}

fn handle_client(emulator: &mut IrNetBoxEmulator, mut stream: TcpStream) -> io::Result<()> {
    stream.set_nodelay(true)?;
    loop {
        let Ok(frame) = Frame::read_from(&mut stream) else {
            // Client closed or corrupted the stream; drop the connection,
            // keep the device state.
            return Ok(());
        };
        for reply in emulator.handle(&frame) {
            stream.write_all(&reply.encode())?;
        }
    }
}
