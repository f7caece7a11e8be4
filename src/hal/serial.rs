// Line transport to the operator console
//
// Inbound bytes are split into lines on a background reader thread and handed
// to the control loop over a channel, so `read_line` never blocks a tick.

use std::io::{self, BufRead, BufReader, ErrorKind, Read, Stdout, Write};
use std::thread;
use std::time::Duration;

use serialport::SerialPort;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};
use tracing::{debug, info, warn};

use super::{HalError, LineTransport, Result};
use crate::config::BAUD;

/// Read timeout on the serial port; the reader thread just retries on expiry
pub const DEFAULT_TIMEOUT_MS: u64 = 10;

/// A writer plus a channel of complete inbound lines
pub struct StreamTransport<W: Write> {
    writer: W,
    inbound: UnboundedReceiver<String>,
    closed: bool,
}

pub type SerialTransport = StreamTransport<Box<dyn SerialPort>>;
pub type StdioTransport = StreamTransport<Stdout>;

impl<W: Write> StreamTransport<W> {
    /// Wrap a writer and start a reader thread on `reader`
    pub fn new<R>(writer: W, reader: R) -> Self
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        spawn_line_reader(reader, tx);
        Self {
            writer,
            inbound: rx,
            closed: false,
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl SerialTransport {
    /// Open the console serial port at the default baud rate
    pub fn open(port_name: &str) -> Result<Self> {
        Self::open_with_baudrate(port_name, BAUD)
    }

    pub fn open_with_baudrate(port_name: &str, baudrate: u32) -> Result<Self> {
        info!("Opening console port {} at {} baud", port_name, baudrate);
        let port = serialport::new(port_name, baudrate)
            .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .open()?;
        let reader = port.try_clone()?;
        Ok(Self::new(port, reader))
    }
}

impl StdioTransport {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stdin())
    }
}

impl<W: Write> LineTransport for StreamTransport<W> {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        match self.inbound.try_recv() {
            Ok(line) => Ok(Some(line)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                if self.closed {
                    Ok(None)
                } else {
                    self.closed = true;
                    Err(HalError::Closed)
                }
            }
        }
    }
}

fn spawn_line_reader<R>(reader: R, tx: UnboundedSender<String>)
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(reader);
        let mut line = String::new();
        loop {
            match reader.read_line(&mut line) {
                Ok(0) => {
                    flush_line(&mut line, &tx);
                    debug!("Inbound stream reached end of input");
                    break;
                }
                Ok(_) => {
                    // Timeouts can leave a partial line behind; keep it until the terminator
                    if line.ends_with('\n') && !flush_line(&mut line, &tx) {
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::TimedOut => continue,
                Err(e) => {
                    warn!("Inbound reader stopped: {}", e);
                    break;
                }
            }
        }
    });
}

/// Send the buffered line (if any) and clear it; false once the receiver is gone
fn flush_line(line: &mut String, tx: &UnboundedSender<String>) -> bool {
    let trimmed = line.trim_end_matches(['\r', '\n']).to_string();
    line.clear();
    if trimmed.is_empty() {
        return true;
    }
    tx.send(trimmed).is_ok()
}
