//! Route `tracing` output to the browser console

use std::io;
use tracing::Level;

/// Buffers one formatted event and logs it to the console on drop
#[derive(Default)]
pub struct ConsoleWriter {
    buffer: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&self.buffer);
        web_sys::console::log_1(&line.trim_end().into());
        self.buffer.clear();
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let _ = io::Write::flush(self);
    }
}

/// Install a global subscriber. Safe to call more than once.
pub fn install(max_level: Level) {
    let subscriber = tracing_subscriber::fmt()
        .with_writer(ConsoleWriter::default)
        .with_max_level(max_level)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
