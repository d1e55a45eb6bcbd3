// Licensed under the Apache-2.0 license

//! Crate-wide logging seam.
//!
//! Components take a `Logger` type parameter (defaulting to [`NoOpLogger`])
//! so that diagnostics cost nothing unless the embedder wires up a sink.
//! [`WriterLogger`] adapts any `embedded_io::Write` sink, which is how test
//! and UART reporting is done.

/// Severity of a log record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Minimal logging interface for `no_std` environments.
///
/// Implementations must not block for long and must not allocate; log calls
/// can originate from interrupt context.
pub trait Logger {
    fn log(&mut self, level: LogLevel, msg: &str);

    fn debug(&mut self, msg: &str) {
        self.log(LogLevel::Debug, msg);
    }

    fn info(&mut self, msg: &str) {
        self.log(LogLevel::Info, msg);
    }

    fn warn(&mut self, msg: &str) {
        self.log(LogLevel::Warn, msg);
    }

    fn error(&mut self, msg: &str) {
        self.log(LogLevel::Error, msg);
    }
}

/// Logger that discards everything. The default.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    fn log(&mut self, _level: LogLevel, _msg: &str) {}
}

/// Logger that writes one line per record to an `embedded_io::Write` sink
/// (a UART, a byte slice in tests). Write errors are swallowed; logging must
/// never propagate failures into the component being logged.
pub struct WriterLogger<W: embedded_io::Write> {
    writer: W,
}

impl<W: embedded_io::Write> WriterLogger<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the underlying sink (to inspect captured output in tests).
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: embedded_io::Write> Logger for WriterLogger<W> {
    fn log(&mut self, level: LogLevel, msg: &str) {
        let tag: &[u8] = match level {
            LogLevel::Debug => b"[DBG] ",
            LogLevel::Info => b"[INF] ",
            LogLevel::Warn => b"[WRN] ",
            LogLevel::Error => b"[ERR] ",
        };
        let _ = self.writer.write_all(tag);
        let _ = self.writer.write_all(msg.as_bytes());
        let _ = self.writer.write_all(b"\r\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_logger_tags_and_terminates_lines() {
        let mut buf = [0u8; 64];
        {
            let mut logger = WriterLogger::new(&mut buf[..]);
            logger.warn("queue full");
        }
        let text = core::str::from_utf8(&buf[..18]).unwrap();
        assert_eq!(text, "[WRN] queue full\r\n");
    }

    #[test]
    fn noop_logger_accepts_all_levels() {
        let mut logger = NoOpLogger;
        logger.debug("a");
        logger.info("b");
        logger.warn("c");
        logger.error("d");
    }
}
