//! Logging setup for the syslog CLI
//!
//! Two `tracing-subscriber` layers are installed:
//!
//! - stderr, filtered by `RUST_LOG` and silent when it is unset
//! - the local syslog socket (`/dev/log`), `info` and above, so that
//!   configuration changes are recorded in the system log
//!
//! # Severity mapping
//!
//! | tracing | syslog |
//! |---------|--------|
//! | ERROR | 3 (Error) |
//! | WARN | 4 (Warning) |
//! | INFO | 5 (Notice) |
//! | DEBUG, TRACE | 7 (Debug) |

use std::fmt;
use std::io::{self, Write};
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};

use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Local syslog socket
pub const DEV_LOG: &str = "/dev/log";

/// Program name recorded in the system log
pub const SYSLOG_IDENT: &str = "syslog-config";

/// LOG_USER
const FACILITY_USER: u8 = 1;

/// Syslog severity of a tracing level.
pub fn severity(level: &Level) -> u8 {
    match *level {
        Level::ERROR => 3,
        Level::WARN => 4,
        Level::INFO => 5,
        Level::DEBUG | Level::TRACE => 7,
    }
}

/// [`MakeWriter`] producing one datagram per event on a syslog socket
#[derive(Debug, Clone)]
pub struct SyslogMakeWriter {
    socket_path: PathBuf,
    ident: String,
    pid: u32,
}

impl SyslogMakeWriter {
    pub fn new(socket_path: impl AsRef<Path>, ident: impl Into<String>) -> Self {
        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
            ident: ident.into(),
            pid: std::process::id(),
        }
    }

    fn record(&self, severity: u8) -> SyslogRecord {
        let priority = FACILITY_USER * 8 + severity;
        let header = format!("<{}>{}[{}]: ", priority, self.ident, self.pid);
        SyslogRecord {
            socket_path: self.socket_path.clone(),
            buf: header.into_bytes(),
        }
    }
}

impl<'a> MakeWriter<'a> for SyslogMakeWriter {
    type Writer = SyslogRecord;

    fn make_writer(&'a self) -> Self::Writer {
        self.record(severity(&Level::INFO))
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        self.record(severity(meta.level()))
    }
}

/// One syslog message, sent when dropped
#[derive(Debug)]
pub struct SyslogRecord {
    socket_path: PathBuf,
    buf: Vec<u8>,
}

impl SyslogRecord {
    /// Framed message as it will be sent
    pub fn bytes(&self) -> &[u8] {
        let end = self
            .buf
            .iter()
            .rposition(|b| *b != b'\n')
            .map_or(0, |i| i + 1);
        &self.buf[..end]
    }
}

impl Write for SyslogRecord {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for SyslogRecord {
    fn drop(&mut self) {
        // No syslog daemon (containers, tests) is not an error.
        if let Ok(socket) = UnixDatagram::unbound() {
            let _ = socket.send_to(self.bytes(), &self.socket_path);
        }
    }
}

/// Formats only the event's fields, without timestamp, level or spans
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageOnly;

impl<S, N> FormatEvent<S, N> for MessageOnly
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install the stderr and syslog layers.
///
/// Calling it twice is harmless; the second call leaves the first
/// subscriber in place.
pub fn init_logging() {
    let stderr_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(stderr_filter);

    let syslog_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .event_format(MessageOnly)
        .with_writer(SyslogMakeWriter::new(DEV_LOG, SYSLOG_IDENT))
        .with_filter(LevelFilter::INFO);

    let _ = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(syslog_layer)
        .try_init();
}
