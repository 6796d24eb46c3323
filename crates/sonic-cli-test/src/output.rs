//! Captured console output

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// Cloneable in-memory writer; clones append to the same buffer
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock()).into_owned()
    }

    /// Written output split into lines
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_buffer() {
        let buffer = SharedBuffer::new();
        let mut writer = buffer.clone();
        writeln!(writer, "Enabling syslog rate limit feature for bgp").unwrap();
        writeln!(writer, "bgp is not running, ignoring...").unwrap();

        assert_eq!(
            buffer.lines(),
            vec![
                "Enabling syslog rate limit feature for bgp",
                "bgp is not running, ignoring...",
            ]
        );
    }
}
