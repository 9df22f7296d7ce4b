//! Logging setup
//!
//! Events go to stdout and to an in-memory ring buffer that the Console
//! screen renders.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::AppConfig;

pub const CONSOLE_LINES: usize = 500;

#[derive(Default)]
struct BufferState {
    lines: VecDeque<String>,
    partial: String,
}

/// Last [`CONSOLE_LINES`] log lines, each prefixed with the local time
#[derive(Clone)]
pub struct ConsoleBuffer {
    capacity: usize,
    state: Arc<Mutex<BufferState>>,
}

impl Default for ConsoleBuffer {
    fn default() -> Self {
        Self::new(CONSOLE_LINES)
    }
}

impl ConsoleBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Arc::new(Mutex::new(BufferState::default())),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.lines.iter().cloned().collect()
    }

    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.lines.clear();
        state.partial.clear();
    }

    pub fn len(&self) -> usize {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push_line(&self, state: &mut BufferState, line: &str) {
        let stamp = chrono::Local::now().format("%H:%M:%S");
        state.lines.push_back(format!("[{}] {}", stamp, line.trim_end()));
        while state.lines.len() > self.capacity {
            state.lines.pop_front();
        }
    }
}

impl io::Write for ConsoleBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.partial.push_str(&text);

        while let Some(pos) = state.partial.find('\n') {
            let line: String = state.partial.drain(..=pos).collect();
            if !line.trim().is_empty() {
                self.push_line(&mut state, &line);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> fmt::MakeWriter<'a> for ConsoleBuffer {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Filter from `RUST_LOG` if set, otherwise from the config
pub fn filter_directives(config: &AppConfig) -> String {
    let mut directives = vec![config.log_level.clone(), "ureq=warn".to_string()];
    directives.extend(config.log_filters.iter().filter(|f| !f.trim().is_empty()).cloned());
    directives.join(",")
}

/// Install the global subscriber. Returns the buffer backing the Console screen.
pub fn init(config: &AppConfig) -> ConsoleBuffer {
    let console = ConsoleBuffer::default();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    let stdout_layer = fmt::layer().with_target(true);
    let console_layer = fmt::layer()
        .with_writer(console.clone())
        .with_ansi(false)
        .with_target(false)
        .without_time();

    if let Err(e) = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(console_layer)
        .try_init()
    {
        eprintln!("Logger already initialized: {}", e);
    }

    console
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_buffer_splits_lines_and_keeps_partial() {
        let mut buffer = ConsoleBuffer::new(10);
        buffer.write_all(b" INFO first\n WARN sec").unwrap();
        assert_eq!(buffer.len(), 1);
        buffer.write_all(b"ond\n\n").unwrap();

        let lines = buffer.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" INFO first"));
        assert!(lines[1].ends_with(" WARN second"));
        assert!(lines[0].starts_with('['));
    }

    #[test]
    fn test_buffer_drops_oldest() {
        let mut buffer = ConsoleBuffer::new(3);
        for i in 0..5 {
            writeln!(buffer, "line {}", i).unwrap();
        }
        let lines = buffer.lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("line 2"));
        assert!(lines[2].ends_with("line 4"));

        buffer.clear();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_filter_directives() {
        let mut config = AppConfig::default();
        config.log_level = "debug".to_string();
        config.log_filters = vec!["prince_tv::api=trace".to_string(), " ".to_string()];
        assert_eq!(filter_directives(&config), "debug,ureq=warn,prince_tv::api=trace");
    }
}
