//! Line sinks for the engine's running output.
//!
//! The `LineSink` trait abstracts over where an engine's progress lines go,
//! so quiet runs pass a no-op sink instead of an optional callback.

use std::io::{self, Write};

/// Receives lines of running output from a conversation engine.
pub trait LineSink: Send {
    /// Called once per output line, without the trailing newline.
    fn emit_line(&mut self, line: &str);
}

/// Writes each line to stdout.
pub struct ConsoleSink {
    stdout: io::Stdout,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSink for ConsoleSink {
    fn emit_line(&mut self, line: &str) {
        let _ = writeln!(self.stdout, "{}", line);
    }
}

/// Discards all output (quiet mode).
#[derive(Debug, Clone, Copy, Default)]
pub struct QuietSink;

impl LineSink for QuietSink {
    fn emit_line(&mut self, _: &str) {}
}

impl<F> LineSink for F
where
    F: FnMut(&str) + Send,
{
    fn emit_line(&mut self, line: &str) {
        self(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_sink_receives_lines() {
        let mut seen = Vec::new();
        {
            let mut sink = |line: &str| seen.push(line.to_string());
            sink.emit_line("turn 1");
            sink.emit_line("turn 2");
        }
        assert_eq!(seen, vec!["turn 1", "turn 2"]);
    }

    #[test]
    fn test_quiet_sink_accepts_anything() {
        let mut sink = QuietSink;
        sink.emit_line("ignored");
    }
}
