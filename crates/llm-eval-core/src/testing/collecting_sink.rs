//! A line sink that keeps every line it receives.

use llm_eval_proto::LineSink;

/// Collects emitted lines in memory.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    lines: Vec<String>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl LineSink for CollectingSink {
    fn emit_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}
