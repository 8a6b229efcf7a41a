use tracing::info;

/// Line-buffered terminal output of a component.
///
/// Bytes are held until a newline arrives; each complete line is recorded
/// and logged.
#[derive(Debug, Clone)]
pub struct TerminalOutput {
    name: &'static str,
    pending: Vec<u8>,
    lines: Vec<String>,
}

impl TerminalOutput {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            pending: Vec::new(),
            lines: Vec::new(),
        }
    }

    pub fn stdout() -> Self {
        Self::new("stdout")
    }

    pub fn stderr() -> Self {
        Self::new("stderr")
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn write(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
        while let Some(newline) = self.pending.iter().position(|&byte| byte == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            self.emit(&line[..newline]);
        }
    }

    /// Emits a trailing partial line, if any.
    pub fn flush(&mut self) {
        if !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            self.emit(&line);
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn take_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }

    fn emit(&mut self, line: &[u8]) {
        let line = String::from_utf8_lossy(line).into_owned();
        info!(stream = self.name, "{}", line);
        self.lines.push(line);
    }
}
