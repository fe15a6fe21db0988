use std::io::{self, Write};

/// Where the watcher prints the messages meant for the person running it.
///
/// Operator logging goes through `tracing`; this is the plain-text console
/// output (product summary, countdown, mail result). Write errors are ignored.
pub struct Console {
    out: Box<dyn Write + Send>,
    status_width: usize,
}

impl Console {
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Box::new(out),
            status_width: 0,
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn line(&mut self, message: &str) {
        let _ = writeln!(self.out, "{}", message);
    }

    /// Overwrites the current line, for the countdown.
    pub fn status(&mut self, message: &str) {
        let width = message.chars().count();
        self.status_width = self.status_width.max(width);
        let _ = write!(self.out, "\r{:<1$}", message, self.status_width);
        let _ = self.out.flush();
    }

    /// Moves off a line written with [`Console::status`].
    pub fn end_status(&mut self) {
        if self.status_width > 0 {
            self.status_width = 0;
            let _ = writeln!(self.out);
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stdout()
    }
}
