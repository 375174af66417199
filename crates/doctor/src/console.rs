#![forbid(unsafe_code)]

use ::console::{Term, style};

/// Line-oriented output and blocking question channel for the checks.
/// Report lines go through here, never through the tracing logger, so the
/// tool stays scriptable and the checks stay testable with a scripted
/// double.
pub trait Console {
    fn output_line(&mut self, line: &str);

    /// Prints the question and blocks for one line of input.
    fn ask(&mut self, question: &str) -> std::io::Result<String>;
}

pub struct TerminalConsole {
    term: Term,
}

impl TerminalConsole {
    pub fn stdout() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl Console for TerminalConsole {
    fn output_line(&mut self, line: &str) {
        // Output is best-effort; a broken pipe should not turn into a check
        // failure.
        let _ = self.term.write_line(line);
    }

    fn ask(&mut self, question: &str) -> std::io::Result<String> {
        self.term
            .write_str(&format!("{} ", style(question).yellow()))?;
        self.term.read_line()
    }
}
