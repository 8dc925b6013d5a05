//! Console decision source: line-based prompts over stdin/stdout.

use std::io::{self, BufRead, Write};

use crate::error::LabelerError;
use crate::labeler::decision::{Decision, DecisionParser, DecisionSource, TokenPrompt};
use crate::labels::Label;

/// Prompts on a writer and reads one answer per line from a reader.
/// End of input counts as quit so the session is still saved.
pub struct ConsoleDecisions<R, W> {
    input: R,
    output: W,
}

impl ConsoleDecisions<io::StdinLock<'static>, io::Stdout> {
    /// Console bound to the process stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleDecisions<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consume the console and return the writer (tests inspect it).
    pub fn into_output(self) -> W {
        self.output
    }

    fn print_menu(&mut self, prompt: &TokenPrompt<'_>) -> io::Result<()> {
        writeln!(
            self.output,
            "\nToken {}/{}: \x1b[1m{}\x1b[0m",
            prompt.index + 1,
            prompt.total,
            prompt.token
        )?;
        writeln!(self.output, "Choose label:")?;
        for label in Label::ALL {
            writeln!(self.output, "  {}: {}", label.key(), label)?;
        }
        writeln!(
            self.output,
            "  {}: skip message, {}: quit",
            DecisionParser::SKIP,
            DecisionParser::QUIT
        )?;
        write!(self.output, "Your choice: ")?;
        self.output.flush()
    }
}

impl<R: BufRead, W: Write> DecisionSource for ConsoleDecisions<R, W> {
    fn show_message(&mut self, channel: &str, tokens: &[String]) {
        let rule = "=".repeat(50);
        let _ = writeln!(
            self.output,
            "\n{rule}\nFull message from {channel}:\n{}\n{rule}",
            tokens.join(" ")
        );
    }

    fn notify(&mut self, text: &str) {
        let _ = writeln!(self.output, "{text}");
    }

    fn next_decision(&mut self, prompt: &TokenPrompt<'_>) -> Result<Decision, LabelerError> {
        self.print_menu(prompt).map_err(LabelerError::Input)?;

        // Undecodable bytes become an invalid choice rather than an error.
        let mut buf = Vec::new();
        let read = self
            .input
            .read_until(b'\n', &mut buf)
            .map_err(LabelerError::Input)?;
        if read == 0 {
            tracing::info!("Operator input closed; ending session");
            return Ok(Decision::Quit);
        }

        let line = String::from_utf8_lossy(&buf);
        let decision = DecisionParser::parse(&line);
        if let Decision::Invalid(ref raw) = decision {
            let _ = writeln!(self.output, "Invalid input '{raw}', defaulting to 'O'");
        }
        Ok(decision)
    }
}
