//! Terminal prompts for the interactive scan session
//!
//! Generic over the input and output streams so the binary can hand it
//! stdin/stdout and tests can hand it in-memory buffers.

use std::io::{BufRead, Write};

use num_bigint::BigInt;
use tracing::debug;

use crate::config::Decision;
use crate::errors::{AppResult, CollatzError};

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `prompt` and read one trimmed line; `None` on end of input.
    fn read_line(&mut self, prompt: &str) -> AppResult<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Ask for an integer of any size and sign.
    pub fn ask_integer(&mut self, prompt: &str) -> AppResult<BigInt> {
        let line = self
            .read_line(prompt)?
            .ok_or_else(|| CollatzError::invalid_argument("Please enter valid integers."))?;
        line.parse::<BigInt>().map_err(|_| {
            debug!("Rejected integer input {:?}", line);
            CollatzError::invalid_argument("Please enter valid integers.")
        })
    }

    /// Yes/no question; only `y` or `yes` (any case) count as yes.
    pub fn confirm(&mut self, prompt: &str) -> AppResult<bool> {
        let answer = self.read_line(&format!("{} (y/n): ", prompt))?;
        Ok(matches!(
            answer.map(|a| a.to_ascii_lowercase()).as_deref(),
            Some("y" | "yes")
        ))
    }

    /// Resolve a configured decision, prompting only for [`Decision::Ask`].
    pub fn decide(&mut self, decision: Decision, prompt: &str) -> AppResult<bool> {
        match decision {
            Decision::Always => Ok(true),
            Decision::Never => Ok(false),
            Decision::Ask => self.confirm(prompt),
        }
    }

    /// Write a line to the session output.
    pub fn say(&mut self, message: &str) -> AppResult<()> {
        writeln!(self.output, "{}", message)?;
        Ok(())
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
