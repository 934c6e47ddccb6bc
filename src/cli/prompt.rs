//! Terminal confirmation prompt

use crate::confirm::Confirm;
use std::io::{self, BufRead, Write};

/// Asks `[y/N]` on stdout and reads the answer from stdin.
///
/// With `force` set every prompt is accepted without asking.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirm {
    pub force: bool,
}

impl StdinConfirm {
    pub fn new(force: bool) -> Self {
        StdinConfirm { force }
    }
}

impl Confirm for StdinConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        if self.force {
            return true;
        }
        let stdin = io::stdin();
        ask(message, &mut stdin.lock(), &mut io::stdout())
    }
}

/// Prompt on `output` and read one line from `input`.
/// Anything other than `y` or `yes`, including a read error, declines.
fn ask(message: &str, input: &mut impl BufRead, output: &mut impl Write) -> bool {
    if write!(output, "{} [y/N] ", message)
        .and_then(|_| output.flush())
        .is_err()
    {
        return false;
    }

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(_) => {
            let answer = line.trim();
            answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
        }
        Err(e) => {
            log::warn!("Could not read answer: {}", e);
            false
        }
    }
}
