//! Line-based yes/no confirmation.

use std::io::{BufRead, Write};

use stocktally_inventory::Confirm;

/// Asks on `output` and reads the answer from `input`.
///
/// Only an explicit yes (`s`, `sim`, `y`, `yes`) confirms; anything else,
/// including end of input or an IO error, counts as no.
pub struct LineConfirm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Confirm for LineConfirm<R, W> {
    fn ask(&mut self, message: &str) -> bool {
        if write!(self.output, "{message} [s/N] ").and_then(|_| self.output.flush()).is_err() {
            return false;
        }

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => matches!(
                answer.trim().to_lowercase().as_str(),
                "s" | "sim" | "y" | "yes"
            ),
        }
    }
}
