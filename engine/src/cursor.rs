//! Explicit line cursor used by the stateful scanners.
//!
//! Rules that read lookahead lines report how many lines they consumed
//! instead of mutating a shared loop index.

/// Forward-only cursor over a slice of report lines.
#[derive(Debug, Clone)]
pub struct LineCursor<'a> {
    lines: &'a [String],
    pos: usize,
}

impl<'a> LineCursor<'a> {
    pub fn new(lines: &'a [String]) -> Self {
        Self { lines, pos: 0 }
    }

    /// Line `n` positions ahead of the current one (`peek(0)` is the current line).
    pub fn peek(&self, n: usize) -> Option<&'a str> {
        self.lines.get(self.pos + n).map(String::as_str)
    }

    /// Moves forward by `n` lines, stopping at the end of input.
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.lines.len());
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_done(&self) -> bool {
        self.pos >= self.lines.len()
    }

    pub fn remaining(&self) -> usize {
        self.lines.len() - self.pos
    }
}
