//! Numeric keypad buffer for entering a cell quantity

/// Longest quantity the keypad accepts, in digits
pub const MAX_DIGITS: usize = 4;

/// Digits typed so far
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuantityEntry {
    buffer: String,
}

impl QuantityEntry {
    /// Start from the cell's current quantity (blank when nothing is ordered)
    pub fn new(current: u32) -> Self {
        let buffer = if current == 0 {
            String::new()
        } else {
            current.to_string()
        };
        Self { buffer }
    }

    /// Type a digit. A lone `0` is replaced; input past four digits is ignored.
    pub fn press(&mut self, digit: char) -> bool {
        if !digit.is_ascii_digit() {
            return false;
        }
        if self.buffer == "0" {
            self.buffer.clear();
        } else if self.buffer.len() >= MAX_DIGITS {
            return false;
        }
        self.buffer.push(digit);
        true
    }

    pub fn backspace(&mut self) {
        self.buffer.pop();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Text to show; empty means zero
    pub fn display(&self) -> &str {
        &self.buffer
    }

    /// Entered quantity; blank input reads as zero
    pub fn value(&self) -> u32 {
        self.buffer.parse().unwrap_or(0)
    }
}
