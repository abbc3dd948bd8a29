mod node;
pub mod rope;

use snafu::Snafu;
use std::ops::Range;

pub use self::rope::Rope;

/// Errors reported for malformed edit arguments. On error the buffer is
/// left untouched.
#[derive(Clone, Debug, Eq, PartialEq, Snafu)]
pub enum EditError {
    #[snafu(display("offset {} out of bounds for buffer of length {}", offset, length))]
    OffsetOutOfBounds { offset: usize, length: usize },

    #[snafu(display("invalid range: start {} > end {}", start, end))]
    InvalidRange { start: usize, end: usize },
}

pub trait TextBuffer {
    fn insert(&mut self, s: &str, offset: usize) -> Result<(), EditError>;
    fn remove(&mut self, range: Range<usize>) -> Result<(), EditError>;
    fn all_content(&self) -> String;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
