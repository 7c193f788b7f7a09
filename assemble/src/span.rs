use std::ops;

/// Represents a location in the original input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// The start index.
    pub m: usize,
    /// The end index.
    pub n: usize,
}

impl Span {
    pub fn new(m: usize, n: usize) -> Self {
        Self { m, n }
    }

    /// The empty span at the very end of the input.
    pub fn eof(input: &str) -> Self {
        Self::new(input.len(), input.len())
    }

    pub fn range(&self) -> ops::Range<usize> {
        self.m..self.n
    }

    pub fn as_str<'i>(&self, input: &'i str) -> &'i str {
        &input[self.range()]
    }

    /// The span without its final byte, like a label without its colon.
    pub fn trim_last(&self) -> Self {
        Self::new(self.m, self.n.saturating_sub(1).max(self.m))
    }
}

impl From<ops::Range<usize>> for Span {
    fn from(r: ops::Range<usize>) -> Self {
        Self {
            m: r.start,
            n: r.end,
        }
    }
}
