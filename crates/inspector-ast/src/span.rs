use serde::{Deserialize, Serialize};

/// Byte range into a source string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both
    pub fn merge(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this span lies entirely inside `outer`
    pub fn within(&self, outer: Span) -> bool {
        self.start >= outer.start && self.end <= outer.end
    }

    /// Rebase onto a sub-range starting at `offset`
    pub fn relative_to(self, offset: usize) -> Span {
        Span::new(
            self.start.saturating_sub(offset),
            self.end.saturating_sub(offset),
        )
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}
