//! Source locations for rendered diagnostics.
//! 用于诊断渲染的源码位置。
//!
//! Weft never reads source text. A host locates the domain value a problem is
//! about and passes the span along when it turns the problem into a
//! diagnostic.

use std::fmt;
use std::ops::Range;

/// A byte range `start..end` in the host's source text.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: u32,
    /// Exclusive.
    pub end: u32,
}

impl Span {
    /// Placeholder for problems the host cannot locate.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    pub fn from_usize(start: usize, end: usize) -> Self {
        Span {
            start: start as u32,
            end: end as u32,
        }
    }

    /// Byte offset where a report about this span starts.
    pub fn offset(&self) -> usize {
        self.start as usize
    }

    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::from_usize(range.start, range.end)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dummy_points_at_start() {
        assert_eq!(Span::DUMMY.range(), 0..0);
        assert_eq!(Span::DUMMY.offset(), 0);
    }

    #[test]
    fn test_from_range() {
        let span = Span::from(3..7);
        assert_eq!(span, Span::from_usize(3, 7));
        assert_eq!(span.offset(), 3);
        assert_eq!(format!("{:?}", span), "3..7");
    }
}
