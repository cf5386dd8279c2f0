//! Byte-range annotations for tokens, warnings and errors.
//!
//! - [`SourceRangeMixin`] attaches a byte span of the `.sm` source to any value.
//! - [`SourceRangeMixinExt`] adds constructors on every type, so `warning.into_wrapper(&token)` reads naturally.

use std::ops::Range;

/// A value together with the byte span of the source text it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceRangeMixin<T> {
    content: T,
    /// Start byte index, inclusive.
    start: usize,
    /// End byte index, exclusive.
    end: usize,
}

impl<T> SourceRangeMixin<T> {
    /// Wraps `content` with the span `start..end`.
    pub const fn new(content: T, start: usize, end: usize) -> Self {
        Self {
            content,
            start,
            end,
        }
    }

    /// Returns the wrapped content.
    pub const fn content(&self) -> &T {
        &self.content
    }

    /// Takes the content out of the wrapper.
    pub fn into_content(self) -> T {
        self.content
    }

    /// Returns the span as a byte range.
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Returns the length of the span in bytes.
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the span covers no bytes.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maps the content, keeping the span.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SourceRangeMixin<U> {
        SourceRangeMixin::new(f(self.content), self.start, self.end)
    }
}

impl<T: std::fmt::Display> std::fmt::Display for SourceRangeMixin<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at bytes {}..{}", self.content, self.start, self.end)
    }
}

impl<T: std::error::Error + 'static> std::error::Error for SourceRangeMixin<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.content)
    }
}

/// Constructors of [`SourceRangeMixin`] available on every type.
pub trait SourceRangeMixinExt: Sized {
    /// Wraps `self` with the same span as `wrapper`.
    fn into_wrapper<W>(self, wrapper: &SourceRangeMixin<W>) -> SourceRangeMixin<Self> {
        SourceRangeMixin::new(self, wrapper.start, wrapper.end)
    }

    /// Wraps `self` with the span `range`.
    fn into_wrapper_range(self, range: Range<usize>) -> SourceRangeMixin<Self> {
        SourceRangeMixin::new(self, range.start, range.end)
    }
}

impl<T> SourceRangeMixinExt for T {}
