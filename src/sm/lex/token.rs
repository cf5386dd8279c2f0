//! Definitions of the token in `.sm` format.

use std::{borrow::Cow, ops::Range};

use crate::mixin::SourceRangeMixin;

/// A `#NAME:value;` tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Token<'a> {
    /// String between `#` and `:`, trimmed. It is always uppercase.
    pub name: Cow<'a, str>,
    /// String between `:` and `;`, as is. It may contain `//` comments and line feeds.
    pub value: &'a str,
    /// Byte index of `value` in the source.
    pub value_start: usize,
}

/// A token with position information.
pub type TokenWithRange<'a> = SourceRangeMixin<Token<'a>>;

impl<'a> Token<'a> {
    pub(crate) fn new(name: &'a str, value: &'a str, value_start: usize) -> Self {
        let name = name.trim();
        let name = if name.bytes().any(|b| b.is_ascii_lowercase()) {
            Cow::Owned(name.to_ascii_uppercase())
        } else {
            Cow::Borrowed(name)
        };
        Self {
            name,
            value,
            value_start,
        }
    }

    /// Byte range of `value` in the source.
    #[must_use]
    pub const fn value_range(&self) -> Range<usize> {
        self.value_start..self.value_start + self.value.len()
    }

    /// The value with comments blanked out by spaces, so byte indices still match the source.
    #[must_use]
    pub fn uncommented_value(&self) -> Cow<'a, str> {
        blank_comments(self.value)
    }
}

/// Replaces every `//` comment by spaces of the same byte length.
pub(crate) fn blank_comments(text: &str) -> Cow<'_, str> {
    if !text.contains("//") {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    for (idx, line) in text.split('\n').enumerate() {
        if idx != 0 {
            out.push('\n');
        }
        match line.find("//") {
            Some(comment) => {
                out.push_str(&line[..comment]);
                out.extend(std::iter::repeat_n(' ', line.len() - comment));
            }
            None => out.push_str(line),
        }
    }
    Cow::Owned(out)
}
