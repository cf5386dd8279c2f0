//! Lexical analyzer of `.sm` format.
//!
//! Raw [`str`] == [`lex_sm`] ==> tokens (in [`LexOutput`]) == [`super::parse`] ==> [`super::SmDocument`]

mod cursor;
pub mod token;

use thiserror::Error;

use crate::mixin::{SourceRangeMixin, SourceRangeMixinExt};

use self::{
    cursor::Cursor,
    token::{Token, TokenWithRange},
};

/// A problem found while splitting the source into tags.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LexWarning {
    /// Text that belongs to no tag.
    #[error("text outside of any tag: `{0}`")]
    StrayText(String),
    /// A tag started with `#` but had no `:` before its line ended.
    #[error("tag without `:` separator")]
    MissingColon,
    /// A tag value was not closed by `;`.
    #[error("tag `{0}` is not closed by `;`")]
    MissingSemicolon(String),
}

/// A lex warning with position information.
pub type LexWarningWithRange = SourceRangeMixin<LexWarning>;

/// Lex results, includes tokens and warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct LexOutput<'a> {
    /// Tags in source order.
    pub tokens: Vec<TokenWithRange<'a>>,
    /// Warnings in source order.
    pub lex_warnings: Vec<LexWarningWithRange>,
}

#[cfg(feature = "diagnostics")]
impl crate::diagnostics::ToAriadne for LexWarningWithRange {
    fn to_report<'a>(
        &self,
        src: &crate::diagnostics::SimpleSource<'a>,
    ) -> ariadne::Report<'a, (String, std::ops::Range<usize>)> {
        crate::diagnostics::build_report(
            src,
            ariadne::ReportKind::Warning,
            self.range(),
            "lex",
            self.content(),
            ariadne::Color::Yellow,
        )
    }
}

/// Splits the simfile source into tags.
pub fn lex_sm(source: &str) -> LexOutput<'_> {
    let mut cursor = Cursor::new(source);
    let mut tokens = vec![];
    let mut lex_warnings = vec![];
    loop {
        cursor.skip_trivia();
        let start = cursor.index();
        match cursor.peek_char() {
            None => break,
            Some('#') => {
                cursor.bump();
                let Some(name) = cursor.take_name() else {
                    lex_warnings.push(LexWarning::MissingColon.into_wrapper_range(start..cursor.index()));
                    continue;
                };
                let (value_range, terminated) = cursor.take_value();
                let token = Token::new(name, &source[value_range.clone()], value_range.start);
                if !terminated {
                    lex_warnings.push(
                        LexWarning::MissingSemicolon(token.name.to_string())
                            .into_wrapper_range(start..value_range.end),
                    );
                }
                tokens.push(token.into_wrapper_range(start..cursor.index()));
            }
            Some(_) => {
                let text = cursor.take_stray();
                lex_warnings.push(
                    LexWarning::StrayText(text.trim().to_string())
                        .into_wrapper_range(start..cursor.index()),
                );
            }
        }
    }
    LexOutput {
        tokens,
        lex_warnings,
    }
}
