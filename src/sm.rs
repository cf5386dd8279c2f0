//! The parser of StepMania `.sm` simfiles.
//!
//! This module consists of two phases, lexical analyzing and tag parsing.
//!
//! [`lex`] splits the source into `#NAME:value;` tags, each with its byte range. Comments (`//` until the end of
//! line) are skipped, and a tag missing its `;` is closed by the next line that starts with `#`.
//!
//! [`parse`] interprets the tags into a [`SmDocument`]: header fields, the tempo and stop maps, and one
//! [`NoteGrid`] for each `#NOTES` tag.
//!
//! Our policies are:
//!
//! - Support only UTF-8 (as required `&str` to input).
//! - Reject malformed numbers and note grids instead of guessing, because they would move every note after them.
//! - Keep recoverable oddities, such as text outside tags or an unknown difficulty name, as warnings.

pub mod lex;
pub mod model;
pub mod notes;
pub mod parse;

use thiserror::Error;

pub use self::{
    lex::{LexOutput, LexWarning, LexWarningWithRange, lex_sm},
    model::{NotesBlock, SmDifficulty, SmDocument, SmHeader},
    notes::{Measure, NoteCode, NoteGrid, Row},
    parse::{ParseError, ParseErrorWithRange, ParseWarning, ParseWarningWithRange},
};

/// A non-fatal problem found while reading a simfile.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SmWarning {
    /// From the lexical analyzer.
    #[error("lex: {0}")]
    Lex(#[from] LexWarningWithRange),
    /// From the tag parser.
    #[error("parse: {0}")]
    Parse(#[from] ParseWarningWithRange),
}

/// Output of [`parse_sm`].
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct SmOutput {
    /// The document, or the first fatal error.
    pub document: Result<SmDocument, ParseErrorWithRange>,
    /// Warnings from both phases, in source order per phase.
    pub warnings: Vec<SmWarning>,
}

/// Parses a simfile from its source text.
///
/// # Example
///
/// ```
/// use sm2chart::sm::parse_sm;
///
/// let source = "#TITLE:Song;#OFFSET:-0.1;#SAMPLESTART:1;#SAMPLELENGTH:2;#BPMS:0=150;\n#NOTES:dance-single::Easy:1::0000;";
/// let output = parse_sm(source);
/// let document = output.document.unwrap();
/// assert_eq!(document.header.title, "Song");
/// assert_eq!(document.tempo_points[0].bpm, 150.0);
/// assert!(output.warnings.is_empty());
/// ```
pub fn parse_sm(source: &str) -> SmOutput {
    let LexOutput {
        tokens,
        lex_warnings,
    } = lex_sm(source);
    let mut warnings: Vec<SmWarning> = lex_warnings.into_iter().map(SmWarning::Lex).collect();
    let (document, parse_warnings) = SmDocument::from_tokens(&tokens);
    warnings.extend(parse_warnings.into_iter().map(SmWarning::Parse));
    SmOutput { document, warnings }
}
