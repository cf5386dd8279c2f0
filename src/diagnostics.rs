//! Fancy diagnostics support using `ariadne`.
//!
//! Warnings and errors of [`crate::sm`] carry byte ranges through [`crate::mixin::SourceRangeMixin`]. This module
//! turns them into `ariadne::Report`s, leaving row and column calculation to ariadne.
//!
//! # Usage Example
//!
//! ```rust
//! use sm2chart::{diagnostics::emit_sm_warnings, sm::parse_sm};
//!
//! let source = "stray\n#TITLE:Test;\n";
//! let output = parse_sm(source);
//!
//! emit_sm_warnings("test.sm", source, &output.warnings);
//! ```

use std::ops::Range;

use ariadne::{Color, Label, Report, ReportKind, Source};

use crate::{
    convert::ConvertWarning,
    sm::{ParseErrorWithRange, SmWarning},
};

/// Simple source container that holds the filename and source text.
///
/// ```rust
/// use sm2chart::diagnostics::SimpleSource;
///
/// let source = SimpleSource::new("test.sm", "#TITLE:test;\n");
/// assert_eq!(source.name(), "test.sm");
/// assert_eq!(source.text(), "#TITLE:test;\n");
/// ```
pub struct SimpleSource<'a> {
    name: &'a str,
    text: &'a str,
}

impl<'a> SimpleSource<'a> {
    /// Create a new source container instance.
    #[must_use]
    pub const fn new(name: &'a str, text: &'a str) -> Self {
        Self { name, text }
    }

    /// Get source text content.
    #[must_use]
    pub const fn text(&self) -> &'a str {
        self.text
    }

    /// Get source file name.
    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }
}

/// Trait for converting positioned errors to `ariadne::Report`.
pub trait ToAriadne {
    /// Convert error to ariadne Report.
    ///
    /// `src` gives the file name, ariadne handles row/column calculation.
    fn to_report<'a>(&self, src: &SimpleSource<'a>) -> Report<'a, (String, Range<usize>)>;
}

/// Helper to build a styled ariadne `Report` consistently.
#[must_use]
pub fn build_report<'a>(
    src: &SimpleSource<'a>,
    kind: ReportKind<'a>,
    range: Range<usize>,
    title: &str,
    label_message: impl ToString,
    color: Color,
) -> Report<'a, (String, Range<usize>)> {
    let filename = src.name().to_string();
    Report::build(kind, (filename.clone(), range.clone()))
        .with_message(title)
        .with_label(
            Label::new((filename, range))
                .with_message(label_message.to_string())
                .with_color(color),
        )
        .finish()
}

impl ToAriadne for SmWarning {
    fn to_report<'a>(&self, src: &SimpleSource<'a>) -> Report<'a, (String, Range<usize>)> {
        match self {
            Self::Lex(warning) => warning.to_report(src),
            Self::Parse(warning) => warning.to_report(src),
        }
    }
}

/// A conversion warning concerns a whole `#NOTES` block, so the report has no label.
impl ToAriadne for ConvertWarning {
    fn to_report<'a>(&self, src: &SimpleSource<'a>) -> Report<'a, (String, Range<usize>)> {
        Report::build(ReportKind::Warning, (src.name().to_string(), 0..0))
            .with_message(self.to_string())
            .finish()
    }
}

/// Convenience method: batch render [`SmWarning`]s to stderr.
pub fn emit_sm_warnings<'a>(
    name: &'a str,
    source: &'a str,
    warnings: impl IntoIterator<Item = &'a SmWarning>,
) {
    let simple = SimpleSource::new(name, source);
    let ariadne_source = Source::from(source);
    for warning in warnings {
        let report = warning.to_report(&simple);
        let _ = report.eprint((name.to_string(), ariadne_source.clone()));
    }
}

/// Renders [`ConvertWarning`]s to stderr.
pub fn emit_convert_warnings<'a>(
    name: &'a str,
    source: &'a str,
    warnings: impl IntoIterator<Item = &'a ConvertWarning>,
) {
    let simple = SimpleSource::new(name, source);
    let ariadne_source = Source::from(source);
    for warning in warnings {
        let _ = warning
            .to_report(&simple)
            .eprint((name.to_string(), ariadne_source.clone()));
    }
}

/// Renders a fatal parse error to stderr.
pub fn emit_sm_error(name: &str, source: &str, error: &ParseErrorWithRange) {
    let simple = SimpleSource::new(name, source);
    let _ = error
        .to_report(&simple)
        .eprint((name.to_string(), Source::from(source)));
}

/// Collect `ariadne::Report` instances for a list of [`SmWarning`] without printing.
#[must_use]
pub fn collect_sm_reports<'a>(
    name: &'a str,
    source: &'a str,
    warnings: impl IntoIterator<Item = &'a SmWarning>,
) -> Vec<Report<'a, (String, Range<usize>)>> {
    let simple = SimpleSource::new(name, source);
    warnings
        .into_iter()
        .map(|warning| warning.to_report(&simple))
        .collect()
}
