//! Parsing [`SmDocument`] from tokens.
//!
//! Raw [`str`] == [`super::lex`] ==> tokens (in [`super::LexOutput`]) == [parse] ==> [`SmDocument`]

use std::collections::HashMap;

use thiserror::Error;

use crate::{
    mixin::{SourceRangeMixin, SourceRangeMixinExt},
    timing::{StopPoint, TempoPoint},
    util::parse_finite,
};

use super::{
    lex::token::TokenWithRange,
    model::{NotesBlock, SmDifficulty, SmDocument, SmHeader},
    notes::NoteGrid,
};

/// A recoverable problem in the tags.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParseWarning {
    /// The tag appeared more than once. The later one is used.
    #[error("duplicating tag `{0}`, the later one is used")]
    DuplicateTag(String),
    /// A timing map declared the same beat twice. The later value is used.
    #[error("duplicating beat {beat} in `{tag}`, the later value is used")]
    DuplicateTimingKey {
        /// The timing tag.
        tag: String,
        /// The duplicated beat.
        beat: f64,
    },
    /// The difficulty name is not known. It is read as `Edit`.
    #[error("unknown difficulty `{0}`, treated as Edit")]
    UnknownDifficulty(String),
    /// The meter is not a non-negative integer.
    #[error("meter `{0}` is not a number")]
    InvalidMeter(String),
}

/// A parse warning with position information.
pub type ParseWarningWithRange = SourceRangeMixin<ParseWarning>;

/// A problem that makes the simfile unusable.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParseError {
    /// A required tag is absent.
    #[error("required tag `#{0}` is missing")]
    MissingTag(String),
    /// A numeric tag is not a finite number.
    #[error("`{text}` in `#{tag}` is not a finite number")]
    InvalidNumber {
        /// The tag.
        tag: String,
        /// The offending value.
        text: String,
    },
    /// An entry of a timing map is not `beat=value`.
    #[error("`{text}` in `#{tag}` is not a `beat=value` pair")]
    InvalidTimingPair {
        /// The tag.
        tag: String,
        /// The offending entry.
        text: String,
    },
    /// A `#NOTES` tag does not have its six `:` separated fields.
    #[error("`#NOTES` needs 6 fields, but found {0}")]
    NotesFieldCount(usize),
    /// A note grid contains an unknown code.
    #[error("unknown note code `{0}`")]
    UnknownNoteCode(char),
    /// A row has a different number of lanes than the first row.
    #[error("row has {found} lanes, but {expected} expected")]
    RowWidthMismatch {
        /// Lanes of the first row.
        expected: usize,
        /// Lanes of this row.
        found: usize,
    },
}

/// A parse error with position information.
pub type ParseErrorWithRange = SourceRangeMixin<ParseError>;

/// Type alias of `core::result::Result<T, ParseErrorWithRange>`
pub(crate) type Result<T> = core::result::Result<T, ParseErrorWithRange>;

#[cfg(feature = "diagnostics")]
mod reports {
    use std::ops::Range;

    use ariadne::{Color, Report, ReportKind};

    use super::{ParseErrorWithRange, ParseWarningWithRange};
    use crate::diagnostics::{SimpleSource, ToAriadne, build_report};

    impl ToAriadne for ParseWarningWithRange {
        fn to_report<'a>(&self, src: &SimpleSource<'a>) -> Report<'a, (String, Range<usize>)> {
            build_report(
                src,
                ReportKind::Warning,
                self.range(),
                "parse",
                self.content(),
                Color::Blue,
            )
        }
    }

    impl ToAriadne for ParseErrorWithRange {
        fn to_report<'a>(&self, src: &SimpleSource<'a>) -> Report<'a, (String, Range<usize>)> {
            build_report(
                src,
                ReportKind::Error,
                self.range(),
                "cannot parse simfile",
                self.content(),
                Color::Red,
            )
        }
    }
}

/// Tags read into the document, other than `#NOTES`.
const HEADER_TAGS: [&str; 11] = [
    "TITLE",
    "SUBTITLE",
    "ARTIST",
    "GENRE",
    "CREDIT",
    "MUSIC",
    "OFFSET",
    "SAMPLESTART",
    "SAMPLELENGTH",
    "BPMS",
    "STOPS",
];

impl SmDocument {
    /// Builds the document from lexed tags. Warnings are returned even when parsing fails.
    pub fn from_tokens(
        tokens: &[TokenWithRange<'_>],
    ) -> (Result<Self>, Vec<ParseWarningWithRange>) {
        let mut warnings = vec![];
        let document = Self::parse_tokens(tokens, &mut warnings);
        (document, warnings)
    }

    fn parse_tokens<'a>(
        tokens: &'a [TokenWithRange<'a>],
        warnings: &mut Vec<ParseWarningWithRange>,
    ) -> Result<Self> {
        let mut tags: HashMap<&str, &TokenWithRange<'a>> = HashMap::new();
        let mut charts = vec![];
        for token in tokens {
            let name = match token.content().name.as_ref() {
                "FREEZES" => "STOPS",
                name => name,
            };
            if name == "NOTES" {
                charts.push(parse_notes_block(token, warnings)?);
                continue;
            }
            let Some(&name) = HEADER_TAGS.iter().find(|&&tag| tag == name) else {
                continue;
            };
            if tags.insert(name, token).is_some() {
                warnings.push(ParseWarning::DuplicateTag(name.into()).into_wrapper(token));
            }
        }

        let required = |name: &str| {
            tags.get(name)
                .copied()
                .ok_or_else(|| ParseError::MissingTag(name.into()).into_wrapper_range(0..0))
        };
        let optional_text = |name: &str| {
            tags.get(name)
                .map(|token| text_value(token))
                .filter(|text| !text.is_empty())
        };

        let header = SmHeader {
            title: text_value(required("TITLE")?),
            subtitle: optional_text("SUBTITLE"),
            artist: optional_text("ARTIST"),
            genre: optional_text("GENRE"),
            credit: optional_text("CREDIT"),
            music: optional_text("MUSIC"),
            offset: number_value(required("OFFSET")?)?,
            sample_start: number_value(required("SAMPLESTART")?)?,
            sample_length: number_value(required("SAMPLELENGTH")?)?,
        };
        let tempo_points = timing_map(required("BPMS")?, warnings)?
            .into_iter()
            .map(|(beat, bpm)| TempoPoint { beat, bpm })
            .collect();
        let stop_points = match tags.get("STOPS") {
            Some(token) => timing_map(token, warnings)?
                .into_iter()
                .map(|(beat, seconds)| StopPoint { beat, seconds })
                .collect(),
            None => vec![],
        };
        if charts.is_empty() {
            return Err(ParseError::MissingTag("NOTES".into()).into_wrapper_range(0..0));
        }

        Ok(Self {
            header,
            tempo_points,
            stop_points,
            charts,
        })
    }
}

fn text_value(token: &TokenWithRange<'_>) -> String {
    token.content().uncommented_value().trim().to_string()
}

fn number_value(token: &TokenWithRange<'_>) -> Result<f64> {
    let content = token.content();
    let value = content.uncommented_value();
    parse_finite(&value).ok_or_else(|| {
        ParseError::InvalidNumber {
            tag: content.name.to_string(),
            text: value.trim().to_string(),
        }
        .into_wrapper_range(content.value_range())
    })
}

/// Reads `beat=value,...` into pairs sorted by beat.
fn timing_map(
    token: &TokenWithRange<'_>,
    warnings: &mut Vec<ParseWarningWithRange>,
) -> Result<Vec<(f64, f64)>> {
    let content = token.content();
    let value = content.uncommented_value();
    let mut points: Vec<(f64, f64)> = vec![];
    let mut offset = content.value_start;
    for entry in value.split(',') {
        let range = offset..offset + entry.len();
        offset += entry.len() + 1;
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let invalid = || {
            ParseError::InvalidTimingPair {
                tag: content.name.to_string(),
                text: entry.to_string(),
            }
            .into_wrapper_range(range.clone())
        };
        let (beat, value) = entry.split_once('=').ok_or_else(invalid)?;
        let beat = parse_finite(beat).ok_or_else(invalid)?;
        let value = parse_finite(value).ok_or_else(invalid)?;
        match points.iter_mut().find(|(existing, _)| existing.total_cmp(&beat).is_eq()) {
            Some(point) => {
                warnings.push(
                    ParseWarning::DuplicateTimingKey {
                        tag: content.name.to_string(),
                        beat,
                    }
                    .into_wrapper_range(range.clone()),
                );
                point.1 = value;
            }
            None => points.push((beat, value)),
        }
    }
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(points)
}

/// Reads `steps type:description:difficulty:meter:radar:grid`.
fn parse_notes_block(
    token: &TokenWithRange<'_>,
    warnings: &mut Vec<ParseWarningWithRange>,
) -> Result<NotesBlock> {
    let content = token.content();
    let value = content.uncommented_value();
    let fields: Vec<&str> = value.splitn(6, ':').collect();
    let &[steps_type, description, difficulty, meter, _radar, grid] = fields.as_slice() else {
        return Err(ParseError::NotesFieldCount(fields.len()).into_wrapper(token));
    };
    let grid_start = content.value_start + (value.len() - grid.len());
    let grid = NoteGrid::parse(grid, grid_start)?;

    let difficulty = difficulty.parse::<SmDifficulty>().unwrap_or_else(|_| {
        warnings.push(ParseWarning::UnknownDifficulty(difficulty.trim().into()).into_wrapper(token));
        SmDifficulty::Edit
    });
    let meter = meter.trim();
    let meter = if meter.is_empty() {
        None
    } else {
        meter.parse::<u32>().map_or_else(
            |_| {
                warnings.push(ParseWarning::InvalidMeter(meter.into()).into_wrapper(token));
                None
            },
            Some,
        )
    };

    Ok(NotesBlock {
        steps_type: steps_type.trim().to_string(),
        description: description.trim().to_string(),
        difficulty,
        meter,
        grid,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::sm::{NoteCode, lex::lex_sm};

    const HEADER: &str = "#TITLE:Kioku;\n#OFFSET:-0.05;\n#SAMPLESTART:30.5;\n#SAMPLELENGTH:12;\n";

    fn parse(source: &str) -> (Result<SmDocument>, Vec<ParseWarningWithRange>) {
        let lexed = lex_sm(source);
        SmDocument::from_tokens(&lexed.tokens)
    }

    #[test]
    fn reads_header_and_timing() {
        let source = format!(
            "{HEADER}#ARTIST:;\n#BPMS:0=120,\n8=-120,\n16=140;\n#FREEZES:4=0.5;\n#NOTES:dance-single:me:Hard:9:0,0,0,0,0:\n1000\n;"
        );
        let (document, warnings) = parse(&source);
        let document = document.unwrap();
        assert_eq!(warnings, vec![]);
        assert_eq!(document.header.title, "Kioku");
        assert_eq!(document.header.artist, None);
        assert_eq!(document.header.offset, -0.05);
        assert_eq!(document.header.sample_start, 30.5);
        assert_eq!(
            document.tempo_points,
            vec![
                TempoPoint {
                    beat: 0.0,
                    bpm: 120.0
                },
                TempoPoint {
                    beat: 8.0,
                    bpm: -120.0
                },
                TempoPoint {
                    beat: 16.0,
                    bpm: 140.0
                },
            ]
        );
        assert_eq!(
            document.stop_points,
            vec![StopPoint {
                beat: 4.0,
                seconds: 0.5
            }]
        );
        let chart = &document.charts[0];
        assert_eq!(chart.steps_type, "dance-single");
        assert_eq!(chart.description, "me");
        assert_eq!(chart.difficulty, SmDifficulty::Hard);
        assert_eq!(chart.meter, Some(9));
        assert_eq!(chart.grid.measures[0].rows[0].codes()[0], NoteCode::Tap);
    }

    #[test]
    fn missing_tags_are_fatal() {
        let (document, _) = parse("#TITLE:x;#OFFSET:0;#SAMPLESTART:0;#SAMPLELENGTH:0;#NOTES:a:b:Easy:1::0000;");
        assert_eq!(
            document.unwrap_err().into_content(),
            ParseError::MissingTag("BPMS".into())
        );

        let (document, _) = parse(&format!("{HEADER}#BPMS:0=120;"));
        assert_eq!(
            document.unwrap_err().into_content(),
            ParseError::MissingTag("NOTES".into())
        );
    }

    #[test]
    fn malformed_numbers_are_fatal() {
        let source = "#TITLE:x;#OFFSET:abc;";
        let (document, _) = parse(source);
        let error = document.unwrap_err();
        assert_eq!(
            error.content(),
            &ParseError::InvalidNumber {
                tag: "OFFSET".into(),
                text: "abc".into()
            }
        );
        assert_eq!(&source[error.range()], "abc");

        let source = format!("{HEADER}#BPMS:0=120,4=fast;#NOTES:a:b:Easy:1::0000;");
        let (document, _) = parse(&source);
        let error = document.unwrap_err();
        assert_eq!(&source[error.range()], "4=fast");
    }

    #[test]
    fn duplicate_timing_keys_keep_the_later() {
        let source = format!("{HEADER}#BPMS:0=120,0=150;#STOPS:;\n#NOTES:a:b:Easy:1::0000;");
        let (document, warnings) = parse(&source);
        let document = document.unwrap();
        assert_eq!(
            document.tempo_points,
            vec![TempoPoint {
                beat: 0.0,
                bpm: 150.0
            }]
        );
        assert!(document.stop_points.is_empty());
        assert_eq!(
            warnings.into_iter().map(SourceRangeMixin::into_content).collect::<Vec<_>>(),
            vec![ParseWarning::DuplicateTimingKey {
                tag: "BPMS".into(),
                beat: 0.0
            }]
        );
    }

    #[test]
    fn notes_block_needs_six_fields() {
        let source = format!("{HEADER}#BPMS:0=120;#NOTES:dance-single:Hard:0000;");
        let (document, _) = parse(&source);
        assert_eq!(
            document.unwrap_err().into_content(),
            ParseError::NotesFieldCount(3)
        );
    }

    #[test]
    fn odd_difficulty_and_meter_warn() {
        let source = format!("{HEADER}#BPMS:0=120;#NOTES:dance-single::Insane:?::0000;");
        let (document, warnings) = parse(&source);
        let chart = &document.unwrap().charts[0];
        assert_eq!(chart.difficulty, SmDifficulty::Edit);
        assert_eq!(chart.meter, None);
        assert_eq!(
            warnings.into_iter().map(SourceRangeMixin::into_content).collect::<Vec<_>>(),
            vec![
                ParseWarning::UnknownDifficulty("Insane".into()),
                ParseWarning::InvalidMeter("?".into()),
            ]
        );
    }

    #[test]
    fn grid_errors_point_into_source() {
        let source = format!("{HEADER}#BPMS:0=120;#NOTES:dance-single::Easy:1::\n1000\n10Q0\n;");
        let (document, _) = parse(&source);
        let error = document.unwrap_err();
        assert_eq!(error.content(), &ParseError::UnknownNoteCode('Q'));
        assert_eq!(&source[error.range()], "Q");
    }
}
