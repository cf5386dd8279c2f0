//! The note grid of a `#NOTES` block.
//!
//! A grid is a list of measures separated by `,`. Every measure spans 4 beats and is split into rows of equal length,
//! one line per row. A row has one code per lane.

use crate::mixin::SourceRangeMixinExt;

use super::parse::{ParseError, ParseErrorWithRange};

/// A code placed on one lane of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoteCode {
    /// `0`, nothing.
    Empty,
    /// `1`, a note to hit.
    Tap,
    /// `2`, the head of a hold.
    HoldHead,
    /// `3`, the tail of a hold or a roll.
    Tail,
    /// `4`, the head of a roll.
    RollHead,
    /// `M`, a mine.
    Mine,
    /// `L`, a lift.
    Lift,
    /// `F`, a fake note.
    Fake,
    /// `K`, an automatic keysound.
    KeySound,
}

impl NoteCode {
    /// Reads a code from its character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        Some(match c {
            '0' => Self::Empty,
            '1' => Self::Tap,
            '2' => Self::HoldHead,
            '3' => Self::Tail,
            '4' => Self::RollHead,
            'M' => Self::Mine,
            'L' => Self::Lift,
            'F' => Self::Fake,
            'K' => Self::KeySound,
            _ => return None,
        })
    }

    /// The character of the code.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Empty => '0',
            Self::Tap => '1',
            Self::HoldHead => '2',
            Self::Tail => '3',
            Self::RollHead => '4',
            Self::Mine => 'M',
            Self::Lift => 'L',
            Self::Fake => 'F',
            Self::KeySound => 'K',
        }
    }
}

/// One time slice of a measure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Row(pub Vec<NoteCode>);

impl Row {
    /// Codes by lane index.
    #[must_use]
    pub fn codes(&self) -> &[NoteCode] {
        &self.0
    }

    /// Whether every lane is [`NoteCode::Empty`].
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(|&code| code == NoteCode::Empty)
    }
}

/// Rows of one measure, evenly spread over its 4 beats.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measure {
    /// Rows in time order.
    pub rows: Vec<Row>,
}

/// All measures of a chart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteGrid {
    /// Measures in time order.
    pub measures: Vec<Measure>,
    /// Number of lanes of every row.
    pub lanes: usize,
}

impl NoteGrid {
    /// Parses the grid text. `base` is the byte index of `text` in the source, used for error ranges.
    ///
    /// `text` must already have its comments blanked.
    ///
    /// # Errors
    ///
    /// Fails on an unknown code or a row whose width differs from the first row.
    pub fn parse(text: &str, base: usize) -> Result<Self, ParseErrorWithRange> {
        let mut measures = vec![];
        let mut lanes = None;
        let mut offset = 0;
        for measure_text in text.split(',') {
            let mut rows = vec![];
            let mut line_offset = offset;
            for line in measure_text.split('\n') {
                let line_start = base + line_offset + (line.len() - line.trim_start().len());
                line_offset += line.len() + 1;
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let codes = line
                    .char_indices()
                    .map(|(idx, c)| {
                        NoteCode::from_char(c).ok_or_else(|| {
                            let start = line_start + idx;
                            ParseError::UnknownNoteCode(c)
                                .into_wrapper_range(start..start + c.len_utf8())
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let expected = *lanes.get_or_insert(codes.len());
                if codes.len() != expected {
                    return Err(ParseError::RowWidthMismatch {
                        expected,
                        found: codes.len(),
                    }
                    .into_wrapper_range(line_start..line_start + line.len()));
                }
                rows.push(Row(codes));
            }
            offset += measure_text.len() + 1;
            measures.push(Measure { rows });
        }
        // A trailing separator leaves nothing behind it.
        if measures.last().is_some_and(|measure| measure.rows.is_empty()) {
            measures.pop();
        }
        Ok(Self {
            measures,
            lanes: lanes.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_measures_and_rows() {
        let grid = NoteGrid::parse("\n1000\n0000\n,\n0200\n0000\n0030\n0000\n,\n", 0).unwrap();
        assert_eq!(grid.lanes, 4);
        assert_eq!(grid.measures.len(), 2);
        assert_eq!(grid.measures[0].rows.len(), 2);
        assert_eq!(grid.measures[1].rows.len(), 4);
        assert_eq!(grid.measures[1].rows[0].codes()[1], NoteCode::HoldHead);
        assert!(grid.measures[0].rows[1].is_blank());
    }

    #[test]
    fn keeps_empty_measures_in_the_middle() {
        let grid = NoteGrid::parse("1000\n,\n,\n0001\n", 0).unwrap();
        assert_eq!(grid.measures.len(), 3);
        assert!(grid.measures[1].rows.is_empty());
    }

    #[test]
    fn unknown_code_points_at_the_char() {
        let text = "1000\n,\n00X0\n";
        let error = NoteGrid::parse(text, 100).unwrap_err();
        assert_eq!(error.content(), &ParseError::UnknownNoteCode('X'));
        assert_eq!(error.range(), 109..110);
    }

    #[test]
    fn row_width_must_match() {
        let error = NoteGrid::parse("1000\n00000\n", 0).unwrap_err();
        assert_eq!(
            error.content(),
            &ParseError::RowWidthMismatch {
                expected: 4,
                found: 5
            }
        );
        assert_eq!(error.range(), 5..10);
    }

    #[test]
    fn chars_round_trip() {
        for c in ['0', '1', '2', '3', '4', 'M', 'L', 'F', 'K'] {
            assert_eq!(NoteCode::from_char(c).map(NoteCode::as_char), Some(c));
        }
        assert_eq!(NoteCode::from_char('x'), None);
    }
}
