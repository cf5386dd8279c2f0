//! Semantic objects of a simfile.

use std::str::FromStr;

use thiserror::Error;

use crate::timing::{StopPoint, TempoPoint};

use super::notes::NoteGrid;

/// The whole simfile.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmDocument {
    /// Metadata tags.
    pub header: SmHeader,
    /// `#BPMS`, sorted by beat.
    pub tempo_points: Vec<TempoPoint>,
    /// `#STOPS` (or `#FREEZES`), sorted by beat. Empty if absent.
    pub stop_points: Vec<StopPoint>,
    /// `#NOTES` blocks in source order.
    pub charts: Vec<NotesBlock>,
}

/// Metadata tags of a simfile.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmHeader {
    /// `#TITLE`.
    pub title: String,
    /// `#SUBTITLE`.
    pub subtitle: Option<String>,
    /// `#ARTIST`.
    pub artist: Option<String>,
    /// `#GENRE`.
    pub genre: Option<String>,
    /// `#CREDIT`, usually the charter.
    pub credit: Option<String>,
    /// `#MUSIC`, the audio file name.
    pub music: Option<String>,
    /// `#OFFSET`, seconds of audio before beat 0, negated.
    pub offset: f64,
    /// `#SAMPLESTART`, start of the music preview in seconds.
    pub sample_start: f64,
    /// `#SAMPLELENGTH`, length of the music preview in seconds.
    pub sample_length: f64,
}

/// One `#NOTES` block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NotesBlock {
    /// Game and style, e.g. `dance-single`.
    pub steps_type: String,
    /// Free text, often the chart author.
    pub description: String,
    /// Difficulty slot.
    pub difficulty: SmDifficulty,
    /// Numeric rating, if it was a number.
    pub meter: Option<u32>,
    /// The hit codes.
    pub grid: NoteGrid,
}

/// Difficulty slot of a `#NOTES` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SmDifficulty {
    /// `Beginner`.
    Beginner,
    /// `Easy`, also `Basic` and `Light`.
    Easy,
    /// `Medium`, also `Another`, `Trick`, `Standard` and `Difficult`.
    Medium,
    /// `Hard`, also `SSR`, `Maniac` and `Heavy`.
    Hard,
    /// `Challenge`, also `SManiac`, `Expert` and `Oni`.
    Challenge,
    /// `Edit`.
    Edit,
}

/// A difficulty name matched no known slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[error("unknown difficulty `{0}`")]
pub struct UnknownDifficulty(pub String);

impl FromStr for SmDifficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const NAMES: [(&str, SmDifficulty); 18] = [
            ("beginner", SmDifficulty::Beginner),
            ("easy", SmDifficulty::Easy),
            ("basic", SmDifficulty::Easy),
            ("light", SmDifficulty::Easy),
            ("medium", SmDifficulty::Medium),
            ("another", SmDifficulty::Medium),
            ("trick", SmDifficulty::Medium),
            ("standard", SmDifficulty::Medium),
            ("difficult", SmDifficulty::Medium),
            ("hard", SmDifficulty::Hard),
            ("ssr", SmDifficulty::Hard),
            ("maniac", SmDifficulty::Hard),
            ("heavy", SmDifficulty::Hard),
            ("challenge", SmDifficulty::Challenge),
            ("smaniac", SmDifficulty::Challenge),
            ("expert", SmDifficulty::Challenge),
            ("oni", SmDifficulty::Challenge),
            ("edit", SmDifficulty::Edit),
        ];
        let s = s.trim();
        NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|&(_, difficulty)| difficulty)
            .ok_or_else(|| UnknownDifficulty(s.to_string()))
    }
}

impl std::fmt::Display for SmDifficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Beginner => "Beginner",
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::Challenge => "Challenge",
            Self::Edit => "Edit",
        };
        f.write_str(name)
    }
}
