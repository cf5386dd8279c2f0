//! The tick-indexed `.chart` document.
//!
//! A [`Chart`] is what the converter produces and what [`Chart::unparse`] writes. Every time value is in ticks, with
//! [`SongSection::resolution`] ticks per beat.

mod unparse;

use crate::timing::SyncEntry;

/// A whole `.chart` document.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chart {
    /// `[Song]`.
    pub song: SongSection,
    /// `[SyncTrack]`, ordered by tick.
    pub sync_track: Vec<SyncEvent>,
    /// Note tracks, at most one per difficulty, ordered by difficulty.
    pub tracks: Vec<NoteTrack>,
}

/// Metadata of the `[Song]` section.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SongSection {
    /// `Name`.
    pub name: String,
    /// `Artist`.
    pub artist: Option<String>,
    /// `Charter`.
    pub charter: Option<String>,
    /// `Genre`.
    pub genre: Option<String>,
    /// `Offset` in seconds.
    pub offset: f64,
    /// `Resolution`, ticks per beat.
    pub resolution: u32,
    /// `PreviewStart` in seconds.
    pub preview_start: f64,
    /// `PreviewEnd` in seconds.
    pub preview_end: f64,
    /// `MusicStream`, the audio file name.
    pub music_stream: Option<String>,
}

/// An entry of the `[SyncTrack]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SyncEvent {
    /// `tick = TS numerator`.
    TimeSignature {
        /// Tick of the change.
        tick: u64,
        /// Beats per measure.
        numerator: u32,
    },
    /// `tick = B value`.
    Tempo {
        /// Tick of the change.
        tick: u64,
        /// Beats per minute, times 1000.
        millibpm: i64,
    },
}

impl SyncEvent {
    /// Tick of the event.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        match self {
            Self::TimeSignature { tick, .. } | Self::Tempo { tick, .. } => *tick,
        }
    }
}

impl From<SyncEntry> for SyncEvent {
    fn from(entry: SyncEntry) -> Self {
        Self::Tempo {
            tick: entry.tick,
            millibpm: entry.bpm_value,
        }
    }
}

/// Difficulty of a note track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChartDifficulty {
    /// `[EasySingle]`.
    Easy,
    /// `[MediumSingle]`.
    Medium,
    /// `[HardSingle]`.
    Hard,
    /// `[ExpertSingle]`.
    Expert,
}

impl ChartDifficulty {
    /// Name of the section holding this difficulty.
    #[must_use]
    pub const fn section_name(self) -> &'static str {
        match self {
            Self::Easy => "EasySingle",
            Self::Medium => "MediumSingle",
            Self::Hard => "HardSingle",
            Self::Expert => "ExpertSingle",
        }
    }
}

/// Notes of one difficulty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteTrack {
    /// The difficulty.
    pub difficulty: ChartDifficulty,
    /// Notes in scan order.
    pub notes: Vec<ChartNote>,
}

/// Number of frets a note can use. Frets from this one up carry the marker events.
pub const NOTE_FRETS: usize = 5;

/// A note, `tick = N fret sustain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartNote {
    /// Tick of the note.
    pub tick: u64,
    /// Lane.
    pub fret: usize,
    /// Hold length in ticks, `0` for a tap.
    pub sustain: u64,
}
