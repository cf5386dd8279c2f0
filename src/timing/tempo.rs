//! The tempo map and the beat to tick placement.

use std::cmp::Ordering;

use super::{TimingError, sorted_points};
use crate::util::round_half_even;

/// A tempo declared from `beat` until the next point. A negative `bpm` marks a warp.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TempoPoint {
    /// Beat where the tempo starts.
    pub beat: f64,
    /// Beats per minute.
    pub bpm: f64,
}

/// How the declared audio offset is split between the header and the note ticks.
///
/// A positive offset is written to the header as is and does not move notes. Otherwise it is converted into ticks
/// with the tempo at beat 0 and added to every placed beat. The offset is never applied in both places.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedOffset {
    /// Offset written to the header, in seconds, as declared.
    pub header_secs: f64,
    /// Ticks added to every [`TempoSchedule::ticks_for_beat`] result.
    pub tick_offset: f64,
}

impl ResolvedOffset {
    /// Splits `offset_secs`, the audio offset declared by the simfile.
    #[must_use]
    pub fn resolve(offset_secs: f64, initial_bpm: f64, resolution: u32) -> Self {
        if offset_secs > 0.0 {
            Self {
                header_secs: offset_secs,
                tick_offset: 0.0,
            }
        } else {
            let minutes = offset_secs / 60.0;
            Self {
                header_secs: 0.0,
                tick_offset: -minutes * initial_bpm * f64::from(resolution),
            }
        }
    }
}

/// An entry of the sync track: a tempo change at a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SyncEntry {
    /// Tick of the change, never negative.
    pub tick: u64,
    /// Tempo multiplied by 1000.
    pub bpm_value: i64,
}

/// Ordered tempo map with the tick placement of beats.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TempoSchedule {
    points: Vec<TempoPoint>,
    resolution: u32,
    offset: ResolvedOffset,
}

impl TempoSchedule {
    /// Creates a schedule with no audio offset.
    ///
    /// # Errors
    ///
    /// Fails when no point is placed at beat 0, when two points share a beat, when a value is not finite, or when
    /// `resolution` is zero.
    pub fn new(
        points: impl IntoIterator<Item = TempoPoint>,
        resolution: u32,
    ) -> Result<Self, TimingError> {
        if resolution == 0 {
            return Err(TimingError::ZeroResolution);
        }
        let points = sorted_points(points, |point| (point.beat, point.bpm))?;
        if !points
            .iter()
            .any(|point| point.beat.partial_cmp(&0.0).is_some_and(Ordering::is_eq))
        {
            return Err(TimingError::MissingInitialTempo);
        }
        Ok(Self {
            points,
            resolution,
            offset: ResolvedOffset::default(),
        })
    }

    /// Applies the audio offset of the simfile, in seconds.
    #[must_use]
    pub fn with_audio_offset(mut self, offset_secs: f64) -> Self {
        self.offset = ResolvedOffset::resolve(offset_secs, self.tempo_at(0.0), self.resolution);
        self
    }

    /// Tempo points in beat order.
    #[must_use]
    pub fn points(&self) -> &[TempoPoint] {
        &self.points
    }

    /// Ticks per beat.
    #[must_use]
    pub const fn resolution(&self) -> u32 {
        self.resolution
    }

    /// The offset split applied by [`Self::with_audio_offset`].
    #[must_use]
    pub const fn offset(&self) -> ResolvedOffset {
        self.offset
    }

    /// Places `beat` onto the tick grid, including the tick offset.
    #[must_use]
    pub fn ticks_for_beat(&self, beat: f64) -> i64 {
        round_half_even(beat * f64::from(self.resolution) + self.offset.tick_offset)
    }

    /// Tempo of the latest point at or before `beat`.
    ///
    /// Beats before the first point use the first point.
    #[must_use]
    pub fn tempo_at(&self, beat: f64) -> f64 {
        let idx = self.points.partition_point(|point| point.beat <= beat);
        idx.checked_sub(1)
            .and_then(|idx| self.points.get(idx))
            .or_else(|| self.points.first())
            .map_or(0.0, |point| point.bpm)
    }

    /// Sync track entries, one for each tempo point.
    #[must_use]
    pub fn sync_track(&self) -> Vec<SyncEntry> {
        self.points
            .iter()
            .map(|point| SyncEntry {
                tick: self.ticks_for_beat(point.beat).max(0) as u64,
                bpm_value: round_half_even(point.bpm * 1000.0),
            })
            .collect()
    }
}
