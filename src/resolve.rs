//! Turning a [`NoteGrid`] into placed notes.
//!
//! [`NoteGridResolver::scan`] walks the grid in time order and builds [`Note`]s, pairing each tail code with the
//! latest unmatched note of its lane. [`NoteGridResolver::place`] then adds the stop offset and drops notes inside
//! warps, yielding [`TimedNote`]s for the emitter.

use itertools::Itertools;
use thiserror::Error;

use crate::{
    sm::{NoteCode, NoteGrid},
    timing::{BEATS_PER_MEASURE, StopSchedule, TempoSchedule, WarpRanges},
    util::round_half_even,
};

/// What started a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoteKind {
    /// Code `1`.
    Tap,
    /// Code `2`.
    HoldHead,
    /// Code `4`.
    RollHead,
}

impl NoteKind {
    const fn from_code(code: NoteCode) -> Option<Self> {
        match code {
            NoteCode::Tap => Some(Self::Tap),
            NoteCode::HoldHead => Some(Self::HoldHead),
            NoteCode::RollHead => Some(Self::RollHead),
            _ => None,
        }
    }
}

/// A note found in the grid, before stops and warps.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Note {
    /// Beat of the row.
    pub beat: f64,
    /// Lane index.
    pub direction: usize,
    /// Tick of the beat, audio offset included.
    pub tick: i64,
    /// Length in ticks, `0` until a tail closes it.
    pub duration: i64,
    /// The start code.
    pub kind: NoteKind,
}

impl std::fmt::Display for Note {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{beat {}, lane {}, tick {}, duration {}}}",
            self.beat, self.direction, self.tick, self.duration
        )
    }
}

/// A note at its final tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimedNote {
    /// Final tick, may be negative before emission.
    pub tick: i64,
    /// Lane index.
    pub direction: usize,
    /// Length in ticks.
    pub duration: i64,
    /// The start code.
    pub kind: NoteKind,
}

/// A grid could not be resolved.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResolveError {
    /// A tail code has no open note in its lane.
    #[error("hold tail at beat {beat} in lane {lane} has no open note; notes so far: [{}]", .notes.iter().join(", "))]
    OrphanHoldTail {
        /// Lane of the tail.
        lane: usize,
        /// Beat of the tail.
        beat: f64,
        /// Notes scanned before the tail.
        notes: Vec<Note>,
    },
}

/// Resolves note grids against one song's timing.
#[derive(Debug, Clone, Copy)]
pub struct NoteGridResolver<'a> {
    tempo: &'a TempoSchedule,
    stops: &'a StopSchedule,
    warps: Option<&'a WarpRanges>,
}

impl<'a> NoteGridResolver<'a> {
    /// Creates a resolver without warp filtering.
    #[must_use]
    pub const fn new(tempo: &'a TempoSchedule, stops: &'a StopSchedule) -> Self {
        Self {
            tempo,
            stops,
            warps: None,
        }
    }

    /// Drops notes inside `warps` when placing.
    #[must_use]
    pub const fn with_warps(mut self, warps: &'a WarpRanges) -> Self {
        self.warps = Some(warps);
        self
    }

    /// Scans the grid into notes, in row order and then lane order.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::OrphanHoldTail`] when a tail code finds no open note in its lane.
    pub fn scan(&self, grid: &NoteGrid) -> Result<Vec<Note>, ResolveError> {
        let resolution = f64::from(self.tempo.resolution());
        let mut notes: Vec<Note> = vec![];
        let mut open: Vec<Vec<usize>> = vec![vec![]; grid.lanes];
        for (measure_idx, measure) in grid.measures.iter().enumerate() {
            let metric = BEATS_PER_MEASURE / measure.rows.len() as f64;
            let measure_beat = measure_idx as f64 * BEATS_PER_MEASURE;
            for (row_idx, row) in measure.rows.iter().enumerate() {
                if row.is_blank() {
                    continue;
                }
                let beat = measure_beat + row_idx as f64 * metric;
                for (lane, &code) in row.codes().iter().enumerate() {
                    if let Some(kind) = NoteKind::from_code(code) {
                        if let Some(stack) = open.get_mut(lane) {
                            stack.push(notes.len());
                        }
                        notes.push(Note {
                            beat,
                            direction: lane,
                            tick: self.tempo.ticks_for_beat(beat),
                            duration: 0,
                            kind,
                        });
                        continue;
                    }
                    if code != NoteCode::Tail {
                        continue;
                    }
                    let head = open
                        .get_mut(lane)
                        .and_then(Vec::pop)
                        .and_then(|idx| notes.get_mut(idx));
                    let Some(head) = head else {
                        return Err(ResolveError::OrphanHoldTail { lane, beat, notes });
                    };
                    head.duration = round_half_even((beat - head.beat) * resolution);
                }
            }
        }
        Ok(notes)
    }

    /// Applies stops and the warp filter. The order of `notes` is kept.
    #[must_use]
    pub fn place(&self, notes: &[Note]) -> Vec<TimedNote> {
        notes
            .iter()
            .filter(|note| {
                self.warps
                    .is_none_or(|warps| !warps.is_blacklisted(note.beat))
            })
            .map(|note| TimedNote {
                tick: round_half_even(
                    note.tick as f64 + self.stops.offset_ticks(note.beat, self.tempo),
                ),
                direction: note.direction,
                duration: note.duration,
                kind: note.kind,
            })
            .collect()
    }

    /// [`scan`](Self::scan) followed by [`place`](Self::place).
    ///
    /// # Errors
    ///
    /// See [`scan`](Self::scan).
    pub fn resolve(&self, grid: &NoteGrid) -> Result<Vec<TimedNote>, ResolveError> {
        let notes = self.scan(grid)?;
        Ok(self.place(&notes))
    }
}
