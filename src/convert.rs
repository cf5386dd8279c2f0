//! Converting a parsed [`SmDocument`] into a [`Chart`].
//!
//! One call of [`convert_sm`] is one conversion pass: the schedules are built from the document, every selected
//! `#NOTES` block is resolved against them, and the results are assembled into the target document.

use std::collections::{BTreeMap, btree_map::Entry};

use thiserror::Error;

use crate::{
    chart::{Chart, ChartDifficulty, ChartNote, NOTE_FRETS, NoteTrack, SongSection, SyncEvent},
    resolve::{NoteGridResolver, ResolveError, TimedNote},
    sm::{NotesBlock, SmDifficulty, SmDocument},
    timing::{
        DEFAULT_RESOLUTION, StopPolicy, StopSchedule, TempoSchedule, TimingError, WarpRanges,
    },
};

/// Options of a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvertConfig {
    /// Ticks per beat of the output.
    pub resolution: u32,
    /// Whether a stop exactly on a note's beat delays that note.
    pub stop_policy: StopPolicy,
    /// Whether notes inside negative tempo sections are dropped.
    pub filter_warps: bool,
    /// Only `#NOTES` blocks of this steps type are converted.
    pub steps_type: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            stop_policy: StopPolicy::default(),
            filter_warps: true,
            steps_type: "dance-single".into(),
        }
    }
}

impl ConvertConfig {
    /// Sets the ticks per beat.
    #[must_use]
    pub const fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution;
        self
    }

    /// Sets the stop policy.
    #[must_use]
    pub const fn with_stop_policy(mut self, stop_policy: StopPolicy) -> Self {
        self.stop_policy = stop_policy;
        self
    }

    /// Enables or disables the warp filter.
    #[must_use]
    pub const fn with_warp_filter(mut self, filter_warps: bool) -> Self {
        self.filter_warps = filter_warps;
        self
    }

    /// Sets the steps type to convert.
    #[must_use]
    pub fn with_steps_type(mut self, steps_type: impl Into<String>) -> Self {
        self.steps_type = steps_type.into();
        self
    }
}

/// A `#NOTES` block that was not converted, or was converted with loss.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConvertWarning {
    /// The block is for another steps type.
    #[error("{difficulty} chart for `{steps_type}` is skipped")]
    OtherStepsType {
        /// Steps type of the block.
        steps_type: String,
        /// Difficulty of the block.
        difficulty: SmDifficulty,
    },
    /// The block has more lanes than the target has frets.
    #[error("{difficulty} chart for `{steps_type}` is skipped, because {lanes} lanes do not fit {} frets", NOTE_FRETS)]
    TooManyLanes {
        /// Steps type of the block.
        steps_type: String,
        /// Difficulty of the block.
        difficulty: SmDifficulty,
        /// Lanes of the grid.
        lanes: usize,
    },
    /// Another block already fills the slot.
    #[error("{difficulty} chart is skipped, because {slot:?} is already taken")]
    SlotTaken {
        /// Difficulty of the skipped block.
        difficulty: SmDifficulty,
        /// The slot it would go to.
        slot: ChartDifficulty,
    },
    /// Notes placed before tick 0 were moved to tick 0.
    #[error("{count} notes of {slot:?} were before tick 0 and moved to 0")]
    ClampedNotes {
        /// The slot.
        slot: ChartDifficulty,
        /// Number of moved notes.
        count: usize,
    },
}

/// A conversion failed.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConvertError {
    /// The tempo or stop map is unusable.
    #[error("invalid timing: {0}")]
    Timing(#[from] TimingError),
    /// A note grid could not be resolved.
    #[error("in {difficulty} chart: {source}")]
    Resolve {
        /// Difficulty of the failed block.
        difficulty: SmDifficulty,
        /// The cause.
        source: ResolveError,
    },
    /// No block matched the steps type.
    #[error("no `{0}` chart to convert")]
    NoPlayableCharts(String),
}

/// Output of [`convert_sm`].
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct ConvertOutput {
    /// The converted document.
    pub chart: Chart,
    /// Blocks skipped or altered.
    pub warnings: Vec<ConvertWarning>,
}

/// Slot of a difficulty, and whether it only fills an empty slot.
const fn slot_of(difficulty: SmDifficulty) -> (ChartDifficulty, bool) {
    match difficulty {
        SmDifficulty::Easy => (ChartDifficulty::Easy, false),
        SmDifficulty::Medium => (ChartDifficulty::Medium, false),
        SmDifficulty::Hard => (ChartDifficulty::Hard, false),
        SmDifficulty::Challenge => (ChartDifficulty::Expert, false),
        SmDifficulty::Beginner => (ChartDifficulty::Easy, true),
        SmDifficulty::Edit => (ChartDifficulty::Expert, true),
    }
}

/// Converts the document with `config`.
///
/// # Errors
///
/// Fails when the timing maps are unusable, when a selected note grid has a tail without a head, or when no block
/// matches [`ConvertConfig::steps_type`].
pub fn convert_sm(
    document: &SmDocument,
    config: &ConvertConfig,
) -> Result<ConvertOutput, ConvertError> {
    let tempo = TempoSchedule::new(document.tempo_points.iter().copied(), config.resolution)?
        .with_audio_offset(document.header.offset);
    let stops = StopSchedule::new(document.stop_points.iter().copied(), config.stop_policy)?;
    let warps = WarpRanges::from_tempo(&tempo);
    let mut resolver = NoteGridResolver::new(&tempo, &stops);
    if config.filter_warps {
        log::debug!("{} warp ranges", warps.ranges().len());
        resolver = resolver.with_warps(&warps);
    }

    let mut warnings = vec![];
    let slots = select_blocks(&document.charts, &config.steps_type, &mut warnings);
    if slots.is_empty() {
        for warning in &warnings {
            log::warn!("{warning}");
        }
        return Err(ConvertError::NoPlayableCharts(config.steps_type.clone()));
    }

    let mut tracks = Vec::with_capacity(slots.len());
    for (slot, block) in slots {
        let resolved = resolver
            .resolve(&block.grid)
            .map_err(|source| ConvertError::Resolve {
                difficulty: block.difficulty,
                source,
            })?;
        log::debug!(
            "{} chart into {slot:?}: {} notes",
            block.difficulty,
            resolved.len()
        );
        let (notes, clamped) = chart_notes(&resolved);
        if clamped > 0 {
            log::debug!("{clamped} notes of {slot:?} were before tick 0, moved to 0");
            warnings.push(ConvertWarning::ClampedNotes {
                slot,
                count: clamped,
            });
        }
        tracks.push(NoteTrack {
            difficulty: slot,
            notes,
        });
    }

    let header = &document.header;
    let song = SongSection {
        name: header.title.clone(),
        artist: header.artist.clone(),
        charter: header.credit.clone(),
        genre: header.genre.clone(),
        offset: tempo.offset().header_secs,
        resolution: config.resolution,
        preview_start: header.sample_start,
        preview_end: header.sample_start + header.sample_length,
        music_stream: header.music.clone(),
    };
    let sync_track = std::iter::once(SyncEvent::TimeSignature {
        tick: 0,
        numerator: 4,
    })
    .chain(tempo.sync_track().into_iter().map(SyncEvent::from))
    .collect();

    Ok(ConvertOutput {
        chart: Chart {
            song,
            sync_track,
            tracks,
        },
        warnings,
    })
}

/// Picks at most one block per slot. Primary difficulties are placed before fallbacks, then source order decides.
fn select_blocks<'a>(
    blocks: &'a [NotesBlock],
    steps_type: &str,
    warnings: &mut Vec<ConvertWarning>,
) -> BTreeMap<ChartDifficulty, &'a NotesBlock> {
    let mut matching = vec![];
    for block in blocks {
        if !block.steps_type.eq_ignore_ascii_case(steps_type) {
            log::debug!(
                "skipping {} chart for `{}`",
                block.difficulty,
                block.steps_type
            );
            warnings.push(ConvertWarning::OtherStepsType {
                steps_type: block.steps_type.clone(),
                difficulty: block.difficulty,
            });
        } else if block.grid.lanes > NOTE_FRETS {
            log::debug!(
                "skipping {} chart with {} lanes",
                block.difficulty,
                block.grid.lanes
            );
            warnings.push(ConvertWarning::TooManyLanes {
                steps_type: block.steps_type.clone(),
                difficulty: block.difficulty,
                lanes: block.grid.lanes,
            });
        } else {
            matching.push(block);
        }
    }

    let mut slots = BTreeMap::new();
    for pass_fallbacks in [false, true] {
        for &block in &matching {
            let (slot, is_fallback) = slot_of(block.difficulty);
            if is_fallback != pass_fallbacks {
                continue;
            }
            match slots.entry(slot) {
                Entry::Vacant(entry) => {
                    entry.insert(block);
                }
                Entry::Occupied(_) => {
                    log::debug!("skipping {} chart, {slot:?} is taken", block.difficulty);
                    warnings.push(ConvertWarning::SlotTaken {
                        difficulty: block.difficulty,
                        slot,
                    });
                }
            }
        }
    }
    slots
}

/// Converts to output notes, returning how many were clamped to tick 0.
fn chart_notes(resolved: &[TimedNote]) -> (Vec<ChartNote>, usize) {
    let clamped = resolved.iter().filter(|note| note.tick < 0).count();
    let notes = resolved
        .iter()
        .map(|note| ChartNote {
            tick: note.tick.max(0) as u64,
            fret: note.direction,
            sustain: note.duration.max(0) as u64,
        })
        .collect();
    (notes, clamped)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        sm::{Measure, NoteCode, NoteGrid, Row, SmHeader},
        timing::{StopPoint, TempoPoint},
    };

    fn grid(rows: &[&str]) -> NoteGrid {
        NoteGrid {
            measures: vec![Measure {
                rows: rows
                    .iter()
                    .map(|row| Row(row.chars().filter_map(NoteCode::from_char).collect()))
                    .collect(),
            }],
            lanes: 4,
        }
    }

    fn block(difficulty: SmDifficulty, rows: &[&str]) -> NotesBlock {
        NotesBlock {
            steps_type: "dance-single".into(),
            description: String::new(),
            difficulty,
            meter: Some(1),
            grid: grid(rows),
        }
    }

    fn document(charts: Vec<NotesBlock>) -> SmDocument {
        SmDocument {
            header: SmHeader {
                title: "Song".into(),
                offset: 0.0,
                sample_start: 10.0,
                sample_length: 5.0,
                ..SmHeader::default()
            },
            tempo_points: vec![TempoPoint {
                beat: 0.0,
                bpm: 120.0,
            }],
            stop_points: vec![],
            charts,
        }
    }

    fn slots(output: &ConvertOutput) -> Vec<ChartDifficulty> {
        output
            .chart
            .tracks
            .iter()
            .map(|track| track.difficulty)
            .collect()
    }

    #[test]
    fn primary_difficulties_win_over_fallbacks() {
        let document = document(vec![
            block(SmDifficulty::Edit, &["1000"]),
            block(SmDifficulty::Beginner, &["0100"]),
            block(SmDifficulty::Challenge, &["0010"]),
            block(SmDifficulty::Hard, &["0001"]),
        ]);
        let output = convert_sm(&document, &ConvertConfig::default()).unwrap();
        assert_eq!(
            slots(&output),
            vec![
                ChartDifficulty::Easy,
                ChartDifficulty::Hard,
                ChartDifficulty::Expert
            ]
        );
        let expert = &output.chart.tracks[2];
        assert_eq!(expert.notes[0].fret, 2);
        assert_eq!(
            output.warnings,
            vec![ConvertWarning::SlotTaken {
                difficulty: SmDifficulty::Edit,
                slot: ChartDifficulty::Expert
            }]
        );
    }

    #[test]
    fn later_duplicates_are_dropped() {
        let document = document(vec![
            block(SmDifficulty::Medium, &["1000"]),
            block(SmDifficulty::Medium, &["0001"]),
        ]);
        let output = convert_sm(&document, &ConvertConfig::default()).unwrap();
        assert_eq!(output.chart.tracks.len(), 1);
        assert_eq!(output.chart.tracks[0].notes[0].fret, 0);
        assert_eq!(output.warnings.len(), 1);
    }

    #[test]
    fn other_steps_types_leave_nothing_to_convert() {
        let mut doubles = block(SmDifficulty::Hard, &["1000"]);
        doubles.steps_type = "dance-double".into();
        let document = document(vec![doubles]);
        assert_eq!(
            convert_sm(&document, &ConvertConfig::default()),
            Err(ConvertError::NoPlayableCharts("dance-single".into()))
        );
        let output = convert_sm(
            &document,
            &ConvertConfig::default().with_steps_type("dance-double"),
        )
        .unwrap();
        assert_eq!(slots(&output), vec![ChartDifficulty::Hard]);
    }

    #[test]
    fn grids_wider_than_the_frets_are_skipped() {
        let mut doubles = block(SmDifficulty::Hard, &["00000100"]);
        doubles.steps_type = "dance-double".into();
        doubles.grid.lanes = 8;
        let mut warnings = vec![];
        let slots = select_blocks(std::slice::from_ref(&doubles), "dance-double", &mut warnings);
        assert!(slots.is_empty());
        assert_eq!(
            warnings,
            vec![ConvertWarning::TooManyLanes {
                steps_type: "dance-double".into(),
                difficulty: SmDifficulty::Hard,
                lanes: 8,
            }]
        );
        assert_eq!(
            convert_sm(
                &document(vec![doubles]),
                &ConvertConfig::default().with_steps_type("dance-double"),
            ),
            Err(ConvertError::NoPlayableCharts("dance-double".into()))
        );
    }

    #[test]
    fn five_lanes_still_fit() {
        let mut pump = block(SmDifficulty::Medium, &["00001"]);
        pump.steps_type = "pump-single".into();
        pump.grid.lanes = 5;
        let output = convert_sm(
            &document(vec![pump]),
            &ConvertConfig::default().with_steps_type("pump-single"),
        )
        .unwrap();
        assert_eq!(output.warnings, vec![]);
        assert_eq!(output.chart.tracks[0].notes[0].fret, 4);
    }

    #[test]
    fn positive_offset_is_written_unrounded() {
        let mut document = document(vec![block(SmDifficulty::Easy, &["1000"])]);
        document.header.offset = 0.0125;
        let chart = convert_sm(&document, &ConvertConfig::default())
            .unwrap()
            .chart;
        assert_eq!(chart.song.offset, 0.0125);
        assert_eq!(chart.tracks[0].notes[0].tick, 0);
        assert!(chart.unparse().contains("  Offset = 0.0125\n"));
    }

    #[test]
    fn header_and_sync_track() {
        let mut document = document(vec![block(SmDifficulty::Easy, &["1000"])]);
        document.header.offset = 0.125;
        document.header.music = Some("song.ogg".into());
        document.tempo_points.push(TempoPoint {
            beat: 4.0,
            bpm: 180.5,
        });
        let chart = convert_sm(&document, &ConvertConfig::default())
            .unwrap()
            .chart;
        assert_eq!(chart.song.offset, 0.125);
        assert_eq!(chart.song.preview_end, 15.0);
        assert_eq!(chart.song.music_stream.as_deref(), Some("song.ogg"));
        assert_eq!(
            chart.sync_track,
            vec![
                SyncEvent::TimeSignature {
                    tick: 0,
                    numerator: 4
                },
                SyncEvent::Tempo {
                    tick: 0,
                    millibpm: 120000
                },
                SyncEvent::Tempo {
                    tick: 768,
                    millibpm: 180500
                },
            ]
        );
    }

    #[test]
    fn stop_policy_is_applied() {
        let mut document = document(vec![block(SmDifficulty::Easy, &["0000", "1000"])]);
        document.stop_points.push(StopPoint {
            beat: 2.0,
            seconds: 0.5,
        });
        let tick_of = |policy| {
            convert_sm(&document, &ConvertConfig::default().with_stop_policy(policy))
                .unwrap()
                .chart
                .tracks[0]
                .notes[0]
                .tick
        };
        assert_eq!(tick_of(StopPolicy::AtOrBefore), 384 + 192);
        assert_eq!(tick_of(StopPolicy::Before), 384);
    }

    #[test]
    fn orphan_tail_fails_the_conversion() {
        let document = document(vec![block(SmDifficulty::Hard, &["0030"])]);
        let error = convert_sm(&document, &ConvertConfig::default()).unwrap_err();
        assert!(matches!(
            error,
            ConvertError::Resolve {
                difficulty: SmDifficulty::Hard,
                source: ResolveError::OrphanHoldTail { lane: 2, .. },
            }
        ));
    }

    #[test]
    fn missing_initial_tempo_is_a_timing_error() {
        let mut document = document(vec![block(SmDifficulty::Easy, &["1000"])]);
        document.tempo_points[0].beat = 1.0;
        assert_eq!(
            convert_sm(&document, &ConvertConfig::default()),
            Err(ConvertError::Timing(TimingError::MissingInitialTempo))
        );
    }
}
