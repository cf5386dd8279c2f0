//! Beat to tick conversion.
//!
//! The target format counts time in ticks, `resolution` ticks per beat. Tempo changes do not move ticks, they are
//! written to the sync track instead. What does move ticks is:
//!
//! - the audio offset, folded into [`TempoSchedule::ticks_for_beat`] once,
//! - stops, converted from seconds with the tempo active at the note ([`StopSchedule::offset_ticks`]).
//!
//! Negative tempo sections rewind the chart in StepMania, which a tick-monotonic format cannot express. Notes inside
//! the rewound span are found by [`WarpRanges`].

pub mod stop;
pub mod tempo;
pub mod warp;

use thiserror::Error;

pub use self::{
    stop::{StopPoint, StopPolicy, StopSchedule},
    tempo::{ResolvedOffset, SyncEntry, TempoPoint, TempoSchedule},
    warp::{WarpRange, WarpRanges},
};

/// Ticks per beat used by the `.chart` format unless configured otherwise.
pub const DEFAULT_RESOLUTION: u32 = 192;

/// Beats in one measure of the note grid.
pub const BEATS_PER_MEASURE: f64 = 4.0;

/// An error occurred when building a schedule.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimingError {
    /// No tempo point is placed at beat 0.
    #[error("no tempo is declared at beat 0")]
    MissingInitialTempo,
    /// Two points share the same beat.
    #[error("two points are declared at beat {beat}")]
    DuplicateBeat {
        /// The shared beat.
        beat: f64,
    },
    /// A beat or value was `NaN` or infinite.
    #[error("non-finite timing value at beat {beat}")]
    NonFinite {
        /// The beat of the point.
        beat: f64,
    },
    /// The resolution was zero.
    #[error("resolution must be positive")]
    ZeroResolution,
}

/// Sorts points by beat and rejects duplicated or non-finite keys.
fn sorted_points<T>(
    points: impl IntoIterator<Item = T>,
    key: impl Fn(&T) -> (f64, f64),
) -> Result<Vec<T>, TimingError> {
    let mut points: Vec<T> = points.into_iter().collect();
    if let Some(bad) = points.iter().map(&key).find(|(beat, value)| {
        !beat.is_finite() || !value.is_finite()
    }) {
        return Err(TimingError::NonFinite { beat: bad.0 });
    }
    points.sort_by(|a, b| key(a).0.total_cmp(&key(b).0));
    let duplicate = points.windows(2).find_map(|pair| match pair {
        [a, b] if key(a).0.total_cmp(&key(b).0).is_eq() => Some(key(a).0),
        _ => None,
    });
    if let Some(beat) = duplicate {
        return Err(TimingError::DuplicateBeat { beat });
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_points_orders_by_beat() {
        let points = sorted_points(vec![(8.0, 1.0), (0.0, 2.0), (4.0, 3.0)], |&p| p).unwrap();
        assert_eq!(points, vec![(0.0, 2.0), (4.0, 3.0), (8.0, 1.0)]);
    }

    #[test]
    fn sorted_points_rejects_duplicates() {
        assert_eq!(
            sorted_points(vec![(4.0, 1.0), (4.0, 2.0)], |&p| p),
            Err(TimingError::DuplicateBeat { beat: 4.0 })
        );
    }

    #[test]
    fn sorted_points_rejects_nan() {
        assert_eq!(
            sorted_points(vec![(1.0, f64::NAN)], |&p| p),
            Err(TimingError::NonFinite { beat: 1.0 })
        );
    }
}
