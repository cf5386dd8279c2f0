//! Stops: pauses that advance ticks without advancing beats.

use super::{TempoSchedule, TimingError, sorted_points};

/// A pause of `seconds` inserted at `beat`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StopPoint {
    /// Beat where the chart stops.
    pub beat: f64,
    /// Length of the pause in seconds.
    pub seconds: f64,
}

/// Which stops count toward a note placed at some beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopPolicy {
    /// Stops placed exactly on the note also delay it.
    #[default]
    AtOrBefore,
    /// Only stops strictly before the note delay it.
    Before,
}

impl StopPolicy {
    fn counts(self, stop_beat: f64, beat: f64) -> bool {
        match self {
            Self::AtOrBefore => stop_beat <= beat,
            Self::Before => stop_beat < beat,
        }
    }
}

/// Ordered stop map.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StopSchedule {
    points: Vec<StopPoint>,
    policy: StopPolicy,
}

impl StopSchedule {
    /// Creates a schedule from stop points in any order.
    ///
    /// # Errors
    ///
    /// Fails when two stops share a beat or a value is not finite.
    pub fn new(
        points: impl IntoIterator<Item = StopPoint>,
        policy: StopPolicy,
    ) -> Result<Self, TimingError> {
        let points = sorted_points(points, |point| (point.beat, point.seconds))?;
        Ok(Self { points, policy })
    }

    /// Stop points in beat order.
    #[must_use]
    pub fn points(&self) -> &[StopPoint] {
        &self.points
    }

    /// The comparison used against note beats.
    #[must_use]
    pub const fn policy(&self) -> StopPolicy {
        self.policy
    }

    /// Total seconds of the stops that delay a note at `beat`.
    #[must_use]
    pub fn seconds_until(&self, beat: f64) -> f64 {
        let count = self
            .points
            .partition_point(|point| self.policy.counts(point.beat, beat));
        self.points.iter().take(count).map(|point| point.seconds).sum()
    }

    /// Ticks to insert before a note at `beat`, converted with the tempo active at `beat`.
    ///
    /// The result is fractional. The caller rounds once, after adding it to the note tick.
    #[must_use]
    pub fn offset_ticks(&self, beat: f64, tempo: &TempoSchedule) -> f64 {
        self.seconds_until(beat) * tempo.tempo_at(beat) * f64::from(tempo.resolution()) / 60.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::TempoPoint;

    fn tempo(points: &[(f64, f64)]) -> TempoSchedule {
        TempoSchedule::new(
            points.iter().map(|&(beat, bpm)| TempoPoint { beat, bpm }),
            192,
        )
        .unwrap()
    }

    fn stops(points: &[(f64, f64)], policy: StopPolicy) -> StopSchedule {
        StopSchedule::new(
            points
                .iter()
                .map(|&(beat, seconds)| StopPoint { beat, seconds }),
            policy,
        )
        .unwrap()
    }

    #[test]
    fn empty_schedule_adds_nothing() {
        let tempo = tempo(&[(0.0, 120.0)]);
        let stops = StopSchedule::default();
        assert_eq!(stops.offset_ticks(100.0, &tempo), 0.0);
    }

    #[test]
    fn policies_differ_only_on_the_stop_beat() {
        let tempo = tempo(&[(0.0, 120.0)]);
        let inclusive = stops(&[(4.0, 0.5)], StopPolicy::AtOrBefore);
        let exclusive = stops(&[(4.0, 0.5)], StopPolicy::Before);
        assert_eq!(exclusive.policy(), StopPolicy::Before);

        assert_eq!(inclusive.offset_ticks(3.9, &tempo), 0.0);
        assert_eq!(exclusive.offset_ticks(3.9, &tempo), 0.0);
        // 0.5 s at 120 BPM is one beat.
        assert_eq!(inclusive.offset_ticks(4.0, &tempo), 192.0);
        assert_eq!(exclusive.offset_ticks(4.0, &tempo), 0.0);
        assert_eq!(inclusive.offset_ticks(4.1, &tempo), 192.0);
        assert_eq!(exclusive.offset_ticks(4.1, &tempo), 192.0);
    }

    #[test]
    fn stops_accumulate_with_tempo_at_query() {
        let tempo = tempo(&[(0.0, 120.0), (8.0, 240.0)]);
        let stops = stops(&[(2.0, 0.5), (6.0, 0.25)], StopPolicy::AtOrBefore);
        assert_eq!(stops.seconds_until(7.0), 0.75);
        assert_eq!(stops.offset_ticks(7.0, &tempo), 288.0);
        // The same stops count double once the tempo doubles.
        assert_eq!(stops.offset_ticks(9.0, &tempo), 576.0);
    }

    #[test]
    fn unsorted_points_are_ordered() {
        let stops = stops(&[(6.0, 1.0), (2.0, 2.0)], StopPolicy::Before);
        assert_eq!(stops.points()[0].beat, 2.0);
        assert_eq!(stops.seconds_until(3.0), 2.0);
    }
}
