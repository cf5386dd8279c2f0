//! Beat intervals rewound by negative tempo.
//!
//! A negative tempo from beat `s` until the next point at beat `e` scrolls the chart backward. By the time playback
//! moves forward again, every beat up to `s + 2 * (e - s)` has already been shown once, so notes written inside that
//! interval have no place in a tick-monotonic chart.

use itertools::Itertools;

use super::TempoSchedule;

/// A closed beat interval whose notes are dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WarpRange {
    /// First rewound beat, the beat of the negative tempo point.
    pub start: f64,
    /// Last rewound beat.
    pub end: f64,
}

impl WarpRange {
    /// Whether `beat` lies inside the interval, bounds included.
    #[must_use]
    pub fn contains(&self, beat: f64) -> bool {
        self.start <= beat && beat <= self.end
    }
}

/// All warp intervals of a tempo map.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WarpRanges {
    ranges: Vec<WarpRange>,
}

impl WarpRanges {
    /// Collects the intervals of every negative tempo point followed by another point.
    ///
    /// A negative tempo on the last point never closes and yields nothing.
    #[must_use]
    pub fn from_tempo(tempo: &TempoSchedule) -> Self {
        let ranges = tempo
            .points()
            .iter()
            .tuple_windows()
            .filter(|(point, _)| point.bpm < 0.0)
            .map(|(point, next)| WarpRange {
                start: point.beat,
                end: point.beat + 2.0 * (next.beat - point.beat),
            })
            .collect();
        Self { ranges }
    }

    /// The collected intervals in beat order.
    #[must_use]
    pub fn ranges(&self) -> &[WarpRange] {
        &self.ranges
    }

    /// Whether a note at `beat` falls into a rewound interval.
    #[must_use]
    pub fn is_blacklisted(&self, beat: f64) -> bool {
        self.ranges.iter().any(|range| range.contains(beat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::TempoPoint;

    fn warps(points: &[(f64, f64)]) -> WarpRanges {
        let tempo = TempoSchedule::new(
            points.iter().map(|&(beat, bpm)| TempoPoint { beat, bpm }),
            192,
        )
        .unwrap();
        WarpRanges::from_tempo(&tempo)
    }

    #[test]
    fn negative_segment_doubles_its_span() {
        let warps = warps(&[(0.0, 120.0), (8.0, -120.0), (16.0, 140.0)]);
        assert_eq!(
            warps.ranges(),
            &[WarpRange {
                start: 8.0,
                end: 24.0
            }]
        );
        assert!(warps.is_blacklisted(8.0));
        assert!(warps.is_blacklisted(12.0));
        assert!(warps.is_blacklisted(24.0));
        assert!(!warps.is_blacklisted(7.99));
        assert!(!warps.is_blacklisted(24.01));
        assert!(!warps.is_blacklisted(32.01));
    }

    #[test]
    fn trailing_negative_tempo_never_closes() {
        let warps = warps(&[(0.0, 120.0), (8.0, -120.0)]);
        assert!(warps.ranges().is_empty());
        assert!(!warps.is_blacklisted(9.0));
    }

    #[test]
    fn consecutive_negative_points_each_open_a_range() {
        let warps = warps(&[(0.0, 120.0), (4.0, -60.0), (5.0, -30.0), (7.0, 120.0)]);
        assert_eq!(
            warps.ranges(),
            &[
                WarpRange {
                    start: 4.0,
                    end: 6.0
                },
                WarpRange {
                    start: 5.0,
                    end: 9.0
                },
            ]
        );
    }

    #[test]
    fn positive_map_has_no_warps() {
        let warps = warps(&[(0.0, 120.0), (16.0, 180.0)]);
        assert_eq!(warps, WarpRanges::default());
    }
}
