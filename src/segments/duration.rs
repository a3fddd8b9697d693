//! Duration/time-window segment: the summary that lets a route operator
//! evaluate a candidate concatenation's total duration and time warp
//! without walking every visit in between.

use crate::data::{Location, ProblemData, TimeWindow};
use crate::error::{checked_add, checked_sub, Result};

/// A very loose bound used as the identity segment's window. Chosen well
/// clear of `i64::MIN/MAX` so arithmetic against it never overflows.
const UNBOUNDED_EARLY: i64 = i64::MIN / 4;
const UNBOUNDED_LATE: i64 = i64::MAX / 4;

/// Summary of a contiguous route sub-sequence's duration and time-window
/// state.
///
/// Two segments `merge` into the summary for their concatenation in O(1),
/// which is what makes delta-cost evaluation for node and route operators
/// constant time regardless of route length. The merge is associative but
/// **not commutative**: `merge(a, b)` and `merge(b, a)` describe visiting
/// the same two sub-sequences in opposite order, and generally carry
/// different time warp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationSegment {
    first_index: Option<usize>,
    last_index: Option<usize>,
    duration: i64,
    time_warp: i64,
    earliest_start: i64,
    latest_start: i64,
    release_time: i64,
}

impl DurationSegment {
    /// The identity segment, representing an empty visit sequence: zero
    /// duration, zero time warp, and an unbounded feasible start window.
    pub fn identity() -> Self {
        Self {
            first_index: None,
            last_index: None,
            duration: 0,
            time_warp: 0,
            earliest_start: UNBOUNDED_EARLY,
            latest_start: UNBOUNDED_LATE,
            release_time: 0,
        }
    }

    /// Builds the single-visit segment for `location`.
    pub fn from_location(data: &ProblemData, location_idx: usize) -> Self {
        let (tw, service, release_time): (TimeWindow, i64, i64) = match data.location(location_idx)
        {
            Location::Depot(d) => (d.time_window(), 0, 0),
            Location::Client(c) => (c.time_window(), c.service_duration(), c.release_time()),
        };
        Self {
            first_index: Some(location_idx),
            last_index: Some(location_idx),
            duration: service,
            time_warp: 0,
            earliest_start: tw.early(),
            latest_start: tw.late(),
            release_time,
        }
    }

    pub fn first_index(&self) -> Option<usize> {
        self.first_index
    }

    pub fn last_index(&self) -> Option<usize> {
        self.last_index
    }

    pub fn duration(&self) -> i64 {
        self.duration
    }

    /// Time warp already accumulated strictly inside this segment, i.e.
    /// assuming the segment starts at its own `earliest_start`.
    pub fn time_warp(&self) -> i64 {
        self.time_warp
    }

    pub fn earliest_start(&self) -> i64 {
        self.earliest_start
    }

    pub fn latest_start(&self) -> i64 {
        self.latest_start
    }

    pub fn release_time(&self) -> i64 {
        self.release_time
    }

    /// Total time warp of this segment once a release time floor is
    /// applied to its start, i.e. what a route's overall duration feasibility
    /// check should read.
    pub fn total_time_warp(&self) -> i64 {
        if self.first_index.is_none() {
            return 0;
        }
        self.time_warp + 0.max(self.release_time - self.earliest_start)
    }

    /// Merges `first` followed by `second`, joined by `travel` (the
    /// duration-matrix entry from `first`'s last location to `second`'s
    /// first). Returns an error only on arithmetic overflow.
    pub fn merge(travel: i64, first: &Self, second: &Self) -> Result<Self> {
        if first.last_index.is_none() {
            return Ok(*second);
        }
        if second.first_index.is_none() {
            return Ok(*first);
        }

        // Real elapsed time from `first`'s earliest start to arrival at
        // `second`'s first location, assuming no additional delay.
        let shift = checked_sub(first.duration, first.time_warp, "duration segment shift")?;
        let shift = checked_add(shift, travel, "duration segment shift")?;
        let arrival = checked_add(first.earliest_start, shift, "duration segment arrival")?;

        let wait = 0.max(second.earliest_start.saturating_sub(arrival));
        let duration = checked_add(first.duration, travel, "duration segment duration")?;
        let duration = checked_add(duration, wait, "duration segment duration")?;
        let duration = checked_add(duration, second.duration, "duration segment duration")?;

        let warp_at_junction = 0.max(arrival.saturating_sub(second.latest_start));
        let time_warp = checked_add(first.time_warp, second.time_warp, "duration segment warp")?;
        let time_warp = checked_add(time_warp, warp_at_junction, "duration segment warp")?;

        let latest_start = first
            .latest_start
            .min(second.latest_start.saturating_sub(shift));

        Ok(Self {
            first_index: first.first_index,
            last_index: second.last_index,
            duration,
            time_warp,
            earliest_start: first.earliest_start,
            latest_start,
            release_time: first.release_time.max(second.release_time),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Hand-built segments bypassing `from_location`, matching the shape
    // PyVRP's own duration-segment test suite exercises.
    fn seg(duration: i64, time_warp: i64, early: i64, late: i64, release: i64) -> DurationSegment {
        DurationSegment {
            first_index: Some(0),
            last_index: Some(0),
            duration,
            time_warp,
            earliest_start: early,
            latest_start: late,
            release_time: release,
        }
    }

    #[test]
    fn test_merge_two_no_existing_warp() {
        let a = seg(5, 0, 0, 5, 0);
        let b = seg(0, 5, 3, 6, 0);
        let merged = DurationSegment::merge(4, &a, &b).unwrap();
        assert_eq!(merged.total_time_warp(), 8);
    }

    #[test]
    fn test_merge_two_with_release_time() {
        let a = seg(5, 0, 0, 5, 0);
        let b = seg(0, 5, 3, 6, 3);
        let merged = DurationSegment::merge(4, &a, &b).unwrap();
        assert_eq!(merged.total_time_warp(), 11);
    }

    #[test]
    fn test_merge_three() {
        let a = seg(5, 0, 0, 5, 0);
        let b = seg(0, 0, 3, 6, 0);
        let c = seg(0, 0, 2, 3, 2);
        let ab = DurationSegment::merge(4, &a, &b).unwrap();
        let abc = DurationSegment::merge(4, &ab, &c).unwrap();
        assert_eq!(abc.total_time_warp(), 12);
    }

    #[test]
    fn test_merge_is_not_commutative() {
        let a = seg(5, 1, 0, 5, 0);
        let b = seg(1, 1, 3, 6, 0);
        let ab = DurationSegment::merge(4, &a, &b).unwrap();
        let ba = DurationSegment::merge(3, &b, &a).unwrap();
        assert_eq!(ab.total_time_warp(), 4);
        assert_eq!(ba.total_time_warp(), 3);
        assert_ne!(ab.total_time_warp(), ba.total_time_warp());
    }

    #[test]
    fn test_identity_is_merge_neutral() {
        let a = seg(5, 1, 0, 5, 0);
        let id = DurationSegment::identity();
        let merged = DurationSegment::merge(0, &id, &a).unwrap();
        assert_eq!(merged.duration(), a.duration());
        assert_eq!(merged.time_warp(), a.time_warp());
    }
}
