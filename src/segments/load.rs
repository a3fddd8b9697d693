//! Load segment: cumulative delivery/pickup demand and the resulting
//! peak vehicle load for one capacity dimension across a route
//! sub-sequence.

use crate::data::{Location, ProblemData};
use crate::error::{checked_add, Result};

/// Summary of a contiguous route sub-sequence's load for a single
/// capacity dimension.
///
/// For a delivery-and-pickup fleet the vehicle's on-board load is not
/// simply the running delivery total: pickups collected early in the
/// route stay on board until the vehicle returns to the depot, so the
/// peak load can be driven by either direction of flow. `merge` accounts
/// for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSegment {
    delivery: i64,
    pickup: i64,
    load: i64,
}

impl LoadSegment {
    /// The identity segment: an empty visit sequence carries no load.
    pub fn identity() -> Self {
        Self {
            delivery: 0,
            pickup: 0,
            load: 0,
        }
    }

    /// Builds a segment directly from raw delivery/pickup totals, with
    /// load set to their max. Used to seed a fold with a vehicle's
    /// initial on-board load (modelled as pre-existing pickup).
    pub(crate) fn from_raw(delivery: i64, pickup: i64) -> Self {
        Self {
            delivery,
            pickup,
            load: delivery.max(pickup),
        }
    }

    /// Builds the single-visit segment for `location`'s `dimension`-th
    /// capacity dimension. Depots and dimension indices past a client's
    /// own load vectors contribute zero.
    pub fn from_location(data: &ProblemData, location_idx: usize, dimension: usize) -> Self {
        let (delivery, pickup) = match data.location(location_idx) {
            Location::Depot(_) => (0, 0),
            Location::Client(c) => (
                c.delivery().get(dimension).copied().unwrap_or(0),
                c.pickup().get(dimension).copied().unwrap_or(0),
            ),
        };
        Self {
            delivery,
            pickup,
            load: delivery.max(pickup),
        }
    }

    /// Total delivery demand collected along this segment.
    pub fn delivery(&self) -> i64 {
        self.delivery
    }

    /// Total pickup demand collected along this segment.
    pub fn pickup(&self) -> i64 {
        self.pickup
    }

    /// The peak on-board load reached somewhere within this segment.
    pub fn load(&self) -> i64 {
        self.load
    }

    /// Merges `first` followed by `second`. The peak load of the
    /// concatenation is whichever is larger: the load built up in
    /// `first` plus everything `second` still has to deliver, or the
    /// load built up in `second` plus everything `first` picked up and
    /// is still carrying.
    pub fn merge(first: &Self, second: &Self) -> Result<Self> {
        let delivery = checked_add(first.delivery, second.delivery, "load segment delivery")?;
        let pickup = checked_add(first.pickup, second.pickup, "load segment pickup")?;
        let via_first = checked_add(first.load, second.delivery, "load segment merge")?;
        let via_second = checked_add(second.load, first.pickup, "load segment merge")?;
        Ok(Self {
            delivery,
            pickup,
            load: via_first.max(via_second),
        })
    }

    /// Excess load over `capacity`, or zero if within capacity.
    pub fn excess_load(&self, capacity: i64) -> i64 {
        0.max(self.load - capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_delivery_only() {
        let a = LoadSegment {
            delivery: 5,
            pickup: 0,
            load: 5,
        };
        let b = LoadSegment {
            delivery: 3,
            pickup: 0,
            load: 3,
        };
        let merged = LoadSegment::merge(&a, &b).unwrap();
        assert_eq!(merged.delivery(), 8);
        assert_eq!(merged.load(), 8);
    }

    #[test]
    fn test_merge_pickup_stays_onboard() {
        // a picks up 4 units which must still be carried past b.
        let a = LoadSegment {
            delivery: 0,
            pickup: 4,
            load: 4,
        };
        let b = LoadSegment {
            delivery: 2,
            pickup: 0,
            load: 2,
        };
        let merged = LoadSegment::merge(&a, &b).unwrap();
        // via_first = a.load(4) + b.delivery(2) = 6
        // via_second = b.load(2) + a.pickup(4) = 6
        assert_eq!(merged.load(), 6);
    }

    #[test]
    fn test_merge_is_associative() {
        let a = LoadSegment {
            delivery: 2,
            pickup: 1,
            load: 2,
        };
        let b = LoadSegment {
            delivery: 3,
            pickup: 4,
            load: 4,
        };
        let c = LoadSegment {
            delivery: 1,
            pickup: 0,
            load: 1,
        };
        let ab_c = LoadSegment::merge(&LoadSegment::merge(&a, &b).unwrap(), &c).unwrap();
        let a_bc = LoadSegment::merge(&a, &LoadSegment::merge(&b, &c).unwrap()).unwrap();
        assert_eq!(ab_c, a_bc);
    }

    #[test]
    fn test_excess_load() {
        let seg = LoadSegment {
            delivery: 10,
            pickup: 0,
            load: 10,
        };
        assert_eq!(seg.excess_load(15), 0);
        assert_eq!(seg.excess_load(5), 5);
    }
}
