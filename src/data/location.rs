//! Client and depot location types.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A closed time interval `[early, late]` during which service may start.
///
/// Arriving before `early` means waiting; arriving after `late` incurs
/// time warp rather than being rejected outright — feasibility is a
/// property of the whole solution (see [`crate::evaluation::CostEvaluator`]),
/// not of a single time window.
///
/// # Examples
///
/// ```
/// use vrp_search_core::data::TimeWindow;
///
/// let tw = TimeWindow::new(100, 200).unwrap();
/// assert!(tw.early() <= tw.late());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    early: i64,
    late: i64,
}

impl TimeWindow {
    /// Creates a new time window. Returns `None` if `early > late`.
    pub fn new(early: i64, late: i64) -> Option<Self> {
        if early > late {
            return None;
        }
        Some(Self { early, late })
    }

    /// Earliest time at which service may start.
    pub fn early(&self) -> i64 {
        self.early
    }

    /// Latest time at which service may start without incurring time warp.
    pub fn late(&self) -> i64 {
        self.late
    }
}

/// A client to be visited: coordinates, loads, service duration, time
/// window, release time, prize, and group membership.
///
/// Invariants (checked by [`ProblemData`](super::ProblemData) construction,
/// not by this constructor, so that partially-built instances used in
/// tests remain cheap to create): `tw.early() <= tw.late()`, deliveries,
/// pickups, service duration, release time, and prize are non-negative,
/// and `release_time <= tw.late()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    x: i64,
    y: i64,
    delivery: Vec<i64>,
    pickup: Vec<i64>,
    service_duration: i64,
    time_window: TimeWindow,
    release_time: i64,
    prize: i64,
    required: bool,
    group: Option<usize>,
}

impl Client {
    /// Creates a new required client with no prize and no group.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        x: i64,
        y: i64,
        delivery: Vec<i64>,
        pickup: Vec<i64>,
        service_duration: i64,
        time_window: TimeWindow,
        release_time: i64,
    ) -> Self {
        Self {
            x,
            y,
            delivery,
            pickup,
            service_duration,
            time_window,
            release_time,
            prize: 0,
            required: true,
            group: None,
        }
    }

    /// Marks this client optional and assigns a collectible prize.
    pub fn with_prize(mut self, prize: i64) -> Self {
        self.prize = prize;
        self.required = false;
        self
    }

    /// Assigns this client to a mutually exclusive group.
    ///
    /// Members of a group must themselves be non-required (checked by
    /// [`ProblemData`](super::ProblemData)).
    pub fn with_group(mut self, group: usize) -> Self {
        self.group = Some(group);
        self.required = false;
        self
    }

    /// Explicitly overrides the `required` flag.
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn x(&self) -> i64 {
        self.x
    }

    pub fn y(&self) -> i64 {
        self.y
    }

    pub fn delivery(&self) -> &[i64] {
        &self.delivery
    }

    pub fn pickup(&self) -> &[i64] {
        &self.pickup
    }

    pub fn service_duration(&self) -> i64 {
        self.service_duration
    }

    pub fn time_window(&self) -> TimeWindow {
        self.time_window
    }

    pub fn release_time(&self) -> i64 {
        self.release_time
    }

    pub fn prize(&self) -> i64 {
        self.prize
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn group(&self) -> Option<usize> {
        self.group
    }

    pub(crate) fn validate(&self, idx: usize) -> Result<()> {
        if self.service_duration < 0 {
            return Err(Error::InvalidInput(format!(
                "client {idx}: service_duration must be non-negative"
            )));
        }
        if self.release_time < 0 {
            return Err(Error::InvalidInput(format!(
                "client {idx}: release_time must be non-negative"
            )));
        }
        if self.prize < 0 {
            return Err(Error::InvalidInput(format!(
                "client {idx}: prize must be non-negative"
            )));
        }
        if self.release_time > self.time_window.late() {
            return Err(Error::InvalidInput(format!(
                "client {idx}: release_time must not exceed tw_late"
            )));
        }
        if self.delivery.iter().any(|&d| d < 0) || self.pickup.iter().any(|&p| p < 0) {
            return Err(Error::InvalidInput(format!(
                "client {idx}: delivery/pickup must be non-negative"
            )));
        }
        if self.required && self.group.is_some() {
            return Err(Error::InvalidInput(format!(
                "client {idx}: group members must be non-required"
            )));
        }
        Ok(())
    }
}

/// A depot: coordinates, service duration, and a time window bounding the
/// whole day of operation at that location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Depot {
    x: i64,
    y: i64,
    service_duration: i64,
    time_window: TimeWindow,
}

impl Depot {
    /// Creates a new depot.
    pub fn new(x: i64, y: i64, service_duration: i64, time_window: TimeWindow) -> Self {
        Self {
            x,
            y,
            service_duration,
            time_window,
        }
    }

    pub fn x(&self) -> i64 {
        self.x
    }

    pub fn y(&self) -> i64 {
        self.y
    }

    pub fn service_duration(&self) -> i64 {
        self.service_duration
    }

    pub fn time_window(&self) -> TimeWindow {
        self.time_window
    }

    pub(crate) fn validate(&self, idx: usize) -> Result<()> {
        if self.service_duration < 0 {
            return Err(Error::InvalidInput(format!(
                "depot {idx}: service_duration must be non-negative"
            )));
        }
        Ok(())
    }
}

/// A location in the problem: either a client or a depot.
///
/// `ProblemData` stores locations in one contiguous, index-addressed list
/// with depots first, so this enum is mostly useful to callers that walk
/// the whole location list generically (e.g. the granular neighbourhood
/// computation, which must skip depots).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Location {
    Depot(Depot),
    Client(Client),
}

impl Location {
    pub fn x(&self) -> i64 {
        match self {
            Location::Depot(d) => d.x(),
            Location::Client(c) => c.x(),
        }
    }

    pub fn y(&self) -> i64 {
        match self {
            Location::Depot(d) => d.y(),
            Location::Client(c) => c.y(),
        }
    }

    pub fn service_duration(&self) -> i64 {
        match self {
            Location::Depot(d) => d.service_duration(),
            Location::Client(c) => c.service_duration(),
        }
    }

    pub fn time_window(&self) -> TimeWindow {
        match self {
            Location::Depot(d) => d.time_window(),
            Location::Client(c) => c.time_window(),
        }
    }

    pub fn is_depot(&self) -> bool {
        matches!(self, Location::Depot(_))
    }

    pub fn as_client(&self) -> Option<&Client> {
        match self {
            Location::Client(c) => Some(c),
            Location::Depot(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_window_valid() {
        let tw = TimeWindow::new(10, 20).expect("valid");
        assert_eq!(tw.early(), 10);
        assert_eq!(tw.late(), 20);
    }

    #[test]
    fn test_time_window_invalid() {
        assert!(TimeWindow::new(20, 10).is_none());
    }

    #[test]
    fn test_time_window_degenerate_is_valid() {
        assert!(TimeWindow::new(5, 5).is_some());
    }

    #[test]
    fn test_client_defaults() {
        let tw = TimeWindow::new(0, 100).unwrap();
        let c = Client::new(1, 2, vec![5], vec![0], 3, tw, 0);
        assert!(c.required());
        assert_eq!(c.prize(), 0);
        assert!(c.group().is_none());
    }

    #[test]
    fn test_client_with_prize_clears_required() {
        let tw = TimeWindow::new(0, 100).unwrap();
        let c = Client::new(1, 2, vec![5], vec![0], 3, tw, 0).with_prize(7);
        assert!(!c.required());
        assert_eq!(c.prize(), 7);
    }

    #[test]
    fn test_client_validate_release_after_due() {
        let tw = TimeWindow::new(0, 10).unwrap();
        let c = Client::new(1, 2, vec![0], vec![0], 0, tw, 20);
        assert!(c.validate(0).is_err());
    }

    #[test]
    fn test_client_validate_required_group_member_rejected() {
        let tw = TimeWindow::new(0, 10).unwrap();
        let c = Client::new(1, 2, vec![0], vec![0], 0, tw, 0).with_required(true);
        let c = Client {
            group: Some(0),
            ..c
        };
        assert!(c.validate(0).is_err());
    }

    #[test]
    fn test_depot_validate_negative_service() {
        let tw = TimeWindow::new(0, 10).unwrap();
        let d = Depot::new(0, 0, -1, tw);
        assert!(d.validate(0).is_err());
    }

    #[test]
    fn test_location_dispatch() {
        let tw = TimeWindow::new(0, 10).unwrap();
        let loc = Location::Client(Client::new(1, 1, vec![0], vec![0], 0, tw, 0));
        assert!(!loc.is_depot());
        assert!(loc.as_client().is_some());

        let loc = Location::Depot(Depot::new(0, 0, 0, tw));
        assert!(loc.is_depot());
        assert!(loc.as_client().is_none());
    }
}
