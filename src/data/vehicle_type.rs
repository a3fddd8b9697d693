//! Vehicle type: fleet size, capacity, depots, and cost coefficients.

use serde::{Deserialize, Serialize};

use super::TimeWindow;
use crate::error::{Error, Result};

/// A homogeneous class of vehicles available to serve routes.
///
/// Invariants (checked by [`ProblemData`](super::ProblemData)):
/// `tw.early() <= start_late <= tw.late()`, all costs and limits are
/// non-negative, and `initial_load[d] <= capacity[d]` for every load
/// dimension `d`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleType {
    num_available: usize,
    capacity: Vec<i64>,
    initial_load: Vec<i64>,
    start_depot: usize,
    end_depot: usize,
    reload_depots: Vec<usize>,
    max_reloads: usize,
    time_window: TimeWindow,
    start_late: Option<i64>,
    max_duration: Option<i64>,
    max_distance: Option<i64>,
    fixed_cost: i64,
    unit_distance_cost: i64,
    unit_duration_cost: i64,
    profile: usize,
}

impl VehicleType {
    /// Creates a vehicle type with the given fleet size and per-dimension
    /// capacity. Start and end depot both default to `depot`; all other
    /// optional limits default to "unset".
    pub fn new(num_available: usize, capacity: Vec<i64>, depot: usize, time_window: TimeWindow) -> Self {
        let initial_load = vec![0; capacity.len()];
        Self {
            num_available,
            capacity,
            initial_load,
            start_depot: depot,
            end_depot: depot,
            reload_depots: Vec::new(),
            max_reloads: 0,
            time_window,
            start_late: None,
            max_duration: None,
            max_distance: None,
            fixed_cost: 0,
            unit_distance_cost: 1,
            unit_duration_cost: 0,
            profile: 0,
        }
    }

    pub fn with_initial_load(mut self, load: Vec<i64>) -> Self {
        self.initial_load = load;
        self
    }

    pub fn with_end_depot(mut self, depot: usize) -> Self {
        self.end_depot = depot;
        self
    }

    pub fn with_reload_depots(mut self, depots: Vec<usize>, max_reloads: usize) -> Self {
        self.reload_depots = depots;
        self.max_reloads = max_reloads;
        self
    }

    pub fn with_start_late(mut self, start_late: i64) -> Self {
        self.start_late = Some(start_late);
        self
    }

    pub fn with_max_duration(mut self, max: i64) -> Self {
        self.max_duration = Some(max);
        self
    }

    pub fn with_max_distance(mut self, max: i64) -> Self {
        self.max_distance = Some(max);
        self
    }

    pub fn with_fixed_cost(mut self, cost: i64) -> Self {
        self.fixed_cost = cost;
        self
    }

    pub fn with_unit_distance_cost(mut self, cost: i64) -> Self {
        self.unit_distance_cost = cost;
        self
    }

    pub fn with_unit_duration_cost(mut self, cost: i64) -> Self {
        self.unit_duration_cost = cost;
        self
    }

    pub fn with_profile(mut self, profile: usize) -> Self {
        self.profile = profile;
        self
    }

    pub fn num_available(&self) -> usize {
        self.num_available
    }

    pub fn capacity(&self) -> &[i64] {
        &self.capacity
    }

    pub fn num_load_dimensions(&self) -> usize {
        self.capacity.len()
    }

    pub fn initial_load(&self) -> &[i64] {
        &self.initial_load
    }

    pub fn start_depot(&self) -> usize {
        self.start_depot
    }

    pub fn end_depot(&self) -> usize {
        self.end_depot
    }

    pub fn reload_depots(&self) -> &[usize] {
        &self.reload_depots
    }

    pub fn max_reloads(&self) -> usize {
        self.max_reloads
    }

    pub fn time_window(&self) -> TimeWindow {
        self.time_window
    }

    /// Latest time the vehicle may leave its start depot. Defaults to
    /// `time_window().late()` when unset.
    pub fn start_late(&self) -> i64 {
        self.start_late.unwrap_or(self.time_window.late())
    }

    pub fn max_duration(&self) -> Option<i64> {
        self.max_duration
    }

    pub fn max_distance(&self) -> Option<i64> {
        self.max_distance
    }

    pub fn fixed_cost(&self) -> i64 {
        self.fixed_cost
    }

    pub fn unit_distance_cost(&self) -> i64 {
        self.unit_distance_cost
    }

    pub fn unit_duration_cost(&self) -> i64 {
        self.unit_duration_cost
    }

    pub fn profile(&self) -> usize {
        self.profile
    }

    pub(crate) fn validate(&self, idx: usize, num_locations: usize, num_profiles: usize) -> Result<()> {
        if self.time_window.early() > self.start_late() || self.start_late() > self.time_window.late() {
            return Err(Error::InvalidInput(format!(
                "vehicle type {idx}: requires tw_early <= start_late <= tw_late"
            )));
        }
        if self.fixed_cost < 0 || self.unit_distance_cost < 0 || self.unit_duration_cost < 0 {
            return Err(Error::InvalidInput(format!(
                "vehicle type {idx}: costs must be non-negative"
            )));
        }
        if self.max_duration.is_some_and(|d| d < 0) || self.max_distance.is_some_and(|d| d < 0) {
            return Err(Error::InvalidInput(format!(
                "vehicle type {idx}: limits must be non-negative"
            )));
        }
        if self.initial_load.len() != self.capacity.len() {
            return Err(Error::InvalidInput(format!(
                "vehicle type {idx}: initial_load must match capacity dimensions"
            )));
        }
        for (d, (&load, &cap)) in self.initial_load.iter().zip(&self.capacity).enumerate() {
            if load > cap {
                return Err(Error::InvalidInput(format!(
                    "vehicle type {idx}: initial_load[{d}] exceeds capacity"
                )));
            }
        }
        if self.start_depot >= num_locations || self.end_depot >= num_locations {
            return Err(Error::InvalidInput(format!(
                "vehicle type {idx}: start/end depot out of range"
            )));
        }
        for &d in &self.reload_depots {
            if d >= num_locations {
                return Err(Error::InvalidInput(format!(
                    "vehicle type {idx}: reload depot {d} out of range"
                )));
            }
        }
        if self.profile >= num_profiles {
            return Err(Error::InvalidInput(format!(
                "vehicle type {idx}: profile {} out of range", self.profile
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tw() -> TimeWindow {
        TimeWindow::new(0, 100).unwrap()
    }

    #[test]
    fn test_defaults() {
        let v = VehicleType::new(3, vec![10, 20], 0, tw());
        assert_eq!(v.num_available(), 3);
        assert_eq!(v.capacity(), &[10, 20]);
        assert_eq!(v.start_depot(), 0);
        assert_eq!(v.end_depot(), 0);
        assert_eq!(v.start_late(), 100);
        assert_eq!(v.max_reloads(), 0);
    }

    #[test]
    fn test_builder() {
        let v = VehicleType::new(1, vec![10], 0, tw())
            .with_end_depot(1)
            .with_reload_depots(vec![2], 3)
            .with_start_late(50)
            .with_max_duration(200)
            .with_max_distance(500)
            .with_fixed_cost(25)
            .with_unit_distance_cost(2)
            .with_unit_duration_cost(1)
            .with_profile(1);
        assert_eq!(v.end_depot(), 1);
        assert_eq!(v.reload_depots(), &[2]);
        assert_eq!(v.max_reloads(), 3);
        assert_eq!(v.start_late(), 50);
        assert_eq!(v.max_duration(), Some(200));
        assert_eq!(v.max_distance(), Some(500));
        assert_eq!(v.fixed_cost(), 25);
        assert_eq!(v.profile(), 1);
    }

    #[test]
    fn test_validate_initial_load_exceeds_capacity() {
        let v = VehicleType::new(1, vec![10], 0, tw()).with_initial_load(vec![20]);
        assert!(v.validate(0, 5, 1).is_err());
    }

    #[test]
    fn test_validate_start_late_out_of_range() {
        let v = VehicleType::new(1, vec![10], 0, tw()).with_start_late(200);
        assert!(v.validate(0, 5, 1).is_err());
    }

    #[test]
    fn test_validate_ok() {
        let v = VehicleType::new(1, vec![10], 0, tw());
        assert!(v.validate(0, 5, 1).is_ok());
    }
}
