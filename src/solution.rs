//! The immutable solution snapshot: a set of routes, plus the derived
//! quantities (`cost`-adjacent but not penalty-weighted) that describe
//! how good or feasible it is.
//!
//! Values here are cheap to produce but not meant for the hot loop:
//! [`crate::search::LocalSearch`] materialises its own mutable, cached
//! [`crate::search::Route`] structures to evaluate candidate moves, then
//! converts back to a fresh `Solution` on export.

use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::data::{Location, ProblemData};
use crate::error::Result;
use crate::segments::{DistanceSegment, DurationSegment, LoadSegment};

/// One vehicle's planned visit sequence: the depots it starts and ends
/// at are implied by its vehicle type, so only clients and reload depots
/// in between are stored.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Route {
    vehicle_type: usize,
    visits: Vec<usize>,
}

impl Route {
    /// Builds a route snapshot for the given vehicle type and visit
    /// sequence (client and reload-depot location indices, in order).
    pub fn new(vehicle_type: usize, visits: Vec<usize>) -> Self {
        Self {
            vehicle_type,
            visits,
        }
    }

    pub fn vehicle_type(&self) -> usize {
        self.vehicle_type
    }

    pub fn visits(&self) -> &[usize] {
        &self.visits
    }

    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    /// The full location sequence including the vehicle type's start and
    /// end depot, used by every segment fold below.
    fn full_sequence(&self, data: &ProblemData) -> Vec<usize> {
        let vt = &data.vehicle_types()[self.vehicle_type];
        let mut seq = Vec::with_capacity(self.visits.len() + 2);
        seq.push(vt.start_depot());
        seq.extend_from_slice(&self.visits);
        seq.push(vt.end_depot());
        seq
    }

    fn duration_segment(&self, data: &ProblemData) -> Result<DurationSegment> {
        let vt = &data.vehicle_types()[self.vehicle_type];
        let seq = self.full_sequence(data);
        let mut acc = DurationSegment::from_location(data, seq[0]);
        for pair in seq.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let travel = data.duration(vt.profile(), from, to);
            let next = DurationSegment::from_location(data, to);
            acc = DurationSegment::merge(travel, &acc, &next)?;
        }
        Ok(acc)
    }

    fn distance_segment(&self, data: &ProblemData) -> Result<DistanceSegment> {
        let vt = &data.vehicle_types()[self.vehicle_type];
        let seq = self.full_sequence(data);
        let mut acc = DistanceSegment::from_location();
        for pair in seq.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let travel = data.distance(vt.profile(), from, to);
            let next = DistanceSegment::from_location();
            acc = DistanceSegment::merge(travel, &acc, &next)?;
        }
        Ok(acc)
    }

    fn load_segment(&self, data: &ProblemData, dimension: usize) -> Result<LoadSegment> {
        let vt = &data.vehicle_types()[self.vehicle_type];
        let initial = vt.initial_load().get(dimension).copied().unwrap_or(0);
        let mut acc = LoadSegment::identity();
        for &idx in &self.visits {
            let next = LoadSegment::from_location(data, idx, dimension);
            acc = LoadSegment::merge(&acc, &next)?;
        }
        // Initial on-board load is modelled as a pre-existing pickup, so
        // it stays on board (and counts toward the peak) for the whole
        // route rather than just its first leg.
        Ok(LoadSegment::merge(&LoadSegment::from_raw(0, initial), &acc)?)
    }

    pub fn distance(&self, data: &ProblemData) -> Result<i64> {
        Ok(self.distance_segment(data)?.distance())
    }

    pub fn duration(&self, data: &ProblemData) -> Result<i64> {
        Ok(self.duration_segment(data)?.duration())
    }

    pub fn time_warp(&self, data: &ProblemData) -> Result<i64> {
        Ok(self.duration_segment(data)?.total_time_warp())
    }

    pub fn load(&self, data: &ProblemData, dimension: usize) -> Result<i64> {
        Ok(self.load_segment(data, dimension)?.load())
    }
}

/// An immutable snapshot of a complete solution: one route per used
/// vehicle.
///
/// Two solutions compare equal, and hash identically, iff their
/// multisets of routes are equal — route order carries no meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    routes: Vec<Route>,
}

impl Solution {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    fn sorted_routes(&self) -> Vec<Route> {
        let mut routes = self.routes.clone();
        routes.sort();
        routes
    }

    /// Sum of every route's travelled distance.
    pub fn distance(&self, data: &ProblemData) -> Result<i64> {
        self.routes.iter().try_fold(0i64, |acc, r| {
            crate::error::checked_add(acc, r.distance(data)?, "solution distance")
        })
    }

    /// Sum of every route's duration.
    pub fn duration(&self, data: &ProblemData) -> Result<i64> {
        self.routes.iter().try_fold(0i64, |acc, r| {
            crate::error::checked_add(acc, r.duration(data)?, "solution duration")
        })
    }

    /// Sum of `fixed_cost` over every non-empty route.
    pub fn fixed_vehicle_cost(&self, data: &ProblemData) -> i64 {
        self.routes
            .iter()
            .filter(|r| !r.is_empty())
            .map(|r| data.vehicle_types()[r.vehicle_type()].fixed_cost())
            .sum()
    }

    /// Excess load over capacity, summed across all routes, for one load
    /// dimension.
    pub fn excess_load(&self, data: &ProblemData, dimension: usize) -> Result<i64> {
        self.routes.iter().try_fold(0i64, |acc, r| {
            let vt = &data.vehicle_types()[r.vehicle_type()];
            let capacity = vt.capacity().get(dimension).copied().unwrap_or(0);
            let load = r.load(data, dimension)?;
            crate::error::checked_add(acc, 0.max(load - capacity), "solution excess load")
        })
    }

    /// Excess distance over `max_distance`, summed across all routes that
    /// have one set.
    pub fn excess_distance(&self, data: &ProblemData) -> Result<i64> {
        self.routes.iter().try_fold(0i64, |acc, r| {
            let vt = &data.vehicle_types()[r.vehicle_type()];
            let excess = match vt.max_distance() {
                Some(max) => 0.max(r.distance(data)? - max),
                None => 0,
            };
            crate::error::checked_add(acc, excess, "solution excess distance")
        })
    }

    /// Total time warp across all routes.
    pub fn total_time_warp(&self, data: &ProblemData) -> Result<i64> {
        self.routes.iter().try_fold(0i64, |acc, r| {
            crate::error::checked_add(acc, r.time_warp(data)?, "solution time warp")
        })
    }

    fn visited_clients(&self) -> HashSet<usize> {
        self.routes
            .iter()
            .flat_map(|r| r.visits().iter().copied())
            .collect()
    }

    /// Sum of `prize` over clients that are not visited by any route.
    pub fn uncollected_prizes(&self, data: &ProblemData) -> i64 {
        let visited = self.visited_clients();
        data.client_indices()
            .filter(|idx| !visited.contains(idx))
            .filter_map(|idx| data.location(idx).as_client().map(|c| c.prize()))
            .sum()
    }

    /// Number of required clients not visited by any route.
    pub fn missing_required_clients(&self, data: &ProblemData) -> usize {
        let visited = self.visited_clients();
        data.client_indices()
            .filter(|&idx| {
                data.location(idx)
                    .as_client()
                    .is_some_and(|c| c.required())
                    && !visited.contains(&idx)
            })
            .count()
    }

    /// Whether every mutually exclusive group has an acceptable number
    /// of visited members (exactly one if required, at most one
    /// otherwise).
    pub fn is_group_feasible(&self, data: &ProblemData) -> bool {
        let visited = self.visited_clients();
        data.groups().iter().all(|g| {
            let visited_count = g.clients().iter().filter(|c| visited.contains(c)).count();
            if g.required() {
                visited_count == 1
            } else {
                visited_count <= 1
            }
        })
    }
}

impl PartialEq for Solution {
    fn eq(&self, other: &Self) -> bool {
        self.sorted_routes() == other.sorted_routes()
    }
}

impl Eq for Solution {}

impl Hash for Solution {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sorted_routes().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Client, Depot, Matrix, Profile, TimeWindow, VehicleType};

    fn square(size: usize) -> Matrix {
        let mut data = vec![1; size * size];
        for i in 0..size {
            data[i * size + i] = 0;
        }
        Matrix::from_data(size, data).unwrap()
    }

    fn small_data() -> ProblemData {
        let tw = TimeWindow::new(0, 1000).unwrap();
        let depots = vec![Location::Depot(Depot::new(0, 0, 0, tw))];
        let clients = vec![
            Location::Client(Client::new(1, 0, vec![5], vec![0], 0, tw, 0)),
            Location::Client(Client::new(2, 0, vec![5], vec![0], 0, tw, 0)),
        ];
        let vehicles = vec![VehicleType::new(2, vec![10], 0, tw)];
        let profiles = vec![Profile {
            distance: square(3),
            duration: square(3),
        }];
        ProblemData::new(depots, clients, vehicles, profiles, vec![]).unwrap()
    }

    #[test]
    fn test_solution_equality_ignores_route_order() {
        let a = Solution::new(vec![Route::new(0, vec![1]), Route::new(0, vec![2])]);
        let b = Solution::new(vec![Route::new(0, vec![2]), Route::new(0, vec![1])]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_solution_distance_and_fixed_cost() {
        let data = small_data();
        let sol = Solution::new(vec![Route::new(0, vec![1, 2]), Route::new(0, vec![])]);
        assert_eq!(sol.distance(&data).unwrap(), 3);
        assert_eq!(sol.fixed_vehicle_cost(&data), 0);
    }

    #[test]
    fn test_solution_excess_load() {
        let data = small_data();
        let sol = Solution::new(vec![Route::new(0, vec![1, 2])]);
        // capacity 10, deliveries 5 + 5 = 10: no excess.
        assert_eq!(sol.excess_load(&data, 0).unwrap(), 0);
    }

    #[test]
    fn test_missing_required_clients() {
        let data = small_data();
        let sol = Solution::new(vec![Route::new(0, vec![1])]);
        assert_eq!(sol.missing_required_clients(&data), 1);
    }

    #[test]
    fn test_group_feasible_requires_exactly_one() {
        let tw = TimeWindow::new(0, 1000).unwrap();
        let depots = vec![Location::Depot(Depot::new(0, 0, 0, tw))];
        let clients = vec![
            Location::Client(Client::new(1, 0, vec![], vec![], 0, tw, 0).with_group(0)),
            Location::Client(Client::new(2, 0, vec![], vec![], 0, tw, 0).with_group(0)),
        ];
        let vehicles = vec![VehicleType::new(1, vec![], 0, tw)];
        let profiles = vec![Profile {
            distance: square(3),
            duration: square(3),
        }];
        let groups = vec![crate::data::ClientGroup::new(vec![1, 2], true)];
        let data = ProblemData::new(depots, clients, vehicles, profiles, groups).unwrap();

        let none = Solution::new(vec![Route::new(0, vec![])]);
        assert!(!none.is_group_feasible(&data));

        let one = Solution::new(vec![Route::new(0, vec![1])]);
        assert!(one.is_group_feasible(&data));

        let both = Solution::new(vec![Route::new(0, vec![1, 2])]);
        assert!(!both.is_group_feasible(&data));
    }
}
