//! The mutable, segment-cached route used during a local-search call.
//!
//! Unlike [`crate::solution::Route`] (a plain immutable snapshot), this
//! `Route` caches a [`DurationSegment`], one [`LoadSegment`] per load
//! dimension, and a [`DistanceSegment`] for every prefix `[0..=i]` and
//! suffix `[i..end]` of its node sequence. Node and route operators read
//! those caches to get O(1) delta-cost evaluation instead of re-walking
//! the route on every candidate move.

use crate::data::ProblemData;
use crate::error::{checked_add, checked_mul, Result};
use crate::segments::{DistanceSegment, DurationSegment, LoadSegment};

use super::node::Node;

/// A single vehicle's route: start depot, zero or more clients
/// interleaved with optional reload depots, end depot.
#[derive(Debug, Clone)]
pub struct Route {
    index: usize,
    vehicle_type: usize,
    /// Node-pool indices, start depot first and end depot last.
    nodes: Vec<usize>,
    prefix_duration: Vec<DurationSegment>,
    suffix_duration: Vec<DurationSegment>,
    prefix_load: Vec<Vec<LoadSegment>>,
    suffix_load: Vec<Vec<LoadSegment>>,
    prefix_distance: Vec<DistanceSegment>,
    suffix_distance: Vec<DistanceSegment>,
}

/// Shared by [`Route::penalised_cost`] and [`Route::splice_cost`]: turns a
/// route's (or candidate splice's) travel totals and violation measures
/// into a penalised cost, using checked arithmetic since `unit_*_cost *
/// distance/duration` can overflow for an adversarially large instance.
fn penalised_cost_of(
    vt: &crate::data::VehicleType,
    cost_eval: &crate::evaluation::CostEvaluator,
    distance: i64,
    duration: i64,
    total_time_warp: i64,
    loads: impl Iterator<Item = i64>,
) -> Result<i64> {
    let travel = checked_add(
        checked_mul(vt.unit_distance_cost(), distance, "route distance cost")?,
        checked_mul(vt.unit_duration_cost(), duration, "route duration cost")?,
        "route travel cost",
    )?;
    let mut total = checked_add(travel, vt.fixed_cost(), "route fixed cost")?;
    total = checked_add(total, cost_eval.tw_penalty(total_time_warp), "route time warp penalty")?;
    for (dim, load) in loads.enumerate() {
        let capacity = vt.capacity().get(dim).copied().unwrap_or(0);
        total = checked_add(total, cost_eval.load_penalty(load, capacity, dim), "route load penalty")?;
    }
    if let Some(max_dist) = vt.max_distance() {
        total = checked_add(total, cost_eval.dist_penalty(distance, max_dist), "route distance penalty")?;
    }
    Ok(total)
}

impl Route {
    /// Creates a fresh route holding only its start and end depot node.
    /// Caller must still call [`Self::update`] once before reading caches.
    pub fn new(index: usize, vehicle_type: usize, start_depot_node: usize, end_depot_node: usize) -> Self {
        Self {
            index,
            vehicle_type,
            nodes: vec![start_depot_node, end_depot_node],
            prefix_duration: Vec::new(),
            suffix_duration: Vec::new(),
            prefix_load: Vec::new(),
            suffix_load: Vec::new(),
            prefix_distance: Vec::new(),
            suffix_distance: Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn vehicle_type(&self) -> usize {
        self.vehicle_type
    }

    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    /// Number of visits excluding the start/end depot (clients and
    /// reload depots).
    pub fn num_visits(&self) -> usize {
        self.nodes.len().saturating_sub(2)
    }

    pub fn is_empty(&self) -> bool {
        self.num_visits() == 0
    }

    pub fn prefix_duration(&self, pos: usize) -> DurationSegment {
        self.prefix_duration[pos]
    }

    pub fn suffix_duration(&self, pos: usize) -> DurationSegment {
        self.suffix_duration[pos]
    }

    pub fn prefix_load(&self, pos: usize, dim: usize) -> LoadSegment {
        self.prefix_load[dim][pos]
    }

    pub fn suffix_load(&self, pos: usize, dim: usize) -> LoadSegment {
        self.suffix_load[dim][pos]
    }

    pub fn prefix_distance(&self, pos: usize) -> DistanceSegment {
        self.prefix_distance[pos]
    }

    pub fn suffix_distance(&self, pos: usize) -> DistanceSegment {
        self.suffix_distance[pos]
    }

    /// Total route duration, i.e. the whole-route duration segment.
    pub fn duration_segment(&self) -> DurationSegment {
        *self.prefix_duration.last().expect("route always has >= 2 nodes")
    }

    pub fn distance_segment(&self) -> DistanceSegment {
        *self.prefix_distance.last().expect("route always has >= 2 nodes")
    }

    pub fn load_segment(&self, dim: usize) -> LoadSegment {
        self.prefix_load[dim].last().copied().expect("route always has >= 2 nodes")
    }

    /// This route's own contribution to a penalised solution cost: travel
    /// and fixed cost, plus time-warp/load/distance penalties, read
    /// straight off the segment caches. Does not include prize terms,
    /// which are a solution-wide concept that operators handle themselves
    /// when they add or remove a client entirely.
    pub fn penalised_cost(&self, data: &ProblemData, cost_eval: &crate::evaluation::CostEvaluator) -> Result<i64> {
        if self.is_empty() {
            return Ok(0);
        }
        let vt = &data.vehicle_types()[self.vehicle_type];
        let distance = self.distance_segment().distance();
        let duration = self.duration_segment().duration();
        penalised_cost_of(
            vt,
            cost_eval,
            distance,
            duration,
            self.duration_segment().total_time_warp(),
            (0..vt.num_load_dimensions()).map(|dim| self.load_segment(dim).load()),
        )
    }

    /// Computes the penalised cost this route *would* have if
    /// `nodes[lo..hi)` were replaced by `insert`, without mutating the
    /// route or rebuilding any cache: merges the cached prefix ending at
    /// `lo - 1`, the segments for `insert` built fresh, and the cached
    /// suffix starting at `hi`. This touches only the replaced window and
    /// the route's existing caches — `O(insert.len())` regardless of how
    /// long the rest of the route is, which is what lets node and route
    /// operators evaluate a candidate move without calling [`Self::update`].
    ///
    /// `lo` and `hi` are positions into the *current* `self.nodes()`, and
    /// must satisfy `1 <= lo <= hi <= self.nodes().len() - 1` (the start
    /// and end depot are never part of the replaced window) — except the
    /// route-becomes-fully-empty case (`insert` empty, `lo == 1`,
    /// `hi == self.nodes().len() - 1`), which returns `0` to match
    /// [`Self::penalised_cost`]'s convention for an empty route.
    pub fn splice_cost(
        &self,
        data: &ProblemData,
        pool: &[Node],
        cost_eval: &crate::evaluation::CostEvaluator,
        lo: usize,
        hi: usize,
        insert: &[usize],
    ) -> Result<i64> {
        if insert.is_empty() && lo == 1 && hi == self.nodes.len() - 1 {
            return Ok(0);
        }

        let vt = &data.vehicle_types()[self.vehicle_type];
        let profile = vt.profile();
        let num_dims = vt.num_load_dimensions();

        let left_loc = pool[self.nodes[lo - 1]].location();
        let right_loc = pool[self.nodes[hi]].location();

        let mut dur = self.prefix_duration[lo - 1];
        let mut dist = self.prefix_distance[lo - 1];
        let mut load: Vec<LoadSegment> = (0..num_dims).map(|d| self.prefix_load[d][lo - 1]).collect();
        let mut prev_loc = left_loc;

        for &node_idx in insert {
            let loc = pool[node_idx].location();

            let here_dur = DurationSegment::from_location(data, loc);
            let travel_dur = data.duration(profile, prev_loc, loc);
            dur = DurationSegment::merge(travel_dur, &dur, &here_dur)?;

            let here_dist = DistanceSegment::from_location();
            let travel_dist = data.distance(profile, prev_loc, loc);
            dist = DistanceSegment::merge(travel_dist, &dist, &here_dist)?;

            for (d, load_d) in load.iter_mut().enumerate() {
                let here_load = LoadSegment::from_location(data, loc, d);
                *load_d = LoadSegment::merge(load_d, &here_load)?;
            }

            prev_loc = loc;
        }

        let travel_dur = data.duration(profile, prev_loc, right_loc);
        dur = DurationSegment::merge(travel_dur, &dur, &self.suffix_duration[hi])?;
        let travel_dist = data.distance(profile, prev_loc, right_loc);
        dist = DistanceSegment::merge(travel_dist, &dist, &self.suffix_distance[hi])?;
        for (d, load_d) in load.iter_mut().enumerate() {
            *load_d = LoadSegment::merge(load_d, &self.suffix_load[d][hi])?;
        }

        penalised_cost_of(
            vt,
            cost_eval,
            dist.distance(),
            dur.duration(),
            dur.total_time_warp(),
            load.iter().map(|l| l.load()),
        )
    }

    /// Reassigns this route to a different vehicle type, replacing its
    /// start and end depot nodes accordingly. Visits in between are left
    /// untouched.
    pub(crate) fn set_vehicle_type(
        &mut self,
        pool: &mut [Node],
        data: &ProblemData,
        vehicle_type: usize,
        start_depot: usize,
        end_depot: usize,
    ) {
        self.vehicle_type = vehicle_type;
        let last = self.nodes.len() - 1;
        self.nodes[0] = start_depot;
        self.nodes[last] = end_depot;
        self.reindex(pool, data);
    }

    /// Wholesale-replaces the node sequence (start and end depot plus
    /// every visit in between) and reindexes. Used by operators that
    /// compute a candidate sequence directly rather than splicing one
    /// position at a time.
    pub(crate) fn set_nodes(&mut self, pool: &mut [Node], data: &ProblemData, nodes: Vec<usize>) {
        self.nodes = nodes;
        self.reindex(pool, data);
    }

    /// Inserts `node_idx` at position `pos` (1-indexed from the start
    /// depot; `pos == num_visits()+1` inserts just before the end depot).
    pub(crate) fn insert(&mut self, pool: &mut [Node], data: &ProblemData, pos: usize, node_idx: usize) {
        self.nodes.insert(pos, node_idx);
        self.reindex(pool, data);
    }

    /// Appends `node_idx` just before the end depot.
    pub(crate) fn append(&mut self, pool: &mut [Node], data: &ProblemData, node_idx: usize) {
        let pos = self.nodes.len() - 1;
        self.insert(pool, data, pos, node_idx);
    }

    /// Removes and returns the node-pool index at position `pos`.
    pub(crate) fn remove(&mut self, pool: &mut [Node], data: &ProblemData, pos: usize) -> usize {
        let node_idx = self.nodes.remove(pos);
        pool[node_idx].detach();
        self.reindex(pool, data);
        node_idx
    }

    /// Removes every client/reload-depot visit, leaving only the start
    /// and end depot.
    pub(crate) fn clear(&mut self, pool: &mut [Node], data: &ProblemData) {
        for &node_idx in &self.nodes[1..self.nodes.len() - 1] {
            pool[node_idx].detach();
        }
        self.nodes = vec![self.nodes[0], *self.nodes.last().unwrap()];
        self.reindex(pool, data);
    }

    /// Swaps the node-pool indices held at two positions in place.
    pub(crate) fn swap(&mut self, pool: &mut [Node], data: &ProblemData, a: usize, b: usize) {
        self.nodes.swap(a, b);
        self.reindex(pool, data);
    }

    fn reindex(&mut self, pool: &mut [Node], data: &ProblemData) {
        let mut trip = 0;
        for (pos, &node_idx) in self.nodes.iter().enumerate() {
            let location = pool[node_idx].location();
            let is_interior_depot = pos > 0
                && pos < self.nodes.len() - 1
                && data.location(location).is_depot();
            pool[node_idx].place(self.index, pos, trip);
            if is_interior_depot {
                trip += 1;
            }
        }
    }

    /// Recomputes every prefix/suffix segment cache from the current
    /// node sequence. Must be called after any mutation before reading
    /// segment accessors.
    ///
    /// Load caches do not fold in the vehicle type's `initial_load`; it
    /// is a per-route constant that [`crate::solution::Solution`] adds
    /// back in when reporting final excess load, so the delta-cost
    /// comparisons operators make on these caches stay unaffected by it.
    pub fn update(&mut self, data: &ProblemData, pool: &[Node]) -> Result<()> {
        let profile = data.vehicle_types()[self.vehicle_type].profile();
        let n = self.nodes.len();
        let locations: Vec<usize> = self.nodes.iter().map(|&idx| pool[idx].location()).collect();
        let num_dims = data.vehicle_types()[self.vehicle_type].num_load_dimensions();

        self.prefix_duration = Vec::with_capacity(n);
        self.suffix_duration = vec![DurationSegment::identity(); n];
        self.prefix_distance = Vec::with_capacity(n);
        self.suffix_distance = vec![DistanceSegment::identity(); n];
        self.prefix_load = vec![Vec::with_capacity(n); num_dims];
        self.suffix_load = vec![vec![LoadSegment::identity(); n]; num_dims];

        let mut acc_dur = DurationSegment::identity();
        let mut acc_dist = DistanceSegment::identity();
        let mut acc_load = vec![LoadSegment::identity(); num_dims];

        for i in 0..n {
            let here = DurationSegment::from_location(data, locations[i]);
            acc_dur = if i == 0 {
                here
            } else {
                let travel = data.duration(profile, locations[i - 1], locations[i]);
                DurationSegment::merge(travel, &acc_dur, &here)?
            };
            self.prefix_duration.push(acc_dur);

            let here_dist = DistanceSegment::from_location();
            acc_dist = if i == 0 {
                here_dist
            } else {
                let travel = data.distance(profile, locations[i - 1], locations[i]);
                DistanceSegment::merge(travel, &acc_dist, &here_dist)?
            };
            self.prefix_distance.push(acc_dist);

            for dim in 0..num_dims {
                let here_load = LoadSegment::from_location(data, locations[i], dim);
                acc_load[dim] = LoadSegment::merge(&acc_load[dim], &here_load)?;
                self.prefix_load[dim].push(acc_load[dim]);
            }
        }

        let mut acc_dur = DurationSegment::identity();
        let mut acc_dist = DistanceSegment::identity();
        let mut acc_load = vec![LoadSegment::identity(); num_dims];
        for i in (0..n).rev() {
            let here = DurationSegment::from_location(data, locations[i]);
            acc_dur = if i == n - 1 {
                here
            } else {
                let travel = data.duration(profile, locations[i], locations[i + 1]);
                DurationSegment::merge(travel, &here, &acc_dur)?
            };
            self.suffix_duration[i] = acc_dur;

            let here_dist = DistanceSegment::from_location();
            acc_dist = if i == n - 1 {
                here_dist
            } else {
                let travel = data.distance(profile, locations[i], locations[i + 1]);
                DistanceSegment::merge(travel, &here_dist, &acc_dist)?
            };
            self.suffix_distance[i] = acc_dist;

            for dim in 0..num_dims {
                let here_load = LoadSegment::from_location(data, locations[i], dim);
                acc_load[dim] = LoadSegment::merge(&here_load, &acc_load[dim])?;
                self.suffix_load[dim][i] = acc_load[dim];
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Client, Depot, Location, Matrix, Profile, TimeWindow, VehicleType};

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
    fn test_insert_and_update_caches() {
        let data = small_data();
        let mut pool = vec![Node::new(0), Node::new(0), Node::new(1), Node::new(2)];
        let mut route = Route::new(0, 0, 0, 1);
        route.update(&data, &pool).unwrap();
        assert!(route.is_empty());

        route.append(&mut pool, &data, 2);
        route.update(&data, &pool).unwrap();
        assert_eq!(route.num_visits(), 1);
        assert_eq!(route.distance_segment().distance(), 2);

        route.append(&mut pool, &data, 3);
        route.update(&data, &pool).unwrap();
        assert_eq!(route.num_visits(), 2);
        assert_eq!(pool[3].position(), 2);
    }

    #[test]
    fn test_remove_detaches_node() {
        let data = small_data();
        let mut pool = vec![Node::new(0), Node::new(0), Node::new(1)];
        let mut route = Route::new(0, 0, 0, 1);
        route.append(&mut pool, &data, 2);
        route.update(&data, &pool).unwrap();

        route.remove(&mut pool, &data, 1);
        route.update(&data, &pool).unwrap();
        assert!(route.is_empty());
        assert!(!pool[2].is_assigned());
    }
}
