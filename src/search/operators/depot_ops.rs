//! Depot-adjacent operators, for vehicle types configured with one or
//! more mid-route reload depots.

use crate::data::ProblemData;
use crate::error::Result;
use crate::evaluation::CostEvaluator;

use super::NodeOperator;
use crate::search::state::SearchState;

/// Relocates client `u` out of its current route and into `v`'s route,
/// inserted right after a reload-depot visit placed just before `v`,
/// opening a new trip there.
///
/// Only tried when `v`'s vehicle type allows at least one reload depot
/// and has room under its `max_reloads` cap. The nearest configured
/// reload depot to `v` is used.
///
/// Capacity feasibility is still read off the whole-route load segment
/// rather than reset per trip, so this operator is best understood as
/// reducing travel distance by restocking near `v`; it does not yet
/// grant the capacity reset a real multi-trip vehicle would get from
/// visiting a reload depot.
pub struct RelocateWithDepot;

impl RelocateWithDepot {
    pub fn new() -> Self {
        Self
    }

    /// The candidate move's structural shape: the two routes involved,
    /// `u`'s position, the position in `v`'s route to insert at, and the
    /// reload depot to insert alongside it. `None` if the move does not
    /// apply at all to this `(u, v)`. Independent of `cost_eval`, so
    /// `evaluate` and `apply` always agree on the same candidate.
    fn plan(&self, u: usize, v: usize, state: &SearchState, data: &ProblemData) -> Option<(usize, usize, usize, usize, usize)> {
        if u == v {
            return None;
        }
        let (Some(ru), Some(rv)) = (state.pool()[u].route(), state.pool()[v].route()) else {
            return None;
        };
        if ru == rv {
            return None;
        }

        let vt = &data.vehicle_types()[state.route(rv).vehicle_type()];
        if vt.reload_depots().is_empty() {
            return None;
        }
        let current_reloads = state
            .route(rv)
            .nodes()
            .iter()
            .filter(|&&idx| data.location(idx).is_depot())
            .count()
            .saturating_sub(2);
        if current_reloads >= vt.max_reloads() {
            return None;
        }

        let profile = vt.profile();
        let depot = vt
            .reload_depots()
            .iter()
            .copied()
            .min_by_key(|&d| data.distance(profile, d, v))?;

        let pu = state.pool()[u].position();
        let pv = state.pool()[v].position();
        Some((ru, rv, pu, pv, depot))
    }
}

impl Default for RelocateWithDepot {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeOperator for RelocateWithDepot {
    fn supports(&self, data: &ProblemData) -> bool {
        data.vehicle_types().iter().any(|vt| !vt.reload_depots().is_empty())
    }

    fn evaluate(
        &self,
        u: usize,
        v: usize,
        state: &SearchState,
        data: &ProblemData,
        cost_eval: &CostEvaluator,
    ) -> Result<i64> {
        let Some((ru, rv, pu, pv, depot)) = self.plan(u, v, state, data) else {
            return Ok(0);
        };
        let before = state.route(ru).penalised_cost(data, cost_eval)? + state.route(rv).penalised_cost(data, cost_eval)?;
        let after_u = state.route(ru).splice_cost(data, state.pool(), cost_eval, pu, pu + 1, &[])?;
        let after_v = state.route(rv).splice_cost(data, state.pool(), cost_eval, pv, pv, &[depot, u])?;
        Ok((after_u + after_v) - before)
    }

    fn apply(
        &self,
        u: usize,
        v: usize,
        state: &mut SearchState,
        data: &ProblemData,
        _cost_eval: &CostEvaluator,
    ) -> Result<()> {
        let Some((ru, rv, pu, pv, depot)) = self.plan(u, v, state, data) else {
            return Ok(());
        };
        state.apply_pair(ru, rv, data, |route_u, route_v, pool| {
            route_u.remove(pool, data, pu);
            route_v.insert(pool, data, pv, u);
            route_v.insert(pool, data, pv, depot);
        })
    }
}

/// Moves the whole trip `u` belongs to (the run of visits between the
/// reload depot preceding it and the one following it, or the start/end
/// depot if there is no reload depot on that side) into `v`'s route,
/// inserted after the reload depot nearest `v`.
///
/// The inverse granularity of [`RelocateWithDepot`]: that operator moves
/// one client at a time into a new trip, this one moves an existing
/// trip wholesale. Same capacity-modelling limitation applies: load
/// feasibility is still read off the whole-route load segment rather
/// than reset per trip.
pub struct TripRelocate;

impl TripRelocate {
    pub fn new() -> Self {
        Self
    }

    #[allow(clippy::type_complexity)]
    fn plan(
        &self,
        u: usize,
        v: usize,
        state: &SearchState,
        data: &ProblemData,
    ) -> Option<(usize, usize, usize, usize, usize, usize, Vec<usize>)> {
        let (Some(ru), Some(rv)) = (state.pool()[u].route(), state.pool()[v].route()) else {
            return None;
        };
        if ru == rv {
            return None;
        }
        let vt_v = &data.vehicle_types()[state.route(rv).vehicle_type()];
        if vt_v.reload_depots().is_empty() {
            return None;
        }

        let nodes_u = state.route(ru).nodes();
        let pu = state.pool()[u].position();
        let (lo, hi) = trip_bounds(data, nodes_u, pu);
        let trip: Vec<usize> = nodes_u[lo..hi].to_vec();
        if trip.is_empty() {
            return None;
        }

        let profile = vt_v.profile();
        let pv = state.pool()[v].position();
        let depot = vt_v
            .reload_depots()
            .iter()
            .copied()
            .min_by_key(|&d| data.distance(profile, d, v))?;

        Some((ru, rv, lo, hi, pv, depot, trip))
    }
}

impl Default for TripRelocate {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeOperator for TripRelocate {
    fn supports(&self, data: &ProblemData) -> bool {
        data.vehicle_types().iter().any(|vt| !vt.reload_depots().is_empty())
    }

    fn evaluate(
        &self,
        u: usize,
        v: usize,
        state: &SearchState,
        data: &ProblemData,
        cost_eval: &CostEvaluator,
    ) -> Result<i64> {
        let Some((ru, rv, lo, hi, pv, depot, trip)) = self.plan(u, v, state, data) else {
            return Ok(0);
        };
        let before = state.route(ru).penalised_cost(data, cost_eval)? + state.route(rv).penalised_cost(data, cost_eval)?;
        let after_u = state.route(ru).splice_cost(data, state.pool(), cost_eval, lo, hi, &[])?;
        let mut insertion = vec![depot];
        insertion.extend_from_slice(&trip);
        let after_v = state.route(rv).splice_cost(data, state.pool(), cost_eval, pv, pv, &insertion)?;
        Ok((after_u + after_v) - before)
    }

    fn apply(
        &self,
        u: usize,
        v: usize,
        state: &mut SearchState,
        data: &ProblemData,
        _cost_eval: &CostEvaluator,
    ) -> Result<()> {
        let Some((ru, rv, lo, hi, pv, depot, trip)) = self.plan(u, v, state, data) else {
            return Ok(());
        };
        state.apply_pair(ru, rv, data, |route_u, route_v, pool| {
            let mut cand_u = route_u.nodes().to_vec();
            cand_u.splice(lo..hi, []);
            route_u.set_nodes(pool, data, cand_u);

            let mut cand_v = route_v.nodes().to_vec();
            let mut insertion = vec![depot];
            insertion.extend_from_slice(&trip);
            cand_v.splice(pv..pv, insertion);
            route_v.set_nodes(pool, data, cand_v);
        })
    }
}

/// Half-open `[lo, hi)` bounds of the trip containing node-pool position
/// `pos`: from just after the nearest preceding depot (start depot or
/// reload depot) up to just before the nearest following one.
fn trip_bounds(data: &ProblemData, nodes: &[usize], pos: usize) -> (usize, usize) {
    let mut lo = pos;
    while lo > 0 && !data.location(nodes[lo - 1]).is_depot() {
        lo -= 1;
    }
    let mut hi = pos + 1;
    while hi < nodes.len() && !data.location(nodes[hi]).is_depot() {
        hi += 1;
    }
    (lo, hi)
}

/// Contracts two adjacent reload-depot visits in `u`'s route into one,
/// or drops a reload depot that sits immediately next to the start or
/// end depot, in either case removing a redundant reload stop that
/// carries no clients. `v` is unused; the operator is anchored purely
/// on `u`, a reload-depot visit.
pub struct RemoveAdjacentDepot;

impl RemoveAdjacentDepot {
    pub fn new() -> Self {
        Self
    }

    fn plan(&self, u: usize, state: &SearchState, data: &ProblemData) -> Option<(usize, usize)> {
        if !data.location(u).is_depot() {
            return None;
        }
        let r = state.pool()[u].route()?;
        let pu = state.pool()[u].position();
        let nodes = state.route(r).nodes();
        let last = nodes.len() - 1;
        if pu == 0 || pu == last {
            return None;
        }
        let adjacent_to_boundary = pu == 1 || pu == last - 1;
        let adjacent_to_depot = data.location(nodes[pu - 1]).is_depot() || data.location(nodes[pu + 1]).is_depot();
        if !adjacent_to_boundary && !adjacent_to_depot {
            return None;
        }
        Some((r, pu))
    }
}

impl Default for RemoveAdjacentDepot {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeOperator for RemoveAdjacentDepot {
    fn supports(&self, data: &ProblemData) -> bool {
        data.vehicle_types().iter().any(|vt| !vt.reload_depots().is_empty())
    }

    fn evaluate(
        &self,
        u: usize,
        _v: usize,
        state: &SearchState,
        data: &ProblemData,
        cost_eval: &CostEvaluator,
    ) -> Result<i64> {
        let Some((r, pu)) = self.plan(u, state, data) else {
            return Ok(0);
        };
        let before = state.route(r).penalised_cost(data, cost_eval)?;
        let after = state.route(r).splice_cost(data, state.pool(), cost_eval, pu, pu + 1, &[])?;
        Ok(after - before)
    }

    fn apply(
        &self,
        u: usize,
        _v: usize,
        state: &mut SearchState,
        data: &ProblemData,
        _cost_eval: &CostEvaluator,
    ) -> Result<()> {
        let Some((r, pu)) = self.plan(u, state, data) else {
            return Ok(());
        };
        state.apply(r, data, |route, pool| {
            route.remove(pool, data, pu);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Client, Depot, Location, Matrix, Profile, TimeWindow, VehicleType};
    use crate::solution::{Route as SolRoute, Solution};

    fn reload_data() -> ProblemData {
        let tw = TimeWindow::new(0, 1000).unwrap();
        let depots = vec![
            Location::Depot(Depot::new(0, 0, 0, tw)),
            Location::Depot(Depot::new(5, 0, 0, tw)),
        ];
        let clients = vec![
            Location::Client(Client::new(1, 0, vec![], vec![], 0, tw, 0)),
            Location::Client(Client::new(6, 0, vec![], vec![], 0, tw, 0)),
        ];
        let vehicles = vec![
            VehicleType::new(1, vec![], 0, tw),
            VehicleType::new(1, vec![], 0, tw).with_reload_depots(vec![1], 2),
        ];
        let size = 4;
        let xs = [0i64, 5, 1, 6];
        let mut data = vec![0i64; size * size];
        for i in 0..size {
            for j in 0..size {
                data[i * size + j] = (xs[i] - xs[j]).abs();
            }
        }
        let matrix = Matrix::from_data(size, data).unwrap();
        let profiles = vec![Profile {
            distance: matrix.clone(),
            duration: matrix,
        }];
        ProblemData::new(depots, clients, vehicles, profiles, vec![]).unwrap()
    }

    #[test]
    fn test_skips_vehicle_type_without_reload_depots() {
        let data = reload_data();
        let sol = Solution::new(vec![
            SolRoute::new(0, vec![2]),
            SolRoute::new(0, vec![3]),
        ]);
        let mut state = SearchState::from_solution(&data, &sol).unwrap();
        let cost_eval = CostEvaluator::new(vec![], 0, 0);
        let op = RelocateWithDepot::new();
        assert!(!op.apply_best(2, 3, &mut state, &data, &cost_eval).unwrap());
    }

    #[test]
    fn test_remove_adjacent_depot_skips_non_depot_client() {
        let data = reload_data();
        let sol = Solution::new(vec![
            SolRoute::new(1, vec![1, 3]),
            SolRoute::new(0, vec![2]),
        ]);
        let mut state = SearchState::from_solution(&data, &sol).unwrap();
        let cost_eval = CostEvaluator::new(vec![], 0, 0);
        let op = RemoveAdjacentDepot::new();
        assert!(!op.apply_best(3, 2, &mut state, &data, &cost_eval).unwrap());
    }

    #[test]
    fn test_trip_relocate_skips_vehicle_type_without_reload_depots() {
        let data = reload_data();
        let sol = Solution::new(vec![
            SolRoute::new(0, vec![2]),
            SolRoute::new(0, vec![3]),
        ]);
        let mut state = SearchState::from_solution(&data, &sol).unwrap();
        let cost_eval = CostEvaluator::new(vec![], 0, 0);
        let op = TripRelocate::new();
        assert!(!op.apply_best(2, 3, &mut state, &data, &cost_eval).unwrap());
    }
}
