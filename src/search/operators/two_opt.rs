//! 2-opt: reverses the sub-sequence between two visits in the same
//! route ([`TwoOpt`]), or reconnects the tails of two different routes
//! ([`SwapTails`], also known as 2-opt*), removing two edges and
//! replacing them with two others.

use crate::data::ProblemData;
use crate::error::Result;
use crate::evaluation::CostEvaluator;

use super::NodeOperator;
use crate::search::state::SearchState;

/// Classic same-route 2-opt move: reverses the sub-sequence between the
/// edge leaving `u` and the edge leaving `v`.
pub struct TwoOpt;

impl TwoOpt {
    pub fn new() -> Self {
        Self
    }

    /// The affected route and the `[lo, hi]` (inclusive) bounds of the
    /// segment that gets reversed, or `None` if `(u, v)` doesn't name a
    /// valid same-route reversal.
    fn plan(&self, u: usize, v: usize, state: &SearchState) -> Option<(usize, usize, usize)> {
        if u == v {
            return None;
        }
        let (Some(ru), Some(rv)) = (state.pool()[u].route(), state.pool()[v].route()) else {
            return None;
        };
        if ru != rv {
            return None;
        }
        let pu = state.pool()[u].position();
        let pv = state.pool()[v].position();
        let (lo, hi) = if pu < pv { (pu, pv) } else { (pv, pu) };
        let num_nodes = state.route(ru).nodes().len();
        if lo + 1 >= num_nodes - 1 || hi >= num_nodes - 1 {
            return None;
        }
        Some((ru, lo, hi))
    }
}

impl Default for TwoOpt {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeOperator for TwoOpt {
    /// Prices the reversal by replacing the `[lo + 1, hi + 1)` window
    /// with itself reversed via [`crate::search::route::Route::splice_cost`]
    /// — `O(hi - lo)`, the length of the segment being reversed, not the
    /// whole route.
    fn evaluate(
        &self,
        u: usize,
        v: usize,
        state: &SearchState,
        data: &ProblemData,
        cost_eval: &CostEvaluator,
    ) -> Result<i64> {
        let Some((r, lo, hi)) = self.plan(u, v, state) else {
            return Ok(0);
        };
        let before = state.route(r).penalised_cost(data, cost_eval)?;
        let mut content = state.route(r).nodes()[lo + 1..=hi].to_vec();
        content.reverse();
        let after = state.route(r).splice_cost(data, state.pool(), cost_eval, lo + 1, hi + 1, &content)?;
        Ok(after - before)
    }

    fn apply(
        &self,
        u: usize,
        v: usize,
        state: &mut SearchState,
        data: &ProblemData,
        _cost_eval: &CostEvaluator,
    ) -> Result<()> {
        let Some((r, lo, hi)) = self.plan(u, v, state) else {
            return Ok(());
        };
        state.apply(r, data, |route, pool| {
            let mut candidate = route.nodes().to_vec();
            candidate[lo + 1..=hi].reverse();
            route.set_nodes(pool, data, candidate);
        })
    }
}

/// Cross-route tail exchange (2-opt*): reconnects the edge leaving `u`
/// to `v`'s tail and vice versa. Gated by [`compatible_depots`] since it
/// splices tails in place without relabelling either route's depot.
pub struct SwapTails;

impl SwapTails {
    pub fn new() -> Self {
        Self
    }

    fn plan(&self, u: usize, v: usize, state: &SearchState, data: &ProblemData) -> Option<(usize, usize, usize, usize)> {
        if u == v {
            return None;
        }
        let (Some(ru), Some(rv)) = (state.pool()[u].route(), state.pool()[v].route()) else {
            return None;
        };
        if ru == rv || !compatible_depots(data, state, ru, rv) {
            return None;
        }
        let pu = state.pool()[u].position();
        let pv = state.pool()[v].position();
        Some((ru, rv, pu, pv))
    }
}

impl Default for SwapTails {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeOperator for SwapTails {
    /// Prices the swap with two [`crate::search::route::Route::splice_cost`]
    /// calls, each replacing one route's tail with the other's —
    /// `O(tail length)` rather than a whole-route rebuild, but not the
    /// constant-bound O(1) a short-segment move gets: a tail can span
    /// most of a route.
    fn evaluate(
        &self,
        u: usize,
        v: usize,
        state: &SearchState,
        data: &ProblemData,
        cost_eval: &CostEvaluator,
    ) -> Result<i64> {
        let Some((ru, rv, pu, pv)) = self.plan(u, v, state, data) else {
            return Ok(0);
        };
        let before = state.route(ru).penalised_cost(data, cost_eval)? + state.route(rv).penalised_cost(data, cost_eval)?;

        let nodes_u = state.route(ru).nodes();
        let nodes_v = state.route(rv).nodes();
        let len_u = nodes_u.len();
        let len_v = nodes_v.len();
        let tail_v: Vec<usize> = nodes_v[pv + 1..].to_vec();
        let tail_u: Vec<usize> = nodes_u[pu + 1..].to_vec();

        let after_u = state.route(ru).splice_cost(data, state.pool(), cost_eval, pu + 1, len_u - 1, &tail_v)?;
        let after_v = state.route(rv).splice_cost(data, state.pool(), cost_eval, pv + 1, len_v - 1, &tail_u)?;
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
        let Some((ru, rv, pu, pv)) = self.plan(u, v, state, data) else {
            return Ok(());
        };
        state.apply_pair(ru, rv, data, |route_u, route_v, pool| {
            let nodes_u = route_u.nodes().to_vec();
            let nodes_v = route_v.nodes().to_vec();

            let mut cand_u = nodes_u[..=pu].to_vec();
            cand_u.extend_from_slice(&nodes_v[pv + 1..]);
            let mut cand_v = nodes_v[..=pv].to_vec();
            cand_v.extend_from_slice(&nodes_u[pu + 1..]);

            route_u.set_nodes(pool, data, cand_u);
            route_v.set_nodes(pool, data, cand_v);
        })
    }
}

/// 2-opt* reconnects tails by splicing them in place: it never relabels
/// which depot sits at the end of a route, so it only produces a valid
/// route pair when both vehicle types share the same start and end
/// depot.
fn compatible_depots(data: &ProblemData, state: &SearchState, ru: usize, rv: usize) -> bool {
    let vtu = &data.vehicle_types()[state.route(ru).vehicle_type()];
    let vtv = &data.vehicle_types()[state.route(rv).vehicle_type()];
    vtu.start_depot() == vtv.start_depot() && vtu.end_depot() == vtv.end_depot()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Client, Depot, Location, Matrix, Profile, TimeWindow, VehicleType};
    use crate::solution::{Route as SolRoute, Solution};

    fn crossed_data() -> ProblemData {
        let tw = TimeWindow::new(0, 1000).unwrap();
        let depots = vec![Location::Depot(Depot::new(0, 0, 0, tw))];
        // A unit square: visiting corners in the order 1->3->2->4 crosses
        // itself and costs more than the uncrossed 1->2->3->4.
        let clients = vec![
            Location::Client(Client::new(0, 1, vec![], vec![], 0, tw, 0)),
            Location::Client(Client::new(1, 1, vec![], vec![], 0, tw, 0)),
            Location::Client(Client::new(1, 0, vec![], vec![], 0, tw, 0)),
            Location::Client(Client::new(0, 1, vec![], vec![], 0, tw, 0)),
        ];
        let vehicles = vec![VehicleType::new(1, vec![], 0, tw)];
        let size = 5;
        let xs = [0i64, 0, 1, 1, 0];
        let ys = [0i64, 1, 1, 0, 1];
        let mut data = vec![0i64; size * size];
        for i in 0..size {
            for j in 0..size {
                data[i * size + j] = (xs[i] - xs[j]).abs() + (ys[i] - ys[j]).abs();
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
    fn test_two_opt_uncrosses_route() {
        let data = crossed_data();
        // visits location indices 1,3,2,4: a crossing tour.
        let sol = Solution::new(vec![SolRoute::new(0, vec![1, 3, 2, 4])]);
        let before_dist = sol.routes()[0].distance(&data).unwrap();

        let mut state = SearchState::from_solution(&data, &sol).unwrap();
        let cost_eval = CostEvaluator::new(vec![], 0, 0);
        let op = TwoOpt::new();
        op.apply_best(1, 2, &mut state, &data, &cost_eval).unwrap();

        let after_dist = state.to_solution().routes()[0].distance(&data).unwrap();
        assert!(after_dist <= before_dist);
    }

    #[test]
    fn test_evaluate_matches_apply_delta() {
        let data = crossed_data();
        let sol = Solution::new(vec![SolRoute::new(0, vec![1, 3, 2, 4])]);
        let mut state = SearchState::from_solution(&data, &sol).unwrap();
        let cost_eval = CostEvaluator::new(vec![], 0, 0);
        let op = TwoOpt::new();

        let before = state.route(0).penalised_cost(&data, &cost_eval).unwrap();
        let delta = op.evaluate(1, 2, &state, &data, &cost_eval).unwrap();
        op.apply(1, 2, &mut state, &data, &cost_eval).unwrap();
        let after = state.route(0).penalised_cost(&data, &cost_eval).unwrap();

        assert_eq!(after - before, delta);
    }
}
