//! Mutable search state: a node pool plus every route, converted to and
//! from an immutable [`crate::solution::Solution`] at the search's edges.

use crate::data::ProblemData;
use crate::error::Result;

use super::node::Node;
use super::route::Route;

/// Owns every node and route touched during a [`super::LocalSearch`] call.
///
/// `pool[i]` is the node for location `i`: depots occupy the first
/// `data.num_depots()` slots and are placed once per route use (a route's
/// start/end depot, plus one slot per allowed reload visit), clients
/// occupy the rest, one slot each.
pub struct SearchState {
    pool: Vec<Node>,
    routes: Vec<Route>,
}

impl SearchState {
    /// Builds a search state from an existing solution: one route per
    /// solution route, in the same order, plus empty routes for any
    /// configured vehicle not currently in use.
    pub fn from_solution(data: &ProblemData, solution: &crate::solution::Solution) -> Result<Self> {
        let mut pool: Vec<Node> = (0..data.num_locations()).map(Node::new).collect();
        let mut routes = Vec::new();

        for sol_route in solution.routes() {
            let vt = sol_route.vehicle_type();
            let start = data.vehicle_types()[vt].start_depot();
            let end = data.vehicle_types()[vt].end_depot();
            let route_idx = routes.len();
            let mut route = Route::new(route_idx, vt, start, end);
            for &loc in sol_route.visits() {
                route.append(&mut pool, data, loc);
            }
            route.update(data, &pool)?;
            routes.push(route);
        }

        Ok(Self { pool, routes })
    }

    /// Exports the current state back to an immutable solution snapshot.
    pub fn to_solution(&self) -> crate::solution::Solution {
        let routes = self
            .routes
            .iter()
            .map(|r| {
                let visits: Vec<usize> = r.nodes()[1..r.nodes().len() - 1]
                    .iter()
                    .map(|&idx| self.pool[idx].location())
                    .collect();
                crate::solution::Route::new(r.vehicle_type(), visits)
            })
            .collect();
        crate::solution::Solution::new(routes)
    }

    pub fn pool(&self) -> &[Node] {
        &self.pool
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn route(&self, idx: usize) -> &Route {
        &self.routes[idx]
    }

    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Client location indices currently assigned to some route.
    pub fn assigned_clients(&self, data: &ProblemData) -> Vec<usize> {
        data.client_indices()
            .filter(|&idx| self.pool[idx].is_assigned())
            .collect()
    }

    /// Client location indices not currently assigned to any route.
    pub fn unassigned_clients(&self, data: &ProblemData) -> Vec<usize> {
        data.client_indices()
            .filter(|&idx| !self.pool[idx].is_assigned())
            .collect()
    }

    /// Applies a committed edit to route `idx`, then refreshes its caches.
    pub fn apply(
        &mut self,
        idx: usize,
        data: &ProblemData,
        f: impl FnOnce(&mut Route, &mut Vec<Node>),
    ) -> Result<()> {
        let mut pool = std::mem::take(&mut self.pool);
        f(&mut self.routes[idx], &mut pool);
        self.routes[idx].update(data, &pool)?;
        self.pool = pool;
        Ok(())
    }

    /// Swaps the vehicle type assigned to two routes, replacing each
    /// route's start/end depot nodes accordingly.
    pub fn swap_vehicle_types(&mut self, a: usize, b: usize, data: &ProblemData) -> Result<()> {
        let vt_a = self.routes[a].vehicle_type();
        let vt_b = self.routes[b].vehicle_type();
        let (start_a, end_a) = (
            data.vehicle_types()[vt_a].start_depot(),
            data.vehicle_types()[vt_a].end_depot(),
        );
        let (start_b, end_b) = (
            data.vehicle_types()[vt_b].start_depot(),
            data.vehicle_types()[vt_b].end_depot(),
        );

        let mut pool = std::mem::take(&mut self.pool);
        self.routes[a].set_vehicle_type(&mut pool, data, vt_b, start_b, end_b);
        self.routes[b].set_vehicle_type(&mut pool, data, vt_a, start_a, end_a);
        self.routes[a].update(data, &pool)?;
        self.routes[b].update(data, &pool)?;
        self.pool = pool;
        Ok(())
    }

    /// Applies a committed edit touching two routes at once.
    pub fn apply_pair(
        &mut self,
        a: usize,
        b: usize,
        data: &ProblemData,
        f: impl FnOnce(&mut Route, &mut Route, &mut Vec<Node>),
    ) -> Result<()> {
        let mut pool = std::mem::take(&mut self.pool);
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (left, right) = self.routes.split_at_mut(hi);
        if a < b {
            f(&mut left[lo], &mut right[0], &mut pool);
        } else {
            f(&mut right[0], &mut left[lo], &mut pool);
        }
        self.routes[a].update(data, &pool)?;
        self.routes[b].update(data, &pool)?;
        self.pool = pool;
        Ok(())
    }
}
