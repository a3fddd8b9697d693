//! Operators for optional clients and mutually exclusive groups: these
//! change *which* clients are visited, not just in what order, so they
//! weigh a route cost delta against the prize collected or forfeited.

use crate::data::ProblemData;
use crate::error::Result;
use crate::evaluation::CostEvaluator;

use super::NodeOperator;
use crate::search::state::SearchState;

fn prize_of(data: &ProblemData, client: usize) -> i64 {
    data.location(client).as_client().map(|c| c.prize()).unwrap_or(0)
}

/// Inserts an unassigned optional client `u` into the route that holds
/// an already-assigned neighbour `v`, immediately before or after it,
/// whichever is cheaper. Applies the move if the prize collected
/// outweighs the added route cost.
pub struct OptionalInsert;

impl OptionalInsert {
    pub fn new() -> Self {
        Self
    }

    /// The route, insertion position, and cost delta (after minus
    /// before, less `u`'s prize) of the cheaper of the two candidate
    /// positions flanking `v`, or `None` if the move doesn't apply.
    fn plan(&self, u: usize, v: usize, state: &SearchState, data: &ProblemData, cost_eval: &CostEvaluator) -> Result<Option<(usize, usize, i64)>> {
        if state.pool()[u].is_assigned() || !state.pool()[v].is_assigned() {
            return Ok(None);
        }
        let r = state.pool()[v].route().expect("checked above");
        let pv = state.pool()[v].position();
        let before = state.route(r).penalised_cost(data, cost_eval)?;

        let mut best: Option<(i64, usize)> = None;
        for pos in [pv, pv + 1] {
            let after = state.route(r).splice_cost(data, state.pool(), cost_eval, pos, pos, &[u])?;
            let delta = after - before - prize_of(data, u);
            if best.as_ref().is_none_or(|&(d, _)| delta < d) {
                best = Some((delta, pos));
            }
        }
        let (delta, pos) = best.expect("pv, pv+1 is never empty");
        Ok(Some((r, pos, delta)))
    }
}

impl Default for OptionalInsert {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeOperator for OptionalInsert {
    fn evaluate(&self, u: usize, v: usize, state: &SearchState, data: &ProblemData, cost_eval: &CostEvaluator) -> Result<i64> {
        Ok(self.plan(u, v, state, data, cost_eval)?.map(|(_, _, d)| d).unwrap_or(0))
    }

    fn apply(&self, u: usize, v: usize, state: &mut SearchState, data: &ProblemData, cost_eval: &CostEvaluator) -> Result<()> {
        let Some((r, pos, _)) = self.plan(u, v, state, data, cost_eval)? else {
            return Ok(());
        };
        state.apply(r, data, |route, pool| {
            route.insert(pool, data, pos, u);
        })
    }
}

/// Removes an assigned, non-required client `u` from its route, if
/// doing so saves more in route cost than its prize is worth. `v` is
/// unused; the operator is anchored purely on `u`.
pub struct RemoveOptional;

impl RemoveOptional {
    pub fn new() -> Self {
        Self
    }

    fn plan(&self, u: usize, state: &SearchState, data: &ProblemData, cost_eval: &CostEvaluator) -> Result<Option<(usize, usize, i64)>> {
        let Some(c) = data.location(u).as_client() else {
            return Ok(None);
        };
        if c.required() {
            return Ok(None);
        }
        let Some(r) = state.pool()[u].route() else {
            return Ok(None);
        };
        let pu = state.pool()[u].position();
        let before = state.route(r).penalised_cost(data, cost_eval)?;
        let after = state.route(r).splice_cost(data, state.pool(), cost_eval, pu, pu + 1, &[])?;
        let delta = after + c.prize() - before;
        Ok(Some((r, pu, delta)))
    }
}

impl Default for RemoveOptional {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeOperator for RemoveOptional {
    fn evaluate(&self, u: usize, _v: usize, state: &SearchState, data: &ProblemData, cost_eval: &CostEvaluator) -> Result<i64> {
        Ok(self.plan(u, state, data, cost_eval)?.map(|(_, _, d)| d).unwrap_or(0))
    }

    fn apply(&self, u: usize, _v: usize, state: &mut SearchState, data: &ProblemData, cost_eval: &CostEvaluator) -> Result<()> {
        let Some((r, pu, _)) = self.plan(u, state, data, cost_eval)? else {
            return Ok(());
        };
        state.apply(r, data, |route, pool| {
            route.remove(pool, data, pu);
        })
    }
}

/// Replaces an assigned group member `u` with an unassigned member `v`
/// of the same mutually-exclusive group, at the same route position.
/// Applies the move whenever the net of route cost delta and prize
/// swap is negative.
pub struct SwapInPlace;

impl SwapInPlace {
    pub fn new() -> Self {
        Self
    }

    fn plan(&self, u: usize, v: usize, state: &SearchState, data: &ProblemData, cost_eval: &CostEvaluator) -> Result<Option<(usize, usize, i64)>> {
        if data.group_of(u).is_none() || data.group_of(u) != data.group_of(v) {
            return Ok(None);
        }
        if !state.pool()[u].is_assigned() || state.pool()[v].is_assigned() {
            return Ok(None);
        }
        let r = state.pool()[u].route().expect("checked above");
        let pu = state.pool()[u].position();
        let before = state.route(r).penalised_cost(data, cost_eval)?;
        let after = state.route(r).splice_cost(data, state.pool(), cost_eval, pu, pu + 1, &[v])?;
        let delta = (after + prize_of(data, u)) - (before + prize_of(data, v));
        Ok(Some((r, pu, delta)))
    }
}

impl Default for SwapInPlace {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeOperator for SwapInPlace {
    fn evaluate(&self, u: usize, v: usize, state: &SearchState, data: &ProblemData, cost_eval: &CostEvaluator) -> Result<i64> {
        Ok(self.plan(u, v, state, data, cost_eval)?.map(|(_, _, d)| d).unwrap_or(0))
    }

    fn apply(&self, u: usize, v: usize, state: &mut SearchState, data: &ProblemData, cost_eval: &CostEvaluator) -> Result<()> {
        let Some((r, pu, _)) = self.plan(u, v, state, data, cost_eval)? else {
            return Ok(());
        };
        state.apply(r, data, |route, pool| {
            let mut candidate = route.nodes().to_vec();
            candidate[pu] = v;
            route.set_nodes(pool, data, candidate);
        })
    }
}

/// Inserts an unassigned client `u` into the route holding an
/// already-assigned neighbour `v`, unconditionally (no prize weighing).
/// Used by a constructive pass to place a client with nowhere else to
/// go; [`OptionalInsert`] is the prize-aware variant used for clients
/// the search is free to leave out.
///
/// Because placement here is mandatory rather than improving,
/// [`Self::apply_best`] is overridden instead of relying on the default
/// evaluate-then-gate-on-negative-delta behaviour: `evaluate` still
/// reports the real cost delta (useful to a caller that wants to know
/// the price of placing `u`), but `apply_best` applies regardless of
/// its sign.
pub struct Insert;

impl Insert {
    pub fn new() -> Self {
        Self
    }

    fn plan(&self, u: usize, v: usize, state: &SearchState) -> Option<(usize, usize)> {
        if state.pool()[u].is_assigned() || !state.pool()[v].is_assigned() {
            return None;
        }
        let r = state.pool()[v].route().expect("checked above");
        let pv = state.pool()[v].position();
        Some((r, pv))
    }
}

impl Default for Insert {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeOperator for Insert {
    fn evaluate(&self, u: usize, v: usize, state: &SearchState, data: &ProblemData, cost_eval: &CostEvaluator) -> Result<i64> {
        let Some((r, pv)) = self.plan(u, v, state) else {
            return Ok(0);
        };
        let before = state.route(r).penalised_cost(data, cost_eval)?;
        let after = state.route(r).splice_cost(data, state.pool(), cost_eval, pv, pv, &[u])?;
        Ok(after - before)
    }

    fn apply(&self, u: usize, v: usize, state: &mut SearchState, data: &ProblemData, _cost_eval: &CostEvaluator) -> Result<()> {
        let Some((r, pv)) = self.plan(u, v, state) else {
            return Ok(());
        };
        state.apply(r, data, |route, pool| {
            route.insert(pool, data, pv, u);
        })
    }

    fn apply_best(&self, u: usize, v: usize, state: &mut SearchState, data: &ProblemData, cost_eval: &CostEvaluator) -> Result<bool> {
        if self.plan(u, v, state).is_none() {
            return Ok(false);
        }
        self.apply(u, v, state, data, cost_eval)?;
        Ok(true)
    }
}

/// Replaces an assigned client `u` with an unassigned client `v` at the
/// same route position, with no group or prize constraint: applies
/// whenever the swap strictly improves route cost. [`SwapInPlace`] and
/// [`ReplaceGroup`] are the group-constrained, prize-aware variants of
/// this same move.
pub struct Replace;

impl Replace {
    pub fn new() -> Self {
        Self
    }

    fn plan(&self, u: usize, v: usize, state: &SearchState, data: &ProblemData, cost_eval: &CostEvaluator) -> Result<Option<(usize, usize, i64)>> {
        if !state.pool()[u].is_assigned() || state.pool()[v].is_assigned() {
            return Ok(None);
        }
        let r = state.pool()[u].route().expect("checked above");
        let pu = state.pool()[u].position();
        let before = state.route(r).penalised_cost(data, cost_eval)?;
        let after = state.route(r).splice_cost(data, state.pool(), cost_eval, pu, pu + 1, &[v])?;
        Ok(Some((r, pu, after - before)))
    }
}

impl Default for Replace {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeOperator for Replace {
    fn evaluate(&self, u: usize, v: usize, state: &SearchState, data: &ProblemData, cost_eval: &CostEvaluator) -> Result<i64> {
        Ok(self.plan(u, v, state, data, cost_eval)?.map(|(_, _, d)| d).unwrap_or(0))
    }

    fn apply(&self, u: usize, v: usize, state: &mut SearchState, data: &ProblemData, cost_eval: &CostEvaluator) -> Result<()> {
        let Some((r, pu, _)) = self.plan(u, v, state, data, cost_eval)? else {
            return Ok(());
        };
        state.apply(r, data, |route, pool| {
            let mut candidate = route.nodes().to_vec();
            candidate[pu] = v;
            route.set_nodes(pool, data, candidate);
        })
    }
}

/// Replaces an assigned optional client `u` with a better unassigned
/// optional client `v`, regardless of group membership, weighing the
/// route cost delta against the prize swap exactly as [`SwapInPlace`]
/// does for a shared group.
pub struct ReplaceOptional;

impl ReplaceOptional {
    pub fn new() -> Self {
        Self
    }

    fn plan(&self, u: usize, v: usize, state: &SearchState, data: &ProblemData, cost_eval: &CostEvaluator) -> Result<Option<(usize, usize, i64)>> {
        let Some(cu) = data.location(u).as_client() else {
            return Ok(None);
        };
        if data.location(v).as_client().is_none() {
            return Ok(None);
        }
        if cu.required() || !state.pool()[u].is_assigned() || state.pool()[v].is_assigned() {
            return Ok(None);
        }
        let r = state.pool()[u].route().expect("checked above");
        let pu = state.pool()[u].position();
        let before = state.route(r).penalised_cost(data, cost_eval)?;
        let after = state.route(r).splice_cost(data, state.pool(), cost_eval, pu, pu + 1, &[v])?;
        let delta = (after + prize_of(data, u)) - (before + prize_of(data, v));
        Ok(Some((r, pu, delta)))
    }
}

impl Default for ReplaceOptional {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeOperator for ReplaceOptional {
    fn evaluate(&self, u: usize, v: usize, state: &SearchState, data: &ProblemData, cost_eval: &CostEvaluator) -> Result<i64> {
        Ok(self.plan(u, v, state, data, cost_eval)?.map(|(_, _, d)| d).unwrap_or(0))
    }

    fn apply(&self, u: usize, v: usize, state: &mut SearchState, data: &ProblemData, cost_eval: &CostEvaluator) -> Result<()> {
        let Some((r, pu, _)) = self.plan(u, v, state, data, cost_eval)? else {
            return Ok(());
        };
        state.apply(r, data, |route, pool| {
            let mut candidate = route.nodes().to_vec();
            candidate[pu] = v;
            route.set_nodes(pool, data, candidate);
        })
    }
}

/// Alias of [`SwapInPlace`] under the name PyVRP gives the group-swap
/// variant of `Replace`.
pub type ReplaceGroup = SwapInPlace;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Client, Depot, Location, Matrix, Profile, TimeWindow, VehicleType};
    use crate::solution::{Route as SolRoute, Solution};

    fn prize_data() -> ProblemData {
        let tw = TimeWindow::new(0, 1000).unwrap();
        let depots = vec![Location::Depot(Depot::new(0, 0, 0, tw))];
        let clients = vec![
            Location::Client(Client::new(1, 0, vec![], vec![], 0, tw, 0)),
            Location::Client(Client::new(2, 0, vec![], vec![], 0, tw, 0).with_prize(100)),
        ];
        let vehicles = vec![VehicleType::new(1, vec![], 0, tw)];
        let matrix = Matrix::from_data(3, vec![0, 1, 2, 1, 0, 1, 2, 1, 0]).unwrap();
        let profiles = vec![Profile {
            distance: matrix.clone(),
            duration: matrix,
        }];
        ProblemData::new(depots, clients, vehicles, profiles, vec![]).unwrap()
    }

    #[test]
    fn test_optional_insert_collects_worthwhile_prize() {
        let data = prize_data();
        let sol = Solution::new(vec![SolRoute::new(0, vec![1])]);
        let mut state = SearchState::from_solution(&data, &sol).unwrap();
        let cost_eval = CostEvaluator::new(vec![], 0, 0);

        let op = OptionalInsert::new();
        let applied = op.apply_best(2, 1, &mut state, &data, &cost_eval).unwrap();
        assert!(applied);
        assert!(state.pool()[2].is_assigned());
    }

    #[test]
    fn test_remove_optional_skips_required_client() {
        let data = prize_data();
        let sol = Solution::new(vec![SolRoute::new(0, vec![1, 2])]);
        let mut state = SearchState::from_solution(&data, &sol).unwrap();
        let cost_eval = CostEvaluator::new(vec![], 0, 0);

        let op = RemoveOptional::new();
        assert!(!op.apply_best(1, 2, &mut state, &data, &cost_eval).unwrap());
    }

    #[test]
    fn test_insert_applies_even_when_costlier() {
        let data = prize_data();
        let sol = Solution::new(vec![SolRoute::new(0, vec![1])]);
        let mut state = SearchState::from_solution(&data, &sol).unwrap();
        let cost_eval = CostEvaluator::new(vec![], 0, 0);

        let op = Insert::new();
        let delta = op.evaluate(2, 1, &state, &data, &cost_eval).unwrap();
        assert!(delta > 0);
        let applied = op.apply_best(2, 1, &mut state, &data, &cost_eval).unwrap();
        assert!(applied);
        assert!(state.pool()[2].is_assigned());
    }
}
