//! `(N, M)`-exchange: swaps a segment of `N` consecutive visits starting
//! at client `u` with a segment of `M` consecutive visits starting at
//! client `v`. `M == 0` degenerates to relocating `u`'s segment in front
//! of `v`. Segments longer than one visit are also tried reversed.
//!
//! Covers every combination with `0 <= M <= N <= 3`, which is the set
//! PyVRP itself wires up as its node operators (`(1,0)` through `(3,3)`).

use crate::data::ProblemData;
use crate::error::Result;
use crate::evaluation::CostEvaluator;

use super::{segment_in_bounds, splice_cross_route, splice_same_route, windowed_swap, NodeOperator};
use crate::search::state::SearchState;

/// Exchanges a length-`N` segment anchored at `u` with a length-`M`
/// segment anchored at `v`.
pub struct Exchange<const N: usize, const M: usize>;

impl<const N: usize, const M: usize> Exchange<N, M> {
    pub fn new() -> Self {
        Self
    }
}

impl<const N: usize, const M: usize> Default for Exchange<N, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize, const M: usize> NodeOperator for Exchange<N, M> {
    fn evaluate(
        &self,
        u: usize,
        v: usize,
        state: &SearchState,
        data: &ProblemData,
        cost_eval: &CostEvaluator,
    ) -> Result<i64> {
        if u == v {
            return Ok(0);
        }
        let (Some(ru), Some(rv)) = (state.pool()[u].route(), state.pool()[v].route()) else {
            return Ok(0);
        };
        let pu = state.pool()[u].position();
        let pv = state.pool()[v].position();

        if ru == rv {
            let num_nodes = state.route(ru).nodes().len();
            if !segment_in_bounds(pu, N, num_nodes) || !segment_in_bounds(pv, M, num_nodes) {
                return Ok(0);
            }
            if ranges_overlap(pu, N, pv, M) {
                return Ok(0);
            }
            Ok(self
                .best_same_route(ru, pu, pv, state, data, cost_eval)?
                .map(|(delta, _, _)| delta)
                .unwrap_or(0))
        } else {
            let num_u = state.route(ru).nodes().len();
            let num_v = state.route(rv).nodes().len();
            if !segment_in_bounds(pu, N, num_u) || !segment_in_bounds(pv, M, num_v) {
                return Ok(0);
            }
            Ok(self
                .best_cross_route(ru, rv, pu, pv, state, data, cost_eval)?
                .map(|(delta, _, _)| delta)
                .unwrap_or(0))
        }
    }

    fn apply(
        &self,
        u: usize,
        v: usize,
        state: &mut SearchState,
        data: &ProblemData,
        cost_eval: &CostEvaluator,
    ) -> Result<()> {
        if u == v {
            return Ok(());
        }
        let (Some(ru), Some(rv)) = (state.pool()[u].route(), state.pool()[v].route()) else {
            return Ok(());
        };
        let pu = state.pool()[u].position();
        let pv = state.pool()[v].position();

        if ru == rv {
            let num_nodes = state.route(ru).nodes().len();
            if !segment_in_bounds(pu, N, num_nodes)
                || !segment_in_bounds(pv, M, num_nodes)
                || ranges_overlap(pu, N, pv, M)
            {
                return Ok(());
            }
            let Some((_, rev_u, rev_v)) = self.best_same_route(ru, pu, pv, state, data, cost_eval)? else {
                return Ok(());
            };
            let nodes = state.route(ru).nodes().to_vec();
            let candidate = splice_same_route(&nodes, pu, N, rev_u, pv, M, rev_v);
            state.apply(ru, data, |route, pool| {
                route.set_nodes(pool, data, candidate);
            })
        } else {
            let num_u = state.route(ru).nodes().len();
            let num_v = state.route(rv).nodes().len();
            if !segment_in_bounds(pu, N, num_u) || !segment_in_bounds(pv, M, num_v) {
                return Ok(());
            }
            let Some((_, rev_u, rev_v)) = self.best_cross_route(ru, rv, pu, pv, state, data, cost_eval)? else {
                return Ok(());
            };
            let nodes_u = state.route(ru).nodes().to_vec();
            let nodes_v = state.route(rv).nodes().to_vec();
            let (cand_u, cand_v) = splice_cross_route(&nodes_u, pu, N, rev_u, &nodes_v, pv, M, rev_v);
            state.apply_pair(ru, rv, data, |route_u, route_v, pool| {
                route_u.set_nodes(pool, data, cand_u);
                route_v.set_nodes(pool, data, cand_v);
            })
        }
    }
}

impl<const N: usize, const M: usize> Exchange<N, M> {
    /// Best orientation for a same-route swap of the segments anchored at
    /// `pu` and `pv`: the delta-cost and which segment(s) were reversed.
    /// Prices each of up to four orientations via `Route::splice_cost`
    /// against only the affected window, `O(hi - lo)` per orientation
    /// rather than the whole route.
    fn best_same_route(
        &self,
        r: usize,
        pu: usize,
        pv: usize,
        state: &SearchState,
        data: &ProblemData,
        cost_eval: &CostEvaluator,
    ) -> Result<Option<(i64, bool, bool)>> {
        let before = state.route(r).penalised_cost(data, cost_eval)?;
        let nodes = state.route(r).nodes();

        let mut best: Option<(i64, bool, bool)> = None;
        for rev_u in orientations(N) {
            for rev_v in orientations(M) {
                let (lo, hi, content) = windowed_swap(nodes, pu, N, rev_u, pv, M, rev_v);
                let after = state.route(r).splice_cost(data, state.pool(), cost_eval, lo, hi, &content)?;
                let delta = after - before;
                if best.as_ref().is_none_or(|&(d, _, _)| delta < d) {
                    best = Some((delta, rev_u, rev_v));
                }
            }
        }
        Ok(best)
    }

    /// Best orientation for a cross-route swap of the segment anchored at
    /// `pu` in route `ru` with the one anchored at `pv` in route `rv`.
    /// Each orientation is priced by two independent `Route::splice_cost`
    /// calls, one per route, each `O(N)`/`O(M)` — true constant time since
    /// neither route's own length enters the cost.
    #[allow(clippy::too_many_arguments)]
    fn best_cross_route(
        &self,
        ru: usize,
        rv: usize,
        pu: usize,
        pv: usize,
        state: &SearchState,
        data: &ProblemData,
        cost_eval: &CostEvaluator,
    ) -> Result<Option<(i64, bool, bool)>> {
        let before =
            state.route(ru).penalised_cost(data, cost_eval)? + state.route(rv).penalised_cost(data, cost_eval)?;
        let nodes_u = state.route(ru).nodes();
        let nodes_v = state.route(rv).nodes();

        let mut best: Option<(i64, bool, bool)> = None;
        for rev_u in orientations(N) {
            for rev_v in orientations(M) {
                let mut seg_u: Vec<usize> = nodes_u[pu..pu + N].to_vec();
                let mut seg_v: Vec<usize> = nodes_v[pv..pv + M].to_vec();
                if rev_u {
                    seg_u.reverse();
                }
                if rev_v {
                    seg_v.reverse();
                }
                let after_u = state.route(ru).splice_cost(data, state.pool(), cost_eval, pu, pu + N, &seg_v)?;
                let after_v = state.route(rv).splice_cost(data, state.pool(), cost_eval, pv, pv + M, &seg_u)?;
                let delta = (after_u + after_v) - before;
                if best.as_ref().is_none_or(|&(d, _, _)| delta < d) {
                    best = Some((delta, rev_u, rev_v));
                }
            }
        }
        Ok(best)
    }
}

fn ranges_overlap(a_start: usize, a_len: usize, b_start: usize, b_len: usize) -> bool {
    if a_len == 0 || b_len == 0 {
        return false;
    }
    a_start < b_start + b_len && b_start < a_start + a_len
}

/// Orientations worth trying for a segment of the given length: a
/// single-visit (or empty) segment has no distinct reversal.
fn orientations(len: usize) -> Vec<bool> {
    if len <= 1 {
        vec![false]
    } else {
        vec![false, true]
    }
}

/// Relocates `u` together with its successor in front of `v`, trying
/// both segment orientations.
///
/// PyVRP wires this up as a distinct node operator from the general
/// `(2,0)`-exchange for historical reasons; here it is a thin wrapper
/// over [`Exchange<2, 0>`] since that operator already tries the
/// reversed orientation for any segment longer than one visit.
pub struct MoveTwoClientsReversed {
    inner: Exchange<2, 0>,
}

impl MoveTwoClientsReversed {
    pub fn new() -> Self {
        Self {
            inner: Exchange::new(),
        }
    }
}

impl Default for MoveTwoClientsReversed {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeOperator for MoveTwoClientsReversed {
    fn evaluate(
        &self,
        u: usize,
        v: usize,
        state: &SearchState,
        data: &ProblemData,
        cost_eval: &CostEvaluator,
    ) -> Result<i64> {
        self.inner.evaluate(u, v, state, data, cost_eval)
    }

    fn apply(
        &self,
        u: usize,
        v: usize,
        state: &mut SearchState,
        data: &ProblemData,
        cost_eval: &CostEvaluator,
    ) -> Result<()> {
        self.inner.apply(u, v, state, data, cost_eval)
    }
}
