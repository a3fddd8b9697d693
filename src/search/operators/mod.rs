//! Local-search operators: each evaluates a candidate move anchored on a
//! pair of clients `(u, v)` drawn from the granular neighbourhood, and
//! applies it if it improves the penalised cost of every route it
//! touches.
//!
//! - [`exchange::Exchange`] (and [`exchange::MoveTwoClientsReversed`]) —
//!   swap or relocate short segments, with optional reversal
//! - [`two_opt::TwoOpt`] / [`two_opt::SwapTails`] — reverse a segment, or
//!   swap two routes' tails
//! - [`route_ops::SwapStar`] / [`route_ops::RelocateStar`] — best-position
//!   relocate of one or two clients at once, breaking the adjacency
//!   requirement `Exchange` has
//! - [`route_ops::SwapRoutes`] — exchange two routes' vehicle types
//! - [`group_ops`] — insert, remove, or swap optional/group clients
//! - [`depot_ops`] — move a client or a whole trip together with a
//!   reload depot, or contract a redundant one away

pub mod depot_ops;
pub mod exchange;
pub mod group_ops;
pub mod route_ops;
pub mod two_opt;

pub use exchange::{Exchange, MoveTwoClientsReversed};
pub use two_opt::{SwapTails, TwoOpt};

use crate::data::ProblemData;
use crate::error::Result;
use crate::evaluation::CostEvaluator;

use super::state::SearchState;

/// A move anchored at client `u`, considering candidate `v`.
///
/// `evaluate` and `apply` are deliberately separate: `evaluate` must never
/// mutate `state` or rebuild a route, so that a caller can price many
/// candidate `(u, v)` pairs and only pay for `apply`'s (comparatively rare)
/// mutation once it has picked a winner. `supports` gates an operator out
/// of a problem variant entirely (e.g. a reload-depot operator against
/// data with no reload depots), independent of any particular `(u, v)`.
pub trait NodeOperator {
    /// Cost delta (after minus before) of applying this move to `(u, v)`,
    /// or `0` if the move is structurally inapplicable (wrong route
    /// shape, out-of-bounds segment, mismatched vehicle types, ...).
    /// Never mutates `state`.
    fn evaluate(
        &self,
        u: usize,
        v: usize,
        state: &SearchState,
        data: &ProblemData,
        cost_eval: &CostEvaluator,
    ) -> Result<i64>;

    /// Mutates the affected route(s) in place to realise the move
    /// `evaluate` priced for `(u, v)`. A no-op if the move is
    /// structurally inapplicable. Takes `cost_eval` too: several
    /// operators choose among several candidate positions or
    /// orientations internally and must re-select the same winner
    /// `evaluate` found, since a stateless `&self` operator has nowhere
    /// else to remember which one that was.
    fn apply(
        &self,
        u: usize,
        v: usize,
        state: &mut SearchState,
        data: &ProblemData,
        cost_eval: &CostEvaluator,
    ) -> Result<()>;

    /// Whether this operator applies at all to `data`. Defaults to
    /// always-applicable; operators restricted to a problem feature
    /// (e.g. reload depots) override this rather than repeating the
    /// check inside every `evaluate` call.
    fn supports(&self, _data: &ProblemData) -> bool {
        true
    }

    /// Evaluates the move and applies it if strictly improving. Returns
    /// whether it was applied.
    fn apply_best(
        &self,
        u: usize,
        v: usize,
        state: &mut SearchState,
        data: &ProblemData,
        cost_eval: &CostEvaluator,
    ) -> Result<bool> {
        if !self.supports(data) {
            return Ok(false);
        }
        let delta = self.evaluate(u, v, state, data, cost_eval)?;
        if delta < 0 {
            self.apply(u, v, state, data, cost_eval)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// The minimal window of a same-route swap: the half-open `[lo, hi)`
/// range spanning both segments and everything between them, and the
/// reordered content that range should hold. `pu` and `pv` must not
/// overlap. Either segment may be reversed before being placed back.
///
/// Kept separate from [`splice_same_route`] so an operator's `evaluate`
/// can price the move via `Route::splice_cost` against only this window
/// — `O(hi - lo)` — rather than building a whole new route-length vector
/// just to read its cost back out.
pub(crate) fn windowed_swap(
    nodes: &[usize],
    pu: usize,
    n: usize,
    reverse_u: bool,
    pv: usize,
    m: usize,
    reverse_v: bool,
) -> (usize, usize, Vec<usize>) {
    let mut seg_u = nodes[pu..pu + n].to_vec();
    let mut seg_v = nodes[pv..pv + m].to_vec();
    if reverse_u {
        seg_u.reverse();
    }
    if reverse_v {
        seg_v.reverse();
    }

    let (first_pos, first_len, first_is_u, second_pos, second_len) = if pu < pv {
        (pu, n, true, pv, m)
    } else {
        (pv, m, false, pu, n)
    };

    let lo = first_pos;
    let hi = second_pos + second_len;
    let mut content = Vec::with_capacity(hi - lo);
    content.extend_from_slice(if first_is_u { &seg_v } else { &seg_u });
    content.extend_from_slice(&nodes[first_pos + first_len..second_pos]);
    content.extend_from_slice(if first_is_u { &seg_u } else { &seg_v });
    (lo, hi, content)
}

/// Builds the sequence that results from swapping the segment
/// `nodes[pu..pu+n]` with `nodes[pv..pv+m]` within a single route's node
/// list. `pu` and `pv` must not overlap. Either segment may be reversed
/// before being placed back. Used once a winning orientation has been
/// picked, to realise it as a whole-route candidate for [`Route::set_nodes`].
pub(crate) fn splice_same_route(
    nodes: &[usize],
    pu: usize,
    n: usize,
    reverse_u: bool,
    pv: usize,
    m: usize,
    reverse_v: bool,
) -> Vec<usize> {
    let (lo, hi, content) = windowed_swap(nodes, pu, n, reverse_u, pv, m, reverse_v);
    let mut result = Vec::with_capacity(nodes.len());
    result.extend_from_slice(&nodes[0..lo]);
    result.extend_from_slice(&content);
    result.extend_from_slice(&nodes[hi..]);
    result
}

/// Builds the two sequences that result from swapping
/// `nodes_u[pu..pu+n]` with `nodes_v[pv..pv+m]` across two distinct
/// routes. Either segment may be reversed before being placed back.
pub(crate) fn splice_cross_route(
    nodes_u: &[usize],
    pu: usize,
    n: usize,
    reverse_u: bool,
    nodes_v: &[usize],
    pv: usize,
    m: usize,
    reverse_v: bool,
) -> (Vec<usize>, Vec<usize>) {
    let mut seg_u = nodes_u[pu..pu + n].to_vec();
    let mut seg_v = nodes_v[pv..pv + m].to_vec();
    if reverse_u {
        seg_u.reverse();
    }
    if reverse_v {
        seg_v.reverse();
    }

    let mut new_u = nodes_u[0..pu].to_vec();
    new_u.extend_from_slice(&seg_v);
    new_u.extend_from_slice(&nodes_u[pu + n..]);

    let mut new_v = nodes_v[0..pv].to_vec();
    new_v.extend_from_slice(&seg_u);
    new_v.extend_from_slice(&nodes_v[pv + m..]);

    (new_u, new_v)
}

/// Whether a length-`len` segment starting at (1-indexed) position `pos`
/// fits entirely among client/reload-depot visits, i.e. excludes both the
/// start and end depot.
pub(crate) fn segment_in_bounds(pos: usize, len: usize, num_nodes: usize) -> bool {
    len == 0 || (pos >= 1 && pos + len <= num_nodes - 1)
}
