//! The local-search driver: repeatedly scans clients in random order,
//! tries every operator against their granular neighbours, and applies
//! the first improving move it finds.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::data::ProblemData;
use crate::error::Result;
use crate::evaluation::CostEvaluator;
use crate::solution::Solution;

use super::neighbourhood::Neighbourhood;
use super::operators::depot_ops::{RelocateWithDepot, RemoveAdjacentDepot, TripRelocate};
use super::operators::exchange::{Exchange, MoveTwoClientsReversed};
use super::operators::group_ops::{
    Insert, OptionalInsert, Replace, ReplaceOptional, RemoveOptional, SwapInPlace,
};
use super::operators::route_ops::{RelocateStar, SwapRoutes, SwapStar};
use super::operators::two_opt::{SwapTails, TwoOpt};
use super::operators::NodeOperator;
use super::state::SearchState;

/// Drives node and route operators to a local optimum from a starting
/// solution.
///
/// Holds no mutable state of its own between calls: [`Self::search`],
/// [`Self::intensify`], and [`Self::call`] each build a fresh
/// [`SearchState`], run to a fixed point, and export a new [`Solution`].
/// The only state threaded between calls is whatever the caller passes
/// back in as the next `solution` and `rng`.
pub struct LocalSearch {
    neighbourhood: Neighbourhood,
}

impl LocalSearch {
    pub fn new(neighbourhood: Neighbourhood) -> Self {
        Self { neighbourhood }
    }

    /// Runs every node operator (segment exchange, 2-opt, swap-star,
    /// optional/group operators, reload-depot relocate) to a fixed
    /// point: repeated passes over a shuffled client order, applying the
    /// first improving move found for each client, until a full pass
    /// makes no change.
    pub fn search(
        &self,
        data: &ProblemData,
        solution: &Solution,
        cost_eval: &CostEvaluator,
        rng: &mut impl Rng,
    ) -> Result<Solution> {
        tracing::debug!(num_routes = solution.routes().len(), "starting full local search");
        let mut state = SearchState::from_solution(data, solution)?;
        self.run_to_fixed_point(&mut state, data, cost_eval, rng, all_node_operators())?;
        Ok(state.to_solution())
    }

    /// Like [`Self::search`], but restricted to the cheaper node
    /// operators (everything short of [`SwapStar`] and the reload-depot
    /// relocate), and only re-evaluates client pairs whose routes are
    /// within `overlap_tolerance` of each other's bounding circle
    /// (measured as the distance between each route's centroid).
    ///
    /// Intended as a faster pass run more often than a full [`Self::search`]
    /// call, the way PyVRP intersperses a cheap intra-route sweep between
    /// full searches.
    pub fn intensify(
        &self,
        data: &ProblemData,
        solution: &Solution,
        cost_eval: &CostEvaluator,
        overlap_tolerance: i64,
        rng: &mut impl Rng,
    ) -> Result<Solution> {
        tracing::debug!(overlap_tolerance, "starting intensify pass");
        let mut state = SearchState::from_solution(data, solution)?;
        self.run_to_fixed_point_filtered(
            &mut state,
            data,
            cost_eval,
            rng,
            intensify_operators(),
            Some(overlap_tolerance),
        )?;
        run_route_operators(&mut state, data, cost_eval, overlap_tolerance)?;
        Ok(state.to_solution())
    }

    /// Runs a full perturb → search → intensify cycle: shake the solution
    /// with a random-removal perturbation (see [`super::perturbation`]),
    /// drive every node operator to a fixed point, then the cheaper
    /// route-overlap-filtered intensify pass, all on the same working
    /// state so the perturbed-but-not-yet-repaired solution never escapes
    /// as an intermediate [`Solution`].
    ///
    /// `degree` is the fraction of currently assigned clients the
    /// perturbation detaches (clamped to at least one client, if any are
    /// assigned); `overlap_tolerance` is passed through to the intensify
    /// phase exactly as in [`Self::intensify`].
    pub fn call(
        &self,
        data: &ProblemData,
        solution: &Solution,
        cost_eval: &CostEvaluator,
        overlap_tolerance: i64,
        degree: f64,
        rng: &mut impl Rng,
    ) -> Result<Solution> {
        tracing::debug!(degree, overlap_tolerance, "starting perturb-search-intensify call");
        let mut state = SearchState::from_solution(data, solution)?;
        super::perturbation::random_removal(&mut state, data, degree, rng)?;
        self.run_to_fixed_point(&mut state, data, cost_eval, rng, all_node_operators())?;
        self.run_to_fixed_point_filtered(
            &mut state,
            data,
            cost_eval,
            rng,
            intensify_operators(),
            Some(overlap_tolerance),
        )?;
        run_route_operators(&mut state, data, cost_eval, overlap_tolerance)?;
        Ok(state.to_solution())
    }

    fn run_to_fixed_point(
        &self,
        state: &mut SearchState,
        data: &ProblemData,
        cost_eval: &CostEvaluator,
        rng: &mut impl Rng,
        ops: Vec<Box<dyn NodeOperator>>,
    ) -> Result<()> {
        self.run_to_fixed_point_filtered(state, data, cost_eval, rng, ops, None)
    }

    fn run_to_fixed_point_filtered(
        &self,
        state: &mut SearchState,
        data: &ProblemData,
        cost_eval: &CostEvaluator,
        rng: &mut impl Rng,
        ops: Vec<Box<dyn NodeOperator>>,
        overlap_tolerance: Option<i64>,
    ) -> Result<()> {
        let mut pass = 0u32;
        loop {
            pass += 1;
            let mut improved_any = false;
            let mut clients: Vec<usize> = data.client_indices().collect();
            clients.shuffle(rng);

            for u in clients {
                if !state.pool()[u].is_assigned() {
                    for v in data.client_indices() {
                        if v != u && state.pool()[v].is_assigned() {
                            for op in &ops {
                                if op.apply_best(u, v, state, data, cost_eval)? {
                                    improved_any = true;
                                    break;
                                }
                            }
                        }
                    }
                    continue;
                }

                let neighbours = self.neighbourhood.of(u).to_vec();
                for v in neighbours {
                    if !state.pool()[v].is_assigned() {
                        continue;
                    }
                    if let Some(tol) = overlap_tolerance {
                        if !routes_overlap(state, data, u, v, tol) {
                            continue;
                        }
                    }
                    for op in &ops {
                        if op.apply_best(u, v, state, data, cost_eval)? {
                            improved_any = true;
                            break;
                        }
                    }
                }
            }

            tracing::trace!(pass, improved_any, "local search pass complete");
            if !improved_any {
                return Ok(());
            }
        }
    }
}

/// The cheaper operator subset [`LocalSearch::intensify`] and the
/// intensify phase of [`LocalSearch::call`] restrict themselves to:
/// everything short of [`SwapStar`], [`RelocateStar`], and the
/// reload-depot operators.
fn intensify_operators() -> Vec<Box<dyn NodeOperator>> {
    vec![
        Box::new(Exchange::<1, 0>::new()),
        Box::new(Exchange::<2, 0>::new()),
        Box::new(Exchange::<1, 1>::new()),
        Box::new(TwoOpt::new()),
    ]
}

fn all_node_operators() -> Vec<Box<dyn NodeOperator>> {
    vec![
        Box::new(Exchange::<1, 0>::new()),
        Box::new(Exchange::<2, 0>::new()),
        Box::new(Exchange::<3, 0>::new()),
        Box::new(Exchange::<1, 1>::new()),
        Box::new(Exchange::<2, 1>::new()),
        Box::new(Exchange::<3, 1>::new()),
        Box::new(Exchange::<2, 2>::new()),
        Box::new(Exchange::<3, 2>::new()),
        Box::new(Exchange::<3, 3>::new()),
        Box::new(MoveTwoClientsReversed::new()),
        Box::new(TwoOpt::new()),
        Box::new(SwapTails::new()),
        Box::new(SwapStar::new()),
        Box::new(RelocateStar::new()),
        Box::new(Insert::new()),
        Box::new(OptionalInsert::new()),
        Box::new(RemoveOptional::new()),
        Box::new(Replace::new()),
        Box::new(ReplaceOptional::new()),
        Box::new(SwapInPlace::new()),
        Box::new(RelocateWithDepot::new()),
        Box::new(TripRelocate::new()),
        Box::new(RemoveAdjacentDepot::new()),
    ]
}

/// Whether `u`'s and `v`'s routes are close enough to be worth probing:
/// unassigned clients and same-route pairs always pass, otherwise the
/// two routes' client location centroids must be within `tolerance`.
fn routes_overlap(state: &SearchState, data: &ProblemData, u: usize, v: usize, tolerance: i64) -> bool {
    let (Some(ru), Some(rv)) = (state.pool()[u].route(), state.pool()[v].route()) else {
        return true;
    };
    route_indices_overlap(state, data, ru, rv, tolerance)
}

/// Whether routes `ru` and `rv` (by route index) lie within `tolerance`
/// of each other, measured as the taxicab distance between their client
/// location centroids. Same-route pairs always pass.
fn route_indices_overlap(state: &SearchState, data: &ProblemData, ru: usize, rv: usize, tolerance: i64) -> bool {
    if ru == rv {
        return true;
    }
    let centroid = |r: usize| -> (i64, i64) {
        let visits: Vec<usize> = state.route(r).nodes()[1..state.route(r).nodes().len() - 1].to_vec();
        if visits.is_empty() {
            return (0, 0);
        }
        let n = visits.len() as i64;
        let sum_x: i64 = visits.iter().map(|&i| data.location(i).x()).sum();
        let sum_y: i64 = visits.iter().map(|&i| data.location(i).y()).sum();
        (sum_x / n, sum_y / n)
    };
    let (ax, ay) = centroid(ru);
    let (bx, by) = centroid(rv);
    (ax - bx).abs() + (ay - by).abs() <= tolerance
}

/// Runs [`SwapRoutes`] to a fixed point over every pair of routes whose
/// centroids lie within `overlap_tolerance`, the route-level counterpart
/// to the node-operator sweep above.
fn run_route_operators(
    state: &mut SearchState,
    data: &ProblemData,
    cost_eval: &CostEvaluator,
    overlap_tolerance: i64,
) -> Result<()> {
    loop {
        let mut changed = false;
        let n = state.num_routes();
        for a in 0..n {
            for b in (a + 1)..n {
                if !route_indices_overlap(state, data, a, b, overlap_tolerance) {
                    continue;
                }
                if SwapRoutes::apply(state, data, cost_eval, a, b)? {
                    changed = true;
                }
            }
        }
        if !changed {
            return Ok(());
        }
    }
}
