//! Penalized cost evaluation over a [`Solution`](crate::solution::Solution).

use crate::data::ProblemData;
use crate::error::Result;
use crate::solution::Solution;

/// Penalty weights for capacity, time-warp, and excess-distance
/// violations, kept separate from [`ProblemData`] so an outer search can
/// anneal them between calls without touching the problem instance.
///
/// # Examples
///
/// ```
/// use vrp_search_core::evaluation::CostEvaluator;
///
/// let eval = CostEvaluator::new(vec![10], 6, 1);
/// assert_eq!(eval.load_penalty(15, 10, 0), 50);
/// assert_eq!(eval.tw_penalty(3), 18);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostEvaluator {
    load_penalties: Vec<i64>,
    tw_penalty: i64,
    dist_penalty: i64,
}

impl CostEvaluator {
    /// Creates an evaluator with one load penalty per capacity dimension,
    /// a time-warp penalty, and an excess-distance penalty.
    pub fn new(load_penalties: Vec<i64>, tw_penalty: i64, dist_penalty: i64) -> Self {
        Self {
            load_penalties,
            tw_penalty,
            dist_penalty,
        }
    }

    /// `penalty[dim] * max(0, load - capacity)`.
    pub fn load_penalty(&self, load: i64, capacity: i64, dim: usize) -> i64 {
        let excess = 0.max(load - capacity);
        self.load_penalties.get(dim).copied().unwrap_or(0) * excess
    }

    /// `tw_pen * time_warp`.
    pub fn tw_penalty(&self, time_warp: i64) -> i64 {
        self.tw_penalty * time_warp
    }

    /// `dist_pen * max(0, distance - max_distance)`.
    pub fn dist_penalty(&self, distance: i64, max_distance: i64) -> i64 {
        self.dist_penalty * 0.max(distance - max_distance)
    }

    fn is_feasible(&self, solution: &Solution, data: &ProblemData) -> Result<bool> {
        if solution.total_time_warp(data)? > 0 || solution.excess_distance(data)? > 0 {
            return Ok(false);
        }
        for dim in 0..data
            .vehicle_types()
            .iter()
            .map(|v| v.num_load_dimensions())
            .max()
            .unwrap_or(0)
        {
            if solution.excess_load(data, dim)? > 0 {
                return Ok(false);
            }
        }
        Ok(solution.missing_required_clients(data) == 0 && solution.is_group_feasible(data))
    }

    /// Raw travel + fixed-vehicle cost net of collected/uncollected
    /// prizes, with no penalty terms. If `solution` is infeasible, returns
    /// [`i64::MAX`] instead (the maximum representable cost).
    pub fn cost(&self, solution: &Solution, data: &ProblemData) -> Result<i64> {
        if !self.is_feasible(solution, data)? {
            return Ok(i64::MAX);
        }
        self.raw_cost(solution, data)
    }

    /// Same as [`Self::cost`], but adds penalty terms even when the
    /// solution is infeasible, so a search can still rank infeasible
    /// candidates against each other.
    pub fn penalised_cost(&self, solution: &Solution, data: &ProblemData) -> Result<i64> {
        let mut total = self.raw_cost(solution, data)?;

        total = crate::error::checked_add(
            total,
            self.tw_penalty(solution.total_time_warp(data)?),
            "penalised cost: time warp",
        )?;

        let max_dims = data
            .vehicle_types()
            .iter()
            .map(|v| v.num_load_dimensions())
            .max()
            .unwrap_or(0);
        for dim in 0..max_dims {
            let excess = solution.excess_load(data, dim)?;
            total = crate::error::checked_add(
                total,
                self.load_penalties.get(dim).copied().unwrap_or(0) * excess,
                "penalised cost: excess load",
            )?;
        }

        let excess_dist = solution.excess_distance(data)?;
        total = crate::error::checked_add(
            total,
            self.dist_penalty * excess_dist,
            "penalised cost: excess distance",
        )?;

        Ok(total)
    }

    fn raw_cost(&self, solution: &Solution, data: &ProblemData) -> Result<i64> {
        let mut total = 0i64;
        for route in solution.routes() {
            let vt = &data.vehicle_types()[route.vehicle_type()];
            let distance_cost = vt.unit_distance_cost() * route.distance(data)?;
            let duration_cost = vt.unit_duration_cost() * route.duration(data)?;
            let fixed = if route.is_empty() { 0 } else { vt.fixed_cost() };
            total = crate::error::checked_add(total, distance_cost, "raw cost: distance")?;
            total = crate::error::checked_add(total, duration_cost, "raw cost: duration")?;
            total = crate::error::checked_add(total, fixed, "raw cost: fixed")?;
        }

        let collected_prizes: i64 = solution
            .routes()
            .iter()
            .flat_map(|r| r.visits().iter())
            .filter_map(|&idx| data.location(idx).as_client().map(|c| c.prize()))
            .sum();
        let uncollected = solution.uncollected_prizes(data);

        total = crate::error::checked_sub(total, collected_prizes, "raw cost: collected prizes")?;
        crate::error::checked_add(total, uncollected, "raw cost: uncollected prizes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_penalty_within_capacity() {
        let eval = CostEvaluator::new(vec![10], 1, 1);
        assert_eq!(eval.load_penalty(5, 10, 0), 0);
    }

    #[test]
    fn test_load_penalty_exceeds_capacity() {
        let eval = CostEvaluator::new(vec![10], 1, 1);
        assert_eq!(eval.load_penalty(15, 10, 0), 50);
    }

    #[test]
    fn test_tw_penalty() {
        let eval = CostEvaluator::new(vec![], 6, 1);
        assert_eq!(eval.tw_penalty(3), 18);
    }

    #[test]
    fn test_dist_penalty() {
        let eval = CostEvaluator::new(vec![], 0, 2);
        assert_eq!(eval.dist_penalty(120, 100), 40);
    }
}
