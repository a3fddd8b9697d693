//! Cost evaluation: penalty weights over capacity, time, and distance
//! violations, decoupled from the problem data so an outer search can
//! anneal them between calls.

mod cost_evaluator;

pub use cost_evaluator::CostEvaluator;
