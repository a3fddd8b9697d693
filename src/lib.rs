//! # vrp-search-core
//!
//! A local-search engine for rich vehicle routing problems: capacitated,
//! multi-depot, heterogeneous-fleet, time-windowed, prize-collecting, and
//! multi-trip variants, built on an associative concatenation-segment
//! data model. Operators price a candidate move by splicing the
//! replaced window against a route's cached prefix/suffix segments
//! rather than rebuilding and re-scanning the whole route: true O(1)
//! for a short, constant-length edit (an `Exchange` across two routes,
//! a single insert/remove/replace), O(window) when the edit's own
//! extent sets the cost (a same-route reversal or segment swap, a
//! cross-route tail exchange).
//!
//! ## Modules
//!
//! - [`data`] — immutable problem input: clients, depots, vehicle types,
//!   groups, distance/duration matrices
//! - [`segments`] — the concatenation-segment algebra (duration, load,
//!   distance) routes are built from
//! - [`evaluation`] — penalised cost evaluation over capacity, time
//!   warp, and distance violations
//! - [`solution`] — the immutable solution snapshot
//! - [`search`] — the mutable local-search engine: node pool, routes,
//!   granular neighbourhoods, and the operator set that drives a
//!   solution to a local optimum

pub mod data;
pub mod error;
pub mod evaluation;
pub mod search;
pub mod segments;
pub mod solution;
