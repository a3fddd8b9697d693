//! Immutable problem input: clients, depots, vehicle types, groups, and
//! the distance/duration matrices that tie them together.
//!
//! Everything in this module is built once, validated at construction,
//! and thereafter read only — it is safe to share across several
//! independent [`crate::search::LocalSearch`] instances.

mod group;
mod location;
mod problem_data;
mod vehicle_type;

pub use group::ClientGroup;
pub use location::{Client, Depot, Location, TimeWindow};
pub use problem_data::{Matrix, ProblemData, Profile};
pub use vehicle_type::VehicleType;
