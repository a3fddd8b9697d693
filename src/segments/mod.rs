//! Concatenation segments: the associative, O(1)-mergeable value types
//! that back every delta-cost computation in this crate.
//!
//! A segment summarises the distance, duration/time-window, or load state
//! of a contiguous sub-sequence of a route. `merge(a, b)` produces the
//! segment for the concatenation `a . b` without re-walking the visits
//! either segment covers — this is what lets node and route operators
//! evaluate candidate moves in constant time.

mod distance;
mod duration;
mod load;

pub use distance::DistanceSegment;
pub use duration::DurationSegment;
pub use load::LoadSegment;
