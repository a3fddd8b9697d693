//! Mutually exclusive client groups.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A set of client indices of which at most one — or, if `required`,
/// exactly one — may appear in a feasible solution.
///
/// Groups model product alternatives or substitute delivery addresses:
/// the customer wants exactly one of several possible visits satisfied.
/// Group members must themselves be marked non-required on the
/// [`Client`](super::Client) side; [`ProblemData`](super::ProblemData)
/// checks this at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientGroup {
    clients: Vec<usize>,
    required: bool,
}

impl ClientGroup {
    /// Creates a new group from a non-empty set of client indices.
    pub fn new(clients: Vec<usize>, required: bool) -> Self {
        Self { clients, required }
    }

    /// The client indices belonging to this group.
    pub fn clients(&self) -> &[usize] {
        &self.clients
    }

    /// Whether exactly one (vs. at most one) member must be visited.
    pub fn required(&self) -> bool {
        self.required
    }

    pub(crate) fn validate(&self, idx: usize, num_locations: usize) -> Result<()> {
        if self.clients.is_empty() {
            return Err(Error::InvalidInput(format!(
                "group {idx}: must contain at least one client"
            )));
        }
        for &c in &self.clients {
            if c == 0 || c >= num_locations {
                return Err(Error::InvalidInput(format!(
                    "group {idx}: member {c} is not a valid client index"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_accessors() {
        let g = ClientGroup::new(vec![1, 2, 3], true);
        assert_eq!(g.clients(), &[1, 2, 3]);
        assert!(g.required());
    }

    #[test]
    fn test_group_validate_empty() {
        let g = ClientGroup::new(vec![], false);
        assert!(g.validate(0, 10).is_err());
    }

    #[test]
    fn test_group_validate_out_of_range() {
        let g = ClientGroup::new(vec![20], false);
        assert!(g.validate(0, 10).is_err());
    }

    #[test]
    fn test_group_validate_depot_member_rejected() {
        let g = ClientGroup::new(vec![0], false);
        assert!(g.validate(0, 10).is_err());
    }
}
