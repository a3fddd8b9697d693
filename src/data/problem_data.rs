//! The immutable problem instance: locations, vehicle types, groups, and
//! the distance/duration matrices, one pair per routing profile.

use serde::{Deserialize, Serialize};

use super::{ClientGroup, Location, VehicleType};
use crate::error::{Error, Result};

/// A dense, square, zero-diagonal `n x n` matrix of travel values (either
/// distance or duration) for one routing profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    data: Vec<i64>,
    size: usize,
}

impl Matrix {
    /// Builds a matrix from explicit row-major data.
    pub fn from_data(size: usize, data: Vec<i64>) -> Result<Self> {
        if data.len() != size * size {
            return Err(Error::InvalidInput(
                "matrix data length must equal size * size".to_string(),
            ));
        }
        let m = Self { data, size };
        for i in 0..size {
            if m.get(i, i) != 0 {
                return Err(Error::InvalidInput(format!(
                    "matrix diagonal entry ({i},{i}) must be zero"
                )));
            }
        }
        Ok(m)
    }

    /// Returns the travel value from `from` to `to`.
    pub fn get(&self, from: usize, to: usize) -> i64 {
        self.data[from * self.size + to]
    }

    /// Matrix dimension (number of locations it covers).
    pub fn size(&self) -> usize {
        self.size
    }
}

/// One profile's pair of matching distance/duration matrices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub distance: Matrix,
    pub duration: Matrix,
}

/// The full, immutable routing problem instance.
///
/// Locations are stored depot-first: indices `0..depots.len()` are depots,
/// the remainder are clients. Built once via [`ProblemData::new`], which
/// validates every invariant from the data model and fails with a
/// descriptive [`Error::InvalidInput`] otherwise.
///
/// # Examples
///
/// ```
/// use vrp_search_core::data::{ProblemData, Depot, Client, VehicleType, TimeWindow, Location};
///
/// let tw = TimeWindow::new(0, 1000).unwrap();
/// let depot = Location::Depot(Depot::new(0, 0, 0, tw));
/// let client = Location::Client(Client::new(1, 1, vec![5], vec![0], 0, tw, 0));
/// let vehicle = VehicleType::new(1, vec![10], 0, tw);
///
/// let dist = vrp_search_core::data::Matrix::from_data(2, vec![0, 1, 1, 0]).unwrap();
/// let dur = vrp_search_core::data::Matrix::from_data(2, vec![0, 1, 1, 0]).unwrap();
///
/// let data = ProblemData::new(
///     vec![depot],
///     vec![client],
///     vec![vehicle],
///     vec![vrp_search_core::data::Profile { distance: dist, duration: dur }],
///     vec![],
/// ).unwrap();
/// assert_eq!(data.num_locations(), 2);
/// assert_eq!(data.num_clients(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemData {
    depots: Vec<Location>,
    clients: Vec<Location>,
    vehicle_types: Vec<VehicleType>,
    profiles: Vec<Profile>,
    groups: Vec<ClientGroup>,
}

impl ProblemData {
    /// Builds and validates a problem instance.
    pub fn new(
        depots: Vec<Location>,
        clients: Vec<Location>,
        vehicle_types: Vec<VehicleType>,
        profiles: Vec<Profile>,
        groups: Vec<ClientGroup>,
    ) -> Result<Self> {
        for loc in &depots {
            if !loc.is_depot() {
                return Err(Error::InvalidInput(
                    "depots list must contain only depot locations".to_string(),
                ));
            }
        }
        for loc in &clients {
            if loc.is_depot() {
                return Err(Error::InvalidInput(
                    "clients list must contain only client locations".to_string(),
                ));
            }
        }

        let num_locations = depots.len() + clients.len();

        for (i, d) in depots.iter().enumerate() {
            if let Location::Depot(depot) = d {
                depot.validate(i)?;
            }
        }
        for (i, c) in clients.iter().enumerate() {
            if let Location::Client(client) = c {
                client.validate(depots.len() + i)?;
            }
        }

        if profiles.is_empty() {
            return Err(Error::InvalidInput(
                "at least one routing profile is required".to_string(),
            ));
        }
        for (i, p) in profiles.iter().enumerate() {
            if p.distance.size() != num_locations || p.duration.size() != num_locations {
                return Err(Error::InvalidInput(format!(
                    "profile {i}: matrices must be size num_locations x num_locations"
                )));
            }
        }

        for (i, g) in groups.iter().enumerate() {
            g.validate(i, num_locations)?;
        }
        Self::validate_group_membership(&clients, depots.len(), &groups)?;

        for (i, v) in vehicle_types.iter().enumerate() {
            v.validate(i, num_locations, profiles.len())?;
            for &d in v.reload_depots() {
                if d >= depots.len() {
                    return Err(Error::InvalidInput(format!(
                        "vehicle type {i}: reload depot {d} is not a depot location"
                    )));
                }
            }
            if v.num_load_dimensions() > 0 {
                for (ci, c) in clients.iter().enumerate() {
                    if let Location::Client(client) = c {
                        if client.delivery().len() != v.num_load_dimensions()
                            || client.pickup().len() != v.num_load_dimensions()
                        {
                            return Err(Error::InvalidInput(format!(
                                "client {} load dimensions do not match vehicle type {i}",
                                depots.len() + ci
                            )));
                        }
                    }
                }
            }
        }

        Ok(Self {
            depots,
            clients,
            vehicle_types,
            profiles,
            groups,
        })
    }

    fn validate_group_membership(
        clients: &[Location],
        num_depots: usize,
        groups: &[ClientGroup],
    ) -> Result<()> {
        let mut owner = vec![None; clients.len()];
        for (gi, g) in groups.iter().enumerate() {
            for &member in g.clients() {
                let client_idx = member - num_depots;
                if let Some(prev) = owner[client_idx] {
                    return Err(Error::InvalidInput(format!(
                        "client {member} belongs to both group {prev} and group {gi}"
                    )));
                }
                owner[client_idx] = Some(gi);
                if let Location::Client(c) = &clients[client_idx] {
                    if c.required() {
                        return Err(Error::InvalidInput(format!(
                            "group {gi} member {member} must not be required"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Total number of locations (depots + clients).
    pub fn num_locations(&self) -> usize {
        self.depots.len() + self.clients.len()
    }

    /// Number of depot locations.
    pub fn num_depots(&self) -> usize {
        self.depots.len()
    }

    /// Number of client locations.
    pub fn num_clients(&self) -> usize {
        self.clients.len()
    }

    /// Returns the location at the given global index (depots first).
    pub fn location(&self, idx: usize) -> &Location {
        if idx < self.depots.len() {
            &self.depots[idx]
        } else {
            &self.clients[idx - self.depots.len()]
        }
    }

    /// Iterates client indices only (excludes depots).
    pub fn client_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.depots.len()..self.num_locations()
    }

    pub fn vehicle_types(&self) -> &[VehicleType] {
        &self.vehicle_types
    }

    pub fn groups(&self) -> &[ClientGroup] {
        &self.groups
    }

    /// The group a client belongs to, if any.
    pub fn group_of(&self, client_idx: usize) -> Option<usize> {
        self.location(client_idx).as_client().and_then(|c| c.group())
    }

    pub fn profile(&self, idx: usize) -> &Profile {
        &self.profiles[idx]
    }

    pub fn distance(&self, profile: usize, from: usize, to: usize) -> i64 {
        self.profiles[profile].distance.get(from, to)
    }

    pub fn duration(&self, profile: usize, from: usize, to: usize) -> i64 {
        self.profiles[profile].duration.get(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Client, Depot, TimeWindow};

    fn square(size: usize) -> Matrix {
        let mut data = vec![1; size * size];
        for i in 0..size {
            data[i * size + i] = 0;
        }
        Matrix::from_data(size, data).unwrap()
    }

    fn small_problem() -> (Vec<Location>, Vec<Location>, Vec<VehicleType>, Vec<Profile>) {
        let tw = TimeWindow::new(0, 1000).unwrap();
        let depots = vec![Location::Depot(Depot::new(0, 0, 0, tw))];
        let clients = vec![
            Location::Client(Client::new(1, 0, vec![5], vec![0], 0, tw, 0)),
            Location::Client(Client::new(2, 0, vec![5], vec![0], 0, tw, 0)),
        ];
        let vehicles = vec![VehicleType::new(2, vec![10], 0, tw)];
        let profiles = vec![Profile {
            distance: square(3),
            duration: square(3),
        }];
        (depots, clients, vehicles, profiles)
    }

    #[test]
    fn test_build_ok() {
        let (depots, clients, vehicles, profiles) = small_problem();
        let data = ProblemData::new(depots, clients, vehicles, profiles, vec![]).unwrap();
        assert_eq!(data.num_locations(), 3);
        assert_eq!(data.num_clients(), 2);
        assert_eq!(data.num_depots(), 1);
    }

    #[test]
    fn test_matrix_size_mismatch_rejected() {
        let (depots, clients, vehicles, _) = small_problem();
        let bad_profiles = vec![Profile {
            distance: square(2),
            duration: square(2),
        }];
        assert!(ProblemData::new(depots, clients, vehicles, bad_profiles, vec![]).is_err());
    }

    #[test]
    fn test_matrix_diagonal_must_be_zero() {
        assert!(Matrix::from_data(2, vec![1, 1, 1, 0]).is_err());
    }

    #[test]
    fn test_no_profiles_rejected() {
        let (depots, clients, vehicles, _) = small_problem();
        assert!(ProblemData::new(depots, clients, vehicles, vec![], vec![]).is_err());
    }

    #[test]
    fn test_group_membership_required_client_rejected() {
        let (depots, clients, vehicles, profiles) = small_problem();
        let groups = vec![ClientGroup::new(vec![1], false)];
        assert!(ProblemData::new(depots, clients, vehicles, profiles, groups).is_err());
    }

    #[test]
    fn test_group_membership_ok() {
        let tw = TimeWindow::new(0, 1000).unwrap();
        let depots = vec![Location::Depot(Depot::new(0, 0, 0, tw))];
        let clients = vec![
            Location::Client(
                Client::new(1, 0, vec![5], vec![0], 0, tw, 0).with_group(0),
            ),
            Location::Client(
                Client::new(2, 0, vec![5], vec![0], 0, tw, 0).with_group(0),
            ),
        ];
        let vehicles = vec![VehicleType::new(1, vec![10], 0, tw)];
        let profiles = vec![Profile {
            distance: square(3),
            duration: square(3),
        }];
        let groups = vec![ClientGroup::new(vec![1, 2], false)];
        assert!(ProblemData::new(depots, clients, vehicles, profiles, groups).is_ok());
    }

    #[test]
    fn test_reload_depot_must_be_a_depot_location() {
        let (depots, clients, _, profiles) = small_problem();
        let tw = TimeWindow::new(0, 1000).unwrap();
        let vehicles = vec![VehicleType::new(1, vec![10], 0, tw).with_reload_depots(vec![1], 1)];
        assert!(ProblemData::new(depots, clients, vehicles, profiles, vec![]).is_err());
    }
}
