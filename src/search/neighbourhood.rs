//! Granular neighbourhoods: per-client candidate lists used to bound the
//! node operators' search to plausibly useful (U, V) pairs instead of
//! scanning every client.

use std::collections::BTreeSet;

use crate::data::ProblemData;

/// For each client, up to `num_neighbours` other clients ordered by
/// proximity, excluding depots, itself, and members of its own
/// mutually-exclusive group.
#[derive(Debug, Clone)]
pub struct Neighbourhood {
    lists: Vec<Vec<usize>>,
}

impl Neighbourhood {
    /// Builds the neighbourhood for `profile`, the routing profile whose
    /// distance/duration matrices define proximity.
    ///
    /// `w_wait` and `w_tw` weight, respectively, the waiting time and
    /// time-warp terms of the proximity metric; `symmetric` closes the
    /// adjacency (`j` in `N(i)` implies `i` in `N(j)`).
    pub fn build(
        data: &ProblemData,
        profile: usize,
        num_neighbours: usize,
        w_wait: i64,
        w_tw: i64,
        symmetric: bool,
    ) -> Self {
        let n = data.num_locations();
        let mut lists = vec![Vec::new(); n];

        for i in data.client_indices() {
            let ci = data.location(i).as_client().expect("client index");
            let mut scored: Vec<(i64, usize)> = Vec::new();

            for j in data.client_indices() {
                if i == j {
                    continue;
                }
                if same_group(data, i, j) {
                    continue;
                }
                let cj = data.location(j).as_client().expect("client index");
                let dist = data.distance(profile, i, j);

                let wait_term = 0.max(cj.time_window().early()
                    - ci.service_duration()
                    - dist
                    - ci.time_window().late());
                let tw_term = 0.max(
                    ci.time_window().early() + ci.service_duration() + dist
                        - cj.time_window().late(),
                );

                let score = dist + w_wait * wait_term + w_tw * tw_term - cj.prize();
                scored.push((score, j));
            }

            scored.sort_unstable();
            lists[i] = scored.into_iter().take(num_neighbours).map(|(_, j)| j).collect();
        }

        if symmetric {
            for i in data.client_indices() {
                let members: Vec<usize> = lists[i].clone();
                for j in members {
                    if !lists[j].contains(&i) {
                        lists[j].push(i);
                    }
                }
            }
        }

        Self { lists }
    }

    /// The candidate list for client `i`, in proximity order (or
    /// insertion order for members added by symmetrisation).
    pub fn of(&self, i: usize) -> &[usize] {
        &self.lists[i]
    }
}

fn same_group(data: &ProblemData, i: usize, j: usize) -> bool {
    match (data.group_of(i), data.group_of(j)) {
        (Some(gi), Some(gj)) => gi == gj,
        _ => false,
    }
}

/// Deduplicates and sorts a set of candidate client indices; used by
/// operators that gather neighbours from several sources.
pub fn unique_sorted(items: impl IntoIterator<Item = usize>) -> Vec<usize> {
    items.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Client, Depot, Location, Matrix, Profile, TimeWindow, VehicleType};

    fn line_data() -> ProblemData {
        let tw = TimeWindow::new(0, 1000).unwrap();
        let depots = vec![Location::Depot(Depot::new(0, 0, 0, tw))];
        let clients = vec![
            Location::Client(Client::new(1, 0, vec![], vec![], 0, tw, 0)),
            Location::Client(Client::new(2, 0, vec![], vec![], 0, tw, 0)),
            Location::Client(Client::new(3, 0, vec![], vec![], 0, tw, 0)),
        ];
        let vehicles = vec![VehicleType::new(1, vec![], 0, tw)];
        let size = 4;
        let mut data = vec![0i64; size * size];
        for i in 0..size {
            for j in 0..size {
                data[i * size + j] = (i as i64 - j as i64).abs();
            }
        }
        let matrix = Matrix::from_data(size, data).unwrap();
        let profiles = vec![Profile {
            distance: matrix.clone(),
            duration: matrix,
        }];
        ProblemData::new(depots, clients, vehicles, profiles, vec![]).unwrap()
    }

    #[test]
    fn test_neighbourhood_excludes_self_and_depot() {
        let data = line_data();
        let nbh = Neighbourhood::build(&data, 0, 10, 1, 1, false);
        assert!(!nbh.of(1).contains(&1));
        assert!(!nbh.of(1).contains(&0));
    }

    #[test]
    fn test_neighbourhood_orders_by_proximity() {
        let data = line_data();
        let nbh = Neighbourhood::build(&data, 0, 10, 1, 1, false);
        // client 1 (loc idx 1) is closer to client 2 (idx 2) than client 3 (idx 3).
        assert_eq!(nbh.of(1)[0], 2);
    }

    #[test]
    fn test_symmetric_neighbourhood_closes_adjacency() {
        let data = line_data();
        let nbh = Neighbourhood::build(&data, 0, 1, 1, 1, true);
        for i in data.client_indices() {
            for &j in nbh.of(i).to_vec().iter() {
                assert!(nbh.of(j).contains(&i));
            }
        }
    }

    #[test]
    fn test_group_members_excluded() {
        let tw = TimeWindow::new(0, 1000).unwrap();
        let depots = vec![Location::Depot(Depot::new(0, 0, 0, tw))];
        let clients = vec![
            Location::Client(Client::new(1, 0, vec![], vec![], 0, tw, 0).with_group(0)),
            Location::Client(Client::new(2, 0, vec![], vec![], 0, tw, 0).with_group(0)),
        ];
        let vehicles = vec![VehicleType::new(1, vec![], 0, tw)];
        let matrix = Matrix::from_data(3, vec![0, 1, 1, 1, 0, 1, 1, 1, 0]).unwrap();
        let profiles = vec![Profile {
            distance: matrix.clone(),
            duration: matrix,
        }];
        let groups = vec![crate::data::ClientGroup::new(vec![1, 2], false)];
        let data = ProblemData::new(depots, clients, vehicles, profiles, groups).unwrap();

        let nbh = Neighbourhood::build(&data, 0, 10, 1, 1, false);
        assert!(!nbh.of(1).contains(&2));
    }
}
