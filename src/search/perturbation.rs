//! Perturbation: the random-removal "shake" [`super::LocalSearch::call`]
//! applies before re-running `search`/`intensify`, so a full cycle can
//! escape a local optimum rather than sit at one.
//!
//! Picks a random fraction of currently assigned clients and strips
//! them from their routes. There is no separate repair step here — the
//! clients land in the pool unassigned, and `search`'s existing
//! unassigned-client handling (`LocalSearch::run_to_fixed_point_filtered`)
//! reinserts them using the same operator set as everything else.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::data::ProblemData;
use crate::error::Result;

use super::state::SearchState;

/// Removes a random `degree` fraction (at least one, if any client is
/// assigned) of assigned clients from their routes, detaching them in
/// the node pool so the next `search` pass treats them as unassigned.
pub fn random_removal(
    state: &mut SearchState,
    data: &ProblemData,
    degree: f64,
    rng: &mut impl Rng,
) -> Result<()> {
    let mut assigned = state.assigned_clients(data);
    if assigned.is_empty() {
        return Ok(());
    }
    assigned.shuffle(rng);
    let num_remove = ((assigned.len() as f64 * degree).round() as usize)
        .max(1)
        .min(assigned.len());

    for &client in assigned.iter().take(num_remove) {
        let node = &state.pool()[client];
        let Some(route_idx) = node.route() else {
            continue;
        };
        let pos = node.position();
        state.apply(route_idx, data, |route, pool| {
            route.remove(pool, data, pos);
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Client, Depot, Location, Matrix, Profile, TimeWindow, VehicleType};
    use crate::solution::{Route as SolRoute, Solution};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

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
        let matrix = Matrix::from_data(size, vec![1; size * size]).unwrap();
        let profiles = vec![Profile {
            distance: matrix.clone(),
            duration: matrix,
        }];
        ProblemData::new(depots, clients, vehicles, profiles, vec![]).unwrap()
    }

    #[test]
    fn test_random_removal_detaches_some_clients() {
        let data = line_data();
        let sol = Solution::new(vec![SolRoute::new(0, vec![1, 2, 3])]);
        let mut state = SearchState::from_solution(&data, &sol).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        random_removal(&mut state, &data, 0.5, &mut rng).unwrap();

        let unassigned = state.unassigned_clients(&data);
        assert!(!unassigned.is_empty());
        assert!(unassigned.len() < 3);
    }

    #[test]
    fn test_random_removal_on_empty_solution_is_a_noop() {
        let data = line_data();
        let sol = Solution::new(vec![SolRoute::new(0, vec![])]);
        let mut state = SearchState::from_solution(&data, &sol).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        random_removal(&mut state, &data, 0.5, &mut rng).unwrap();
        assert_eq!(state.unassigned_clients(&data).len(), 3);
    }
}
