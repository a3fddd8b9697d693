//! A single position in a route.

/// One visit slot: a client node, a start/end-depot node, or a reload
/// depot node.
///
/// `Node` is owned by the search state's node pool for the duration of a
/// [`LocalSearch`](super::LocalSearch) call; `route` is a weak back
/// reference used for lookup only, never for ownership — the pool, not
/// the route, owns the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    location: usize,
    route: Option<usize>,
    position: usize,
    trip: usize,
}

impl Node {
    /// Creates a detached node (not yet placed on any route).
    pub fn new(location: usize) -> Self {
        Self {
            location,
            route: None,
            position: 0,
            trip: 0,
        }
    }

    pub fn location(&self) -> usize {
        self.location
    }

    pub fn route(&self) -> Option<usize> {
        self.route
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn trip(&self) -> usize {
        self.trip
    }

    pub fn is_assigned(&self) -> bool {
        self.route.is_some()
    }

    pub(crate) fn place(&mut self, route: usize, position: usize, trip: usize) {
        self.route = Some(route);
        self.position = position;
        self.trip = trip;
    }

    pub(crate) fn detach(&mut self) {
        self.route = None;
        self.position = 0;
        self.trip = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_is_unassigned() {
        let node = Node::new(3);
        assert_eq!(node.location(), 3);
        assert!(!node.is_assigned());
    }

    #[test]
    fn test_place_and_detach() {
        let mut node = Node::new(3);
        node.place(1, 2, 0);
        assert!(node.is_assigned());
        assert_eq!(node.route(), Some(1));
        assert_eq!(node.position(), 2);
        node.detach();
        assert!(!node.is_assigned());
    }
}
