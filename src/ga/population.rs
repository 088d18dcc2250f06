//! Population: the routes evaluated in one generation.

use super::route::Route;

/// An ordered collection of routes.
///
/// Sorting is ascending by total distance (best first) and stable, so routes
/// with equal distance keep their insertion order. The `sorted` flag makes
/// repeated sorts free; every mutation through [`add_route`](Self::add_route)
/// or [`set_route`](Self::set_route) clears it.
#[derive(Debug, Clone, Default)]
pub struct Population {
    routes: Vec<Route>,
    sorted: bool,
}

impl Population {
    /// Creates an empty population with room for `capacity` routes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            routes: Vec::with_capacity(capacity),
            sorted: false,
        }
    }

    pub fn from_routes(routes: Vec<Route>) -> Self {
        Self {
            routes,
            sorted: false,
        }
    }

    pub fn add_route(&mut self, route: Route) {
        self.routes.push(route);
        self.sorted = false;
    }

    /// # Panics
    /// Panics if `index >= self.len()`.
    pub fn route(&self, index: usize) -> &Route {
        &self.routes[index]
    }

    /// # Panics
    /// Panics if `index >= self.len()`.
    pub fn set_route(&mut self, index: usize, route: Route) {
        self.routes[index] = route;
        self.sorted = false;
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Read-only view of all routes in their current order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Whether the routes are known to be in best-first order.
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Sorts best-first. No-op if already sorted.
    pub fn sort_by_fitness(&mut self) {
        if !self.sorted {
            self.routes.sort_by(Route::cmp_by_distance);
            self.sorted = true;
        }
    }

    /// Shortest route, or `None` if the population is empty.
    pub fn best_route(&mut self) -> Option<&Route> {
        self.sort_by_fitness();
        self.routes.first()
    }

    /// Longest route, or `None` if the population is empty.
    pub fn worst_route(&mut self) -> Option<&Route> {
        self.sort_by_fitness();
        self.routes.last()
    }

    /// The best `min(n, len)` routes.
    pub fn top_routes(&mut self, n: usize) -> &[Route] {
        self.sort_by_fitness();
        let count = n.min(self.routes.len());
        &self.routes[..count]
    }

    /// Mean total distance; `0` for an empty population.
    pub fn average_distance(&self) -> f64 {
        if self.routes.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.routes.iter().map(Route::total_distance).sum();
        sum / self.routes.len() as f64
    }

    pub fn best_distance(&mut self) -> Option<f64> {
        self.best_route().map(Route::total_distance)
    }

    pub fn worst_distance(&mut self) -> Option<f64> {
        self.worst_route().map(Route::total_distance)
    }

    /// Sum of every route's fitness.
    pub fn total_fitness(&self) -> f64 {
        self.routes.iter().map(Route::fitness).sum()
    }
}
