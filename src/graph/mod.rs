//! City graph: cities plus the distance oracle.
//!
//! The graph is plain owned data. An engine holds one [`CityGraph`] and every
//! route built from it shares the same [`DistanceTable`] through an `Arc`, so
//! there is no process-wide distance state.
//!
//! [`CityGraph::standard`] builds the eight-city graph `F, G, H, E, K, N, C, L`
//! the solver ships with.

mod city;
mod distance;

pub use city::City;
pub use distance::{DistanceTable, NO_EDGE};

use crate::error::TspResult;
use std::collections::HashMap;
use std::sync::Arc;

/// Undirected edges of the standard graph.
const STANDARD_EDGES: [(&str, &str, f64); 18] = [
    ("F", "N", 30.0),
    ("F", "C", 20.0),
    ("F", "L", 10.0),
    ("F", "G", 55.0),
    ("N", "C", 47.0),
    ("N", "K", 60.0),
    ("C", "K", 70.0),
    ("C", "E", 10.0),
    ("C", "H", 30.0),
    ("C", "L", 10.0),
    ("K", "E", 10.0),
    ("K", "G", 90.0),
    ("K", "H", 73.0),
    ("E", "H", 60.0),
    ("E", "G", 40.0),
    ("E", "L", 5.0),
    ("H", "G", 80.0),
    ("H", "L", 40.0),
];

/// Cities of the standard graph with their display coordinates.
const STANDARD_CITIES: [(&str, f64, f64); 8] = [
    ("F", 100.0, 300.0),
    ("G", 400.0, 100.0),
    ("H", 350.0, 250.0),
    ("E", 300.0, 200.0),
    ("K", 250.0, 150.0),
    ("N", 150.0, 200.0),
    ("C", 200.0, 250.0),
    ("L", 150.0, 300.0),
];

/// A set of cities and the distances between them.
///
/// City order is stable (construction order), which keeps seeded runs
/// reproducible.
#[derive(Debug, Clone)]
pub struct CityGraph {
    cities: Vec<Arc<City>>,
    distances: Arc<DistanceTable>,
}

impl CityGraph {
    /// Builds a graph from cities and undirected edges.
    pub fn new(cities: Vec<City>, edges: &[(&str, &str, f64)]) -> TspResult<Self> {
        let ids: Vec<&str> = cities.iter().map(City::id).collect();
        let distances = DistanceTable::from_edges(&ids, edges)?;
        Ok(Self {
            cities: cities.into_iter().map(Arc::new).collect(),
            distances: Arc::new(distances),
        })
    }

    /// The built-in eight-city graph.
    pub fn standard() -> Self {
        // STANDARD_EDGES only names STANDARD_CITIES ids, with finite positive distances
        Self::new(standard_cities(), &STANDARD_EDGES)
            .expect("standard graph edges reference known cities")
    }

    /// Replaces the city set, keeping the current distance table.
    ///
    /// Cities the table does not know are disconnected from everything
    /// (every lookup involving them yields [`NO_EDGE`]). Cities are ordered
    /// by id.
    pub fn replace_cities(&mut self, cities: HashMap<String, City>) {
        let mut cities: Vec<City> = cities.into_values().collect();
        cities.sort_by(|a, b| a.id().cmp(b.id()));
        self.cities = cities.into_iter().map(Arc::new).collect();
    }

    /// Looks up a city by id.
    pub fn city(&self, id: &str) -> Option<&Arc<City>> {
        self.cities.iter().find(|c| c.id() == id)
    }

    /// All cities in graph order.
    pub fn cities(&self) -> &[Arc<City>] {
        &self.cities
    }

    /// All cities keyed by id.
    pub fn city_map(&self) -> HashMap<String, Arc<City>> {
        self.cities
            .iter()
            .map(|c| (c.id().to_string(), Arc::clone(c)))
            .collect()
    }

    /// Every city except `start`, in graph order.
    pub fn cities_except(&self, start: &City) -> Vec<Arc<City>> {
        self.cities
            .iter()
            .filter(|c| c.id() != start.id())
            .cloned()
            .collect()
    }

    pub fn distances(&self) -> &Arc<DistanceTable> {
        &self.distances
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

fn standard_cities() -> Vec<City> {
    STANDARD_CITIES
        .iter()
        .map(|&(id, x, y)| City::new(id, id, x, y))
        .collect()
}

impl Default for CityGraph {
    fn default() -> Self {
        Self::standard()
    }
}
