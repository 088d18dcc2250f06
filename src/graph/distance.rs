//! Static distance oracle.

use super::city::City;
use crate::error::{TspError, TspResult};
use std::collections::HashMap;

/// Distance reported for pairs with no edge between them.
///
/// Large but finite, so a tour through a missing edge scores as very bad
/// instead of impossible and still gets a small non-zero fitness.
pub const NO_EDGE: f64 = 999_999.0;

/// Symmetric city-to-city distance table.
///
/// Built once from an edge list and immutable afterwards. Lookups never fail:
///
/// - `d(a, a) == 0` for every city known to the table
/// - `d(a, b) == d(b, a)`
/// - a missing edge, or an id the table does not know, yields [`NO_EDGE`]
///
/// # Examples
///
/// ```
/// use u_tsp::graph::{DistanceTable, NO_EDGE};
///
/// let table = DistanceTable::from_edges(&["A", "B", "C"], &[("A", "B", 12.0)]).unwrap();
/// assert_eq!(table.distance_by_id("B", "A"), 12.0);
/// assert_eq!(table.distance_by_id("A", "C"), NO_EDGE);
/// ```
#[derive(Debug, Clone)]
pub struct DistanceTable {
    index: HashMap<String, usize>,
    matrix: Vec<f64>,
    n: usize,
}

impl DistanceTable {
    /// Builds a table over `ids` with the given undirected edges.
    ///
    /// Every pair not listed is disconnected. Returns an error if an edge
    /// names an id not in `ids`, or if a distance is negative or NaN.
    pub fn from_edges<S: AsRef<str>>(ids: &[S], edges: &[(&str, &str, f64)]) -> TspResult<Self> {
        let n = ids.len();
        let mut index = HashMap::with_capacity(n);
        for (i, id) in ids.iter().enumerate() {
            if index.insert(id.as_ref().to_string(), i).is_some() {
                return Err(TspError::InvalidConfig(format!(
                    "duplicate city id in distance table: {}",
                    id.as_ref()
                )));
            }
        }

        let mut matrix = vec![NO_EDGE; n * n];
        for i in 0..n {
            matrix[i * n + i] = 0.0;
        }

        let mut table = Self { index, matrix, n };
        for &(a, b, d) in edges {
            table.add_edge(a, b, d)?;
        }
        Ok(table)
    }

    fn add_edge(&mut self, a: &str, b: &str, distance: f64) -> TspResult<()> {
        if distance.is_nan() || distance < 0.0 {
            return Err(TspError::InvalidConfig(format!(
                "edge {a}-{b} has invalid distance {distance}"
            )));
        }
        let i = self.position(a)?;
        let j = self.position(b)?;
        self.matrix[i * self.n + j] = distance;
        self.matrix[j * self.n + i] = distance;
        Ok(())
    }

    fn position(&self, id: &str) -> TspResult<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| TspError::UnknownCity(id.to_string()))
    }

    /// Distance between two cities.
    pub fn distance(&self, a: &City, b: &City) -> f64 {
        self.distance_by_id(a.id(), b.id())
    }

    /// Distance between two city ids.
    pub fn distance_by_id(&self, a: &str, b: &str) -> f64 {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&i), Some(&j)) => self.matrix[i * self.n + j],
            _ => NO_EDGE,
        }
    }

    /// Whether an edge connects `a` and `b` directly.
    pub fn has_direct_connection(&self, a: &City, b: &City) -> bool {
        self.distance(a, b) < NO_EDGE
    }

    /// Whether the table knows `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Number of cities in the table.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }
}
