//! Route: one candidate closed tour.
//!
//! A [`Route`] is the permutation of every non-start city, plus the fixed
//! start city the tour leaves from and returns to. The tour length is
//! computed from the route's [`DistanceTable`] at construction and recomputed
//! on every positional change, so it can never go stale.

use crate::error::{TspError, TspResult};
use crate::graph::{City, DistanceTable};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Converts a tour length into a fitness value (higher is better).
///
/// Zero, infinite and NaN distances map to `0`, and so does any distance
/// small enough that its reciprocal overflows (subnormals). Degenerate tours
/// rank last in fitness-proportionate selection and never put `inf`/`NaN`
/// into the cumulative sums.
///
/// ```
/// use u_tsp::ga::fitness_from_distance;
///
/// assert_eq!(fitness_from_distance(0.0), 0.0);
/// assert_eq!(fitness_from_distance(f64::INFINITY), 0.0);
/// assert_eq!(fitness_from_distance(1e-320), 0.0);
/// assert_eq!(fitness_from_distance(4.0), 0.25);
/// ```
pub fn fitness_from_distance(distance: f64) -> f64 {
    if distance <= 0.0 || !distance.is_finite() {
        return 0.0;
    }
    let fitness = 1.0 / distance;
    if fitness.is_finite() {
        fitness
    } else {
        0.0
    }
}

/// A candidate tour.
///
/// Cloning is cheap: cities are shared `Arc`s and the computed distance is
/// carried over.
#[derive(Clone)]
pub struct Route {
    start: Arc<City>,
    cities: Vec<Arc<City>>,
    distances: Arc<DistanceTable>,
    total_distance: f64,
}

impl Route {
    /// Creates a route from a start city and the ordered remaining cities.
    ///
    /// Fails if `cities` repeats a city or contains the start city. Whether
    /// `cities` covers the whole graph is the caller's responsibility.
    pub fn new(
        start: Arc<City>,
        cities: Vec<Arc<City>>,
        distances: Arc<DistanceTable>,
    ) -> TspResult<Self> {
        let mut seen = HashSet::with_capacity(cities.len());
        for city in &cities {
            if city.id() == start.id() {
                return Err(TspError::InvalidRoute(format!(
                    "start city {} appears inside the sequence",
                    start.id()
                )));
            }
            if !seen.insert(city.id()) {
                return Err(TspError::InvalidRoute(format!(
                    "city {} appears more than once",
                    city.id()
                )));
            }
        }

        let total_distance = tour_distance(&start, &cities, &distances);
        Ok(Self {
            start,
            cities,
            distances,
            total_distance,
        })
    }

    pub fn start_city(&self) -> &Arc<City> {
        &self.start
    }

    /// Cities visited between leaving and returning to the start city.
    pub fn cities(&self) -> &[Arc<City>] {
        &self.cities
    }

    /// City at `index` of the sequence.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    pub fn city(&self, index: usize) -> &Arc<City> {
        &self.cities[index]
    }

    /// Overwrites one position of the sequence and recomputes the distance.
    ///
    /// This can leave the route with a duplicate until the displaced city is
    /// written back elsewhere; only call it on a route you own exclusively.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    pub fn set_city(&mut self, index: usize, city: Arc<City>) {
        self.cities[index] = city;
        self.refresh();
    }

    /// Reorders the sequence in place, then recomputes the distance once.
    ///
    /// `f` must only permute the slice (swap, reverse, shuffle).
    pub(crate) fn rearrange<F: FnOnce(&mut [Arc<City>])>(&mut self, f: F) {
        f(&mut self.cities);
        debug_assert_eq!(
            self.cities
                .iter()
                .map(|c| c.id())
                .collect::<HashSet<_>>()
                .len(),
            self.cities.len(),
            "rearrange must not duplicate cities"
        );
        self.refresh();
    }

    fn refresh(&mut self) {
        self.total_distance = tour_distance(&self.start, &self.cities, &self.distances);
    }

    /// Number of cities in the sequence (start city excluded).
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Length of the closed tour `start → cities… → start`.
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    /// `1 / total_distance`, or `0` for degenerate tours.
    pub fn fitness(&self) -> f64 {
        fitness_from_distance(self.total_distance)
    }

    pub fn contains_city(&self, city: &City) -> bool {
        self.cities.iter().any(|c| c.id() == city.id())
    }

    /// The distance table the route is scored against.
    pub fn distance_table(&self) -> &Arc<DistanceTable> {
        &self.distances
    }

    /// Names along the closed tour, start city at both ends.
    pub fn city_names(&self) -> Vec<String> {
        std::iter::once(&self.start)
            .chain(self.cities.iter())
            .chain(std::iter::once(&self.start))
            .map(|c| c.name().to_string())
            .collect()
    }

    /// Orders routes by ascending total distance.
    pub fn cmp_by_distance(&self, other: &Route) -> Ordering {
        self.total_distance.total_cmp(&other.total_distance)
    }

    /// Whether both routes share the start city and visit the same city set.
    pub fn is_permutation_of(&self, other: &Route) -> bool {
        if self.start.id() != other.start.id() || self.len() != other.len() {
            return false;
        }
        let mine: HashSet<&str> = self.cities.iter().map(|c| c.id()).collect();
        other.cities.iter().all(|c| mine.contains(c.id()))
    }
}

/// Sums edge distances around the closed tour.
fn tour_distance(start: &City, cities: &[Arc<City>], distances: &DistanceTable) -> f64 {
    let (first, last) = match (cities.first(), cities.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return distances.distance(start, start),
    };

    let inner: f64 = cities
        .windows(2)
        .map(|pair| distances.distance(&pair[0], &pair[1]))
        .sum();

    distances.distance(start, first) + inner + distances.distance(last, start)
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Distance: {:.2})",
            self.city_names().join(" -> "),
            self.total_distance
        )
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.city_names())
            .field("total_distance", &self.total_distance)
            .finish()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Route {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Route", 3)?;
        state.serialize_field("cities", &self.city_names())?;
        state.serialize_field("totalDistance", &self.total_distance)?;
        state.serialize_field("fitness", &self.fitness())?;
        state.end()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::graph::{CityGraph, NO_EDGE};

    /// Builds a route over the standard graph from a start id and a path of ids.
    pub(crate) fn route_of(graph: &CityGraph, start: &str, path: &[&str]) -> Route {
        let start = graph.city(start).expect("start city exists").clone();
        let cities = path
            .iter()
            .map(|id| graph.city(id).expect("path city exists").clone())
            .collect();
        Route::new(start, cities, graph.distances().clone()).expect("valid route")
    }

    /// Ids of the sequence, in order.
    pub(crate) fn ids(route: &Route) -> Vec<String> {
        route.cities().iter().map(|c| c.id().to_string()).collect()
    }

    #[test]
    fn test_total_distance_closed_loop() {
        let g = CityGraph::standard();
        // F-L 10, L-E 5, E-C 10, C-F 20
        let r = route_of(&g, "F", &["L", "E", "C"]);
        assert!((r.total_distance() - 45.0).abs() < 1e-9);
        assert!((r.fitness() - 1.0 / 45.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_edge_uses_sentinel() {
        let g = CityGraph::standard();
        // F-H has no edge: 999999 + H-L 40 + L-F 10
        let r = route_of(&g, "F", &["H", "L"]);
        assert!((r.total_distance() - (NO_EDGE + 50.0)).abs() < 1e-6);
        assert!(r.fitness() > 0.0);
    }

    #[test]
    fn test_empty_sequence_has_zero_distance_and_fitness() {
        let g = CityGraph::standard();
        let r = route_of(&g, "F", &[]);
        assert!(r.is_empty());
        assert_eq!(r.total_distance(), 0.0);
        assert_eq!(r.fitness(), 0.0);
    }

    #[test]
    fn test_fitness_degenerate_values() {
        assert_eq!(fitness_from_distance(0.0), 0.0);
        assert_eq!(fitness_from_distance(f64::INFINITY), 0.0);
        assert_eq!(fitness_from_distance(f64::NAN), 0.0);
        assert_eq!(fitness_from_distance(-3.0), 0.0);
    }

    #[test]
    fn test_fitness_of_subnormal_distance_is_zero() {
        for d in [1e-320, f64::MIN_POSITIVE / 8.0, 5e-324] {
            assert_eq!(fitness_from_distance(d), 0.0, "distance {d:e}");
        }
        assert!(fitness_from_distance(f64::MIN_POSITIVE).is_finite());
    }

    #[test]
    fn test_fitness_decreases_with_distance() {
        let pairs = [(1.0, 2.0), (10.0, 10.5), (45.0, 999_999.0)];
        for (d1, d2) in pairs {
            assert!(fitness_from_distance(d1) > fitness_from_distance(d2));
        }
    }

    #[test]
    fn test_rejects_duplicates() {
        let g = CityGraph::standard();
        let f = g.city("F").expect("F").clone();
        let l = g.city("L").expect("L").clone();
        let err = Route::new(f, vec![l.clone(), l], g.distances().clone()).unwrap_err();
        assert!(matches!(err, TspError::InvalidRoute(_)));
    }

    #[test]
    fn test_rejects_start_in_sequence() {
        let g = CityGraph::standard();
        let f = g.city("F").expect("F").clone();
        let err = Route::new(f.clone(), vec![f], g.distances().clone()).unwrap_err();
        assert!(matches!(err, TspError::InvalidRoute(_)));
    }

    #[test]
    fn test_set_city_recomputes_distance() {
        let g = CityGraph::standard();
        let mut r = route_of(&g, "F", &["L", "E", "C"]);
        let before = r.total_distance();
        let c = r.city(2).clone();
        let l = r.city(0).clone();
        r.set_city(0, c);
        r.set_city(2, l);
        assert_eq!(ids(&r), vec!["C", "E", "L"]);
        // F-C 20, C-E 10, E-L 5, L-F 10
        assert!((r.total_distance() - 45.0).abs() < 1e-9);
        assert!((before - r.total_distance()).abs() < 1e-9);

        let n = g.city("N").expect("N").clone();
        r.set_city(1, n);
        // F-C 20, C-N 47, N-L none, L-F 10
        assert!((r.total_distance() - (77.0 + NO_EDGE)).abs() < 1e-6);
    }

    #[test]
    fn test_clone_keeps_distance_and_is_independent() {
        let g = CityGraph::standard();
        let original = route_of(&g, "F", &["L", "E", "C"]);
        let mut copy = original.clone();
        assert_eq!(copy.total_distance(), original.total_distance());

        copy.rearrange(|s| s.reverse());
        assert_eq!(ids(&original), vec!["L", "E", "C"]);
        assert_eq!(ids(&copy), vec!["C", "E", "L"]);
    }

    #[test]
    fn test_city_names_and_display() {
        let g = CityGraph::standard();
        let r = route_of(&g, "F", &["L", "E", "C"]);
        assert_eq!(r.city_names(), vec!["F", "L", "E", "C", "F"]);
        assert_eq!(r.to_string(), "F -> L -> E -> C -> F (Distance: 45.00)");
    }

    #[test]
    fn test_cmp_by_distance() {
        let g = CityGraph::standard();
        let short = route_of(&g, "F", &["L", "E", "C"]);
        let long = route_of(&g, "F", &["H", "L", "E"]);
        assert_eq!(short.cmp_by_distance(&long), Ordering::Less);
        assert_eq!(long.cmp_by_distance(&short), Ordering::Greater);
        assert_eq!(short.cmp_by_distance(&short.clone()), Ordering::Equal);
    }

    #[test]
    fn test_is_permutation_of() {
        let g = CityGraph::standard();
        let a = route_of(&g, "F", &["L", "E", "C"]);
        let b = route_of(&g, "F", &["C", "L", "E"]);
        let c = route_of(&g, "F", &["C", "L", "H"]);
        let d = route_of(&g, "L", &["C", "F", "E"]);
        assert!(a.is_permutation_of(&b));
        assert!(!a.is_permutation_of(&c));
        assert!(!a.is_permutation_of(&d));
        assert!(a.contains_city(g.city("E").expect("E")));
        assert!(!a.contains_city(g.city("F").expect("F")));
    }
}
