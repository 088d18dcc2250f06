//! Selection strategies.
//!
//! Selection decides which routes become parents. Strategies differ in
//! selection pressure:
//!
//! - [`Selection::Tournament`]: best of `k` random draws; pressure grows with `k`
//! - [`Selection::Roulette`]: probability proportional to fitness
//! - [`Selection::Rank`]: probability proportional to rank, immune to
//!   fitness scale
//! - [`Selection::StochasticUniversal`]: fitness-proportionate, but all
//!   picks come from one sweep of evenly spaced pointers
//!
//! [`elite`] is separate: it is deterministic and feeds survivors, not
//! parents.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Baker (1987), "Reducing Bias and Inefficiency in the Selection Algorithm"

use super::population::Population;
use super::route::Route;
use rand::Rng;

/// Tournament size used when none is configured.
pub const DEFAULT_TOURNAMENT_SIZE: usize = 5;

/// Parent selection strategy.
///
/// Every strategy returns indices into [`Population::routes`] in the
/// population's current order.
///
/// # Examples
///
/// ```
/// use u_tsp::ga::Selection;
///
/// let strong = Selection::Tournament(7);
/// let fair = Selection::StochasticUniversal;
/// assert_eq!(Selection::default(), Selection::Tournament(5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Draw `k` routes uniformly with replacement, keep the shortest.
    ///
    /// When `k` is at least the population size the tournament covers the
    /// whole population and the global best always wins.
    Tournament(usize),

    /// Fitness-proportionate (roulette wheel) selection.
    ///
    /// **Warning**: a single short route can dominate the wheel.
    Roulette,

    /// Linear rank selection: weights `n, n-1, …, 1` from best to worst.
    Rank,

    /// Stochastic universal sampling (Baker, 1987).
    ///
    /// Identical to roulette for a single pick; for `count` picks the
    /// selection counts stay within one of their expected values.
    StochasticUniversal,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Tournament(DEFAULT_TOURNAMENT_SIZE)
    }
}

impl Selection {
    /// Selects one parent index.
    ///
    /// # Panics
    /// Panics if `population` is empty.
    pub fn select<R: Rng>(&self, population: &Population, rng: &mut R) -> usize {
        assert!(
            !population.is_empty(),
            "cannot select from empty population"
        );

        let routes = population.routes();
        match self {
            Selection::Tournament(k) => tournament(routes, *k, rng),
            Selection::Roulette => roulette(routes, rng),
            Selection::Rank => rank(routes, rng),
            Selection::StochasticUniversal => {
                stochastic_universal(routes, 1, rng)[0]
            }
        }
    }

    /// Selects `count` parent indices.
    ///
    /// SUS places all picks in one sweep; the other strategies draw
    /// independently.
    ///
    /// # Panics
    /// Panics if `population` is empty and `count > 0`.
    pub fn select_many<R: Rng>(
        &self,
        population: &Population,
        count: usize,
        rng: &mut R,
    ) -> Vec<usize> {
        if count == 0 {
            return Vec::new();
        }
        match self {
            Selection::StochasticUniversal => {
                assert!(
                    !population.is_empty(),
                    "cannot select from empty population"
                );
                stochastic_universal(population.routes(), count, rng)
            }
            _ => (0..count).map(|_| self.select(population, rng)).collect(),
        }
    }
}

/// The best `count` routes, unchanged.
///
/// Sorts the population first. Returns fewer routes if the population is
/// smaller than `count`.
pub fn elite(population: &mut Population, count: usize) -> Vec<Route> {
    population.top_routes(count).to_vec()
}

/// Tournament selection: k draws with replacement, shortest wins.
///
/// Ties keep the earliest draw.
fn tournament<R: Rng>(routes: &[Route], k: usize, rng: &mut R) -> usize {
    let n = routes.len();
    if k >= n {
        return best_index(routes);
    }

    let k = k.max(1);
    let mut best_idx = rng.random_range(0..n);
    for _ in 1..k {
        let idx = rng.random_range(0..n);
        if routes[idx].total_distance() < routes[best_idx].total_distance() {
            best_idx = idx;
        }
    }
    best_idx
}

/// Index of the shortest route; first one on ties.
fn best_index(routes: &[Route]) -> usize {
    let mut best_idx = 0;
    for (i, route) in routes.iter().enumerate().skip(1) {
        if route.total_distance() < routes[best_idx].total_distance() {
            best_idx = i;
        }
    }
    best_idx
}

/// Roulette wheel selection on `fitness = 1/distance`.
///
/// If every fitness is zero (or the total overflows) the wheel is unusable
/// and the last route is returned.
fn roulette<R: Rng>(routes: &[Route], rng: &mut R) -> usize {
    let n = routes.len();
    let total: f64 = routes.iter().map(Route::fitness).sum();
    if !(total > 0.0 && total.is_finite()) {
        return n - 1;
    }

    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (i, route) in routes.iter().enumerate() {
        cumulative += route.fitness();
        if cumulative >= threshold {
            return i;
        }
    }

    n - 1 // floating-point fallback
}

/// Linear rank selection.
///
/// Ranks are computed on a local best-first ordering; the population itself
/// is not reordered.
fn rank<R: Rng>(routes: &[Route], rng: &mut R) -> usize {
    let n = routes.len();
    if n == 1 {
        return 0;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| routes[a].cmp_by_distance(&routes[b]));

    // rank 0 (best) weighs n, rank n-1 weighs 1
    let total = n * (n + 1) / 2;
    let threshold = rng.random_range(0..total);
    let mut cumulative = 0;
    for (rank, &idx) in order.iter().enumerate() {
        cumulative += n - rank;
        if cumulative > threshold {
            return idx;
        }
    }

    order[n - 1]
}

/// Stochastic universal sampling: `count` pointers spaced `total/count`
/// apart from one random offset, resolved in a single sweep.
fn stochastic_universal<R: Rng>(routes: &[Route], count: usize, rng: &mut R) -> Vec<usize> {
    let n = routes.len();
    let total: f64 = routes.iter().map(Route::fitness).sum();
    if !(total > 0.0 && total.is_finite()) {
        return vec![n - 1; count];
    }

    let spacing = total / count as f64;
    let offset = rng.random_range(0.0..spacing);

    let mut selected = Vec::with_capacity(count);
    let mut idx = 0;
    let mut cumulative = routes[0].fitness();
    for i in 0..count {
        let pointer = offset + i as f64 * spacing;
        while cumulative <= pointer && idx < n - 1 {
            idx += 1;
            cumulative += routes[idx].fitness();
        }
        selected.push(idx);
    }
    selected
}
