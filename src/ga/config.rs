//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop.
//! Rates are expressed in **percentage points** (`70.0` means 70%), the
//! engine converts them to probabilities.

use super::operators::Mutation;
use super::selection::Selection;
use crate::error::{TspError, TspResult};

/// Configuration for the TSP genetic algorithm.
///
/// # Defaults
///
/// ```
/// use u_tsp::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.max_generations, 100);
/// assert_eq!(config.start_city_id, "F");
/// assert!(config.validate().is_ok());
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_tsp::ga::{GaConfig, Mutation, Selection};
///
/// let config = GaConfig::default()
///     .with_population_size(200)
///     .with_crossover_points(1, 4)
///     .with_selection(Selection::Rank)
///     .with_mutation(Mutation::Inversion)
///     .with_seed(42);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "camelCase")
)]
pub struct GaConfig {
    /// Number of routes in every generation. At least 100.
    pub population_size: usize,

    /// Chance, in percent, that a parent pair is recombined with PMX.
    ///
    /// Must lie in `[60, 80]`. Pairs that skip crossover are cloned.
    pub crossover_rate: f64,

    /// Chance, in percent, that an offspring is mutated. Must lie in `[0, 100]`.
    pub mutation_rate: f64,

    /// Number of generations evolved by a full run. At least 1; no early
    /// stopping.
    pub max_generations: usize,

    /// Routes copied unchanged into the next generation. `[0, 20]`.
    pub elitism_count: usize,

    /// Share of the population replaced per generation, in percent.
    ///
    /// Validated and reported; replacement is always generational (the
    /// whole non-elite population is rebuilt every generation).
    pub generation_gap: f64,

    /// PMX segment start (inclusive). At least 1.
    pub crossover_point1: usize,

    /// PMX segment end (exclusive). At least 2 and greater than
    /// `crossover_point1`.
    pub crossover_point2: usize,

    /// Id of the city every tour starts and ends at.
    pub start_city_id: String,

    /// Parent selection strategy.
    pub selection: Selection,

    /// Mutation strategy applied to offspring.
    pub mutation: Mutation,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            crossover_rate: 70.0,
            mutation_rate: 0.8,
            max_generations: 100,
            elitism_count: 5,
            generation_gap: 0.9,
            crossover_point1: 2,
            crossover_point2: 5,
            start_city_id: "F".to_string(),
            selection: Selection::default(),
            mutation: Mutation::default(),
            seed: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the crossover rate (percent).
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the mutation rate (percent).
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the number of elites.
    pub fn with_elitism_count(mut self, n: usize) -> Self {
        self.elitism_count = n;
        self
    }

    /// Sets the generation gap (percent).
    pub fn with_generation_gap(mut self, gap: f64) -> Self {
        self.generation_gap = gap;
        self
    }

    /// Sets both PMX cut points.
    pub fn with_crossover_points(mut self, point1: usize, point2: usize) -> Self {
        self.crossover_point1 = point1;
        self.crossover_point2 = point2;
        self
    }

    /// Sets the start city id.
    pub fn with_start_city(mut self, id: impl Into<String>) -> Self {
        self.start_city_id = id.into();
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, sel: Selection) -> Self {
        self.selection = sel;
        self
    }

    /// Convenience builder for setting tournament size.
    ///
    /// Equivalent to `.with_selection(Selection::Tournament(k))`.
    pub fn with_tournament_size(self, k: usize) -> Self {
        self.with_selection(Selection::Tournament(k))
    }

    /// Sets the mutation strategy.
    pub fn with_mutation(mut self, mutation: Mutation) -> Self {
        self.mutation = mutation;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Crossover probability in `[0, 1]`.
    pub fn crossover_probability(&self) -> f64 {
        self.crossover_rate / 100.0
    }

    /// Mutation probability in `[0, 1]`.
    pub fn mutation_probability(&self) -> f64 {
        self.mutation_rate / 100.0
    }

    /// Validates the configuration.
    ///
    /// Returns [`TspError::InvalidConfig`] describing the first parameter out
    /// of range, or [`TspError::InvalidCrossoverPoints`] when the cut points
    /// are not ordered. Cut points are checked against the route length only
    /// once the graph is known, by the engine.
    pub fn validate(&self) -> TspResult<()> {
        if self.population_size < 100 {
            return Err(invalid("population_size must be at least 100"));
        }
        if !(60.0..=80.0).contains(&self.crossover_rate) {
            return Err(invalid("crossover_rate must be within [60, 80] percent"));
        }
        if !(0.0..=100.0).contains(&self.mutation_rate) {
            return Err(invalid("mutation_rate must be within [0, 100] percent"));
        }
        if self.max_generations == 0 {
            return Err(invalid("max_generations must be at least 1"));
        }
        if self.elitism_count > 20 {
            return Err(invalid("elitism_count must be within [0, 20]"));
        }
        if !(0.0..=100.0).contains(&self.generation_gap) {
            return Err(invalid("generation_gap must be within [0, 100] percent"));
        }
        if self.crossover_point1 < 1 {
            return Err(invalid("crossover_point1 must be at least 1"));
        }
        if self.crossover_point2 < 2 {
            return Err(invalid("crossover_point2 must be at least 2"));
        }
        if self.crossover_point1 >= self.crossover_point2 {
            return Err(TspError::InvalidCrossoverPoints {
                point1: self.crossover_point1,
                point2: self.crossover_point2,
                route_len: self.crossover_point2,
            });
        }
        if let Selection::Tournament(0) = self.selection {
            return Err(invalid("tournament size must be at least 1"));
        }
        if self.start_city_id.is_empty() {
            return Err(invalid("start_city_id must not be empty"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> TspError {
    TspError::InvalidConfig(message.to_string())
}
