//! GA evolutionary loop execution.
//!
//! [`GaEngine`] orchestrates the complete evolutionary process:
//! initialization → elitism → selection → crossover → mutation → replacement
//! → repeat, recording a [`GenerationResult`] for every generation.
//!
//! The engine is a plain stateful value: one population, one history and one
//! random source per instance. Every state-changing call takes `&mut self`,
//! so callers sharing an engine must serialize access themselves.

use super::config::GaConfig;
use super::operators::pmx_crossover;
use super::population::Population;
use super::route::Route;
use super::selection::elite;
use crate::error::{TspError, TspResult};
use crate::graph::{City, CityGraph};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::instrument;

/// Number of best routes kept in every [`GenerationResult`].
pub const TOP_ROUTES: usize = 10;

/// Snapshot of one generation.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "camelCase")
)]
pub struct GenerationResult {
    /// Generation number; `0` is the initial population.
    pub generation: usize,

    /// Shortest route of the generation.
    pub best_route: Route,

    pub best_distance: f64,

    pub average_distance: f64,

    pub worst_distance: f64,

    /// Up to [`TOP_ROUTES`] best routes, best first.
    pub top_routes: Vec<Route>,
}

/// Result of a full GA run.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "camelCase")
)]
pub struct GaExecutionResult {
    /// Best route of the final population.
    pub best_route: Route,

    /// Distance of `best_route`.
    pub best_distance: f64,

    /// Number of generations evolved (the initial population not counted).
    pub total_generations: usize,

    /// Generation 0 followed by every evolved generation.
    pub history: Vec<GenerationResult>,

    /// Configuration the run used.
    pub config: GaConfig,

    /// Wall-clock duration of the run.
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_millis"))]
    pub execution_time: Duration,
}

/// Summary of the current population.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "camelCase")
)]
pub struct PopulationStats {
    pub size: usize,
    pub best_distance: f64,
    pub average_distance: f64,
    pub worst_distance: f64,
    /// City names of the best tour, start city at both ends.
    pub best_route: Vec<String>,
}

#[cfg(feature = "serde")]
fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u128(d.as_millis())
}

/// State of an engine with a live population.
#[derive(Debug, Clone)]
struct Run {
    config: GaConfig,
    population: Population,
}

/// Genetic-algorithm engine for the TSP.
///
/// # Usage
///
/// ```
/// use u_tsp::ga::{GaConfig, GaEngine};
///
/// let mut engine = GaEngine::new();
/// let config = GaConfig::default().with_max_generations(10).with_seed(42);
/// let result = engine.run_genetic_algorithm(&config).unwrap();
///
/// assert_eq!(result.history.len(), 11);
/// assert_eq!(result.best_route.city_names().first().map(String::as_str), Some("F"));
/// ```
#[derive(Debug)]
pub struct GaEngine {
    graph: CityGraph,
    run: Option<Run>,
    history: Vec<GenerationResult>,
    rng: StdRng,
}

impl Default for GaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GaEngine {
    /// Creates an engine over the standard eight-city graph.
    pub fn new() -> Self {
        Self::with_graph(CityGraph::standard())
    }

    /// Creates an engine over `graph`.
    pub fn with_graph(graph: CityGraph) -> Self {
        tracing::info!(cities = graph.len(), "city graph loaded");
        Self {
            graph,
            run: None,
            history: Vec::new(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Seeds a fresh random population and clears the history.
    ///
    /// # Errors
    ///
    /// - [`TspError::InvalidConfig`] / [`TspError::InvalidCrossoverPoints`]
    ///   if the configuration is invalid, including cut points beyond the
    ///   route length of this graph
    /// - [`TspError::UnknownCity`] if `start_city_id` is not in the graph
    #[instrument(level = "info", skip(self, config), fields(population_size = config.population_size, start = %config.start_city_id))]
    pub fn initialize_population(&mut self, config: &GaConfig) -> TspResult<&Population> {
        config.validate()?;

        let start = self
            .graph
            .city(&config.start_city_id)
            .cloned()
            .ok_or_else(|| TspError::UnknownCity(config.start_city_id.clone()))?;
        let available = self.graph.cities_except(&start);
        if config.crossover_point2 > available.len() {
            return Err(TspError::InvalidCrossoverPoints {
                point1: config.crossover_point1,
                point2: config.crossover_point2,
                route_len: available.len(),
            });
        }

        if let Some(seed) = config.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        self.history.clear();

        let mut population = Population::with_capacity(config.population_size);
        for _ in 0..config.population_size {
            let mut cities = available.clone();
            cities.shuffle(&mut self.rng);
            population.add_route(Route::new(
                Arc::clone(&start),
                cities,
                Arc::clone(self.graph.distances()),
            )?);
        }

        tracing::info!(
            size = population.len(),
            best_distance = population.best_distance().unwrap_or(f64::INFINITY),
            "population initialized"
        );

        let run = self.run.insert(Run {
            config: config.clone(),
            population,
        });
        Ok(&run.population)
    }

    /// Evolves the current population by one generation.
    ///
    /// Records the resulting [`GenerationResult`] in the history and returns
    /// it.
    ///
    /// # Errors
    ///
    /// [`TspError::NotInitialized`] if no population exists yet.
    #[instrument(level = "debug", skip(self))]
    pub fn evolve_generation(&mut self, generation: usize) -> TspResult<GenerationResult> {
        let run = self.run.as_mut().ok_or(TspError::NotInitialized)?;
        let config = &run.config;
        let size = config.population_size;
        let crossover_p = config.crossover_probability().clamp(0.0, 1.0);
        let mutation_p = config.mutation_probability();

        // Elite preservation
        let mut next_gen = Population::with_capacity(size);
        for route in elite(&mut run.population, config.elitism_count) {
            next_gen.add_route(route);
        }

        // Generate offspring
        while next_gen.len() < size {
            let parents = config.selection.select_many(&run.population, 2, &mut self.rng);
            let parent1 = run.population.route(parents[0]);
            let parent2 = run.population.route(parents[1]);

            let (child1, child2) = if self.rng.random_bool(crossover_p) {
                pmx_crossover(
                    parent1,
                    parent2,
                    config.crossover_point1,
                    config.crossover_point2,
                )?
            } else {
                (parent1.clone(), parent2.clone())
            };

            for child in [child1, child2] {
                if next_gen.len() >= size {
                    break;
                }
                next_gen.add_route(config.mutation.mutate(child, mutation_p, &mut self.rng));
            }
        }

        run.population = next_gen;
        let result = snapshot(generation, &mut run.population)?;

        tracing::debug!(
            generation,
            best = result.best_distance,
            average = result.average_distance,
            worst = result.worst_distance,
            "generation evolved"
        );

        self.history.push(result.clone());
        Ok(result)
    }

    /// Runs the full algorithm: initialize, record generation 0, evolve
    /// `max_generations` generations.
    ///
    /// Always evolves the full generation count.
    ///
    /// # Errors
    ///
    /// Any failure is returned as [`TspError::RunFailed`] with the original
    /// error as its source.
    #[instrument(level = "info", skip(self, config), fields(max_generations = config.max_generations))]
    pub fn run_genetic_algorithm(&mut self, config: &GaConfig) -> TspResult<GaExecutionResult> {
        self.run_inner(config).map_err(|err| {
            tracing::error!(error = %err, "genetic algorithm run failed");
            err.into_run_failure()
        })
    }

    fn run_inner(&mut self, config: &GaConfig) -> TspResult<GaExecutionResult> {
        let started = Instant::now();

        self.initialize_population(config)?;
        let initial = snapshot(0, self.population_mut()?)?;
        self.history.push(initial);

        for generation in 1..=config.max_generations {
            self.evolve_generation(generation)?;
        }

        let best_route = self
            .population_mut()?
            .best_route()
            .cloned()
            .ok_or(TspError::NotInitialized)?;
        let execution_time = started.elapsed();

        tracing::info!(
            elapsed_ms = execution_time.as_millis() as u64,
            best_distance = best_route.total_distance(),
            route = %best_route,
            "genetic algorithm finished"
        );

        Ok(GaExecutionResult {
            best_distance: best_route.total_distance(),
            best_route,
            total_generations: config.max_generations,
            history: self.history.clone(),
            config: config.clone(),
            execution_time,
        })
    }

    /// Size and best/average/worst distance of the current population.
    ///
    /// # Errors
    ///
    /// [`TspError::NotInitialized`] if no population exists yet.
    pub fn population_stats(&mut self) -> TspResult<PopulationStats> {
        let population = self.population_mut()?;
        let best = population.best_route().cloned().ok_or(TspError::NotInitialized)?;
        let worst_distance = population
            .worst_distance()
            .ok_or(TspError::NotInitialized)?;

        Ok(PopulationStats {
            size: population.len(),
            best_distance: best.total_distance(),
            average_distance: population.average_distance(),
            worst_distance,
            best_route: best.city_names(),
        })
    }

    /// Generation records since the last initialization, oldest first.
    pub fn history(&self) -> &[GenerationResult] {
        &self.history
    }

    /// The current population, if initialized.
    pub fn current_population(&self) -> Option<&Population> {
        self.run.as_ref().map(|run| &run.population)
    }

    /// The configuration of the current population, if initialized.
    pub fn current_config(&self) -> Option<&GaConfig> {
        self.run.as_ref().map(|run| &run.config)
    }

    /// All cities of the active graph keyed by id.
    pub fn cities(&self) -> HashMap<String, Arc<City>> {
        self.graph.city_map()
    }

    pub fn graph(&self) -> &CityGraph {
        &self.graph
    }

    /// Replaces the city set, keeping the distance table.
    ///
    /// The engine returns to the uninitialized state: routes built against
    /// the previous city set are dropped together with the history.
    pub fn set_cities(&mut self, cities: HashMap<String, City>) {
        self.graph.replace_cities(cities);
        self.reset();
        tracing::info!(cities = self.graph.len(), "city graph updated");
    }

    /// Replaces the whole graph (cities and distances).
    ///
    /// Resets the engine like [`set_cities`](Self::set_cities).
    pub fn set_graph(&mut self, graph: CityGraph) {
        self.graph = graph;
        self.reset();
        tracing::info!(cities = self.graph.len(), "city graph replaced");
    }

    fn reset(&mut self) {
        self.run = None;
        self.history.clear();
    }

    fn population_mut(&mut self) -> TspResult<&mut Population> {
        self.run
            .as_mut()
            .map(|run| &mut run.population)
            .ok_or(TspError::NotInitialized)
    }
}

/// Records best/average/worst and the top routes of `population`.
fn snapshot(generation: usize, population: &mut Population) -> TspResult<GenerationResult> {
    let best_route = population.best_route().cloned().ok_or(TspError::NotInitialized)?;
    let worst_distance = population
        .worst_distance()
        .ok_or(TspError::NotInitialized)?;

    Ok(GenerationResult {
        generation,
        best_distance: best_route.total_distance(),
        best_route,
        average_distance: population.average_distance(),
        worst_distance,
        top_routes: population.top_routes(TOP_ROUTES).to_vec(),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::{Mutation, Selection};
    use crate::graph::NO_EDGE;
    use std::collections::HashSet;

    fn scenario_config() -> GaConfig {
        GaConfig::default()
            .with_population_size(100)
            .with_max_generations(20)
            .with_elitism_count(5)
            .with_crossover_rate(70.0)
            .with_mutation_rate(0.8)
            .with_crossover_points(2, 5)
            .with_start_city("F")
            .with_seed(42)
    }

    fn assert_full_permutation(route: &Route) {
        let ids: HashSet<&str> = route.cities().iter().map(|c| c.id()).collect();
        assert_eq!(route.len(), 7, "route {route} has wrong length");
        assert_eq!(ids.len(), 7, "route {route} repeats a city");
        assert!(!ids.contains("F"), "route {route} visits the start city");
        assert_eq!(route.start_city().id(), "F");
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut engine = GaEngine::new();
        let result = engine
            .run_genetic_algorithm(&scenario_config())
            .expect("run succeeds");

        assert_eq!(result.total_generations, 20);
        assert_eq!(result.history.len(), 21);
        assert_eq!(engine.history().len(), 21);
        for (i, record) in result.history.iter().enumerate() {
            assert_eq!(record.generation, i);
        }

        let initial_best = result.history[0].best_distance;
        assert!(result.best_distance <= initial_best);
        assert_eq!(result.best_distance, result.best_route.total_distance());
        assert_full_permutation(&result.best_route);
        assert_eq!(result.config, scenario_config());
    }

    #[test]
    fn test_elitism_never_regresses() {
        let mut engine = GaEngine::new();
        let config = scenario_config().with_mutation_rate(50.0);
        let result = engine.run_genetic_algorithm(&config).expect("run succeeds");

        for window in result.history.windows(2) {
            assert!(
                window[1].best_distance <= window[0].best_distance,
                "best distance regressed: {} -> {}",
                window[0].best_distance,
                window[1].best_distance
            );
        }
    }

    #[test]
    fn test_every_route_is_a_permutation() {
        let mut engine = GaEngine::new();
        let config = scenario_config()
            .with_mutation_rate(100.0)
            .with_max_generations(5);
        engine.initialize_population(&config).expect("init");
        for route in engine.current_population().expect("initialized").routes() {
            assert_full_permutation(route);
        }

        for generation in 1..=5 {
            engine.evolve_generation(generation).expect("evolve");
            let population = engine.current_population().expect("initialized");
            assert_eq!(population.len(), 100);
            for route in population.routes() {
                assert_full_permutation(route);
            }
        }
    }

    #[test]
    fn test_all_strategies_run() {
        for selection in [
            Selection::Tournament(3),
            Selection::Roulette,
            Selection::Rank,
            Selection::StochasticUniversal,
        ] {
            for mutation in [Mutation::Swap, Mutation::Inversion, Mutation::Scramble] {
                let mut engine = GaEngine::new();
                let config = scenario_config()
                    .with_max_generations(5)
                    .with_selection(selection)
                    .with_mutation(mutation)
                    .with_mutation_rate(30.0);
                let result = engine.run_genetic_algorithm(&config).expect("run succeeds");
                assert_eq!(result.history.len(), 6);
                assert!(result.best_distance <= result.history[0].best_distance);
                assert_full_permutation(&result.best_route);
            }
        }
    }

    #[test]
    fn test_finds_a_feasible_tour() {
        // every tour through a missing edge costs at least NO_EDGE
        let mut engine = GaEngine::new();
        let config = scenario_config().with_max_generations(60).with_mutation_rate(20.0);
        let result = engine.run_genetic_algorithm(&config).expect("run succeeds");
        assert!(
            result.best_distance < NO_EDGE,
            "expected a tour using only real edges, got {}",
            result.best_route
        );
    }

    #[test]
    fn test_same_seed_same_result() {
        let config = scenario_config().with_max_generations(10);
        let a = GaEngine::new().run_genetic_algorithm(&config).expect("run a");
        let b = GaEngine::new().run_genetic_algorithm(&config).expect("run b");
        let best = |r: &GaExecutionResult| -> Vec<f64> {
            r.history.iter().map(|g| g.best_distance).collect()
        };
        assert_eq!(best(&a), best(&b));
        assert_eq!(a.best_route.city_names(), b.best_route.city_names());
    }

    #[test]
    fn test_generation_records() {
        let mut engine = GaEngine::new();
        engine.initialize_population(&scenario_config()).expect("init");
        let result = engine.evolve_generation(1).expect("evolve");

        assert_eq!(result.generation, 1);
        assert_eq!(result.top_routes.len(), TOP_ROUTES);
        assert_eq!(result.best_distance, result.top_routes[0].total_distance());
        assert!(result.best_distance <= result.average_distance);
        assert!(result.average_distance <= result.worst_distance);
        assert!(result
            .top_routes
            .windows(2)
            .all(|w| w[0].total_distance() <= w[1].total_distance()));
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn test_initialize_clears_history() {
        let mut engine = GaEngine::new();
        let config = scenario_config().with_max_generations(3);
        engine.run_genetic_algorithm(&config).expect("run");
        assert_eq!(engine.history().len(), 4);

        let population = engine.initialize_population(&config).expect("init");
        assert_eq!(population.len(), 100);
        assert!(engine.history().is_empty());
        assert_eq!(engine.current_config(), Some(&config));
    }

    #[test]
    fn test_evolve_before_initialize() {
        let mut engine = GaEngine::new();
        assert!(matches!(
            engine.evolve_generation(1),
            Err(TspError::NotInitialized)
        ));
        assert!(matches!(
            engine.population_stats(),
            Err(TspError::NotInitialized)
        ));
        assert!(engine.current_population().is_none());
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_unknown_start_city() {
        let mut engine = GaEngine::new();
        let config = scenario_config().with_start_city("Z");
        assert!(matches!(
            engine.initialize_population(&config),
            Err(TspError::UnknownCity(ref id)) if id == "Z"
        ));
    }

    #[test]
    fn test_crossover_points_beyond_route() {
        let mut engine = GaEngine::new();
        let config = scenario_config().with_crossover_points(2, 8);
        assert!(matches!(
            engine.initialize_population(&config),
            Err(TspError::InvalidCrossoverPoints { route_len: 7, .. })
        ));
    }

    #[test]
    fn test_run_wraps_failures() {
        let mut engine = GaEngine::new();
        let config = scenario_config().with_start_city("Z");
        match engine.run_genetic_algorithm(&config) {
            Err(TspError::RunFailed { source }) => {
                assert!(matches!(*source, TspError::UnknownCity(_)));
            }
            other => panic!("expected RunFailed, got {other:?}"),
        }

        let config = scenario_config().with_population_size(10);
        assert!(matches!(
            engine.run_genetic_algorithm(&config),
            Err(TspError::RunFailed { .. })
        ));
    }

    #[test]
    fn test_population_stats() {
        let mut engine = GaEngine::new();
        engine.initialize_population(&scenario_config()).expect("init");
        let stats = engine.population_stats().expect("stats");

        assert_eq!(stats.size, 100);
        assert!(stats.best_distance <= stats.average_distance);
        assert!(stats.average_distance <= stats.worst_distance);
        assert_eq!(stats.best_route.len(), 9);
        assert_eq!(stats.best_route.first().map(String::as_str), Some("F"));
        assert_eq!(stats.best_route.last().map(String::as_str), Some("F"));
    }

    #[test]
    fn test_set_cities_resets_engine() {
        let mut engine = GaEngine::new();
        engine.initialize_population(&scenario_config()).expect("init");
        assert_eq!(engine.cities().len(), 8);

        let mut cities = HashMap::new();
        for id in ["F", "L", "E", "C"] {
            cities.insert(id.to_string(), City::new(id, id, 0.0, 0.0));
        }
        engine.set_cities(cities);

        assert_eq!(engine.cities().len(), 4);
        assert!(engine.current_population().is_none());
        assert!(engine.history().is_empty());

        // three non-start cities: cut points must fit
        let config = scenario_config().with_crossover_points(1, 3);
        let result = engine.run_genetic_algorithm(&config).expect("run");
        assert_eq!(result.best_route.len(), 3);
        assert!((result.best_distance - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_set_graph() {
        let cities = vec![
            City::new("A", "Alpha", 0.0, 0.0),
            City::new("B", "Beta", 0.0, 0.0),
            City::new("C", "Gamma", 0.0, 0.0),
            City::new("D", "Delta", 0.0, 0.0),
        ];
        let edges = [
            ("A", "B", 1.0),
            ("B", "C", 1.0),
            ("C", "D", 1.0),
            ("D", "A", 1.0),
            ("A", "C", 5.0),
            ("B", "D", 5.0),
        ];
        let mut engine = GaEngine::new();
        engine.set_graph(CityGraph::new(cities, &edges).expect("graph"));

        let config = scenario_config()
            .with_start_city("A")
            .with_crossover_points(1, 3)
            .with_max_generations(10);
        let result = engine.run_genetic_algorithm(&config).expect("run");
        assert!((result.best_distance - 4.0).abs() < 1e-9);
        assert_eq!(result.best_route.city_names().first().map(String::as_str), Some("Alpha"));
    }
}
