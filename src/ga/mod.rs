//! Genetic Algorithm for the TSP.
//!
//! Routes are permutations of every non-start city; the engine evolves a
//! population of them toward a short closed tour.
//!
//! # Key Types
//!
//! - [`Route`]: a candidate tour, scored against the graph's distance table
//! - [`Population`]: the routes of one generation, sortable best-first
//! - [`GaConfig`]: algorithm parameters (sizes, rates, cut points, strategies)
//! - [`GaEngine`]: runs generations and keeps their history
//! - [`GenerationResult`] / [`GaExecutionResult`]: reporting snapshots
//!
//! # Operators
//!
//! - [`Selection`] and [`elite`]: choosing parents and survivors
//! - [`pmx_crossover`]: partially mapped crossover with fixed cut points
//! - [`Mutation`]: swap, inversion and scramble mutation
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Goldberg & Lingle (1985), "Alleles, Loci, and the Traveling Salesman Problem"

mod config;
mod operators;
mod population;
mod route;
mod runner;
mod selection;

pub use config::GaConfig;
pub use operators::{pmx_crossover, Mutation};
pub use population::Population;
pub use route::{fitness_from_distance, Route};
pub use runner::{GaEngine, GaExecutionResult, GenerationResult, PopulationStats, TOP_ROUTES};
pub use selection::{elite, Selection, DEFAULT_TOURNAMENT_SIZE};
