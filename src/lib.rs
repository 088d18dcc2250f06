//! Genetic-algorithm solver for the symmetric Traveling Salesman Problem.
//!
//! Evolves closed tours over a fixed city graph: every tour leaves a
//! designated start city, visits every other city exactly once and returns.
//!
//! - **Graph** ([`graph`]): cities and the static distance table. Pairs
//!   without an edge cost [`graph::NO_EDGE`].
//! - **Genetic Algorithm** ([`ga`]): routes, populations, selection
//!   (elite, tournament, roulette, rank, SUS), PMX crossover, swap /
//!   inversion / scramble mutation, and the [`ga::GaEngine`] generation loop.
//!
//! # Example
//!
//! ```
//! use u_tsp::ga::{GaConfig, GaEngine};
//!
//! let mut engine = GaEngine::new();
//! let config = GaConfig::default().with_max_generations(20).with_seed(7);
//! let result = engine.run_genetic_algorithm(&config).unwrap();
//!
//! println!("{}", result.best_route);
//! assert!(result.best_distance <= result.history[0].best_distance);
//! ```
//!
//! # Logging
//!
//! The engine emits [`tracing`] events (population initialization, one debug
//! event per generation, run completion). Install a subscriber to see them.

pub mod error;
pub mod ga;
pub mod graph;

pub use error::{TspError, TspResult};
