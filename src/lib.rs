//! # Geodemax
//!
//! A command-line tool and library for finding the best build order in a
//! small production chain.
//!
//! A scenario lists recipes that turn stock into extra production of one
//! resource kind. Starting from a single ore producer, the optimizer decides
//! on every tick whether to wait or to build one producer, and finds the
//! largest amount of a target resource (geodes by default) that can be
//! accumulated within a fixed number of ticks.
//!
//! ## Modules
//!
//! - [`models`] - Resource vectors, recipes, scenarios and search states
//! - [`data`] - Blueprint text and CSV recipe table loading
//! - [`optimizer`] - Branch-and-bound search for a single scenario
//! - [`scheduler`] - Parallel evaluation of many scenarios and aggregations
//! - [`display`] - Output formatting and display utilities
//! - [`error`] - Error types
//!
//! ## Example Usage
//!
//! ```no_run
//! use geodemax::{
//!     data::{load_scenarios, InputFormat},
//!     scheduler::{quality_level_sum, Scheduler, SchedulerConfig},
//! };
//! use std::path::Path;
//!
//! let scenarios = load_scenarios(Path::new("data/example.txt"), InputFormat::Auto).unwrap();
//!
//! let scheduler = Scheduler::new(SchedulerConfig::new(24)).unwrap();
//! let quality = scheduler.run_and_aggregate(&scenarios, quality_level_sum).unwrap();
//! println!("Quality level sum: {}", quality);
//! ```
//!
//! ## Search Rules
//!
//! The search is exact. Three rules keep it fast without changing the result:
//!
//! 1. **Memoization**: a state seen before with the same time remaining is skipped.
//! 2. **Bound pruning**: a state is dropped when even building a target
//!    producer on every remaining tick could not beat the best value so far.
//! 3. **Dominance**: no more producers of a resource are built once its
//!    production covers the largest amount any recipe spends.

pub mod data;
pub mod display;
pub mod error;
pub mod models;
pub mod optimizer;
pub mod scheduler;
pub mod wasm;
