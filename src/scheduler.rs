//! Parallel evaluation of many scenarios.
//!
//! Every scenario is searched by an independent task on a rayon pool. Tasks
//! share nothing but the read-only scenario list; each owns its own search
//! context. Results are always returned in input order, no matter which task
//! finishes first.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, warn};

use crate::error::{ScenarioError, ScheduleError};
use crate::models::{Resource, ScenarioDefinition, SearchState};
use crate::optimizer::{maximize, SearchOptions, SearchStatistics};

/// Configuration for a batch of scenario searches.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Ticks simulated per scenario.
    pub time_budget: u32,
    /// Resource to maximize.
    pub target: Resource,
    /// State every scenario starts from.
    pub initial: SearchState,
    /// Optional search rules.
    pub options: SearchOptions,
    /// Worker count for a dedicated pool; `None` uses the global rayon pool.
    pub threads: Option<usize>,
}

impl SchedulerConfig {
    /// Default configuration for the given budget: maximize geodes starting
    /// from a single ore producer.
    pub fn new(time_budget: u32) -> Self {
        SchedulerConfig {
            time_budget,
            target: Resource::Geode,
            initial: SearchState::default(),
            options: SearchOptions::default(),
            threads: None,
        }
    }
}

/// The optimum found for one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioResult {
    /// Id of the scenario.
    pub id: u32,
    /// Largest reachable amount of the target resource.
    pub best: u32,
    /// Counters collected during the search.
    pub statistics: SearchStatistics,
}

/// Runs one search per scenario and joins the results.
///
/// # Example
///
/// ```
/// use geodemax::models::ScenarioDefinition;
/// use geodemax::scheduler::{quality_level_sum, Scheduler, SchedulerConfig};
///
/// let scenarios = vec![
///     ScenarioDefinition::blueprint(1, 4, 2, 3, 14, 2, 7),
///     ScenarioDefinition::blueprint(2, 2, 3, 3, 8, 3, 12),
/// ];
/// let scheduler = Scheduler::new(SchedulerConfig::new(24)).unwrap();
/// let total = scheduler.run_and_aggregate(&scenarios, quality_level_sum).unwrap();
///
/// assert_eq!(total, 33);
/// ```
pub struct Scheduler {
    config: SchedulerConfig,
    pool: Option<ThreadPool>,
}

impl Scheduler {
    /// Creates a scheduler, building a dedicated pool if `config.threads` is set.
    pub fn new(config: SchedulerConfig) -> Result<Self, ScheduleError> {
        let pool = match config.threads {
            Some(threads) => Some(ThreadPoolBuilder::new().num_threads(threads).build()?),
            None => None,
        };
        Ok(Scheduler { config, pool })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    fn run_one(&self, scenario: &ScenarioDefinition) -> Result<ScenarioResult, ScenarioError> {
        let config = &self.config;
        match maximize(scenario, config.target, config.initial, config.time_budget, config.options) {
            Ok(outcome) => Ok(ScenarioResult {
                id: scenario.id,
                best: outcome.best,
                statistics: outcome.statistics,
            }),
            Err(source) => {
                warn!(scenario = scenario.id, error = %source, "scenario search failed");
                Err(ScenarioError { id: scenario.id, source })
            }
        }
    }

    /// Searches all scenarios concurrently, one task per scenario.
    ///
    /// A failure in one scenario does not affect the others; the returned
    /// vector holds one entry per scenario, in input order.
    pub fn run(
        &self,
        scenarios: &[ScenarioDefinition],
    ) -> Vec<Result<ScenarioResult, ScenarioError>> {
        debug!(
            scenarios = scenarios.len(),
            time_budget = self.config.time_budget,
            "dispatching scenario searches"
        );
        let fan_out = || {
            scenarios
                .par_iter()
                .map(|scenario| self.run_one(scenario))
                .collect::<Vec<_>>()
        };
        match &self.pool {
            Some(pool) => pool.install(fan_out),
            None => fan_out(),
        }
    }

    /// Searches all scenarios one after another on the calling thread.
    pub fn run_sequential(
        &self,
        scenarios: &[ScenarioDefinition],
    ) -> Vec<Result<ScenarioResult, ScenarioError>> {
        scenarios.iter().map(|scenario| self.run_one(scenario)).collect()
    }

    /// Searches all scenarios concurrently and feeds the joined results,
    /// in input order, to `aggregate`.
    ///
    /// Any scenario failure is returned instead of an aggregate.
    pub fn run_and_aggregate<R, F>(
        &self,
        scenarios: &[ScenarioDefinition],
        aggregate: F,
    ) -> Result<R, ScheduleError>
    where
        F: FnOnce(&[ScenarioResult]) -> R,
    {
        let results = self
            .run(scenarios)
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(aggregate(&results))
    }
}

/// Sum of `id * best` over all results.
pub fn quality_level_sum(results: &[ScenarioResult]) -> u64 {
    results
        .iter()
        .map(|r| u64::from(r.id) * u64::from(r.best))
        .sum()
}

/// Product of the best values of the first `count` results.
pub fn product_of_first(results: &[ScenarioResult], count: usize) -> u64 {
    results.iter().take(count).map(|r| u64::from(r.best)).product()
}

/// Product of the `count` largest best values.
pub fn product_of_top(results: &[ScenarioResult], count: usize) -> u64 {
    let mut values: Vec<u64> = results.iter().map(|r| u64::from(r.best)).collect();
    values.sort_unstable_by(|a, b| b.cmp(a));
    values.into_iter().take(count).product()
}
