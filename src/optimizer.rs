//! Production optimization algorithms for Geodemax.
//!
//! This module contains the branch-and-bound search that finds the largest
//! amount of a target resource a scenario can accumulate within a fixed
//! number of ticks.
//!
//! The search walks a DAG whose nodes are `(state, time remaining)` pairs.
//! From every node it explores "wait one tick" and "build recipe `i`, then
//! wait one tick". Three rules keep the tree manageable:
//!
//! - an exact memoization set skips states that were already expanded,
//! - an optimistic bound prunes states that cannot beat the best value found
//!   so far, even if a target producer were built on every remaining tick,
//! - a dominance rule never builds producers of a resource whose production
//!   already covers the most any recipe can spend per tick.

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::error::SearchError;
use crate::models::{Resource, ResourceVector, ScenarioDefinition, SearchState};

/// Switches for the optional search rules.
///
/// Both rules only ever skip work; turning them off must not change the
/// optimum, just the time it takes to find it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Prune states whose optimistic bound cannot beat the incumbent.
    pub prune_by_bound: bool,
    /// Skip producers of resources that are already produced at the spending ceiling.
    pub skip_dominated: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            prune_by_bound: true,
            skip_dominated: true,
        }
    }
}

/// Counters collected during one scenario search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStatistics {
    /// Total search calls made.
    pub nodes_explored: u64,
    /// Terminal states reached.
    pub leaves: u64,
    /// States skipped because they were already expanded.
    pub cache_hits: u64,
    /// States pruned by the optimistic bound.
    pub prunings_bound: u64,
    /// Build branches skipped by the dominance rule.
    pub prunings_dominated: u64,
    /// Distinct states stored in the memoization set.
    pub cached_states: u64,
}

impl SearchStatistics {
    #[inline]
    fn on_node_explored(&mut self) {
        self.nodes_explored = self.nodes_explored.saturating_add(1);
    }

    #[inline]
    fn on_leaf(&mut self) {
        self.leaves = self.leaves.saturating_add(1);
    }

    #[inline]
    fn on_cache_hit(&mut self) {
        self.cache_hits = self.cache_hits.saturating_add(1);
    }

    #[inline]
    fn on_pruning_bound(&mut self) {
        self.prunings_bound = self.prunings_bound.saturating_add(1);
    }

    #[inline]
    fn on_pruning_dominated(&mut self) {
        self.prunings_dominated = self.prunings_dominated.saturating_add(1);
    }
}

impl fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Nodes explored:        {}", self.nodes_explored)?;
        writeln!(f, "  Leaves reached:        {}", self.leaves)?;
        writeln!(f, "  Cached states:         {}", self.cached_states)?;
        writeln!(f, "  Cache hits:            {}", self.cache_hits)?;
        writeln!(f, "  Prunings (bound):      {}", self.prunings_bound)?;
        write!(f, "  Prunings (dominated):  {}", self.prunings_dominated)
    }
}

/// Result of searching one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Largest reachable amount of the target resource.
    pub best: u32,
    /// Counters collected along the way.
    pub statistics: SearchStatistics,
}

/// Exact memoization key. Two states share a key only if they are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct VisitKey {
    state: SearchState,
    time_remaining: u32,
}

/// Optimistic gain of the target over `time_remaining` ticks, assuming the
/// current rate grows by one on every remaining tick.
///
/// Never below what building one target producer per tick can achieve, so
/// pruning on it cannot discard the optimum.
///
/// # Example
///
/// ```
/// use geodemax::optimizer::optimistic_gain;
///
/// assert_eq!(optimistic_gain(0, 1), 0);
/// assert!(optimistic_gain(2, 3) >= 2 + 3 + 4);
/// ```
pub fn optimistic_gain(rate: u32, time_remaining: u32) -> u64 {
    let rate = u64::from(rate);
    let time = u64::from(time_remaining);
    time.saturating_mul(rate + (rate + time)) / 2
}

/// Mutable state of one scenario search.
///
/// Owned by a single call to [`maximize`] and never shared.
struct SearchContext<'a> {
    scenario: &'a ScenarioDefinition,
    target: Resource,
    ceilings: ResourceVector,
    options: SearchOptions,
    best: u32,
    visited: HashSet<VisitKey>,
    statistics: SearchStatistics,
}

impl<'a> SearchContext<'a> {
    fn new(scenario: &'a ScenarioDefinition, target: Resource, options: SearchOptions) -> Self {
        SearchContext {
            scenario,
            target,
            ceilings: scenario.cost_ceilings(),
            options,
            best: 0,
            visited: HashSet::new(),
            statistics: SearchStatistics::default(),
        }
    }

    /// Returns `true` if building another producer of `resource` cannot help.
    fn is_saturated(&self, state: &SearchState, resource: Resource) -> bool {
        resource != self.target && state.production[resource] >= self.ceilings[resource]
    }

    fn search(&mut self, state: SearchState, time_remaining: u32) -> Result<u32, SearchError> {
        self.statistics.on_node_explored();
        let target = self.target;

        if time_remaining == 1 {
            let stock = state.stock[target];
            let rate = state.production[target];
            let value = stock.checked_add(rate).ok_or(SearchError::QuantityOverflow {
                left: ResourceVector::ZERO.with(target, stock),
                right: ResourceVector::ZERO.with(target, rate),
            })?;
            self.statistics.on_leaf();
            self.best = self.best.max(value);
            return Ok(value);
        }

        // The first visit already folded this subtree into `best`.
        if !self.visited.insert(VisitKey { state, time_remaining }) {
            self.statistics.on_cache_hit();
            return Ok(0);
        }

        if self.options.prune_by_bound {
            let ceiling = u64::from(state.stock[target])
                .saturating_add(optimistic_gain(state.production[target], time_remaining));
            if ceiling < u64::from(self.best) {
                self.statistics.on_pruning_bound();
                return Ok(0);
            }
        }

        let mut current = self.search(state.advance_tick()?, time_remaining - 1)?;
        self.best = self.best.max(current);

        // Recipes further down the chain usually feed the target, try them first.
        let scenario = self.scenario;
        for recipe in scenario.recipes.iter().rev() {
            if !recipe.can_afford(&state.stock) {
                continue;
            }
            if self.options.skip_dominated && self.is_saturated(&state, recipe.produces) {
                self.statistics.on_pruning_dominated();
                continue;
            }
            let next = state.apply(recipe)?.advance_tick()?;
            current = current.max(self.search(next, time_remaining - 1)?);
            self.best = self.best.max(current);
        }

        Ok(current)
    }
}

/// Finds the largest amount of `target` reachable from `initial` within
/// `time_budget` ticks.
///
/// # Arguments
///
/// * `scenario` - The recipes available to build
/// * `target` - The resource to maximize
/// * `initial` - The state at the start of the first tick
/// * `time_budget` - Number of ticks to simulate
/// * `options` - Which optional search rules to apply
///
/// # Returns
///
/// A [`SearchOutcome`] with the optimum and the search counters, or a
/// [`SearchError`] if an internal invariant was violated or a quantity
/// overflowed.
///
/// # Example
///
/// ```
/// use geodemax::models::{Resource, ScenarioDefinition, SearchState};
/// use geodemax::optimizer::{maximize, SearchOptions};
///
/// let blueprint = ScenarioDefinition::blueprint(1, 4, 2, 3, 14, 2, 7);
/// let outcome = maximize(
///     &blueprint,
///     Resource::Geode,
///     SearchState::default(),
///     24,
///     SearchOptions::default(),
/// )
/// .unwrap();
///
/// assert_eq!(outcome.best, 9);
/// ```
pub fn maximize(
    scenario: &ScenarioDefinition,
    target: Resource,
    initial: SearchState,
    time_budget: u32,
    options: SearchOptions,
) -> Result<SearchOutcome, SearchError> {
    if time_budget == 0 {
        return Ok(SearchOutcome {
            best: initial.stock[target],
            statistics: SearchStatistics::default(),
        });
    }

    debug!(scenario = scenario.id, %target, time_budget, "starting search");

    let mut ctx = SearchContext::new(scenario, target, options);
    let root = ctx.search(initial, time_budget)?;
    let best = ctx.best.max(root);

    let mut statistics = ctx.statistics;
    statistics.cached_states = ctx.visited.len() as u64;

    debug!(
        scenario = scenario.id,
        best,
        nodes = statistics.nodes_explored,
        cache_hits = statistics.cache_hits,
        prunings = statistics.prunings_bound,
        "search finished"
    );

    Ok(SearchOutcome { best, statistics })
}

/// Finds the largest amount of `target` reachable in `time_budget` ticks from
/// the default starting state, with all search rules enabled.
pub fn max_target_value(
    scenario: &ScenarioDefinition,
    target: Resource,
    time_budget: u32,
) -> Result<u32, SearchError> {
    maximize(scenario, target, SearchState::default(), time_budget, SearchOptions::default())
        .map(|outcome| outcome.best)
}
