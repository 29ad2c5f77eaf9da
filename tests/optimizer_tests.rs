//! Tests for the branch-and-bound search.

use geodemax::error::SearchError;
use geodemax::models::{Recipe, Resource, ResourceVector, ScenarioDefinition, SearchState};
use geodemax::optimizer::{max_target_value, maximize, optimistic_gain, SearchOptions};
use proptest::prelude::*;

fn example_blueprints() -> (ScenarioDefinition, ScenarioDefinition) {
    (
        ScenarioDefinition::blueprint(1, 4, 2, 3, 14, 2, 7),
        ScenarioDefinition::blueprint(2, 2, 3, 3, 8, 3, 12),
    )
}

fn search(
    scenario: &ScenarioDefinition,
    initial: SearchState,
    time_budget: u32,
    options: SearchOptions,
) -> u32 {
    maximize(scenario, Resource::Geode, initial, time_budget, options)
        .expect("search should not fail")
        .best
}

const EXHAUSTIVE: SearchOptions = SearchOptions {
    prune_by_bound: false,
    skip_dominated: false,
};

const NO_BOUND: SearchOptions = SearchOptions {
    prune_by_bound: false,
    skip_dominated: true,
};

#[test]
fn test_terminal_tick_folds_production() {
    let scenario = ScenarioDefinition::new(1, vec![]);
    let initial = SearchState {
        stock: ResourceVector::ZERO.with(Resource::Geode, 5),
        production: ResourceVector::ZERO.with(Resource::Geode, 2),
        pending: ResourceVector::ZERO,
    };

    assert_eq!(search(&scenario, initial, 1, SearchOptions::default()), 7);
}

#[test]
fn test_single_producer_accumulates() {
    let scenario = ScenarioDefinition::new(1, vec![]);
    let initial = SearchState::with_production(ResourceVector::unit(Resource::Geode));

    assert_eq!(search(&scenario, initial, 4, SearchOptions::default()), 4);
}

#[test]
fn test_zero_recipes_is_pure_accumulation() {
    let scenario = ScenarioDefinition::new(3, vec![]);
    for stock in [0u32, 3, 11] {
        for rate in [0u32, 1, 4] {
            for budget in 1..12u32 {
                let initial = SearchState {
                    stock: ResourceVector::ZERO.with(Resource::Geode, stock),
                    production: ResourceVector::new([1, 0, 0, rate]),
                    pending: ResourceVector::ZERO,
                };
                assert_eq!(
                    search(&scenario, initial, budget, SearchOptions::default()),
                    stock + budget * rate
                );
            }
        }
    }
}

#[test]
fn test_zero_budget_returns_stock() {
    let (blueprint, _) = example_blueprints();
    let mut initial = SearchState::default();
    initial.stock = ResourceVector::ZERO.with(Resource::Geode, 6);

    assert_eq!(search(&blueprint, initial, 0, SearchOptions::default()), 6);
}

#[test]
fn test_unreachable_target_yields_zero() {
    let (blueprint, _) = example_blueprints();

    // No geode producer can be afforded this early.
    assert_eq!(max_target_value(&blueprint, Resource::Geode, 10).unwrap(), 0);
}

#[test]
fn test_example_blueprints_24_minutes() {
    let (first, second) = example_blueprints();

    assert_eq!(max_target_value(&first, Resource::Geode, 24).unwrap(), 9);
    assert_eq!(max_target_value(&second, Resource::Geode, 24).unwrap(), 12);
}

#[test]
#[ignore = "long-running: explores millions of states"]
fn test_example_blueprints_32_minutes() {
    let (first, second) = example_blueprints();

    assert_eq!(max_target_value(&first, Resource::Geode, 32).unwrap(), 56);
    assert_eq!(max_target_value(&second, Resource::Geode, 32).unwrap(), 62);
}

#[test]
fn test_other_target_resource() {
    // Maximizing ore with a cheap ore producer: build one whenever possible.
    let scenario = ScenarioDefinition::new(
        1,
        vec![Recipe::new(Resource::Ore, ResourceVector::new([1, 0, 0, 0]))],
    );

    let best = max_target_value(&scenario, Resource::Ore, 5).unwrap();
    let waiting = 5;
    assert!(best > waiting, "building ore producers should beat waiting");
}

#[test]
fn test_search_is_deterministic() {
    let (first, _) = example_blueprints();

    let a = maximize(&first, Resource::Geode, SearchState::default(), 20, SearchOptions::default())
        .unwrap();
    let b = maximize(&first, Resource::Geode, SearchState::default(), 20, SearchOptions::default())
        .unwrap();

    assert_eq!(a, b);
}

#[test]
fn test_pruning_is_sound_on_examples() {
    let (first, second) = example_blueprints();

    for budget in [16u32, 18, 20] {
        for blueprint in [&first, &second] {
            assert_eq!(
                search(blueprint, SearchState::default(), budget, SearchOptions::default()),
                search(blueprint, SearchState::default(), budget, NO_BOUND),
                "budget {} blueprint {}",
                budget,
                blueprint.id
            );
        }
    }
}

#[test]
fn test_dominance_is_sound_on_examples() {
    let (first, second) = example_blueprints();

    for blueprint in [&first, &second] {
        assert_eq!(
            search(blueprint, SearchState::default(), 16, SearchOptions::default()),
            search(blueprint, SearchState::default(), 16, EXHAUSTIVE),
        );
    }
}

#[test]
fn test_statistics_are_collected() {
    let (first, _) = example_blueprints();

    let outcome =
        maximize(&first, Resource::Geode, SearchState::default(), 24, SearchOptions::default())
            .unwrap();
    let stats = outcome.statistics;

    assert!(stats.nodes_explored > 0);
    assert!(stats.leaves > 0);
    assert!(stats.cached_states > 0);
    assert!(stats.cached_states <= stats.nodes_explored);
    assert!(stats.prunings_bound > 0);
}

#[test]
fn test_saturated_producers_are_skipped() {
    // The only recipe spends one ore, and one ore per tick is already produced.
    let scenario = ScenarioDefinition::new(
        1,
        vec![Recipe::new(Resource::Ore, ResourceVector::new([1, 0, 0, 0]))],
    );

    let outcome =
        maximize(&scenario, Resource::Geode, SearchState::default(), 3, SearchOptions::default())
            .unwrap();

    assert_eq!(outcome.best, 0);
    assert!(outcome.statistics.prunings_dominated >= 1);
}

#[test]
fn test_disabled_rules_do_not_prune() {
    let (first, _) = example_blueprints();

    let outcome = maximize(&first, Resource::Geode, SearchState::default(), 14, EXHAUSTIVE).unwrap();

    assert_eq!(outcome.statistics.prunings_bound, 0);
    assert_eq!(outcome.statistics.prunings_dominated, 0);
}

#[test]
fn test_optimistic_gain_never_underestimates() {
    // Building one target producer per tick from rate `p` yields
    // p + (p + 1) + ... + (p + t - 1).
    for rate in 0..5u32 {
        for time in 1..30u32 {
            let exact: u64 = (0..time).map(|i| u64::from(rate + i)).sum();
            assert!(optimistic_gain(rate, time) >= exact);
        }
    }
    assert!(optimistic_gain(u32::MAX, u32::MAX) > 0);
}

#[test]
fn test_saturated_producers_skip_everything_but_target() {
    let blueprint = ScenarioDefinition::blueprint(1, 4, 2, 3, 14, 2, 7);
    // Every recipe is affordable; ore, clay and obsidian run at their ceilings.
    let initial = SearchState {
        stock: ResourceVector::new([10, 20, 10, 0]),
        production: ResourceVector::new([4, 14, 7, 0]),
        pending: ResourceVector::ZERO,
    };

    let outcome = maximize(&blueprint, Resource::Geode, initial, 2, SearchOptions::default()).unwrap();

    assert_eq!(outcome.best, 1);
    assert_eq!(outcome.statistics.prunings_dominated, 3);
    assert_eq!(outcome.best, search(&blueprint, initial, 2, EXHAUSTIVE));
}

#[test]
fn test_production_below_ceiling_is_not_saturated() {
    let blueprint = ScenarioDefinition::blueprint(1, 4, 2, 3, 14, 2, 7);
    let initial = SearchState {
        stock: ResourceVector::new([10, 20, 10, 0]),
        production: ResourceVector::new([3, 13, 6, 0]),
        pending: ResourceVector::ZERO,
    };

    let outcome = maximize(&blueprint, Resource::Geode, initial, 2, SearchOptions::default()).unwrap();

    assert_eq!(outcome.best, 1);
    assert_eq!(outcome.statistics.prunings_dominated, 0);
}

#[test]
fn test_terminal_overflow_is_an_error() {
    let scenario = ScenarioDefinition::new(1, vec![]);
    let initial = SearchState {
        stock: ResourceVector::ZERO.with(Resource::Geode, u32::MAX - 1),
        production: ResourceVector::ZERO.with(Resource::Geode, 2),
        pending: ResourceVector::ZERO,
    };

    let result = maximize(&scenario, Resource::Geode, initial, 1, SearchOptions::default());

    assert!(matches!(result, Err(SearchError::QuantityOverflow { .. })));
}

#[test]
fn test_terminal_at_range_limit_fits() {
    let scenario = ScenarioDefinition::new(1, vec![]);
    let initial = SearchState {
        stock: ResourceVector::ZERO.with(Resource::Geode, u32::MAX - 2),
        production: ResourceVector::ZERO.with(Resource::Geode, 2),
        pending: ResourceVector::ZERO,
    };

    assert_eq!(search(&scenario, initial, 1, SearchOptions::default()), u32::MAX);
}

#[test]
fn test_stock_overflow_while_waiting_is_an_error() {
    let scenario = ScenarioDefinition::new(1, vec![]);
    let initial = SearchState {
        stock: ResourceVector::ZERO.with(Resource::Ore, u32::MAX),
        production: ResourceVector::unit(Resource::Ore),
        pending: ResourceVector::ZERO,
    };

    for options in [SearchOptions::default(), EXHAUSTIVE] {
        let result = maximize(&scenario, Resource::Geode, initial, 3, options);
        assert!(matches!(result, Err(SearchError::QuantityOverflow { .. })));
    }
}

#[test]
fn test_memo_distinguishes_large_quantities() {
    // Building the first obsidian producer from ore leaves {ore 0, clay 10000};
    // building it from clay leaves {ore 1, clay 0}. Only the second can still
    // afford the single geode producer, and it is reached after the first.
    let scenario = ScenarioDefinition::new(
        1,
        vec![
            Recipe::new(Resource::Geode, ResourceVector::new([1, 0, 1, 0])),
            Recipe::new(Resource::Obsidian, ResourceVector::new([0, 10_000, 0, 0])),
            Recipe::new(Resource::Obsidian, ResourceVector::new([1, 0, 0, 0])),
        ],
    );
    let initial = SearchState {
        stock: ResourceVector::new([1, 10_000, 0, 0]),
        production: ResourceVector::ZERO,
        pending: ResourceVector::ZERO,
    };

    assert_eq!(search(&scenario, initial, 4, EXHAUSTIVE), 1);
    assert_eq!(search(&scenario, initial, 4, SearchOptions::default()), 1);
    assert_eq!(search(&scenario, initial, 4, NO_BOUND), 1);
}

fn blueprint_strategy() -> impl Strategy<Value = ScenarioDefinition> {
    (1u32..5, 1u32..5, 1u32..5, 1u32..8, 1u32..5, 1u32..8).prop_map(
        |(ore_ore, clay_ore, obs_ore, obs_clay, geode_ore, geode_obs)| {
            ScenarioDefinition::blueprint(1, ore_ore, clay_ore, obs_ore, obs_clay, geode_ore, geode_obs)
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_pruning_never_changes_optimum(blueprint in blueprint_strategy(), budget in 1u32..15) {
        prop_assert_eq!(
            search(&blueprint, SearchState::default(), budget, SearchOptions::default()),
            search(&blueprint, SearchState::default(), budget, NO_BOUND)
        );
    }

    #[test]
    fn prop_dominance_never_changes_optimum(blueprint in blueprint_strategy(), budget in 1u32..10) {
        prop_assert_eq!(
            search(&blueprint, SearchState::default(), budget, NO_BOUND),
            search(&blueprint, SearchState::default(), budget, EXHAUSTIVE)
        );
    }

    #[test]
    fn prop_more_time_never_hurts(blueprint in blueprint_strategy(), budget in 2u32..16) {
        let start = SearchState::default();
        let longer = search(&blueprint, start, budget, SearchOptions::default());
        let shorter = search(&blueprint, start.advance_tick().unwrap(), budget - 1, SearchOptions::default());
        prop_assert!(longer >= shorter);

        let same_start = search(&blueprint, start, budget - 1, SearchOptions::default());
        prop_assert!(longer >= same_start);
    }

    #[test]
    fn prop_never_violates_invariant(blueprint in blueprint_strategy(), budget in 1u32..16) {
        let outcome = maximize(
            &blueprint,
            Resource::Geode,
            SearchState::default(),
            budget,
            SearchOptions::default(),
        );
        prop_assert!(outcome.is_ok());
    }
}
