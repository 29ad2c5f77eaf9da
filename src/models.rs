//! Data models and structures for Geodemax.
//!
//! This module contains the value types the optimizer works on: resource
//! kinds, resource vectors, recipes, scenario definitions and the search
//! state that is threaded through the branch-and-bound recursion.

use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Number of resource kinds tracked by every scenario.
pub const RESOURCE_KINDS: usize = 4;

/// A kind of countable resource in the production chain.
///
/// The ordering follows the chain: ore feeds clay and obsidian producers,
/// obsidian feeds geode producers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Ore,
    Clay,
    Obsidian,
    Geode,
}

impl Resource {
    /// All resource kinds in slot order.
    pub const ALL: [Resource; RESOURCE_KINDS] =
        [Resource::Ore, Resource::Clay, Resource::Obsidian, Resource::Geode];

    /// Returns the slot of this resource inside a [`ResourceVector`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the lowercase name used in input files.
    pub fn name(self) -> &'static str {
        match self {
            Resource::Ore => "ore",
            Resource::Clay => "clay",
            Resource::Obsidian => "obsidian",
            Resource::Geode => "geode",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fixed-length vector with one non-negative quantity per resource kind.
///
/// Quantities are unsigned, so a negative component cannot be represented.
/// Arithmetic is checked: [`ResourceVector::checked_sub`] returns `None`
/// where a quantity would go below zero, [`ResourceVector::checked_add`]
/// where it would overflow.
///
/// # Example
///
/// ```
/// use geodemax::models::{Resource, ResourceVector};
///
/// let stock = ResourceVector::new([5, 3, 0, 0]);
/// let cost = ResourceVector::new([3, 3, 0, 0]);
///
/// assert!(stock.covers(&cost));
/// assert_eq!(stock.checked_sub(&cost), Some(ResourceVector::new([2, 0, 0, 0])));
/// assert_eq!(cost.checked_sub(&stock), None);
/// assert_eq!(stock[Resource::Ore], 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ResourceVector([u32; RESOURCE_KINDS]);

impl ResourceVector {
    /// The vector with every quantity at zero.
    pub const ZERO: ResourceVector = ResourceVector([0; RESOURCE_KINDS]);

    /// Creates a vector from quantities in [`Resource::ALL`] order.
    pub const fn new(values: [u32; RESOURCE_KINDS]) -> Self {
        ResourceVector(values)
    }

    /// Creates a vector holding exactly one unit of `resource`.
    pub fn unit(resource: Resource) -> Self {
        ResourceVector::ZERO.with(resource, 1)
    }

    /// Returns a copy with the quantity of `resource` replaced by `amount`.
    pub fn with(mut self, resource: Resource, amount: u32) -> Self {
        self.0[resource.index()] = amount;
        self
    }

    /// Returns the quantity of `resource`.
    pub fn get(&self, resource: Resource) -> u32 {
        self.0[resource.index()]
    }

    /// Returns the raw quantities in [`Resource::ALL`] order.
    pub fn as_array(&self) -> &[u32; RESOURCE_KINDS] {
        &self.0
    }

    /// Componentwise subtraction, `None` if any component would be negative.
    pub fn checked_sub(&self, other: &ResourceVector) -> Option<ResourceVector> {
        let mut out = [0; RESOURCE_KINDS];
        for (slot, (a, b)) in out.iter_mut().zip(self.0.iter().zip(other.0.iter())) {
            *slot = a.checked_sub(*b)?;
        }
        Some(ResourceVector(out))
    }

    /// Componentwise addition, `None` if any component would overflow.
    pub fn checked_add(&self, other: &ResourceVector) -> Option<ResourceVector> {
        let mut out = [0; RESOURCE_KINDS];
        for (slot, (a, b)) in out.iter_mut().zip(self.0.iter().zip(other.0.iter())) {
            *slot = a.checked_add(*b)?;
        }
        Some(ResourceVector(out))
    }

    /// Returns `true` if every component is at least the matching component of `other`.
    pub fn covers(&self, other: &ResourceVector) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(a, b)| a >= b)
    }

    /// Returns `true` if every component is zero.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&v| v == 0)
    }

    /// Iterates over `(resource, quantity)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Resource, u32)> + '_ {
        Resource::ALL.iter().map(move |&r| (r, self.get(r)))
    }
}

impl Index<Resource> for ResourceVector {
    type Output = u32;

    fn index(&self, resource: Resource) -> &u32 {
        &self.0[resource.index()]
    }
}

impl fmt::Display for ResourceVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("nothing");
        }
        let parts: Vec<String> = self
            .iter()
            .filter(|(_, amount)| *amount > 0)
            .map(|(resource, amount)| format!("{} {}", amount, resource))
            .collect();
        f.write_str(&parts.join(" and "))
    }
}

/// A rule for building one more producer of a resource.
///
/// Building consumes `cost` from stock immediately; the new producer joins
/// the production rate one tick later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recipe {
    /// The resource the built producer yields, one unit per tick.
    pub produces: Resource,
    /// Resources consumed when building.
    pub cost: ResourceVector,
}

impl Recipe {
    pub fn new(produces: Resource, cost: ResourceVector) -> Self {
        Recipe { produces, cost }
    }

    /// The production-rate increase granted once the producer is built.
    pub fn output(&self) -> ResourceVector {
        ResourceVector::unit(self.produces)
    }

    /// Returns `true` if `stock` can pay for this recipe.
    pub fn can_afford(&self, stock: &ResourceVector) -> bool {
        stock.covers(&self.cost)
    }
}

/// One independent instance of the optimization problem.
///
/// # Example
///
/// ```
/// use geodemax::models::{Resource, ScenarioDefinition};
///
/// let blueprint = ScenarioDefinition::blueprint(1, 4, 2, 3, 14, 2, 7);
///
/// assert_eq!(blueprint.recipes.len(), 4);
/// assert_eq!(blueprint.max_cost(Resource::Ore), 4);
/// assert_eq!(blueprint.max_cost(Resource::Clay), 14);
/// assert_eq!(blueprint.max_cost(Resource::Geode), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    /// Stable identifier, used by aggregations such as the quality level.
    pub id: u32,
    /// Recipes in input order.
    pub recipes: Vec<Recipe>,
}

impl ScenarioDefinition {
    pub fn new(id: u32, recipes: Vec<Recipe>) -> Self {
        ScenarioDefinition { id, recipes }
    }

    /// Builds the four-recipe blueprint family: ore, clay, obsidian and geode
    /// producers with the usual cost structure.
    pub fn blueprint(
        id: u32,
        ore_robot_ore: u32,
        clay_robot_ore: u32,
        obsidian_robot_ore: u32,
        obsidian_robot_clay: u32,
        geode_robot_ore: u32,
        geode_robot_obsidian: u32,
    ) -> Self {
        ScenarioDefinition::new(
            id,
            vec![
                Recipe::new(Resource::Ore, ResourceVector::new([ore_robot_ore, 0, 0, 0])),
                Recipe::new(Resource::Clay, ResourceVector::new([clay_robot_ore, 0, 0, 0])),
                Recipe::new(
                    Resource::Obsidian,
                    ResourceVector::new([obsidian_robot_ore, obsidian_robot_clay, 0, 0]),
                ),
                Recipe::new(
                    Resource::Geode,
                    ResourceVector::new([geode_robot_ore, 0, geode_robot_obsidian, 0]),
                ),
            ],
        )
    }

    /// Largest amount of `resource` any single recipe costs.
    ///
    /// Since at most one producer is built per tick, producing more than this
    /// per tick can never be spent.
    pub fn max_cost(&self, resource: Resource) -> u32 {
        self.recipes
            .iter()
            .map(|r| r.cost.get(resource))
            .max()
            .unwrap_or(0)
    }

    /// Per-resource spending ceilings, see [`ScenarioDefinition::max_cost`].
    pub fn cost_ceilings(&self) -> ResourceVector {
        let mut ceilings = ResourceVector::ZERO;
        for resource in Resource::ALL {
            ceilings = ceilings.with(resource, self.max_cost(resource));
        }
        ceilings
    }
}

/// One simulated instant of a scenario.
///
/// The remaining time is not stored here; the search carries it alongside.
/// Transitions never mutate a state in place, they return a new one.
///
/// # Example
///
/// ```
/// use geodemax::models::{Recipe, Resource, ResourceVector, SearchState};
///
/// let state = SearchState::default()
///     .advance_tick()
///     .and_then(|s| s.advance_tick())
///     .unwrap();
/// assert_eq!(state.stock, ResourceVector::new([2, 0, 0, 0]));
///
/// let clay = Recipe::new(Resource::Clay, ResourceVector::new([2, 0, 0, 0]));
/// let next = state.apply(&clay).and_then(|s| s.advance_tick()).unwrap();
/// assert_eq!(next.stock, ResourceVector::new([1, 0, 0, 0]));
/// assert_eq!(next.production, ResourceVector::new([1, 1, 0, 0]));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchState {
    /// Resources on hand.
    pub stock: ResourceVector,
    /// Resources collected per tick.
    pub production: ResourceVector,
    /// Producers committed this tick, joining production at the next tick.
    pub pending: ResourceVector,
}

impl Default for SearchState {
    /// One ore producer and nothing else.
    fn default() -> Self {
        SearchState::with_production(ResourceVector::unit(Resource::Ore))
    }
}

impl SearchState {
    /// Creates a state with empty stock and the given production rate.
    pub fn with_production(production: ResourceVector) -> Self {
        SearchState {
            stock: ResourceVector::ZERO,
            production,
            pending: ResourceVector::ZERO,
        }
    }

    /// Commits to building `recipe`: pays its cost now, queues its output.
    ///
    /// Fails with [`SearchError::InvariantViolation`] if the stock cannot pay
    /// for the recipe. Callers check [`Recipe::can_afford`] first.
    /// Fails with [`SearchError::QuantityOverflow`] if the pending producers
    /// no longer fit.
    pub fn apply(&self, recipe: &Recipe) -> Result<SearchState, SearchError> {
        let stock = self
            .stock
            .checked_sub(&recipe.cost)
            .ok_or(SearchError::InvariantViolation {
                produces: recipe.produces,
                cost: recipe.cost,
                stock: self.stock,
            })?;
        Ok(SearchState {
            stock,
            production: self.production,
            pending: checked_sum(&self.pending, &recipe.output())?,
        })
    }

    /// Collects one tick of production and brings pending producers online.
    ///
    /// Fails with [`SearchError::QuantityOverflow`] if a quantity no longer fits.
    pub fn advance_tick(&self) -> Result<SearchState, SearchError> {
        Ok(SearchState {
            stock: checked_sum(&self.stock, &self.production)?,
            production: checked_sum(&self.production, &self.pending)?,
            pending: ResourceVector::ZERO,
        })
    }
}

fn checked_sum(
    left: &ResourceVector,
    right: &ResourceVector,
) -> Result<ResourceVector, SearchError> {
    left.checked_add(right).ok_or(SearchError::QuantityOverflow {
        left: *left,
        right: *right,
    })
}

// ============================================================================
// CSV Row Structures
// ============================================================================

/// CSV row structure for recipe tables.
///
/// Each row describes one recipe of one scenario. Cost columns that are
/// missing or left blank count as zero.
#[derive(Debug, Deserialize)]
pub struct RecipeRow {
    /// Id of the scenario the recipe belongs to
    pub scenario: u32,
    /// Resource produced by the built producer
    pub produces: Resource,
    /// Ore cost
    #[serde(default)]
    pub ore: Option<u32>,
    /// Clay cost
    #[serde(default)]
    pub clay: Option<u32>,
    /// Obsidian cost
    #[serde(default)]
    pub obsidian: Option<u32>,
    /// Geode cost
    #[serde(default)]
    pub geode: Option<u32>,
}

impl From<RecipeRow> for Recipe {
    fn from(row: RecipeRow) -> Self {
        Recipe::new(
            row.produces,
            ResourceVector::new([
                row.ore.unwrap_or(0),
                row.clay.unwrap_or(0),
                row.obsidian.unwrap_or(0),
                row.geode.unwrap_or(0),
            ]),
        )
    }
}
