//! Error types for Geodemax.
//!
//! Parsing failures are reported through [`ParseError`]. Search failures are
//! reported through [`SearchError`] and only ever abort the scenario that
//! raised them; the scheduler wraps them in [`ScenarioError`] so callers know
//! which scenario failed.

use thiserror::Error;

use crate::models::{Resource, ResourceVector};

/// Errors raised while reading scenario definitions.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The input file could not be read.
    #[error("failed to read scenario input: {0}")]
    Io(#[from] std::io::Error),

    /// A CSV recipe table could not be decoded.
    #[error("invalid recipe table: {0}")]
    Csv(#[from] csv::Error),

    /// A blueprint paragraph did not match the expected sentence layout.
    #[error("malformed blueprint #{index}: {text:?}")]
    MalformedBlueprint {
        /// One-based position of the paragraph in the input.
        index: usize,
        /// The offending text, trimmed.
        text: String,
    },

    /// A quantity did not fit into the supported integer range.
    #[error("quantity out of range: {0}")]
    Number(#[from] std::num::ParseIntError),

    /// The input contained no scenarios at all.
    #[error("no scenarios found in input")]
    NoScenarios,
}

/// Errors raised while searching a single scenario.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// A recipe was applied to a stock that cannot pay for it.
    ///
    /// This indicates a defect in the affordability check that guards every
    /// build, never a problem with the scenario data.
    #[error("non-negative stock invariant violated: building a {produces} producer costing {cost} from stock {stock}")]
    InvariantViolation {
        /// Resource the offending recipe produces.
        produces: Resource,
        /// Cost of the offending recipe.
        cost: ResourceVector,
        /// Stock the recipe was applied to.
        stock: ResourceVector,
    },

    /// A quantity grew past the largest representable value.
    #[error("quantity overflow: {left} plus {right} does not fit")]
    QuantityOverflow {
        /// Left-hand side of the failed addition.
        left: ResourceVector,
        /// Right-hand side of the failed addition.
        right: ResourceVector,
    },
}

/// A search failure tagged with the scenario it came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("scenario {id} failed: {source}")]
pub struct ScenarioError {
    /// Id of the failed scenario.
    pub id: u32,
    /// The underlying search failure.
    #[source]
    pub source: SearchError,
}

/// Errors raised by the scheduler.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The dedicated worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A scenario failed, so no aggregate can be computed.
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}
