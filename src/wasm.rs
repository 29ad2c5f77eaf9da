//! WebAssembly bindings for Geodemax.
//!
//! This module provides JavaScript-accessible functions for the optimizer.
//! Input and output are JSON strings; searches run sequentially because the
//! browser offers no worker pool to rayon.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::data::parse_blueprints;
use crate::models::Resource;
use crate::scheduler::{
    product_of_first, product_of_top, quality_level_sum, ScenarioResult, Scheduler,
    SchedulerConfig,
};

/// Blueprints used when the caller supplies no input.
const EMBEDDED_EXAMPLE: &str = include_str!("../data/example.txt");

/// How the per-scenario results are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JsAggregation {
    /// Sum of id times value.
    #[default]
    Quality,
    /// Product of the first `count` values.
    ProductFirst,
    /// Product of the `count` largest values.
    ProductTop,
}

fn default_minutes() -> u32 {
    24
}

fn default_count() -> usize {
    3
}

fn default_target() -> Resource {
    Resource::Geode
}

/// JavaScript-friendly input for optimization.
#[derive(Debug, Clone, Deserialize)]
pub struct JsOptimizeInput {
    /// Blueprint text; the embedded example is used when empty.
    #[serde(default)]
    pub input: String,
    #[serde(default = "default_minutes")]
    pub minutes: u32,
    #[serde(default = "default_target")]
    pub target: Resource,
    #[serde(default)]
    pub aggregation: JsAggregation,
    #[serde(default = "default_count")]
    pub count: usize,
}

/// JavaScript-friendly per-scenario output.
#[derive(Debug, Clone, Serialize)]
pub struct JsScenarioResult {
    pub id: u32,
    pub best: u32,
    pub nodes_explored: u64,
}

/// JavaScript-friendly optimization result.
#[derive(Debug, Clone, Serialize)]
pub struct JsOptimizeResult {
    pub success: bool,
    pub error: Option<String>,
    pub scenarios: Vec<JsScenarioResult>,
    pub aggregate: u64,
    pub elapsed_ms: f64,
}

impl JsOptimizeResult {
    fn failure(message: String) -> Self {
        JsOptimizeResult {
            success: false,
            error: Some(message),
            scenarios: vec![],
            aggregate: 0,
            elapsed_ms: 0.0,
        }
    }
}

impl From<&ScenarioResult> for JsScenarioResult {
    fn from(result: &ScenarioResult) -> Self {
        JsScenarioResult {
            id: result.id,
            best: result.best,
            nodes_explored: result.statistics.nodes_explored,
        }
    }
}

/// Runs the optimization described by `input`, without touching any
/// browser API.
fn run_optimization(input: &JsOptimizeInput) -> JsOptimizeResult {
    let text = if input.input.trim().is_empty() {
        EMBEDDED_EXAMPLE
    } else {
        input.input.as_str()
    };

    let scenarios = match parse_blueprints(text) {
        Ok(s) => s,
        Err(e) => return JsOptimizeResult::failure(format!("Invalid blueprints: {}", e)),
    };

    let mut config = SchedulerConfig::new(input.minutes);
    config.target = input.target;
    let scheduler = match Scheduler::new(config) {
        Ok(s) => s,
        Err(e) => return JsOptimizeResult::failure(e.to_string()),
    };

    let results = match scheduler
        .run_sequential(&scenarios)
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(r) => r,
        Err(e) => return JsOptimizeResult::failure(e.to_string()),
    };

    let aggregate = match input.aggregation {
        JsAggregation::Quality => quality_level_sum(&results),
        JsAggregation::ProductFirst => product_of_first(&results, input.count),
        JsAggregation::ProductTop => product_of_top(&results, input.count),
    };

    JsOptimizeResult {
        success: true,
        error: None,
        scenarios: results.iter().map(JsScenarioResult::from).collect(),
        aggregate,
        elapsed_ms: 0.0,
    }
}

/// Main optimization function exposed to JavaScript.
///
/// Takes a JSON string input and returns a JSON string result.
#[wasm_bindgen]
pub fn optimize(input_json: &str) -> String {
    let input: JsOptimizeInput = match serde_json::from_str(input_json) {
        Ok(i) => i,
        Err(e) => {
            return serde_json::to_string(&JsOptimizeResult::failure(format!(
                "Invalid input: {}",
                e
            )))
            .unwrap_or_default();
        }
    };

    let started = js_sys::Date::now();
    let mut result = run_optimization(&input);
    result.elapsed_ms = js_sys::Date::now() - started;

    let summary = match &result.error {
        Some(error) => format!("geodemax: {}", error),
        None => format!(
            "geodemax: {} scenarios in {:.0}ms, aggregate {}",
            result.scenarios.len(),
            result.elapsed_ms,
            result.aggregate
        ),
    };
    web_sys::console::log_1(&summary.into());

    serde_json::to_string(&result).unwrap_or_default()
}

/// Get the version of the optimizer.
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
