//! Data loading functionality for Geodemax.
//!
//! Scenarios come in two formats:
//!
//! - blueprint text, one paragraph per blueprint, as published with the
//!   puzzle (see `data/example.txt`),
//! - CSV recipe tables with one row per recipe (see `data/example.csv`).
//!
//! Both loaders reject malformed input, so the optimizer never has to
//! re-validate the scenarios it receives.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use csv::ReaderBuilder;
use regex::Regex;

use crate::error::ParseError;
use crate::models::{Recipe, RecipeRow, ScenarioDefinition};

/// Sentence layout of a single blueprint. Whitespace between sentences is free.
const BLUEPRINT_PATTERN: &str = r"^Blueprint\s+(\d+):\s*Each ore robot costs (\d+) ore\.\s*Each clay robot costs (\d+) ore\.\s*Each obsidian robot costs (\d+) ore and (\d+) clay\.\s*Each geode robot costs (\d+) ore and (\d+) obsidian\.$";

static BLUEPRINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(BLUEPRINT_PATTERN).expect("blueprint pattern compiles"));

/// Supported scenario file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum InputFormat {
    /// Pick by file extension: `.csv` is a recipe table, anything else blueprint text.
    #[default]
    Auto,
    /// Blueprint paragraphs.
    Blueprints,
    /// CSV recipe table.
    Csv,
}

/// Parses blueprint text into scenarios.
///
/// # Arguments
///
/// * `text` - One or more blueprint paragraphs
///
/// # Returns
///
/// The blueprints in input order, or a [`ParseError`] naming the first
/// paragraph that does not follow the expected layout.
///
/// # Example
///
/// ```
/// use geodemax::data::parse_blueprints;
///
/// let text = "Blueprint 7: Each ore robot costs 4 ore. Each clay robot costs 2 ore. \
///             Each obsidian robot costs 3 ore and 14 clay. \
///             Each geode robot costs 2 ore and 7 obsidian.";
/// let scenarios = parse_blueprints(text).unwrap();
///
/// assert_eq!(scenarios.len(), 1);
/// assert_eq!(scenarios[0].id, 7);
/// ```
pub fn parse_blueprints(text: &str) -> Result<Vec<ScenarioDefinition>, ParseError> {
    let mut scenarios = Vec::new();
    let paragraphs = text
        .split("Blueprint")
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty());

    for (i, chunk) in paragraphs.enumerate() {
        let paragraph = format!("Blueprint {}", chunk);
        let caps = BLUEPRINT
            .captures(&paragraph)
            .ok_or_else(|| ParseError::MalformedBlueprint {
                index: i + 1,
                text: paragraph.clone(),
            })?;

        let mut numbers = [0u32; 7];
        for (slot, group) in numbers.iter_mut().zip(caps.iter().skip(1)) {
            if let Some(m) = group {
                *slot = m.as_str().parse()?;
            }
        }
        let [id, ore_ore, clay_ore, obsidian_ore, obsidian_clay, geode_ore, geode_obsidian] =
            numbers;

        scenarios.push(ScenarioDefinition::blueprint(
            id,
            ore_ore,
            clay_ore,
            obsidian_ore,
            obsidian_clay,
            geode_ore,
            geode_obsidian,
        ));
    }

    if scenarios.is_empty() {
        return Err(ParseError::NoScenarios);
    }
    Ok(scenarios)
}

/// Loads blueprint text from a file.
pub fn load_blueprints(path: &Path) -> Result<Vec<ScenarioDefinition>, ParseError> {
    let text = fs::read_to_string(path)?;
    parse_blueprints(&text)
}

/// Parses a CSV recipe table into scenarios.
///
/// # CSV Format
///
/// Expected columns: `scenario, produces, ore, clay, obsidian, geode`.
/// Rows of the same scenario are grouped together; scenarios keep the order
/// in which their ids first appear, and recipes keep row order.
pub fn parse_recipe_table<R: Read>(reader: R) -> Result<Vec<ScenarioDefinition>, ParseError> {
    let mut rdr = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut scenarios: Vec<ScenarioDefinition> = Vec::new();
    let mut positions: HashMap<u32, usize> = HashMap::new();

    for result in rdr.deserialize() {
        let row: RecipeRow = result?;
        let id = row.scenario;
        let position = *positions.entry(id).or_insert_with(|| {
            scenarios.push(ScenarioDefinition::new(id, Vec::new()));
            scenarios.len() - 1
        });
        scenarios[position].recipes.push(Recipe::from(row));
    }

    if scenarios.is_empty() {
        return Err(ParseError::NoScenarios);
    }
    Ok(scenarios)
}

/// Loads a CSV recipe table from a file.
pub fn load_recipe_table(path: &Path) -> Result<Vec<ScenarioDefinition>, ParseError> {
    let file = File::open(path)?;
    parse_recipe_table(file)
}

/// Loads scenarios from `path` in the given format.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use geodemax::data::{load_scenarios, InputFormat};
///
/// let scenarios = load_scenarios(Path::new("data/example.txt"), InputFormat::Auto).unwrap();
/// println!("Loaded {} scenarios", scenarios.len());
/// ```
pub fn load_scenarios(
    path: &Path,
    format: InputFormat,
) -> Result<Vec<ScenarioDefinition>, ParseError> {
    match resolve_format(path, format) {
        InputFormat::Csv => load_recipe_table(path),
        _ => load_blueprints(path),
    }
}

/// Resolves [`InputFormat::Auto`] by file extension.
pub fn resolve_format(path: &Path, format: InputFormat) -> InputFormat {
    match format {
        InputFormat::Auto => {
            let is_csv = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if is_csv {
                InputFormat::Csv
            } else {
                InputFormat::Blueprints
            }
        }
        explicit => explicit,
    }
}
