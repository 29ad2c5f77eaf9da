//! Display and formatting utilities for Geodemax.
//!
//! This module provides functions for formatting output and displaying
//! optimization results to the user in a readable format.

use std::time::Duration;

use crate::error::ScenarioError;
use crate::models::Resource;
use crate::scheduler::ScenarioResult;

/// Formats a duration to a human-readable string.
///
/// # Arguments
///
/// * `duration` - Elapsed time
///
/// # Returns
///
/// A formatted string like "1m 5.20s", "3.50s" or "250ms"
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use geodemax::display::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(65_200)), "1m 5.20s");
/// assert_eq!(format_duration(Duration::from_millis(3_500)), "3.50s");
/// assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs_f64();
    if total >= 60.0 {
        let minutes = (total / 60.0).floor();
        format!("{}m {:.2}s", minutes, total - minutes * 60.0)
    } else if total >= 1.0 {
        format!("{:.2}s", total)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

/// Prints the header for one batch of scenario searches.
pub fn display_header(title: &str, time_budget: u32, target: Resource) {
    println!();
    println!("+================================================================+");
    println!("| {:<62} |", title);
    println!("+================================================================+");
    println!("  Maximizing {} over {} ticks", target, time_budget);
    println!();
}

/// Prints one line per scenario, with search statistics if requested.
///
/// Failed scenarios are listed with their error in place of a value.
pub fn display_results(
    results: &[Result<ScenarioResult, ScenarioError>],
    target: Resource,
    show_statistics: bool,
) {
    println!("[SCENARIOS]");
    println!("----------------------------------------------------------------");
    for entry in results {
        match entry {
            Ok(result) => {
                println!("  Scenario {:>3}: {} {}", result.id, result.best, target);
                if show_statistics {
                    println!("{}", result.statistics);
                }
            }
            Err(error) => println!("  Scenario {:>3}: [FAILED] {}", error.id, error.source),
        }
    }
}

/// Prints an aggregate value and the time it took to compute.
pub fn display_aggregate(label: &str, value: u64, elapsed: Duration) {
    println!();
    println!("[SUMMARY]");
    println!("----------------------------------------------------------------");
    println!("  {:<18}{}", format!("{}:", label), value);
    println!("  {:<18}{}", "Elapsed:", format_duration(elapsed));
}
