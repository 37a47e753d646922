//! Builds a rubric for an assessment from the tool's criteria table.
//!
//! ## Mark allocation
//! Every criterion but the last receives `weight% * total` rounded half to
//! even; the last receives whatever is left, so the rows always add up to
//! the total. Within a criterion each band is worth its floor percentage of
//! the criterion's marks, and "Needs Improvement" is worth 0.

use crate::tables::{self, ToolCriteria};
use crate::types::{BloomIntegration, CriterionRubric, Level, PerformanceLevel, Rubric};
use data_loader::BloomLevel;
use tracing::debug;

/// Generate a rubric.
///
/// Unknown tools use the Quiz criteria; unknown Bloom levels use Apply verbs
/// and list no cognitive processes.
pub fn generate(assessment_name: &str, fa_tool: &str, total_marks: u32, bloom_level: &str) -> Rubric {
    let table = tables::criteria_for(fa_tool).unwrap_or_else(|| {
        debug!("No criteria table for tool '{fa_tool}', using Quiz criteria");
        tables::fallback_criteria()
    });
    let bloom = bloom_level.parse::<BloomLevel>().ok();

    let criteria = distribute_marks(table, total_marks)
        .into_iter()
        .enumerate()
        .map(|(idx, (criterion, marks))| CriterionRubric {
            criterion: criterion.to_string(),
            marks,
            levels: performance_levels(criterion, idx, marks, bloom),
        })
        .collect();

    Rubric {
        assessment_name: assessment_name.to_string(),
        fa_tool: fa_tool.to_string(),
        bloom_level: bloom_level.to_string(),
        total_marks,
        criteria,
        bloom_integration: bloom_integration(bloom_level, bloom, fa_tool),
    }
}

/// Split `total` across the table's criteria
fn distribute_marks(table: &ToolCriteria, total: u32) -> Vec<(&'static str, u32)> {
    let mut remaining = total;
    let last = table.criteria.len().saturating_sub(1);
    table
        .criteria
        .iter()
        .enumerate()
        .map(|(idx, &(criterion, weight))| {
            let marks = if idx == last {
                remaining
            } else {
                share(weight, total).min(remaining)
            };
            remaining -= marks;
            (criterion, marks)
        })
        .collect()
}

/// `percent% * marks`, rounded half to even
fn share(percent: u32, marks: u32) -> u32 {
    ((percent as f64 / 100.0) * marks as f64).round_ties_even() as u32
}

fn performance_levels(
    criterion: &str,
    criterion_idx: usize,
    marks: u32,
    bloom: Option<BloomLevel>,
) -> Vec<PerformanceLevel> {
    Level::ALL
        .into_iter()
        .enumerate()
        .map(|(level_idx, level)| PerformanceLevel {
            level: level.label().to_string(),
            range: level.range().to_string(),
            marks: match level {
                Level::NeedsImprovement => 0,
                _ => share(level.floor_percent(), marks),
            },
            description: describe(criterion, criterion_idx + level_idx, level, bloom),
        })
        .collect()
}

/// Hand-written text when available, else "Can {verb} {criterion} {qualifier}"
fn describe(criterion: &str, verb_seed: usize, level: Level, bloom: Option<BloomLevel>) -> String {
    if let Some(text) = tables::specific_description(criterion, level) {
        return text.to_string();
    }
    let verbs = tables::verbs(bloom.unwrap_or(BloomLevel::Apply));
    let verb = verbs[verb_seed % verbs.len()];
    format!("Can {verb} {} {}", criterion.to_lowercase(), level.qualifier())
}

fn bloom_integration(bloom_level: &str, bloom: Option<BloomLevel>, fa_tool: &str) -> BloomIntegration {
    BloomIntegration {
        target_level: bloom_level.to_string(),
        alignment: format!("This {fa_tool} is designed to assess {bloom_level} level skills"),
        cognitive_processes: bloom
            .map(|b| tables::cognitive_processes(b).iter().map(|p| p.to_string()).collect())
            .unwrap_or_default(),
        assessment_focus: format!(
            "Students will be evaluated on their ability to {} through {}",
            bloom_level.to_lowercase(),
            fa_tool.to_lowercase()
        ),
    }
}
