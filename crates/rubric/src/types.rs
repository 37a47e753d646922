//! Rubric document types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Performance band, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    Excellent,
    Good,
    Satisfactory,
    NeedsImprovement,
}

impl Level {
    pub const ALL: [Level; 4] = [
        Self::Excellent,
        Self::Good,
        Self::Satisfactory,
        Self::NeedsImprovement,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Satisfactory => "Satisfactory",
            Self::NeedsImprovement => "Needs Improvement",
        }
    }

    /// Lowest score percentage in the band
    pub fn floor_percent(self) -> u32 {
        match self {
            Self::Excellent => 90,
            Self::Good => 75,
            Self::Satisfactory => 60,
            Self::NeedsImprovement => 0,
        }
    }

    pub fn range(self) -> &'static str {
        match self {
            Self::Excellent => "90-100%",
            Self::Good => "75-89%",
            Self::Satisfactory => "60-74%",
            Self::NeedsImprovement => "0-59%",
        }
    }

    pub fn qualifier(self) -> &'static str {
        match self {
            Self::Excellent => "exceptionally well",
            Self::Good => "effectively",
            Self::Satisfactory => "adequately",
            Self::NeedsImprovement => "with significant gaps",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One cell of the rubric grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceLevel {
    pub level: String,
    pub range: String,
    pub marks: u32,
    pub description: String,
}

/// One row of the rubric grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionRubric {
    pub criterion: String,
    pub marks: u32,
    pub levels: Vec<PerformanceLevel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloomIntegration {
    pub target_level: String,
    pub alignment: String,
    pub cognitive_processes: Vec<String>,
    pub assessment_focus: String,
}

/// A complete marking rubric
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rubric {
    pub assessment_name: String,
    pub fa_tool: String,
    pub bloom_level: String,
    pub total_marks: u32,
    pub criteria: Vec<CriterionRubric>,
    pub bloom_integration: BloomIntegration,
}

impl Rubric {
    /// Sum of criterion marks (always equals `total_marks`)
    pub fn allocated_marks(&self) -> u32 {
        self.criteria.iter().map(|c| c.marks).sum()
    }
}
