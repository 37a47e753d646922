//! Static rubric content: per-tool criteria, Bloom vocabulary and
//! hand-written level descriptions.

use crate::types::Level;
use data_loader::BloomLevel;

/// Criteria and their percentage weights (summing to 100) for one tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolCriteria {
    pub tool: &'static str,
    pub criteria: &'static [(&'static str, u32)],
}

pub const TOOL_CRITERIA: [ToolCriteria; 12] = [
    ToolCriteria {
        tool: "Quiz",
        criteria: &[
            ("Accuracy of answers", 40),
            ("Speed of completion", 20),
            ("Understanding of concepts", 40),
        ],
    },
    ToolCriteria {
        tool: "Project",
        criteria: &[
            ("Innovation and creativity", 25),
            ("Technical implementation", 30),
            ("Documentation quality", 25),
            ("Presentation", 20),
        ],
    },
    ToolCriteria {
        tool: "Lab Work",
        criteria: &[
            ("Experimental setup", 25),
            ("Data collection", 25),
            ("Analysis and interpretation", 35),
            ("Safety protocols", 15),
        ],
    },
    ToolCriteria {
        tool: "Case Study",
        criteria: &[
            ("Problem identification", 20),
            ("Analysis depth", 30),
            ("Solution feasibility", 30),
            ("Critical thinking", 20),
        ],
    },
    ToolCriteria {
        tool: "Group Work",
        criteria: &[
            ("Collaboration", 25),
            ("Individual contribution", 25),
            ("Final output quality", 30),
            ("Communication", 20),
        ],
    },
    ToolCriteria {
        tool: "Presentation / PPT",
        criteria: &[
            ("Content quality", 35),
            ("Visual design", 20),
            ("Delivery and communication", 35),
            ("Time management", 10),
        ],
    },
    ToolCriteria {
        tool: "Written Paper",
        criteria: &[
            ("Content accuracy", 40),
            ("Writing clarity", 25),
            ("Structure and organization", 25),
            ("References and citations", 10),
        ],
    },
    ToolCriteria {
        tool: "Role Play",
        criteria: &[
            ("Character understanding", 25),
            ("Scenario execution", 25),
            ("Learning demonstration", 30),
            ("Creativity", 20),
        ],
    },
    ToolCriteria {
        tool: "Poster Presentation",
        criteria: &[
            ("Visual appeal", 25),
            ("Content clarity", 30),
            ("Information accuracy", 25),
            ("Presentation skills", 20),
        ],
    },
    ToolCriteria {
        tool: "Viva / Oral Test",
        criteria: &[
            ("Knowledge depth", 40),
            ("Communication skills", 20),
            ("Confidence", 20),
            ("Question handling", 20),
        ],
    },
    ToolCriteria {
        tool: "Reflection Journal",
        criteria: &[
            ("Self-reflection depth", 30),
            ("Learning insights", 30),
            ("Writing quality", 20),
            ("Regular entries", 20),
        ],
    },
    ToolCriteria {
        tool: "Open Book Test",
        criteria: &[
            ("Information utilization", 30),
            ("Problem-solving approach", 30),
            ("Time management", 20),
            ("Answer quality", 20),
        ],
    },
];

/// Criteria table for `tool`, if it is one of the catalogue tools
pub fn criteria_for(tool: &str) -> Option<&'static ToolCriteria> {
    TOOL_CRITERIA.iter().find(|t| t.tool == tool)
}

/// Table used for tools outside the catalogue
pub fn fallback_criteria() -> &'static ToolCriteria {
    &TOOL_CRITERIA[0]
}

/// Cognitive processes assessed at each level
pub fn cognitive_processes(level: BloomLevel) -> [&'static str; 4] {
    match level {
        BloomLevel::Remember => ["Recall facts", "List items", "Define terms", "Identify concepts"],
        BloomLevel::Understand => [
            "Explain concepts",
            "Summarize content",
            "Interpret information",
            "Compare ideas",
        ],
        BloomLevel::Apply => [
            "Use knowledge in new situations",
            "Solve problems",
            "Implement procedures",
            "Demonstrate skills",
        ],
        BloomLevel::Analyze => [
            "Break down information",
            "Examine relationships",
            "Compare and contrast",
            "Identify patterns",
        ],
        BloomLevel::Evaluate => ["Make judgments", "Critique ideas", "Assess quality", "Justify decisions"],
        BloomLevel::Create => [
            "Design solutions",
            "Generate new ideas",
            "Develop plans",
            "Construct products",
        ],
    }
}

/// Action verbs used in generated descriptions
pub fn verbs(level: BloomLevel) -> [&'static str; 4] {
    match level {
        BloomLevel::Remember => ["recall", "identify", "list", "define"],
        BloomLevel::Understand => ["explain", "describe", "summarize", "interpret"],
        BloomLevel::Apply => ["apply", "use", "implement", "demonstrate"],
        BloomLevel::Analyze => ["analyze", "examine", "compare", "break down"],
        BloomLevel::Evaluate => ["evaluate", "assess", "critique", "judge"],
        BloomLevel::Create => ["create", "design", "develop", "generate"],
    }
}

/// Hand-written description for well-known criteria
pub fn specific_description(criterion: &str, level: Level) -> Option<&'static str> {
    use Level::*;
    let text = match (criterion, level) {
        ("Accuracy of answers", Excellent) => "All answers are correct with detailed explanations",
        ("Accuracy of answers", Good) => "Most answers correct with good explanations",
        ("Accuracy of answers", Satisfactory) => "Basic answers with some correct elements",
        ("Accuracy of answers", NeedsImprovement) => "Many incorrect answers or incomplete responses",

        ("Content quality", Excellent) => "Exceptional depth and breadth of content with innovative insights",
        ("Content quality", Good) => "Good content with clear understanding",
        ("Content quality", Satisfactory) => "Adequate content meeting minimum requirements",
        ("Content quality", NeedsImprovement) => "Insufficient content or significant gaps",

        ("Technical implementation", Excellent) => "Flawless execution with advanced techniques",
        ("Technical implementation", Good) => "Solid implementation with minor areas for improvement",
        ("Technical implementation", Satisfactory) => "Basic implementation with room for improvement",
        ("Technical implementation", NeedsImprovement) => "Poor implementation with major issues",

        ("Collaboration", Excellent) => "Outstanding teamwork and leadership skills demonstrated",
        ("Collaboration", Good) => "Effective participation and good teamwork",
        ("Collaboration", Satisfactory) => "Participated but limited contribution",
        ("Collaboration", NeedsImprovement) => "Limited participation or disruptive behavior",

        ("Knowledge depth", Excellent) => "Comprehensive understanding with ability to extend concepts",
        ("Knowledge depth", Good) => "Good understanding with minor gaps",
        ("Knowledge depth", Satisfactory) => "Basic understanding with some confusion",
        ("Knowledge depth", NeedsImprovement) => "Minimal understanding with major gaps",

        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::FA_TOOLS;

    #[test]
    fn test_every_catalogue_tool_has_criteria() {
        for tool in FA_TOOLS {
            assert!(criteria_for(tool).is_some(), "no criteria for {tool}");
        }
    }

    #[test]
    fn test_weights_sum_to_100() {
        for table in &TOOL_CRITERIA {
            let total: u32 = table.criteria.iter().map(|(_, w)| w).sum();
            assert_eq!(total, 100, "{}", table.tool);
        }
    }

    #[test]
    fn test_fallback_is_quiz() {
        assert_eq!(fallback_criteria().tool, "Quiz");
        assert!(criteria_for("Interpretive Dance").is_none());
    }

    #[test]
    fn test_specific_descriptions() {
        assert_eq!(
            specific_description("Collaboration", Level::Good),
            Some("Effective participation and good teamwork")
        );
        assert_eq!(specific_description("Speed of completion", Level::Good), None);
    }
}
