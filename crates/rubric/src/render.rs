//! Text, JSON and HTML rendering of a [`Rubric`].

use crate::error::{Result, RubricError};
use crate::types::{Level, Rubric};
use std::fmt::Write;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RubricFormat {
    #[default]
    Text,
    Json,
    Html,
}

impl FromStr for RubricFormat {
    type Err = RubricError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            _ => Err(RubricError::UnknownFormat(s.to_string())),
        }
    }
}

impl Rubric {
    pub fn render(&self, format: RubricFormat) -> Result<String> {
        match format {
            RubricFormat::Text => Ok(self.to_text()),
            RubricFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            RubricFormat::Html => Ok(self.to_html()),
        }
    }

    /// Plain-text listing of criteria and bands
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Assessment: {}", self.assessment_name);
        let _ = writeln!(out, "FA Tool: {}", self.fa_tool);
        let _ = writeln!(out, "Bloom's Level: {}", self.bloom_level);
        let _ = writeln!(out, "Total Marks: {}", self.total_marks);
        let _ = writeln!(out, "\nCriteria:");

        for criterion in &self.criteria {
            let _ = writeln!(out, "\n{} ({} marks)", criterion.criterion, criterion.marks);
            for level in &criterion.levels {
                let _ = writeln!(
                    out,
                    "  {} [{}]: {} ({} marks)",
                    level.level, level.range, level.description, level.marks
                );
            }
        }

        let bloom = &self.bloom_integration;
        let _ = writeln!(out, "\nBloom's Taxonomy Integration:");
        let _ = writeln!(out, "  {}", bloom.alignment);
        if !bloom.cognitive_processes.is_empty() {
            let _ = writeln!(out, "  Cognitive processes: {}", bloom.cognitive_processes.join(", "));
        }
        let _ = writeln!(out, "  {}", bloom.assessment_focus);
        out
    }

    /// Self-contained HTML fragment; all user-supplied text is escaped
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        html.push_str("<div class=\"rubric-container\">\n");
        let _ = writeln!(html, "  <h2>Assessment Rubric: {}</h2>", escape(&self.assessment_name));
        html.push_str("  <div class=\"rubric-info\">\n");
        let _ = writeln!(html, "    <p><strong>FA Tool:</strong> {}</p>", escape(&self.fa_tool));
        let _ = writeln!(html, "    <p><strong>Bloom's Level:</strong> {}</p>", escape(&self.bloom_level));
        let _ = writeln!(html, "    <p><strong>Total Marks:</strong> {}</p>", self.total_marks);
        html.push_str("  </div>\n");

        html.push_str("  <table class=\"rubric-table\">\n    <thead>\n      <tr>\n");
        html.push_str("        <th>Criteria</th>\n        <th>Marks</th>\n");
        for level in Level::ALL {
            let _ = writeln!(html, "        <th>{}</th>", level.label());
        }
        html.push_str("      </tr>\n    </thead>\n    <tbody>\n");

        for criterion in &self.criteria {
            html.push_str("      <tr>\n");
            let _ = writeln!(html, "        <td><strong>{}</strong></td>", escape(&criterion.criterion));
            let _ = writeln!(html, "        <td>{}</td>", criterion.marks);
            for level in &criterion.levels {
                let _ = writeln!(
                    html,
                    "        <td><div class=\"level-info\"><strong>{}</strong><br><span class=\"marks\">({} marks)</span><p>{}</p></div></td>",
                    escape(&level.range),
                    level.marks,
                    escape(&level.description)
                );
            }
            html.push_str("      </tr>\n");
        }
        html.push_str("    </tbody>\n  </table>\n");

        let bloom = &self.bloom_integration;
        html.push_str("  <div class=\"bloom-integration\">\n");
        html.push_str("    <h3>Bloom's Taxonomy Integration</h3>\n");
        let _ = writeln!(html, "    <p><strong>Target Level:</strong> {}</p>", escape(&bloom.target_level));
        let _ = writeln!(html, "    <p><strong>Assessment Focus:</strong> {}</p>", escape(&bloom.assessment_focus));
        html.push_str("  </div>\n</div>\n");
        html
    }
}

/// Escape text for HTML element content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate;

    #[test]
    fn test_format_parsing() {
        assert_eq!("HTML".parse::<RubricFormat>().unwrap(), RubricFormat::Html);
        assert_eq!("json".parse::<RubricFormat>().unwrap(), RubricFormat::Json);
        assert!(matches!("pdf".parse::<RubricFormat>(), Err(RubricError::UnknownFormat(_))));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>A & B</b>"), "&lt;b&gt;A &amp; B&lt;/b&gt;");
        assert_eq!(escape("it's \"fine\""), "it&#39;s &quot;fine&quot;");
    }

    #[test]
    fn test_html_escapes_assessment_name() {
        let rubric = generate("<script>alert(1)</script>", "Quiz", 10, "Apply");
        let html = rubric.to_html();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert_eq!(html.matches("<tr>").count(), 1 + rubric.criteria.len());
    }

    #[test]
    fn test_text_lists_every_criterion() {
        let rubric = generate("Data Structures Quiz", "Quiz", 20, "Apply");
        let text = rubric.to_text();
        assert!(text.contains("Accuracy of answers (8 marks)"));
        assert!(text.contains("Speed of completion (4 marks)"));
        assert!(text.contains("Excellent [90-100%]"));
    }

    #[test]
    fn test_json_round_trip() {
        let rubric = generate("Lab 3", "Lab Work", 25, "Analyze");
        let json = rubric.render(RubricFormat::Json).unwrap();
        let parsed: Rubric = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, rubric);
    }
}
