//! Core domain types for student learning records.
//!
//! This module defines the fundamental data structures used throughout the system:
//! - Column name constants shared by the loader, the pipeline and the model
//! - Attribute enums with their canonical labels (Year, LearningStyle, BloomLevel)
//! - `AttributeValue` / `RawRecord` for loosely typed student input
//! - `LabeledRecord` / `Dataset` for training data

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::DatasetError;

// =============================================================================
// Column Names
// =============================================================================

/// Student year of study ("1st Year" .. "4th Year")
pub const YEAR_COLUMN: &str = "Year";

/// Preferred learning style (Visual, Auditory, ...)
pub const LEARNING_STYLE_COLUMN: &str = "LearningStyle";

/// Self-reported confidence, already numeric
pub const CONFIDENCE_COLUMN: &str = "ConfidenceLevel";

/// Bloom's taxonomy level of the assessment target
pub const BLOOM_COLUMN: &str = "BloomLevel";

/// Identifier column, never a feature
pub const STUDENT_ID_COLUMN: &str = "StudentID";

/// Ground-truth column the model learns to predict
pub const LABEL_COLUMN: &str = "PreferredTool";

/// Second survey answer that would leak label information
pub const LEAST_EFFECTIVE_COLUMN: &str = "LeastEffectiveTool";

/// Columns removed before feature extraction
pub const NON_FEATURE_COLUMNS: [&str; 3] = [STUDENT_ID_COLUMN, LABEL_COLUMN, LEAST_EFFECTIVE_COLUMN];

/// The twelve formative-assessment tools the survey asks about.
///
/// The classifier's label set is whatever appears in the training data; this
/// list travels with the model as documentation.
pub const FA_TOOLS: [&str; 12] = [
    "Quiz",
    "Project",
    "Lab Work",
    "Case Study",
    "Group Work",
    "Presentation / PPT",
    "Written Paper",
    "Role Play",
    "Poster Presentation",
    "Viva / Oral Test",
    "Reflection Journal",
    "Open Book Test",
];

// =============================================================================
// Attribute Enums
// =============================================================================

/// Year of study. Ordinal 1..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum YearOfStudy {
    First,
    Second,
    Third,
    Fourth,
}

impl YearOfStudy {
    pub const ALL: [YearOfStudy; 4] = [Self::First, Self::Second, Self::Third, Self::Fourth];

    /// Label as it appears in survey data
    pub fn label(self) -> &'static str {
        match self {
            Self::First => "1st Year",
            Self::Second => "2nd Year",
            Self::Third => "3rd Year",
            Self::Fourth => "4th Year",
        }
    }

    pub fn ordinal(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
            Self::Fourth => 4,
        }
    }
}

/// Preferred learning style. Nominal, encoded 1..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LearningStyle {
    Visual,
    Auditory,
    ReadingWriting,
    Kinesthetic,
}

impl LearningStyle {
    pub const ALL: [LearningStyle; 4] = [
        Self::Visual,
        Self::Auditory,
        Self::ReadingWriting,
        Self::Kinesthetic,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Visual => "Visual",
            Self::Auditory => "Auditory",
            Self::ReadingWriting => "Reading/Writing",
            Self::Kinesthetic => "Kinesthetic",
        }
    }

    pub fn ordinal(self) -> u8 {
        match self {
            Self::Visual => 1,
            Self::Auditory => 2,
            Self::ReadingWriting => 3,
            Self::Kinesthetic => 4,
        }
    }
}

/// Bloom's taxonomy cognitive level, lowest to highest.
///
/// Used both as a model feature and as rubric metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloomLevel {
    Remember,
    Understand,
    Apply,
    Analyze,
    Evaluate,
    Create,
}

impl BloomLevel {
    pub const ALL: [BloomLevel; 6] = [
        Self::Remember,
        Self::Understand,
        Self::Apply,
        Self::Analyze,
        Self::Evaluate,
        Self::Create,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Remember => "Remember",
            Self::Understand => "Understand",
            Self::Apply => "Apply",
            Self::Analyze => "Analyze",
            Self::Evaluate => "Evaluate",
            Self::Create => "Create",
        }
    }

    pub fn ordinal(self) -> u8 {
        match self {
            Self::Remember => 1,
            Self::Understand => 2,
            Self::Apply => 3,
            Self::Analyze => 4,
            Self::Evaluate => 5,
            Self::Create => 6,
        }
    }
}

/// Shared `FromStr` for the label enums: exact match against `label()`.
macro_rules! impl_label_parsing {
    ($ty:ty, $field:expr) => {
        impl FromStr for $ty {
            type Err = DatasetError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty>::ALL
                    .into_iter()
                    .find(|variant| variant.label() == s)
                    .ok_or_else(|| DatasetError::InvalidValue {
                        field: $field.to_string(),
                        value: s.to_string(),
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

impl_label_parsing!(YearOfStudy, YEAR_COLUMN);
impl_label_parsing!(LearningStyle, LEARNING_STYLE_COLUMN);
impl_label_parsing!(BloomLevel, BLOOM_COLUMN);

// =============================================================================
// Raw Attribute Values
// =============================================================================

/// A single raw attribute value: either a number or free text.
///
/// Deserializes from plain JSON numbers and strings (`#[serde(untagged)]`), so
/// a request body like `{"Year": "2nd Year", "ConfidenceLevel": 4}` maps
/// straight onto a [`RawRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
}

impl AttributeValue {
    /// Interpret a dataset cell.
    ///
    /// Empty cells are absent (`None`), cells that parse as a float become
    /// `Number`, everything else stays `Text`.
    pub fn parse_cell(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<f64>() {
            Ok(n) => Some(Self::Number(n)),
            Err(_) => Some(Self::Text(trimmed.to_string())),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }

    /// Numeric view; text is parsed leniently. Non-finite values are rejected.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        n.is_finite().then_some(n)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for AttributeValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for AttributeValue {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

// =============================================================================
// Records
// =============================================================================

/// Mapping from attribute name to raw value for one student.
///
/// Keys are kept in a `BTreeMap` so iteration order is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    attributes: BTreeMap<String, AttributeValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        self.attributes.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl<K: Into<String>, V: Into<AttributeValue>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = RawRecord::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

/// A raw record paired with its ground-truth tool label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledRecord {
    pub record: RawRecord,
    pub label: String,
}

// =============================================================================
// Dataset
// =============================================================================

/// A labeled dataset as read from disk.
///
/// `columns` keeps the header order, which becomes the feature order at
/// training time.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub source: PathBuf,
    pub columns: Vec<String>,
    pub label_column: String,
    pub(crate) examples: Vec<LabeledRecord>,
}

impl Dataset {
    /// Creates an in-memory dataset (mostly for tests and tooling)
    pub fn new(columns: Vec<String>, label_column: impl Into<String>) -> Self {
        Self {
            source: PathBuf::new(),
            columns,
            label_column: label_column.into(),
            examples: Vec::new(),
        }
    }

    pub fn push(&mut self, example: LabeledRecord) {
        self.examples.push(example);
    }

    pub fn examples(&self) -> &[LabeledRecord] {
        &self.examples
    }

    pub fn records(&self) -> impl Iterator<Item = &RawRecord> {
        self.examples.iter().map(|e| &e.record)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.examples.iter().map(|e| e.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Number of rows per label, sorted by label
    pub fn class_distribution(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for label in self.labels() {
            *counts.entry(label.to_string()).or_insert(0) += 1;
        }
        counts
    }
}
