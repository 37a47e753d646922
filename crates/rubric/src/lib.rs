//! Marking rubrics for formative-assessment tools.
//!
//! A rubric splits an assessment's marks across tool-specific criteria and
//! describes four performance bands per criterion, phrased for the target
//! Bloom's taxonomy level.
//!
//! ## Example Usage
//! ```ignore
//! use rubric::{generate, RubricFormat};
//!
//! let rubric = generate("Data Structures Quiz", "Quiz", 20, "Apply");
//! println!("{}", rubric.render(RubricFormat::Html)?);
//! ```

pub mod error;
pub mod generator;
pub mod render;
pub mod tables;
pub mod types;

pub use error::{Result, RubricError};
pub use generator::generate;
pub use render::{RubricFormat, escape};
pub use types::{BloomIntegration, CriterionRubric, Level, PerformanceLevel, Rubric};
