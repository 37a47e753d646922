//! Server crate for the FA tool recommender.
//!
//! This crate contains the service facade that owns the live model and
//! combines recommendations with rubric generation.

pub mod service;

pub use service::{
    AssessmentRequest, AssessmentResponse, AssessmentService, BootstrapOutcome, DEFAULT_TOTAL_MARKS,
    Result, ServiceError,
};
