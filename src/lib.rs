//! churnwise: Customer Churn Scoring Library
//!
//! Loads trained churn model artifacts once into an immutable
//! [`pipeline::InferenceContext`] and scores telecom customer records with it:
//! categorical encoding, fixed feature ordering, numeric scaling,
//! classification and a two- or three-tier decision policy.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
