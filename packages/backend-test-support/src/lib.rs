//! Shared helpers for backend unit and integration tests: one-time logging
//! setup and assertions on problem+json error bodies.

pub mod logging;
pub mod problem_details;
